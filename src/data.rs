use std::fmt;
use serde::{Deserialize, Serialize};

/// Metadata of the outgoing API request that takes part in the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RequestDescriptor {
    pub method: String,
    pub path: String,
    /// Empty when the request has no body
    pub content_type: String,
    /// Empty when the request has no body
    pub content_hash: String,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            content_type: String::new(),
            content_hash: String::new(),
        }
    }

    pub fn with_content(mut self, content_type: impl Into<String>, content_hash: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self.content_hash = content_hash.into();
        self
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub nonce: String,
    pub timestamp: i64,
    pub company_code: String,
    #[serde(default)]
    pub device_token: Option<String>,
    #[serde(default)]
    pub impersonated_user_id: Option<i64>,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        nonce: impl Into<String>,
        timestamp: i64,
        company_code: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            nonce: nonce.into(),
            timestamp,
            company_code: company_code.into(),
            device_token: None,
            impersonated_user_id: None,
        }
    }

    pub fn with_device_token(mut self, token: impl Into<String>) -> Self {
        self.device_token = Some(token.into());
        self
    }

    pub fn with_impersonated_user(mut self, user_id: i64) -> Self {
        self.impersonated_user_id = Some(user_id);
        self
    }
}

// The secret must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("nonce", &self.nonce)
            .field("timestamp", &self.timestamp)
            .field("company_code", &self.company_code)
            .field("device_token", &self.device_token)
            .field("impersonated_user_id", &self.impersonated_user_id)
            .finish()
    }
}

/// Credentials after signing. Carries everything the digest string needs,
/// the secret excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedCredentials {
    pub api_key: String,
    pub nonce: String,
    pub timestamp: i64,
    pub company_code: String,
    pub device_token: Option<String>,
    pub impersonated_user_id: Option<i64>,
    pub signature: String,
}

impl SignedCredentials {
    pub fn from_credentials(credentials: &Credentials, signature: String) -> Self {
        Self {
            api_key: credentials.api_key.clone(),
            nonce: credentials.nonce.clone(),
            timestamp: credentials.timestamp,
            company_code: credentials.company_code.clone(),
            device_token: credentials.device_token.clone(),
            impersonated_user_id: credentials.impersonated_user_id,
            signature,
        }
    }

    pub fn has_client_fields(&self) -> bool {
        self.device_token.is_some() || self.impersonated_user_id.is_some()
    }
}
