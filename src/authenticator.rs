use std::{fmt, str::FromStr};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use tracing::{debug, info};

use crate::{
    data::{Credentials, RequestDescriptor},
    error::{AuthError, AuthResult},
    sign::{build_authorization_header, sign},
    utils::{content_md5, current_unix_timestamp, random_nonce, CLIENT_NONCE_LENGTH},
};

pub const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(AuthError::InvalidInput(format!("Unsupported HTTP method: {}", other))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body as it will be sent, with its MIME type.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    pub content_type: &'a str,
    pub content: &'a str,
}

/// Authorization produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub header: String,
    /// Set only when a body was hashed into an ApiKey signature
    pub content_md5: Option<String>,
}

/// Picks the authorization scheme for outgoing requests: a user access token
/// when one is configured, otherwise a freshly signed ApiKey header.
#[derive(Clone)]
pub struct Authenticator {
    pub api_key: String,
    pub api_secret: String,
    pub company_code: String,
    pub access_token: Option<String>,
    pub device_token: Option<String>,
    pub impersonated_user_id: Option<i64>,
    pub nonce_length: usize,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("api_key", &self.api_key)
            .field("company_code", &self.company_code)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("device_token", &self.device_token)
            .field("impersonated_user_id", &self.impersonated_user_id)
            .field("nonce_length", &self.nonce_length)
            .finish()
    }
}

impl Authenticator {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>, company_code: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            company_code: company_code.into(),
            access_token: None,
            device_token: None,
            impersonated_user_id: None,
            nonce_length: CLIENT_NONCE_LENGTH,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_device_token(mut self, token: impl Into<String>) -> Self {
        self.device_token = Some(token.into());
        self
    }

    pub fn with_impersonated_user(mut self, user_id: i64) -> Self {
        self.impersonated_user_id = Some(user_id);
        self
    }

    pub fn with_nonce_length(mut self, length: usize) -> Self {
        self.nonce_length = length;
        self
    }

    /// `None` when neither an access token nor a key/secret pair is configured.
    pub fn authorize(&self, method: HttpMethod, path: &str, body: Option<Body<'_>>) -> AuthResult<Option<Authorization>> {
        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            debug!("Using access token for {} {}", method, path);
            let header = if token.starts_with("Basic ") || token.starts_with("Bearer ") {
                token.to_string()
            } else {
                format!("Bearer {}", token)
            };
            return Ok(Some(Authorization { header, content_md5: None }));
        }

        if self.api_key.is_empty() || self.api_secret.is_empty() {
            info!("No credentials configured, {} {} is sent unauthenticated", method, path);
            return Ok(None);
        }

        let mut request = RequestDescriptor::new(method.as_str(), path);
        let mut content_hash = None;
        if let Some(body) = body {
            let hash = content_md5(body.content);
            request = request.with_content(body.content_type, hash.clone());
            content_hash = Some(hash);
        }

        let credentials = self.credentials(random_nonce(self.nonce_length)?, current_unix_timestamp());
        let signed = sign(&request, &credentials)?;
        Ok(Some(Authorization {
            header: build_authorization_header(&signed),
            content_md5: content_hash,
        }))
    }

    pub fn header_map(&self, method: HttpMethod, path: &str, body: Option<Body<'_>>) -> AuthResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(auth) = self.authorize(method, path, body)? {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth.header)?);
            if let Some(hash) = auth.content_md5 {
                headers.insert(CONTENT_MD5, HeaderValue::from_str(&hash)?);
            }
        }
        Ok(headers)
    }

    fn credentials(&self, nonce: String, timestamp: i64) -> Credentials {
        let mut credentials = Credentials::new(
            self.api_key.clone(),
            self.api_secret.clone(),
            nonce,
            timestamp,
            self.company_code.clone(),
        );
        // The client digest always carries both trailing fields
        credentials.device_token = Some(self.device_token.clone().unwrap_or_default());
        credentials.impersonated_user_id = Some(self.impersonated_user_id.unwrap_or(0));
        credentials
    }
}
