use serde::{Deserialize, Serialize};
use std::{env, fmt};

use crate::{
    authenticator::{Authenticator, HttpMethod},
    error::{AuthError, AuthResult},
    utils::{DEFAULT_NONCE_LENGTH, MIN_NONCE_LENGTH},
};

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub company_code: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub device_token: Option<String>,
    pub impersonated_user_id: Option<i64>,
    pub nonce_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub method: String,
    pub path: String,
    pub content_type: String,
    /// Raw body; its MD5 becomes the signed content hash
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub request: RequestConfig,
    pub logging: LoggingConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            company_code: String::new(),
            access_token: None,
            device_token: None,
            impersonated_user_id: None,
            nonce_length: DEFAULT_NONCE_LENGTH,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            path: "/api/BusinessIntelligence/GetActiveGroups".to_string(),
            content_type: String::new(),
            body: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("company_code", &self.company_code)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("device_token", &self.device_token)
            .field("impersonated_user_id", &self.impersonated_user_id)
            .field("nonce_length", &self.nonce_length)
            .finish()
    }
}

impl ApiConfig {
    /// An empty token counts as no token at all.
    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn authenticator(&self) -> Authenticator {
        let mut auth = Authenticator::new(&self.api_key, &self.api_secret, &self.company_code)
            .with_nonce_length(self.nonce_length);
        auth.access_token = self.access_token.clone();
        auth.device_token = self.device_token.clone();
        auth.impersonated_user_id = self.impersonated_user_id;
        auth
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api.access_token = lookup("MO_ACCESS_TOKEN").filter(|t| !t.is_empty());

        // A key pair is optional once a user access token is configured
        let has_token = config.api.access_token.is_some();
        let required = |name: &str| -> AuthResult<String> {
            match lookup(name) {
                Some(value) => Ok(value),
                None if has_token => Ok(String::new()),
                None => Err(AuthError::Configuration(format!("{} not found", name))),
            }
        };
        config.api.api_key = required("MO_API_KEY")?;
        config.api.api_secret = required("MO_API_SECRET")?;
        config.api.company_code = lookup("MO_COMPANY_CODE").unwrap_or_default();
        config.api.device_token = lookup("MO_DEVICE_TOKEN").filter(|t| !t.is_empty());

        if let Some(user_id) = lookup("MO_IMPERSONATED_USER_ID") {
            config.api.impersonated_user_id = Some(user_id.parse()
                .map_err(|_| AuthError::Configuration("Invalid MO_IMPERSONATED_USER_ID".to_string()))?);
        }

        if let Some(length) = lookup("MO_NONCE_LENGTH") {
            config.api.nonce_length = length.parse()
                .map_err(|_| AuthError::Configuration("Invalid MO_NONCE_LENGTH".to_string()))?;
        }

        if let Some(method) = lookup("MO_REQUEST_METHOD") {
            config.request.method = method;
        }

        if let Some(path) = lookup("MO_REQUEST_PATH") {
            config.request.path = path;
        }

        if let Some(content_type) = lookup("MO_REQUEST_CONTENT_TYPE") {
            config.request.content_type = content_type;
        }

        config.request.body = lookup("MO_REQUEST_BODY");

        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> AuthResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Configuration(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AuthResult<Self> {
        let mut config: AppConfig = toml::from_str(content)?;
        config.api.access_token = config.api.access_token.filter(|t| !t.is_empty());
        config.validate()?;
        Ok(config)
    }

    pub fn method(&self) -> AuthResult<HttpMethod> {
        self.request.method.parse()
    }

    /// Validate configuration
    pub fn validate(&self) -> AuthResult<()> {
        if !self.api.has_access_token() {
            if self.api.api_key.is_empty() {
                return Err(AuthError::Configuration("API key cannot be empty".to_string()));
            }

            if self.api.api_secret.is_empty() {
                return Err(AuthError::Configuration("API secret cannot be empty".to_string()));
            }
        }

        if self.api.nonce_length < MIN_NONCE_LENGTH {
            return Err(AuthError::Configuration(format!(
                "Nonce length must be at least {}", MIN_NONCE_LENGTH
            )));
        }

        if self.request.path.is_empty() {
            return Err(AuthError::Configuration("Request path cannot be empty".to_string()));
        }

        self.method()
            .map_err(|e| AuthError::Configuration(e.to_string()))?;

        if self.request.body.is_some() && self.request.content_type.is_empty() {
            return Err(AuthError::Configuration("A request body needs a content type".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(AuthError::Configuration(format!("Invalid log level: {}", self.logging.level)));
        }

        Ok(())
    }
}
