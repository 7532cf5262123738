use tracing::debug;

use crate::{
    data::{Credentials, RequestDescriptor, SignedCredentials},
    error::{AuthError, AuthResult},
    utils::{hmac_sha256_base64, to_base64, MIN_NONCE_LENGTH},
};

pub const AUTH_SCHEME: &str = "ApiKey";

/// `METHOD path content-type content-hash timestamp nonce`, space separated.
/// Empty content fields keep their separators, so a bodiless request has
/// three spaces between the path and the timestamp.
pub fn canonical_message(request: &RequestDescriptor, credentials: &Credentials) -> String {
    [
        request.method.to_uppercase(),
        request.path.to_lowercase(),
        request.content_type.to_lowercase(),
        request.content_hash.clone(),
        credentials.timestamp.to_string(),
        credentials.nonce.clone(),
    ]
    .join(" ")
}

fn validate(request: &RequestDescriptor, credentials: &Credentials) -> AuthResult<()> {
    if credentials.api_secret.is_empty() {
        return Err(AuthError::InvalidInput("API secret cannot be empty".to_string()));
    }
    if credentials.nonce.chars().count() < MIN_NONCE_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "nonce must be at least {} characters",
            MIN_NONCE_LENGTH
        )));
    }
    if credentials.timestamp < 0 {
        return Err(AuthError::InvalidInput(format!(
            "timestamp must not be negative, got {}",
            credentials.timestamp
        )));
    }
    if request.method.is_empty() {
        return Err(AuthError::InvalidInput("request method cannot be empty".to_string()));
    }
    if request.path.is_empty() {
        return Err(AuthError::InvalidInput("request path cannot be empty".to_string()));
    }
    Ok(())
}

pub fn sign(request: &RequestDescriptor, credentials: &Credentials) -> AuthResult<SignedCredentials> {
    validate(request, credentials)?;

    let message = canonical_message(request, credentials);
    debug!("HMAC message to sign: {}", message);

    let signature = hmac_sha256_base64(credentials.api_secret.as_bytes(), &message)?;
    Ok(SignedCredentials::from_credentials(credentials, signature))
}

/// `apiKey:nonce:timestamp:companyCode:signature`, followed by
/// `:deviceToken:impersonatedUserId` when either client field is set.
pub fn build_digest_string(signed: &SignedCredentials) -> String {
    let mut tokens = vec![
        signed.api_key.clone(),
        signed.nonce.clone(),
        signed.timestamp.to_string(),
        signed.company_code.clone(),
        signed.signature.clone(),
    ];

    if signed.has_client_fields() {
        tokens.push(signed.device_token.clone().unwrap_or_default());
        tokens.push(signed.impersonated_user_id.unwrap_or(0).to_string());
    }

    tokens.join(":")
}

pub fn build_authorization_header(signed: &SignedCredentials) -> String {
    format!("{} {}", AUTH_SCHEME, to_base64(build_digest_string(signed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};

    const API_KEY: &str = "a87a466d-52e4-4dde-8f1d-a6ff3a68209e";
    const API_SECRET: &str = "eJFf7vJ4c2C7euY294PCxuSV5jVYK";
    const GOLDEN_SIGNATURE: &str = "JulCvoDirUKtpDYUk6C9hT2qnsyWzojp15CIkAxJo0c=";

    fn request() -> RequestDescriptor {
        RequestDescriptor::new("GET", "/api/BusinessIntelligence/GetActiveGroups")
    }

    fn credentials() -> Credentials {
        Credentials::new(API_KEY, API_SECRET, "AbCd1234", 1600000000, "dev")
    }

    #[test]
    fn canonical_message_keeps_empty_fields() {
        assert_eq!(
            canonical_message(&request(), &credentials()),
            "GET /api/businessintelligence/getactivegroups   1600000000 AbCd1234"
        );
    }

    #[test]
    fn canonical_message_normalizes_case() {
        let request = RequestDescriptor::new("post", "/API/Groups").with_content("Application/JSON", "AbC==");
        assert_eq!(
            canonical_message(&request, &credentials()),
            "POST /api/groups application/json AbC== 1600000000 AbCd1234"
        );
    }

    #[test]
    fn golden_signature() {
        let signed = sign(&request(), &credentials()).unwrap();
        assert_eq!(signed.signature, GOLDEN_SIGNATURE);
    }

    #[test]
    fn signing_is_deterministic() {
        let first = sign(&request(), &credentials()).unwrap();
        let second = sign(&request(), &credentials()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn every_signed_field_changes_the_signature() {
        let base = sign(&request(), &credentials()).unwrap().signature;

        let mut requests = Vec::new();
        let mut r = request();
        r.method = "POST".into();
        requests.push(r);
        let mut r = request();
        r.path = "/api/BusinessIntelligence/GetGroups".into();
        requests.push(r);
        requests.push(request().with_content("application/json", ""));
        requests.push(request().with_content("", "1B2M2Y8AsgTpgAmY7PhCfg=="));
        for r in &requests {
            assert_ne!(sign(r, &credentials()).unwrap().signature, base, "{:?}", r);
        }

        let mut c = credentials();
        c.timestamp += 1;
        assert_ne!(sign(&request(), &c).unwrap().signature, base);
        let mut c = credentials();
        c.nonce = "AbCd1235".into();
        assert_ne!(sign(&request(), &c).unwrap().signature, base);
        let mut c = credentials();
        c.api_secret.push('x');
        assert_ne!(sign(&request(), &c).unwrap().signature, base);
    }

    #[test]
    fn path_and_method_case_do_not_matter() {
        let base = sign(&request(), &credentials()).unwrap().signature;
        let shouted = RequestDescriptor::new("get", "/API/BUSINESSINTELLIGENCE/GETACTIVEGROUPS");
        assert_eq!(sign(&shouted, &credentials()).unwrap().signature, base);
    }

    #[test]
    fn invalid_input_is_rejected_before_signing() {
        let mut c = credentials();
        c.api_secret.clear();
        assert!(matches!(sign(&request(), &c), Err(AuthError::InvalidInput(_))));

        let mut c = credentials();
        c.nonce = "abc".into();
        assert!(matches!(sign(&request(), &c), Err(AuthError::InvalidInput(_))));

        let mut c = credentials();
        c.timestamp = -5;
        assert!(matches!(sign(&request(), &c), Err(AuthError::InvalidInput(_))));

        let empty_method = RequestDescriptor::new("", "/api/x");
        assert!(matches!(sign(&empty_method, &credentials()), Err(AuthError::InvalidInput(_))));

        let empty_path = RequestDescriptor::new("GET", "");
        assert!(matches!(sign(&empty_path, &credentials()), Err(AuthError::InvalidInput(_))));
    }

    #[test]
    fn epoch_timestamp_is_accepted() {
        let mut c = credentials();
        c.timestamp = 0;
        let signed = sign(&request(), &c).unwrap();
        assert!(build_digest_string(&signed).contains(":AbCd1234:0:dev:"));
    }

    #[test]
    fn digest_string_has_five_fields() {
        let signed = sign(&request(), &credentials()).unwrap();
        assert_eq!(
            build_digest_string(&signed),
            format!("{}:AbCd1234:1600000000:dev:{}", API_KEY, GOLDEN_SIGNATURE)
        );
    }

    #[test]
    fn digest_string_appends_client_fields() {
        let c = credentials().with_device_token("dev-token").with_impersonated_user(42);
        let signed = sign(&request(), &c).unwrap();
        assert_eq!(signed.signature, GOLDEN_SIGNATURE);
        assert!(build_digest_string(&signed).ends_with(":dev:JulCvoDirUKtpDYUk6C9hT2qnsyWzojp15CIkAxJo0c=:dev-token:42"));

        let only_user = sign(&request(), &credentials().with_impersonated_user(5)).unwrap();
        assert!(build_digest_string(&only_user).ends_with("Jo0c=::5"));

        let only_device = sign(&request(), &credentials().with_device_token("d")).unwrap();
        assert!(build_digest_string(&only_device).ends_with("Jo0c=:d:0"));
    }

    #[test]
    fn authorization_header_golden_value() {
        let signed = sign(&request(), &credentials()).unwrap();
        assert_eq!(
            build_authorization_header(&signed),
            "ApiKey YTg3YTQ2NmQtNTJlNC00ZGRlLThmMWQtYTZmZjNhNjgyMDllOkFiQ2QxMjM0OjE2MDAwMDAwMDA6ZGV2Okp1bEN2b0RpclVLdHBEWVVrNkM5aFQycW5zeVd6b2pwMTVDSWtBeEpvMGM9"
        );
    }

    #[test]
    fn authorization_header_is_prefix_plus_base64() {
        let signed = sign(&request(), &credentials()).unwrap();
        let header = build_authorization_header(&signed);
        let encoded = header.strip_prefix("ApiKey ").unwrap();
        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded, build_digest_string(&signed));
    }
}
