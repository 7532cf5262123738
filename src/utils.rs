use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

pub const MIN_NONCE_LENGTH: usize = 4;
pub const DEFAULT_NONCE_LENGTH: usize = 8;
/// Nonce length used by the full API client
pub const CLIENT_NONCE_LENGTH: usize = 12;

/// Standard, padded Base64. Text is encoded through its UTF-8 bytes.
pub fn to_base64<T: AsRef<[u8]>>(data: T) -> String {
    STANDARD.encode(data.as_ref())
}

pub fn hmac_sha256_base64(secret_key: &[u8], msg: &str) -> AuthResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key)
        .map_err(|e| AuthError::Encoding(format!("HMAC key rejected: {}", e)))?;
    mac.update(msg.as_bytes());
    Ok(to_base64(mac.finalize().into_bytes()))
}

/// Alphanumeric nonce drawn from the operating system's CSPRNG.
pub fn random_nonce(length: usize) -> AuthResult<String> {
    if length < MIN_NONCE_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "nonce length must be at least {}, got {}",
            MIN_NONCE_LENGTH, length
        )));
    }

    Ok(OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect())
}

pub fn current_unix_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Base64 of the MD5 sum of a request body, the form the API expects in
/// `Content-MD5` and in the signed content hash.
pub fn content_md5<T: AsRef<[u8]>>(body: T) -> String {
    to_base64(md5::compute(body.as_ref()).0)
}
