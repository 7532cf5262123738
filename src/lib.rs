//! ApiKey authorization for the Mobil Omsorg API.
//!
//! A request is signed with HMAC-SHA256 over
//! `METHOD path content-type content-hash timestamp nonce`, and the signature
//! travels in a Base64 digest string behind the `ApiKey` scheme:
//!
//! ```
//! use mo_auth::{sign, build_authorization_header, Credentials, RequestDescriptor};
//!
//! let request = RequestDescriptor::new("GET", "/api/BusinessIntelligence/GetActiveGroups");
//! let credentials = Credentials::new("key", "secret", "AbCd1234", 1600000000, "dev");
//! let signed = sign(&request, &credentials).unwrap();
//! assert!(build_authorization_header(&signed).starts_with("ApiKey "));
//! ```

pub mod authenticator;
pub mod config;
pub mod data;
pub mod error;
pub mod sign;
pub mod utils;


pub use authenticator::{Authenticator, Authorization, Body, HttpMethod};
pub use data::{Credentials, RequestDescriptor, SignedCredentials};
pub use error::{AuthError, AuthResult};
pub use sign::{build_authorization_header, build_digest_string, canonical_message, sign};
pub use utils::{content_md5, current_unix_timestamp, random_nonce, to_base64};
