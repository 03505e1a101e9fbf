use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an access token. The token is self-contained: validity
/// is decided by signature and expiry alone, nothing is stored server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Identity asserted by the provider at login. Opaque, untrusted string.
    pub id: String,
    /// Absolute expiry as a unix timestamp
    pub exp: u64,
}

/// Reasons a token can fail verification. Callers use the distinction to
/// decide between retrying login (Expired) and treating the request as hostile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct IssueError(#[from] jsonwebtoken::errors::Error);

/// Issues and verifies signed, expiring access tokens (HS256).
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        // Pinning the algorithm list rejects tokens signed with anything
        // other than HS256, including the "none" algorithm.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Produces a signed token for `identity` expiring `ttl_secs` from now.
    pub fn issue(&self, identity: &str, ttl_secs: u64) -> Result<String, IssueError> {
        let claims = Claims {
            id: identity.to_string(),
            exp: Utc::now().timestamp() as u64 + ttl_secs,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Checks signature and expiry and returns the embedded claims.
    ///
    /// The signature is verified before the payload is deserialized, so a
    /// token altered in transit surfaces as `BadSignature` rather than a
    /// parse error. Verification has no side effects; repeated calls on the
    /// same token yield the same result.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let data: TokenData<Claims> =
            decode(token, &self.decoding_key, &self.validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => VerifyError::BadSignature,
                _ => VerifyError::Malformed,
            })?;
        Ok(data.claims)
    }
}
