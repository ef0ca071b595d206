//! Shared-secret admin authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Authenticator that validates requests against the configured admin key.
///
/// Accepts the key in either:
/// - `X-Admin-Key: <key>` header
/// - `Authorization: Bearer <key>` header
pub struct AdminKeyAuthenticator {
    expected_key: String,
}

impl AdminKeyAuthenticator {
    pub fn new(admin_key: String) -> Self {
        Self {
            expected_key: admin_key,
        }
    }

    fn extract_key<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        if let Some(key) = request.header(ADMIN_KEY_HEADER) {
            return Some(key);
        }

        let auth_header = request.header("authorization")?;
        auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
    }
}

#[async_trait]
impl Authenticator for AdminKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided_key = self
            .extract_key(request)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(provided_key.as_bytes(), self.expected_key.as_bytes()) {
            Ok(Identity::admin())
        } else {
            Err(AuthError::InvalidCredentials(
                "Invalid admin key".to_string(),
            ))
        }
    }

    fn method_name(&self) -> &'static str {
        "admin_key"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
