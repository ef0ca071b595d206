use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

impl AuthRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Authenticated identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
}

impl Identity {
    /// The single administrator holding the shared key.
    pub fn admin() -> Self {
        Self {
            user_id: "admin".to_string(),
            method: "admin_key".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_identity() {
        let identity = Identity::admin();
        assert_eq!(identity.user_id, "admin");
        assert_eq!(identity.method, "admin_key");
    }

    #[test]
    fn test_header_lookup() {
        let request = AuthRequest {
            headers: HashMap::from([("x-admin-key".to_string(), "k".to_string())]),
            source_ip: "10.0.0.1".parse().unwrap(),
        };
        assert_eq!(request.header("x-admin-key"), Some("k"));
        assert_eq!(request.header("authorization"), None);
    }
}
