mod admin_key;
mod traits;
mod types;

pub use admin_key::*;
pub use traits::*;
pub use types::*;

use crate::config::AdminConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AdminConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    let key = config.key.trim();
    if key.is_empty() {
        return Err(AuthError::ConfigurationError(
            "admin.key must be set".to_string(),
        ));
    }
    Ok(Box::new(AdminKeyAuthenticator::new(key.to_string())))
}
