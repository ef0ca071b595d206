use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Admin section exists (enforced by serde)
/// - Admin key is not blank
/// - Server port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.admin.key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "admin.key cannot be empty".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}
