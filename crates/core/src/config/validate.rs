use std::collections::HashSet;

use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - api_key is set when auth method is "api_key"
/// - At least one room, with unique non-empty ids
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Auth validation
    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is \"api_key\"".to_string(),
        ));
    }

    // Queue validation
    if config.queue.rooms.is_empty() {
        return Err(ConfigError::ValidationError(
            "queue.rooms must contain at least one room".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for room in &config.queue.rooms {
        if room.id.is_empty() {
            return Err(ConfigError::ValidationError(
                "queue.rooms entries must have a non-empty id".to_string(),
            ));
        }
        if !seen.insert(room.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate room id: {}",
                room.id
            )));
        }
    }

    Ok(())
}
