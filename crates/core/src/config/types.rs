use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::engine::RoomDefinition;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration for the staff-only actions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Required when method = "api_key"
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
    // Future: Oidc
}

/// Queue configuration: ticket numbering and the static room roster
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// First ticket number handed out (and the number after every reset)
    #[serde(default = "default_ticket_number_base")]
    pub ticket_number_base: u32,
    /// Rooms available for two-stage routing, in display order
    #[serde(default = "default_rooms")]
    pub rooms: Vec<RoomDefinition>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            ticket_number_base: default_ticket_number_base(),
            rooms: default_rooms(),
        }
    }
}

fn default_ticket_number_base() -> u32 {
    101
}

fn default_rooms() -> Vec<RoomDefinition> {
    vec![
        RoomDefinition::new("room-a", "Room A"),
        RoomDefinition::new("room-b", "Room B"),
        RoomDefinition::new("room-c", "Room C"),
    ]
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub queue: QueueConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config.auth.api_key.is_some(),
            },
            server: config.server.clone(),
            queue: config.queue.clone(),
        }
    }
}
