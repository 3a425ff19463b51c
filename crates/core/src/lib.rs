pub mod auth;
pub mod config;
pub mod engine;

pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, QueueConfig, SanitizedConfig, ServerConfig,
};
pub use engine::{
    QueueEngine, QueueMode, QueueSnapshot, Rejection, Room, RoomDefinition, RoomView, Ticket,
    TicketId, TicketStatus,
};
