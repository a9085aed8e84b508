//! Application layer errors

use thiserror::Error;

/// Error type plugins return from executors, handlers and service inits
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for plugin entry points
pub type HandlerResult = Result<(), BoxError>;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// A module file could not be imported
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse module: {0}")]
    Parse(String),

    #[error("Unknown {capability} '{symbol}'")]
    UnresolvedSymbol { capability: &'static str, symbol: String },

    #[error("Failed to load library: {0}")]
    Library(String),
}

/// A loaded module does not have the required shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing a required \"data\" property")]
    MissingMetadata,

    #[error("Missing a required \"data.name\" property")]
    MissingName,

    #[error("Missing a required \"execute\" property")]
    MissingExecutor,

    #[error("Missing a required \"handler\" property")]
    MissingHandler,

    #[error("Command '{0}' is already registered")]
    Duplicate(String),
}

/// Service initialization errors
#[derive(Error, Debug)]
pub enum ServiceInitError {
    #[error("Service '{service}' failed unrecoverably: {reason}")]
    Fatal { service: String, reason: String },
}

/// Returned by a service to request process termination
#[derive(Error, Debug)]
#[error("{0}")]
pub struct Fatal(pub String);

/// Remote command registration errors
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote rejected commands ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Registrar panicked: {0}")]
    Panicked(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{0}")]
    Failed(BoxError),

    #[error("Executor panicked: {0}")]
    Panicked(String),
}

/// Interaction response errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Interaction has already been acknowledged")]
    AlreadyAcknowledged,

    #[error("Interaction has not been acknowledged yet")]
    NotAcknowledged,

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Connection collaborator errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Login failed: {0}")]
    Login(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
