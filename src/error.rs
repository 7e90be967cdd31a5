use thiserror::Error;

/// Main error type for lobbygraph
#[derive(Error, Debug)]
pub enum LobbyGraphError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or out-of-range caller input
    #[error("Invalid input: {0}")]
    InvalidArgument(String),

    /// Expansion seed does not resolve to an entity
    #[error("Seed entity not found: {0}")]
    SeedNotFound(String),

    /// Entity lookup miss
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// The entity/relationship store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Parse errors (fixtures, stored values)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LobbyGraphError {
    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            LobbyGraphError::InvalidArgument(_) => "INVALID_ARGUMENT",
            LobbyGraphError::SeedNotFound(_) | LobbyGraphError::EntityNotFound(_) => "NOT_FOUND",
            LobbyGraphError::StoreUnavailable(_)
            | LobbyGraphError::Database(_)
            | LobbyGraphError::Io(_) => "SERVICE_UNAVAILABLE",
            LobbyGraphError::Config(_) | LobbyGraphError::Parse(_) => "INTERNAL",
        }
    }
}

impl From<rusqlite::Error> for LobbyGraphError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            // A stored value that cannot be decoded fails the same way on every retry.
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => {
                LobbyGraphError::Parse(format!("malformed stored row: {}", err))
            }
            other => LobbyGraphError::Database(other),
        }
    }
}

/// Convenient Result type using LobbyGraphError
pub type Result<T> = std::result::Result<T, LobbyGraphError>;
