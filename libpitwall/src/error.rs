//! Error types for Pitwall
//!
//! Two layers live here:
//!
//! - [`FetchError`]: raw failures produced by a fetch client (transport,
//!   decoding, anything else).
//! - [`NetworkError`]: the closed taxonomy every raw failure is mapped to by
//!   [`classify`] before it leaves the repository.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PitwallError>;

#[derive(Error, Debug)]
pub enum PitwallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PitwallError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PitwallError::InvalidInput(_) => 3,
            PitwallError::Config(_) => 2,
            PitwallError::Network(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Classified network failure.
///
/// Every variant may carry the text of the failure it was derived from.
/// `Display` yields the fixed user-facing sentence for the kind; `Unknown`
/// shows its wrapped message instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("No internet connection")]
    NoConnection { cause: Option<String> },

    #[error("Server error")]
    ServerError {
        status: Option<u16>,
        cause: Option<String>,
    },

    #[error("Request timeout")]
    Timeout { cause: Option<String> },

    #[error("{message}")]
    Unknown {
        message: String,
        cause: Option<String>,
    },
}

/// Discriminant of [`NetworkError`], handy for assertions and logging fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    NoConnection,
    ServerError,
    Timeout,
    Unknown,
}

impl std::fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkErrorKind::NoConnection => write!(f, "no_connection"),
            NetworkErrorKind::ServerError => write!(f, "server_error"),
            NetworkErrorKind::Timeout => write!(f, "timeout"),
            NetworkErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

impl NetworkError {
    pub fn no_connection() -> Self {
        NetworkError::NoConnection { cause: None }
    }

    pub fn timeout() -> Self {
        NetworkError::Timeout { cause: None }
    }

    pub fn server_error(status: Option<u16>) -> Self {
        NetworkError::ServerError {
            status,
            cause: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        NetworkError::Unknown {
            message: message.into(),
            cause: None,
        }
    }

    pub fn kind(&self) -> NetworkErrorKind {
        match self {
            NetworkError::NoConnection { .. } => NetworkErrorKind::NoConnection,
            NetworkError::ServerError { .. } => NetworkErrorKind::ServerError,
            NetworkError::Timeout { .. } => NetworkErrorKind::Timeout,
            NetworkError::Unknown { .. } => NetworkErrorKind::Unknown,
        }
    }

    /// Text of the underlying failure, if one was recorded
    pub fn cause(&self) -> Option<&str> {
        match self {
            NetworkError::NoConnection { cause }
            | NetworkError::ServerError { cause, .. }
            | NetworkError::Timeout { cause }
            | NetworkError::Unknown { cause, .. } => cause.as_deref(),
        }
    }

    /// Human-readable message shown to the user
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::Unknown { message, .. } if message.trim().is_empty() => {
                UNKNOWN_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Raw failure raised by a fetch client
#[derive(Error, Debug)]
pub enum FetchError {
    /// Failure the transport already classified (e.g. a non-2xx status)
    #[error(transparent)]
    Classified(#[from] NetworkError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Message fragments that mark an I/O failure as a connectivity problem
const NO_CONNECTION_MARKERS: &[&str] = &[
    "unable to resolve host",
    "network is unreachable",
    "failed to lookup address",
    "name or service not known",
];

/// Map any raw fetch failure onto the closed [`NetworkError`] taxonomy.
///
/// Rules, first match wins:
/// 1. already classified: returned unchanged
/// 2. I/O failure mentioning host resolution or an unreachable network: `NoConnection`
/// 3. timeout (dedicated variant or `ErrorKind::TimedOut`): `Timeout`
/// 4. any other I/O failure: `Unknown` with the original message
/// 5. anything else: `Unknown`
pub fn classify(error: FetchError) -> NetworkError {
    match error {
        FetchError::Classified(network) => network,
        FetchError::Io(io) => classify_io(io),
        FetchError::Timeout(message) => NetworkError::Timeout {
            cause: Some(message),
        },
        FetchError::Decode(decode) => {
            let message = decode.to_string();
            NetworkError::Unknown {
                message: message.clone(),
                cause: Some(message),
            }
        }
        FetchError::Other(message) => NetworkError::Unknown {
            message: non_empty_or(message.clone(), UNKNOWN_ERROR_MESSAGE),
            cause: Some(message),
        },
    }
}

fn classify_io(io: std::io::Error) -> NetworkError {
    let message = io.to_string();
    let lowered = message.to_lowercase();

    if NO_CONNECTION_MARKERS.iter().any(|m| lowered.contains(m)) {
        return NetworkError::NoConnection {
            cause: Some(message),
        };
    }

    if io.kind() == std::io::ErrorKind::TimedOut {
        return NetworkError::Timeout {
            cause: Some(message),
        };
    }

    NetworkError::Unknown {
        message: non_empty_or(message.clone(), "Network error"),
        cause: Some(message),
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
