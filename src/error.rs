//! Error types.
//!
//! Every fallible session operation returns [`SessionError`]. Transport problems
//! are wrapped in [`TransportError`] so backends can report them without knowing
//! about sessions.

use std::io;

use thiserror::Error;

/// Which control table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Axis,
    Button,
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlKind::Axis => f.write_str("axis"),
            ControlKind::Button => f.write_str("button"),
        }
    }
}

/// Failure reported by an HID backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to enumerate devices: {0}")]
    Enumerate(String),

    #[error("failed to open device {vendor_id:04x}:{product_id:04x}: {reason}")]
    Open {
        vendor_id: u16,
        product_id: u16,
        reason: String,
    },

    #[error("failed to configure device: {0}")]
    Configure(String),

    #[error("device read failed: {0}")]
    Read(String),
}

/// Failure of a [`Session`](crate::session::Session) operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The device could not be opened or was lost mid-read.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No axis/button matches the given name or index.
    #[error("{kind} `{key}` was not found")]
    NotFound { kind: ControlKind, key: String },

    /// The mapping was never set, or an empty mapping was offered.
    #[error("{0} mapping not provided")]
    MappingUnavailable(ControlKind),

    /// The operation needs an open device.
    #[error("device is not connected")]
    Disconnected,

    /// The caller used the session incorrectly.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// The controller model refused the device.
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),

    /// The report is too short for the model's layout.
    #[error("report too short: expected at least {expected} bytes, got {actual}")]
    ShortReport { expected: usize, actual: usize },

    /// The polling thread could not be started.
    #[error("failed to spawn polling thread: {0}")]
    Spawn(#[from] io::Error),
}

impl SessionError {
    pub(crate) fn not_found(kind: ControlKind, key: impl ToString) -> Self {
        SessionError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

/// Failure loading a [`SessionConfig`](crate::config::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),

    #[error("unknown controller model `{0}`")]
    UnknownModel(String),
}
