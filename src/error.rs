//! Error types shared by the kernel boundary, the renderer and the host

use thiserror::Error;

/// Result type for umbra operations
pub type Result<T> = std::result::Result<T, LightError>;

/// Which encoded buffer an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Sources,
    Obstacles,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferKind::Sources => f.write_str("sources"),
            BufferKind::Obstacles => f.write_str("obstacles"),
        }
    }
}

/// Errors that can occur while encoding, rendering or hosting a frame
#[derive(Error, Debug)]
pub enum LightError {
    #[error("{kind} buffer has {actual} scalars, expected {expected}")]
    BufferLength {
        kind: BufferKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} capacity is {capacity}, but {requested} entries were supplied")]
    CapacityExceeded {
        kind: BufferKind,
        capacity: usize,
        requested: usize,
    },

    #[error("Invalid kernel configuration: {0}")]
    InvalidConfig(String),

    #[error("Parallel backend unavailable: {0}")]
    Backend(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("MQTT error: {0}")]
    Mqtt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
