/// Convenience result type used across Vision.
pub type VisionResult<T> = Result<T, VisionError>;

/// Top-level error taxonomy used by canvas, IR, interpreter and service APIs.
#[derive(thiserror::Error, Debug)]
pub enum VisionError {
    /// A record or wire payload could not be parsed at all.
    #[error("decode error: {0}")]
    Decode(String),

    /// The record names an operation outside the fixed six.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// Parameters are missing, extra, or of the wrong shape for the named operation.
    #[error("invalid parameter for '{command}': {message}")]
    InvalidParameter {
        /// Operation whose parameters were rejected.
        command: String,
        /// Human-readable reason.
        message: String,
    },

    /// A draw operation ran before the first `refresh`.
    #[error("canvas is not initialized: '{operation}' requires a prior refresh")]
    UninitializedCanvas {
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// The raster backend rejected the operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// Wire framing or stream state violation.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The render service answered with a failed acknowledgment.
    #[error("render service rejected '{0}'")]
    Rejected(String),

    /// Filesystem or socket failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VisionError {
    /// Build a [`VisionError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`VisionError::InvalidParameter`] value.
    pub fn invalid_parameter(command: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidParameter {
            command: command.into(),
            message: msg.into(),
        }
    }

    /// Build a [`VisionError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`VisionError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
