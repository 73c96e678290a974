use std::fmt;
use std::path::PathBuf;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, PressLightError>;

/// Main error type for the signal-control agent
#[derive(Debug, Clone)]
pub enum PressLightError {
    /// Missing or invalid hyperparameter
    Configuration {
        key: String,
        reason: String,
    },

    /// Tensor shapes that do not line up
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Replay buffer holds fewer transitions than requested
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// No checkpoint stored for the requested episode and rank
    CheckpointNotFound {
        path: PathBuf,
    },

    /// Loss or gradients became NaN/Inf
    NumericalInstability(String),

    /// Action index outside the action space
    InvalidAction {
        action: usize,
        num_actions: usize,
    },

    /// Phase index that cannot be one-hot encoded
    InvalidPhase {
        phase: usize,
        num_phases: usize,
    },

    /// IO errors (file operations)
    Io(String),

    /// Serialization/deserialization errors
    Serialization(String),
}

impl fmt::Display for PressLightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PressLightError::Configuration { key, reason } => {
                write!(f, "Configuration error for '{}': {}", key, reason)
            }
            PressLightError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            PressLightError::InsufficientData { requested, available } => {
                write!(
                    f,
                    "Insufficient data: requested {} transitions, buffer holds {}",
                    requested, available
                )
            }
            PressLightError::CheckpointNotFound { path } => {
                write!(f, "Checkpoint not found: {}", path.display())
            }
            PressLightError::NumericalInstability(msg) => {
                write!(f, "Numerical instability: {}", msg)
            }
            PressLightError::InvalidAction { action, num_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, num_actions)
            }
            PressLightError::InvalidPhase { phase, num_phases } => {
                write!(f, "Invalid phase {}: must be less than {}", phase, num_phases)
            }
            PressLightError::Io(msg) => write!(f, "IO error: {}", msg),
            PressLightError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PressLightError {}

impl From<std::io::Error> for PressLightError {
    fn from(err: std::io::Error) -> Self {
        PressLightError::Io(err.to_string())
    }
}

impl From<bincode::Error> for PressLightError {
    fn from(err: bincode::Error) -> Self {
        PressLightError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PressLightError {
    fn from(err: serde_json::Error) -> Self {
        PressLightError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl PressLightError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        PressLightError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn configuration<S: Into<String>>(key: S, reason: S) -> Self {
        PressLightError::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
