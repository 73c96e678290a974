//! Hyperparameters for a single intersection agent.
//!
//! The agent never looks anything up on its own: an [`AgentConfig`] is
//! built once (from JSON, a numeric mapping, or by hand) and handed to the
//! constructor together with an [`IntersectionSpec`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PressLightError, Result};

/// RMSProp smoothing constant for the squared-gradient average.
pub const RMSPROP_ALPHA: f32 = 0.9;

/// RMSProp denominator term.
pub const RMSPROP_EPSILON: f32 = 1e-7;

/// Learning hyperparameters read at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Discount factor.
    pub gamma: f32,
    /// Maximum global gradient norm.
    pub grad_clip: f32,
    /// Initial exploration rate.
    pub epsilon: f32,
    /// Multiplicative decay applied after each training step.
    pub epsilon_decay: f32,
    /// Floor for the exploration rate.
    pub epsilon_min: f32,
    pub learning_rate: f32,
    pub batch_size: usize,
    /// Replay buffer capacity.
    pub buffer_size: usize,
    /// Hidden width of both dense layers.
    pub d_dense: usize,
    /// Append the phase indicator to the observation.
    pub phase: bool,
    /// One-hot encode the phase instead of appending the raw index.
    pub one_hot: bool,
}

const REQUIRED_KEYS: [&str; 11] = [
    "gamma",
    "grad_clip",
    "epsilon",
    "epsilon_decay",
    "epsilon_min",
    "learning_rate",
    "batch_size",
    "buffer_size",
    "d_dense",
    "phase",
    "one_hot",
];

impl AgentConfig {
    /// Parse a JSON object. Missing keys surface as configuration errors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| PressLightError::configuration("<root>", "expected a JSON object"))?;
        for key in REQUIRED_KEYS {
            if !object.contains_key(key) {
                return Err(PressLightError::configuration(key, "missing required key"));
            }
        }
        let config: AgentConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Build from a flat numeric mapping. Flags are true when non-zero.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self> {
        let get = |key: &str| -> Result<f64> {
            map.get(key)
                .copied()
                .ok_or_else(|| PressLightError::configuration(key, "missing required key"))
        };
        let get_count = |key: &str| -> Result<usize> {
            let value = get(key)?;
            if value < 0.0 || value.fract() != 0.0 {
                return Err(PressLightError::Configuration {
                    key: key.to_string(),
                    reason: format!("expected a non-negative integer, got {}", value),
                });
            }
            Ok(value as usize)
        };

        let config = AgentConfig {
            gamma: get("gamma")? as f32,
            grad_clip: get("grad_clip")? as f32,
            epsilon: get("epsilon")? as f32,
            epsilon_decay: get("epsilon_decay")? as f32,
            epsilon_min: get("epsilon_min")? as f32,
            learning_rate: get("learning_rate")? as f32,
            batch_size: get_count("batch_size")?,
            buffer_size: get_count("buffer_size")?,
            d_dense: get_count("d_dense")?,
            phase: get("phase")? != 0.0,
            one_hot: get("one_hot")? != 0.0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(invalid("gamma", format!("must lie in [0, 1], got {}", self.gamma)));
        }
        if !(self.grad_clip > 0.0) {
            return Err(invalid("grad_clip", format!("must be positive, got {}", self.grad_clip)));
        }
        if !(self.learning_rate > 0.0) {
            return Err(invalid(
                "learning_rate",
                format!("must be positive, got {}", self.learning_rate),
            ));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(invalid(
                "epsilon_decay",
                format!("must lie in (0, 1], got {}", self.epsilon_decay),
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(invalid("epsilon", format!("must lie in [0, 1], got {}", self.epsilon)));
        }
        if self.epsilon_min < 0.0 || self.epsilon_min > self.epsilon {
            return Err(invalid(
                "epsilon_min",
                format!("must lie in [0, epsilon], got {}", self.epsilon_min),
            ));
        }
        for (key, value) in [
            ("batch_size", self.batch_size),
            ("buffer_size", self.buffer_size),
            ("d_dense", self.d_dense),
        ] {
            if value == 0 {
                return Err(invalid(key, "must be greater than 0".to_string()));
            }
        }
        if self.batch_size > self.buffer_size {
            return Err(invalid(
                "batch_size",
                format!(
                    "cannot exceed buffer_size ({} > {})",
                    self.batch_size, self.buffer_size
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: String) -> PressLightError {
    PressLightError::Configuration {
        key: key.to_string(),
        reason,
    }
}

/// Shape of one intersection as reported by the world's generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionSpec {
    /// Width of the raw lane observation.
    pub observation_len: usize,
    /// Number of signal phases, which is also the action count.
    pub num_actions: usize,
}

impl IntersectionSpec {
    pub fn new(observation_len: usize, num_actions: usize) -> Self {
        IntersectionSpec {
            observation_len,
            num_actions,
        }
    }
}
