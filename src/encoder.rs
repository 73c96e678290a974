//! Builds network input rows from a lane observation and a phase indicator.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::config::{AgentConfig, IntersectionSpec};
use crate::error::{PressLightError, Result};

/// How the current signal phase is appended to the observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEncoding {
    /// Observation only.
    Disabled,
    /// Append the raw phase index as one extra feature.
    Raw,
    /// Append a one-hot vector with one slot per action.
    OneHot,
}

impl PhaseEncoding {
    pub fn from_flags(phase: bool, one_hot: bool) -> Self {
        match (phase, one_hot) {
            (false, _) => PhaseEncoding::Disabled,
            (true, false) => PhaseEncoding::Raw,
            (true, true) => PhaseEncoding::OneHot,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureEncoder {
    observation_len: usize,
    num_actions: usize,
    encoding: PhaseEncoding,
}

impl FeatureEncoder {
    pub fn new(observation_len: usize, num_actions: usize, encoding: PhaseEncoding) -> Self {
        FeatureEncoder {
            observation_len,
            num_actions,
            encoding,
        }
    }

    pub fn from_config(config: &AgentConfig, spec: &IntersectionSpec) -> Self {
        Self::new(
            spec.observation_len,
            spec.num_actions,
            PhaseEncoding::from_flags(config.phase, config.one_hot),
        )
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn encoding(&self) -> PhaseEncoding {
        self.encoding
    }

    /// Width of every encoded row; the network input must match it.
    pub fn feature_len(&self) -> usize {
        match self.encoding {
            PhaseEncoding::Disabled => self.observation_len,
            PhaseEncoding::Raw => self.observation_len + 1,
            PhaseEncoding::OneHot => self.observation_len + self.num_actions,
        }
    }

    /// Encode one observation/phase pair. `phase` is ignored when the
    /// encoding is disabled and must hold exactly one index otherwise.
    pub fn encode(&self, observation: ArrayView1<f32>, phase: &[usize]) -> Result<Array1<f32>> {
        let mut row = Array1::zeros(self.feature_len());
        self.encode_into(observation, phase, row.view_mut())?;
        Ok(row)
    }

    /// Stack encoded rows in iteration order.
    pub fn encode_batch<'a, I>(&self, rows: I) -> Result<Array2<f32>>
    where
        I: IntoIterator<Item = (ArrayView1<'a, f32>, &'a [usize])>,
    {
        let rows: Vec<_> = rows.into_iter().collect();
        let mut batch = Array2::zeros((rows.len(), self.feature_len()));
        for ((observation, phase), out) in rows.into_iter().zip(batch.rows_mut()) {
            self.encode_into(observation, phase, out)?;
        }
        Ok(batch)
    }

    fn encode_into(
        &self,
        observation: ArrayView1<f32>,
        phase: &[usize],
        mut out: ndarray::ArrayViewMut1<f32>,
    ) -> Result<()> {
        if observation.len() != self.observation_len {
            return Err(PressLightError::dimension_mismatch(
                format!("observation of length {}", self.observation_len),
                format!("length {}", observation.len()),
            ));
        }
        out.slice_mut(ndarray::s![..self.observation_len]).assign(&observation);

        if self.encoding == PhaseEncoding::Disabled {
            return Ok(());
        }
        let index = match phase {
            [index] => *index,
            _ => {
                return Err(PressLightError::dimension_mismatch(
                    "phase of length 1".to_string(),
                    format!("length {}", phase.len()),
                ))
            }
        };
        match self.encoding {
            PhaseEncoding::Raw => out[self.observation_len] = index as f32,
            PhaseEncoding::OneHot => {
                if index >= self.num_actions {
                    return Err(PressLightError::InvalidPhase {
                        phase: index,
                        num_phases: self.num_actions,
                    });
                }
                out[self.observation_len + index] = 1.0;
            }
            PhaseEncoding::Disabled => {}
        }
        Ok(())
    }
}
