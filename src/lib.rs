//! # PressLight - Value-Based Traffic Signal Control
//!
//! PressLight learns a phase-selection policy for a single road
//! intersection with DQN-style value learning. The simulator, the
//! generators that turn simulator state into vectors, and the training
//! orchestration live outside this crate; the agent only needs an
//! observation vector, a phase indicator and a reward per step.
//!
//! ## Key Features
//!
//! - **Feature encoding**: lane observation plus raw or one-hot phase
//! - **Experience replay**: FIFO buffer sampled uniformly without replacement
//! - **Online/target networks**: three dense layers, explicit value-only
//!   and differentiable forward passes
//! - **Training step**: Bellman targets from the target network, MSE loss,
//!   global-norm gradient clipping, RMSProp, epsilon decay
//! - **Checkpoints**: bincode parameter files keyed by episode and rank
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use presslight::agent::PressLightAgentBuilder;
//! use presslight::config::{AgentConfig, IntersectionSpec};
//!
//! let config = AgentConfig::from_json_file("configs/presslight.json").unwrap();
//! let mut agent = PressLightAgentBuilder::new()
//!     .config(config)
//!     .intersection(IntersectionSpec::new(24, 8))
//!     .rank(0)
//!     .checkpoint_dir("output")
//!     .build()
//!     .unwrap();
//!
//! // once the replay buffer holds a batch worth of transitions:
//! let loss = agent.train().unwrap();
//! agent.update_target_network();
//! agent.save(0).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - ReLU and linear activations
//! - [`agent`] - The per-intersection agent and its environment trait
//! - [`checkpoint`] - Parameter files addressed by episode and rank
//! - [`config`] - Hyperparameters and intersection shape
//! - [`encoder`] - Observation/phase feature encoding
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Mean squared error
//! - [`metrics`] - Training diagnostics
//! - [`network`] - Action-value network
//! - [`optimizer`] - RMSProp and gradient clipping
//! - [`policy`] - Epsilon-greedy action selection
//! - [`replay_buffer`] - Transition storage
//! - [`trainer`] - Temporal-difference training step

pub mod activations;
pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod encoder;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod policy;
pub mod replay_buffer;
pub mod trainer;

#[cfg(test)]
mod tests;
