//! # Signal-Control Agent Module
//!
//! A [`PressLightAgent`] learns a phase-selection policy for one
//! intersection with DQN-style value learning:
//!
//! - **Online network**: trained every step on sampled transitions
//! - **Target network**: supplies bootstrap targets, refreshed only by
//!   [`PressLightAgent::update_target_network`]
//! - **Epsilon-greedy**: exploration rate decays after each training step
//! - **Replay buffer**: FIFO store sampled uniformly without replacement
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use presslight::agent::PressLightAgentBuilder;
//! use presslight::config::{AgentConfig, IntersectionSpec};
//! use ndarray::Array1;
//!
//! let config = AgentConfig::from_json_file("configs/presslight.json").unwrap();
//! let mut agent = PressLightAgentBuilder::new()
//!     .config(config)
//!     .intersection(IntersectionSpec::new(24, 8))
//!     .rank(0)
//!     .checkpoint_dir("output")
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let observation = Array1::zeros(24);
//! let action = agent.act(observation.view(), &[0], true).unwrap();
//! assert!(action < 8);
//! ```

pub mod traits;

mod presslight;
pub use presslight::{PressLightAgent, PressLightAgentBuilder};
pub use traits::IntersectionEnv;
