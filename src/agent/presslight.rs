use std::path::PathBuf;

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::traits::IntersectionEnv;
use crate::activations::Activation;
use crate::checkpoint::CheckpointStore;
use crate::config::{AgentConfig, IntersectionSpec};
use crate::encoder::FeatureEncoder;
use crate::error::{PressLightError, Result};
use crate::metrics::TrainingStats;
use crate::network::QNetwork;
use crate::policy::{random_actions, EpsilonGreedy};
use crate::replay_buffer::{ReplayBuffer, Transition};
use crate::trainer::{Trainer, TrainingBatch};

/// Number of intersections a single agent controls.
const SUB_AGENTS: usize = 1;

/// DQN agent for one intersection.
///
/// Owns its replay buffer, the online and target networks, the optimizer
/// state and a seedable random generator. Nothing is shared between
/// agents of different ranks.
///
/// # Example
///
/// ```rust
/// use presslight::agent::PressLightAgentBuilder;
/// use presslight::config::{AgentConfig, IntersectionSpec};
/// use presslight::replay_buffer::Transition;
/// use ndarray::array;
///
/// let config = AgentConfig {
///     gamma: 0.95,
///     grad_clip: 5.0,
///     epsilon: 0.1,
///     epsilon_decay: 0.995,
///     epsilon_min: 0.01,
///     learning_rate: 0.001,
///     batch_size: 2,
///     buffer_size: 100,
///     d_dense: 16,
///     phase: true,
///     one_hot: true,
/// };
/// let mut agent = PressLightAgentBuilder::new()
///     .config(config)
///     .intersection(IntersectionSpec::new(4, 2))
///     .seed(42)
///     .build()
///     .unwrap();
///
/// for step in 0..4 {
///     agent.remember(Transition {
///         key: "intersection_1_1".to_string(),
///         last_observation: array![1.0, 0.0, 2.0, 3.0],
///         last_phase: vec![step % 2],
///         action: step % 2,
///         reward: -1.5,
///         observation: array![0.0, 1.0, 2.0, 1.0],
///         phase: vec![(step + 1) % 2],
///     });
/// }
/// let loss = agent.train().unwrap();
/// assert!(loss.is_finite());
/// agent.update_target_network();
/// ```
pub struct PressLightAgent {
    config: AgentConfig,
    rank: usize,
    encoder: FeatureEncoder,
    replay_buffer: ReplayBuffer,
    q_network: QNetwork,
    target_network: QNetwork,
    policy: EpsilonGreedy,
    trainer: Trainer,
    checkpoints: CheckpointStore,
    stats: TrainingStats,
    rng: StdRng,
}

impl PressLightAgent {
    /// Create an agent with freshly initialized, synchronized networks.
    pub fn new(
        config: AgentConfig,
        spec: IntersectionSpec,
        rank: usize,
        checkpoints: CheckpointStore,
        mut rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        let encoder = FeatureEncoder::from_config(&config, &spec);
        let (features, hidden) = (encoder.feature_len(), config.d_dense);
        let q_network = QNetwork::new(features, hidden, spec.num_actions, &mut rng)?;
        let mut target_network = QNetwork::new(features, hidden, spec.num_actions, &mut rng)?;
        target_network.copy_from(&q_network);
        Self::assemble(config, rank, encoder, q_network, target_network, checkpoints, rng)
    }

    fn assemble(
        config: AgentConfig,
        rank: usize,
        encoder: FeatureEncoder,
        q_network: QNetwork,
        target_network: QNetwork,
        checkpoints: CheckpointStore,
        rng: StdRng,
    ) -> Result<Self> {
        for (name, network) in [("online", &q_network), ("target", &target_network)] {
            check_architecture(name, network, config.d_dense)?;
            if network.input_size() != encoder.feature_len() {
                return Err(PressLightError::Configuration {
                    key: format!("{}_network", name),
                    reason: format!(
                        "input width {} does not match encoded feature length {}",
                        network.input_size(),
                        encoder.feature_len()
                    ),
                });
            }
            if network.num_actions() != encoder.num_actions() {
                return Err(PressLightError::Configuration {
                    key: format!("{}_network", name),
                    reason: format!(
                        "output width {} does not match {} actions",
                        network.num_actions(),
                        encoder.num_actions()
                    ),
                });
            }
        }
        let online_shapes = q_network.layers.iter().map(|l| l.weights.dim());
        if online_shapes.ne(target_network.layers.iter().map(|l| l.weights.dim())) {
            return Err(PressLightError::configuration(
                "target_network",
                "architecture differs from the online network",
            ));
        }

        info!(
            "agent {}: {} features ({:?} phase), {} actions, d_dense={}, buffer={}",
            rank,
            encoder.feature_len(),
            encoder.encoding(),
            encoder.num_actions(),
            config.d_dense,
            config.buffer_size
        );

        let trainer = Trainer::new(&config, &q_network);
        Ok(PressLightAgent {
            replay_buffer: ReplayBuffer::new(config.buffer_size),
            policy: EpsilonGreedy::from_config(&config),
            config,
            rank,
            encoder,
            q_network,
            target_network,
            trainer,
            checkpoints,
            stats: TrainingStats::default(),
            rng,
        })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn num_actions(&self) -> usize {
        self.encoder.num_actions()
    }

    pub fn epsilon(&self) -> f32 {
        self.policy.epsilon()
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }

    pub fn q_network(&self) -> &QNetwork {
        &self.q_network
    }

    pub fn target_network(&self) -> &QNetwork {
        &self.target_network
    }

    pub fn trainer(&self) -> &Trainer {
        &self.trainer
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Read the current observation and phase from the environment.
    pub fn observe<E: IntersectionEnv + ?Sized>(&self, env: &E) -> (Array1<f32>, Vec<usize>) {
        (env.observation(), env.phase())
    }

    pub fn reward<E: IntersectionEnv + ?Sized>(&self, env: &E) -> f32 {
        env.reward()
    }

    pub fn encode(&self, observation: ArrayView1<f32>, phase: &[usize]) -> Result<Array1<f32>> {
        self.encoder.encode(observation, phase)
    }

    /// Epsilon-greedy choice over a batch of encoded feature rows.
    pub fn select_actions(
        &mut self,
        features: ArrayView2<f32>,
        explore: bool,
    ) -> Result<Vec<usize>> {
        self.policy.select(&self.q_network, features, explore, &mut self.rng)
    }

    /// Encode one observation and pick an action for it.
    pub fn act(
        &mut self,
        observation: ArrayView1<f32>,
        phase: &[usize],
        explore: bool,
    ) -> Result<usize> {
        let features = self.encode(observation, phase)?.insert_axis(ndarray::Axis(0));
        let actions = self.select_actions(features.view(), explore)?;
        actions
            .first()
            .copied()
            .ok_or_else(|| PressLightError::dimension_mismatch("one action", "none"))
    }

    pub fn act_on<E: IntersectionEnv + ?Sized>(&mut self, env: &E, explore: bool) -> Result<usize> {
        let (observation, phase) = self.observe(env);
        self.act(observation.view(), &phase, explore)
    }

    /// Uniformly random actions, one per controlled intersection.
    pub fn sample_actions(&mut self) -> Vec<usize> {
        random_actions(self.num_actions(), SUB_AGENTS, &mut self.rng)
    }

    pub fn remember(&mut self, transition: Transition) {
        self.replay_buffer.add(transition);
    }

    /// Value-only evaluation of the online network.
    pub fn q_values(&self, features: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.q_network.predict(features)
    }

    pub fn target_q_values(&self, features: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.target_network.predict(features)
    }

    /// One training step on a uniformly sampled batch. Returns the loss.
    ///
    /// Fails with `InsufficientData` while the buffer holds fewer than
    /// `batch_size` transitions. A failed step leaves the networks, the
    /// optimizer and epsilon untouched.
    pub fn train(&mut self) -> Result<f32> {
        let samples = self.replay_buffer.sample(self.config.batch_size, &mut self.rng)?;
        let batch = TrainingBatch::from_transitions(&self.encoder, &samples)?;
        let report = self
            .trainer
            .step(&mut self.q_network, &self.target_network, &batch)?;

        let floored = self.policy.decay();
        self.stats
            .record_step(report.loss, report.grad_norm, self.policy.epsilon());
        if floored {
            info!(
                "agent {}: epsilon reached its floor {} after {} steps",
                self.rank,
                self.policy.epsilon_min(),
                self.stats.train_steps
            );
        }
        Ok(report.loss)
    }

    /// Copy every online parameter into the target network.
    pub fn update_target_network(&mut self) {
        self.target_network.copy_from(&self.q_network);
        self.stats.record_sync();
        debug!("agent {}: target network synchronized", self.rank);
    }

    /// Persist the online network under `(episode, rank)`.
    pub fn save(&self, episode: usize) -> Result<PathBuf> {
        self.checkpoints
            .save(&self.q_network.state_dict(), episode, self.rank)
    }

    /// Load the `(episode, rank)` checkpoint into both networks and reset
    /// the optimizer. In-memory state is unchanged on failure.
    pub fn load(&mut self, episode: usize) -> Result<()> {
        let parameters = self.checkpoints.load(episode, self.rank)?;
        let mut q_network = self.q_network.clone();
        q_network.load_state_dict(&parameters)?;
        let mut target_network = self.target_network.clone();
        target_network.load_state_dict(&parameters)?;

        self.q_network = q_network;
        self.target_network = target_network;
        self.trainer.reset_optimizer(&self.q_network);
        Ok(())
    }
}

/// Rejects anything other than `relu(d_dense) -> relu(d_dense) -> linear`.
fn check_architecture(name: &str, network: &QNetwork, d_dense: usize) -> Result<()> {
    let key = format!("{}_network", name);
    let expected = [Activation::Relu, Activation::Relu, Activation::Linear];
    if network.layers.len() != expected.len() {
        return Err(PressLightError::Configuration {
            key,
            reason: format!("expected 3 dense layers, found {}", network.layers.len()),
        });
    }
    for (index, (layer, activation)) in network.layers.iter().zip(expected).enumerate() {
        if layer.activation != activation {
            return Err(PressLightError::Configuration {
                key,
                reason: format!(
                    "layer {} uses {:?}, expected {:?}",
                    index, layer.activation, activation
                ),
            });
        }
    }
    for (index, layer) in network.layers[..2].iter().enumerate() {
        if layer.output_size() != d_dense {
            return Err(PressLightError::Configuration {
                key,
                reason: format!(
                    "hidden layer {} has width {}, expected d_dense={}",
                    index,
                    layer.output_size(),
                    d_dense
                ),
            });
        }
    }
    Ok(())
}

/// Builder pattern for PressLightAgent
pub struct PressLightAgentBuilder {
    config: Option<AgentConfig>,
    spec: Option<IntersectionSpec>,
    rank: usize,
    checkpoint_dir: PathBuf,
    rng: Option<StdRng>,
    networks: Option<(QNetwork, QNetwork)>,
}

impl PressLightAgentBuilder {
    pub fn new() -> Self {
        PressLightAgentBuilder {
            config: None,
            spec: None,
            rank: 0,
            checkpoint_dir: PathBuf::from("."),
            rng: None,
            networks: None,
        }
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn intersection(mut self, spec: IntersectionSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// Root under which `model/<episode>_<rank>.bin` files live.
    pub fn checkpoint_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Use prebuilt online and target networks instead of fresh ones.
    pub fn networks(mut self, online: QNetwork, target: QNetwork) -> Self {
        self.networks = Some((online, target));
        self
    }

    pub fn build(self) -> Result<PressLightAgent> {
        let config = self.config.ok_or_else(|| {
            PressLightError::configuration("config", "agent configuration must be specified")
        })?;
        let spec = self.spec.ok_or_else(|| {
            PressLightError::configuration("intersection", "intersection shape must be specified")
        })?;
        let rng = self.rng.unwrap_or_else(StdRng::from_entropy);
        let checkpoints = CheckpointStore::new(self.checkpoint_dir);

        match self.networks {
            Some((online, target)) => {
                config.validate()?;
                let encoder = FeatureEncoder::from_config(&config, &spec);
                PressLightAgent::assemble(
                    config,
                    self.rank,
                    encoder,
                    online,
                    target,
                    checkpoints,
                    rng,
                )
            }
            None => PressLightAgent::new(config, spec, self.rank, checkpoints, rng),
        }
    }
}

impl Default for PressLightAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
