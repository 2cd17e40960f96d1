//! Configuration of [`DeepQLearning`](super::DeepQLearning).
use crate::{critic::CriticConfig, opt::OptimizerConfig, util::CriticLoss, Device};
use anyhow::Result;
use kestrel_agent::{
    action_representation::ActionRepresentationConfig,
    explorer::{EpsilonGreedy, Explorer},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`DeepQLearning`](super::DeepQLearning).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    /// Action-value network over `concat(state, action representation)`.
    pub critic_config: CriticConfig,

    /// Representation of raw actions given to the network.
    pub action_representation: ActionRepresentationConfig,

    /// Cardinality used to pad available-action sets.
    ///
    /// If `None`, the one of the action representation is used, if any.
    pub max_number_actions: Option<usize>,

    /// Explorer used when not exploiting.
    pub explorer: Explorer,

    /// Discount factor.
    pub discount_factor: f64,

    /// Soft update coefficient of the target network.
    pub tau: f64,

    /// The target network is updated every this number of batches.
    pub soft_update_interval: usize,

    /// The number of transitions in a batch.
    pub batch_size: usize,

    /// The number of batches per learning step.
    pub training_rounds: usize,

    /// Type of the loss function.
    pub critic_loss: CriticLoss,

    /// Device of the networks.
    pub device: Device,

    /// Random seed of the explorer.
    pub seed: u64,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            critic_config: CriticConfig::new(1, 1, vec![64, 64]),
            action_representation: ActionRepresentationConfig::Identity,
            max_number_actions: None,
            explorer: Explorer::EpsilonGreedy(EpsilonGreedy::constant(0.1)),
            discount_factor: 0.99,
            tau: 0.1,
            soft_update_interval: 1,
            batch_size: 128,
            training_rounds: 10,
            critic_loss: CriticLoss::Mse,
            device: Device::Cpu,
            seed: 42,
        }
    }
}

impl DqnConfig {
    /// Sets the network for states and represented actions of the given dimensions.
    pub fn network(mut self, state_dim: usize, action_dim: usize, units: Vec<usize>) -> Self {
        self.critic_config = CriticConfig::new(state_dim, action_dim, units)
            .opt_config(self.critic_config.opt_config);
        self
    }

    /// Sets the optimizer of the network.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.critic_config.opt_config = v;
        self
    }

    /// Sets the action representation.
    pub fn action_representation(mut self, v: ActionRepresentationConfig) -> Self {
        self.action_representation = v;
        self
    }

    /// Sets the cardinality used to pad available-action sets.
    pub fn max_number_actions(mut self, v: usize) -> Self {
        self.max_number_actions = Some(v);
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: Explorer) -> Self {
        self.explorer = v;
        self
    }

    /// Sets a constant exploration rate of epsilon-greedy exploration.
    pub fn exploration_rate(mut self, v: f32) -> Self {
        self.explorer = Explorer::EpsilonGreedy(EpsilonGreedy::constant(v));
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the soft update coefficient.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Sets the interval of soft updates.
    pub fn soft_update_interval(mut self, v: usize) -> Self {
        self.soft_update_interval = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of batches per learning step.
    pub fn training_rounds(mut self, v: usize) -> Self {
        self.training_rounds = v;
        self
    }

    /// Sets the loss function.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
