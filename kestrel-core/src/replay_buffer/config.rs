//! Configurations of replay buffers.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`FifoReplayBuffer`](super::FifoReplayBuffer).
///
/// ```
/// use kestrel_core::replay_buffer::FifoReplayBufferConfig;
///
/// let config = FifoReplayBufferConfig::default()
///     .capacity(10000)
///     .seed(42);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FifoReplayBufferConfig {
    /// Maximum number of transitions stored in the buffer.
    /// Once the buffer is full, each push evicts the oldest transition.
    pub capacity: usize,

    /// Random seed used for sampling.
    pub seed: u64,

    /// If `true`, available-action sets are not materialized.
    pub is_action_continuous: bool,
}

impl Default for FifoReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            seed: 42,
            is_action_continuous: false,
        }
    }
}

impl FifoReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the flag for continuous actions.
    pub fn is_action_continuous(mut self, v: bool) -> Self {
        self.is_action_continuous = v;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of [`HindsightReplayBuffer`](super::HindsightReplayBuffer).
///
/// The reward function is not a part of the configuration; it is given to
/// [`HindsightReplayBuffer::build`](super::HindsightReplayBuffer::build).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct HindsightReplayBufferConfig {
    /// Configuration of the underlying FIFO buffer.
    pub fifo_config: FifoReplayBufferConfig,

    /// Number of trailing dimensions of states holding the goal.
    pub goal_dim: usize,
}

impl Default for HindsightReplayBufferConfig {
    fn default() -> Self {
        Self {
            fifo_config: FifoReplayBufferConfig::default(),
            goal_dim: 0,
        }
    }
}

impl HindsightReplayBufferConfig {
    /// Sets the configuration of the underlying FIFO buffer.
    pub fn fifo_config(mut self, fifo_config: FifoReplayBufferConfig) -> Self {
        self.fifo_config = fifo_config;
        self
    }

    /// Sets the dimension of goals.
    pub fn goal_dim(mut self, goal_dim: usize) -> Self {
        self.goal_dim = goal_dim;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
