//! Configuration of [`TabularQLearning`](super::TabularQLearning).
use crate::explorer::{EpsilonGreedy, Explorer};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TabularQLearning`](super::TabularQLearning).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TabularQLearningConfig {
    /// Step size of the update.
    pub learning_rate: f32,

    /// Discount factor.
    pub discount_factor: f32,

    /// Explorer used when not exploiting.
    pub explorer: Explorer,

    /// The number of transitions in a batch.
    pub batch_size: usize,

    /// The number of batches per learning step.
    pub training_rounds: usize,

    /// Cardinality used to pad available-action sets in the replay buffer.
    ///
    /// If `None`, sets are padded to the cardinality of the action space of the
    /// environment.
    pub max_number_actions: Option<usize>,

    /// Random seed of the explorer.
    pub seed: u64,
}

impl Default for TabularQLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            discount_factor: 0.9,
            explorer: Explorer::EpsilonGreedy(EpsilonGreedy::constant(0.01)),
            batch_size: 1,
            training_rounds: 1,
            max_number_actions: None,
            seed: 42,
        }
    }
}

impl TabularQLearningConfig {
    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f32) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets a constant exploration rate of epsilon-greedy exploration.
    pub fn exploration_rate(mut self, v: f32) -> Self {
        self.explorer = Explorer::EpsilonGreedy(EpsilonGreedy::constant(v));
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: Explorer) -> Self {
        self.explorer = v;
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

    /// Sets the cardinality used to pad available-action sets.
    pub fn max_number_actions(mut self, v: usize) -> Self {
        self.max_number_actions = Some(v);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`TabularQLearningConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TabularQLearningConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
