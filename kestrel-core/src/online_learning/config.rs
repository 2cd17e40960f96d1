//! Configuration of [`OnlineLearning`](super::OnlineLearning).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`OnlineLearning`](super::OnlineLearning).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OnlineLearningConfig {
    /// The number of episodes.
    pub number_of_episodes: usize,

    /// If `true`, the agent learns once at the end of each episode
    /// instead of every `learn_every_k_steps` environment steps.
    pub learn_after_episode: bool,

    /// Interval of learning in environment steps. `0` disables learning during episodes.
    pub learn_every_k_steps: usize,

    /// Interval of writing records in episodes.
    pub record_interval: usize,
}

impl Default for OnlineLearningConfig {
    fn default() -> Self {
        Self {
            number_of_episodes: 1000,
            learn_after_episode: false,
            learn_every_k_steps: 1,
            record_interval: 1,
        }
    }
}

impl OnlineLearningConfig {
    /// Sets the number of episodes.
    pub fn number_of_episodes(mut self, v: usize) -> Self {
        self.number_of_episodes = v;
        self
    }

    /// Sets the flag of learning at the end of each episode.
    pub fn learn_after_episode(mut self, v: bool) -> Self {
        self.learn_after_episode = v;
        self
    }

    /// Sets the interval of learning in environment steps.
    pub fn learn_every_k_steps(mut self, v: usize) -> Self {
        self.learn_every_k_steps = v;
        self
    }

    /// Sets the interval of writing records in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Constructs [`OnlineLearningConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`OnlineLearningConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
