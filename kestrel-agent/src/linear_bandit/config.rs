//! Configuration of [`LinearBandit`](super::LinearBandit).
use crate::{action_representation::ActionRepresentationConfig, explorer::Explorer};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`LinearBandit`](super::LinearBandit).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LinearBanditConfig {
    /// Dimension of features, i.e., the dimension of subjective states plus the
    /// dimension of the action representation.
    pub feature_dim: usize,

    /// L2 regularization coefficient of the regression, positive.
    pub l2_reg_lambda: f32,

    /// Explorer used when not exploiting.
    pub explorer: Explorer,

    /// Representation of actions in features.
    pub action_representation: ActionRepresentationConfig,

    /// The number of transitions in a batch.
    pub batch_size: usize,

    /// The number of batches per learning step.
    pub training_rounds: usize,

    /// Random seed of the explorer.
    pub seed: u64,
}

impl Default for LinearBanditConfig {
    fn default() -> Self {
        Self {
            feature_dim: 2,
            l2_reg_lambda: 1.0,
            explorer: Explorer::Ucb { alpha: 1.0 },
            action_representation: ActionRepresentationConfig::Identity,
            batch_size: 128,
            training_rounds: 100,
            seed: 42,
        }
    }
}

impl LinearBanditConfig {
    /// Sets the dimension of features.
    pub fn feature_dim(mut self, v: usize) -> Self {
        self.feature_dim = v;
        self
    }

    /// Sets the L2 regularization coefficient.
    pub fn l2_reg_lambda(mut self, v: f32) -> Self {
        self.l2_reg_lambda = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: Explorer) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the action representation.
    pub fn action_representation(mut self, v: ActionRepresentationConfig) -> Self {
        self.action_representation = v;
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

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`LinearBanditConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`LinearBanditConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_linear_bandit_config() -> Result<()> {
        let config = LinearBanditConfig::default()
            .feature_dim(6)
            .action_representation(ActionRepresentationConfig::OneHot {
                max_number_actions: 5,
            })
            .explorer(Explorer::Ucb { alpha: 0.5 });

        let dir = TempDir::new("linear_bandit_config")?;
        let path = dir.path().join("linear_bandit.yaml");

        config.save(&path)?;
        let config_ = LinearBanditConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_default_training_rounds() {
        assert_eq!(LinearBanditConfig::default().training_rounds, 100);
    }
}
