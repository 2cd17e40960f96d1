//! Configuration of [`SoftActorCritic`](super::SoftActorCritic).
use super::{ActorConfig, EntCoefMode};
use crate::{critic::CriticConfig, opt::OptimizerConfig, util::CriticLoss, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`SoftActorCritic`](super::SoftActorCritic).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SacConfig {
    /// Lower bounds of actions.
    pub action_low: Vec<f32>,

    /// Upper bounds of actions.
    pub action_high: Vec<f32>,

    /// Gaussian policy.
    pub actor_config: ActorConfig,

    /// Action-value networks, shared by all critics.
    pub critic_config: CriticConfig,

    /// The number of critics; targets use the minimum over them.
    pub n_critics: usize,

    /// Discount factor.
    pub discount_factor: f64,

    /// Soft update coefficient of the target critics.
    pub tau: f64,

    /// The number of transitions in a batch.
    pub batch_size: usize,

    /// The number of batches per learning step.
    pub training_rounds: usize,

    /// Entropy coefficient.
    pub ent_coef_mode: EntCoefMode,

    /// Added inside the logarithm of the squashing correction.
    pub epsilon: f64,

    /// Lower clamp of the log standard deviation.
    pub min_lstd: f64,

    /// Upper clamp of the log standard deviation.
    pub max_lstd: f64,

    /// Type of the loss function of critics.
    pub critic_loss: CriticLoss,

    /// Device of the networks.
    pub device: Device,
}

impl SacConfig {
    /// Configuration for states of `state_dim` and actions in the box `[low, high]`.
    ///
    /// Both networks get hidden layers of `units`. The entropy coefficient is tuned
    /// towards the target entropy `-action_dim`.
    pub fn new(state_dim: usize, low: Vec<f32>, high: Vec<f32>, units: Vec<usize>) -> Self {
        let action_dim = low.len();
        Self {
            action_low: low,
            action_high: high,
            actor_config: ActorConfig::new(state_dim, action_dim, units.clone()),
            critic_config: CriticConfig::new(state_dim, action_dim, units),
            n_critics: 2,
            discount_factor: 0.99,
            tau: 0.005,
            batch_size: 256,
            training_rounds: 100,
            ent_coef_mode: EntCoefMode::Auto(-(action_dim as f64), 1e-3),
            epsilon: 1e-6,
            min_lstd: -20.0,
            max_lstd: 2.0,
            critic_loss: CriticLoss::Mse,
            device: Device::Cpu,
        }
    }

    /// Sets the optimizer of the actor.
    pub fn actor_opt_config(mut self, v: OptimizerConfig) -> Self {
        self.actor_config.opt_config = v;
        self
    }

    /// Sets the optimizer of the critics.
    pub fn critic_opt_config(mut self, v: OptimizerConfig) -> Self {
        self.critic_config.opt_config = v;
        self
    }

    /// Sets the number of critics.
    pub fn n_critics(mut self, v: usize) -> Self {
        self.n_critics = v;
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

    /// Sets the mode of the entropy coefficient.
    pub fn ent_coef_mode(mut self, v: EntCoefMode) -> Self {
        self.ent_coef_mode = v;
        self
    }

    /// Sets the loss function of critics.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Loads [`SacConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SacConfig`].
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
    fn test_serde_sac_config() -> Result<()> {
        let config = SacConfig::new(3, vec![-1.0, 0.0], vec![1.0, 2.0], vec![32, 32])
            .ent_coef_mode(EntCoefMode::Fix(0.2))
            .actor_opt_config(OptimizerConfig::Adam { lr: 3e-4 })
            .batch_size(64);

        let dir = TempDir::new("sac_config")?;
        let path = dir.path().join("sac.yaml");

        config.save(&path)?;
        let config_ = SacConfig::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config_.critic_config.q_config.in_dim, 5);
        assert_eq!(config_.actor_config.pi_config.out_dim, 2);
        Ok(())
    }

    #[test]
    fn test_default_target_entropy() {
        let config = SacConfig::new(3, vec![-1.0; 4], vec![1.0; 4], vec![8]);
        assert_eq!(config.ent_coef_mode, EntCoefMode::Auto(-4.0, 1e-3));
        assert_eq!(config.training_rounds, 100);
    }
}
