//! Actor of SAC.
use crate::{
    mlp::{Mlp2, MlpConfig},
    opt::{Optimizer, OptimizerConfig},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Actor`].
pub struct ActorConfig {
    /// Network mapping a state to the mean and the log standard deviation of actions.
    pub pi_config: MlpConfig,

    /// Optimizer of the network.
    pub opt_config: OptimizerConfig,
}

impl ActorConfig {
    /// Actor of states and actions of the given dimensions.
    pub fn new(state_dim: usize, action_dim: usize, units: Vec<usize>) -> Self {
        Self {
            pi_config: MlpConfig::new(state_dim, units, action_dim),
            opt_config: OptimizerConfig::default(),
        }
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Gaussian policy before squashing.
pub struct Actor {
    varmap: VarMap,
    pi: Mlp2,
    opt: Optimizer,
}

impl Actor {
    /// Constructs the network on `device`.
    pub fn build(config: &ActorConfig, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let pi = Mlp2::build(&vb, &config.pi_config)?;
        let opt = config.opt_config.build(varmap.all_vars())?;
        Ok(Self { varmap, pi, opt })
    }

    /// Mean and log standard deviation, each of shape `(batch_size, action_dim)`.
    pub fn forward(&self, state: &Tensor) -> Result<(Tensor, Tensor)> {
        self.pi.forward(state)
    }

    /// Updates the parameters to decrease `loss`.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Saves the parameters.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save actor to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load actor from {:?}", path.as_ref());
        Ok(())
    }
}
