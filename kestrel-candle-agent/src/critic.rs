//! Action-value network.
use crate::{
    mlp::{Mlp, MlpConfig},
    opt::{Optimizer, OptimizerConfig},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Critic`].
pub struct CriticConfig {
    /// Network taking the concatenation of a state and an action, with `out_dim = 1`.
    pub q_config: MlpConfig,

    /// Optimizer of the network.
    pub opt_config: OptimizerConfig,
}

impl CriticConfig {
    /// Critic of states and actions of the given dimensions.
    pub fn new(state_dim: usize, action_dim: usize, units: Vec<usize>) -> Self {
        Self {
            q_config: MlpConfig::new(state_dim + action_dim, units, 1),
            opt_config: OptimizerConfig::default(),
        }
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Action-value function `Q(s, a)` with its own parameters and optimizer.
pub struct Critic {
    varmap: VarMap,
    q: Mlp,
    opt: Optimizer,
}

impl Critic {
    /// Constructs the network on `device`.
    pub fn build(config: &CriticConfig, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let q = Mlp::build(&vb, &config.q_config)?;
        let opt = config.opt_config.build(varmap.all_vars())?;
        Ok(Self { varmap, q, opt })
    }

    /// Action values of a batch, shape `(batch_size,)`.
    pub fn forward(&self, state: &Tensor, action: &Tensor) -> Result<Tensor> {
        let xs = Tensor::cat(&[state, action], D::Minus1)?;
        self.forward_features(&xs)
    }

    /// Action values of concatenated states and actions, shape `(batch_size,)`.
    pub fn forward_features(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(self.q.forward(xs)?.squeeze(D::Minus1)?)
    }

    /// Updates the parameters to decrease `loss`.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// The parameters.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Saves the parameters.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save critic to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load critic from {:?}", path.as_ref());
        Ok(())
    }
}
