//! Entropy coefficient of SAC.
use crate::opt::{Optimizer, OptimizerConfig};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{init::Init, VarBuilder, VarMap};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mode of the entropy coefficient of SAC.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum EntCoefMode {
    /// Use a constant as alpha.
    Fix(f64),

    /// Automatic tuning given `(target_entropy, learning_rate)`.
    Auto(f64, f64),
}

/// The entropy coefficient of SAC, held as `log(alpha)`.
pub struct EntCoef {
    varmap: VarMap,
    log_alpha: Tensor,
    target_entropy: Option<f64>,
    opt: Option<Optimizer>,
}

impl EntCoef {
    /// Constructs the coefficient on `device`; auto-tuning starts from `alpha = 1`.
    pub fn new(mode: &EntCoefMode, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let (log_alpha, target_entropy, opt) = match mode {
            EntCoefMode::Fix(alpha) => {
                let log_alpha = vb.get_with_hints(1, "log_alpha", Init::Const(alpha.ln()))?;
                (log_alpha, None, None)
            }
            EntCoefMode::Auto(target_entropy, learning_rate) => {
                let log_alpha = vb.get_with_hints(1, "log_alpha", Init::Const(0.0))?;
                let opt = OptimizerConfig::default()
                    .learning_rate(*learning_rate)
                    .build(varmap.all_vars())?;
                (log_alpha, Some(*target_entropy), Some(opt))
            }
        };

        Ok(Self {
            varmap,
            log_alpha,
            target_entropy,
            opt,
        })
    }

    /// Returns the entropy coefficient, shape `(1,)`, without gradient.
    pub fn alpha(&self) -> Result<Tensor> {
        Ok(self.log_alpha.detach().exp()?)
    }

    /// Returns the entropy coefficient as a scalar.
    pub fn value(&self) -> Result<f32> {
        Ok(self.alpha()?.to_vec1::<f32>()?[0])
    }

    /// Moves alpha so that the entropy of the policy approaches the target.
    ///
    /// `logp` is the log probability of actions sampled from the current policy. Does
    /// nothing for a fixed coefficient.
    pub fn update(&mut self, logp: &Tensor) -> Result<()> {
        if let (Some(target_entropy), Some(opt)) = (self.target_entropy, &mut self.opt) {
            let loss = logp
                .detach()
                .affine(1.0, target_entropy)?
                .broadcast_mul(&self.log_alpha)?
                .affine(-1.0, 0.0)?
                .mean_all()?;
            opt.backward_step(&loss)?;
        }
        Ok(())
    }

    /// Saves the parameter.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save entropy coefficient to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameter.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load entropy coefficient from {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_coefficient() -> Result<()> {
        let device = Device::Cpu;
        let mut ent_coef = EntCoef::new(&EntCoefMode::Fix(0.2), &device)?;
        let logp = Tensor::from_slice(&[5.0f32, 5.0], (2,), &device)?;
        ent_coef.update(&logp)?;
        assert!((ent_coef.value()? - 0.2).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_auto_coefficient_follows_entropy() -> Result<()> {
        let device = Device::Cpu;

        // Entropy below the target (`-logp < -1`) increases alpha.
        let mut ent_coef = EntCoef::new(&EntCoefMode::Auto(-1.0, 0.1), &device)?;
        let logp = Tensor::from_slice(&[3.0f32, 3.0], (2,), &device)?;
        for _ in 0..10 {
            ent_coef.update(&logp)?;
        }
        assert!(ent_coef.value()? > 1.0);

        // Entropy above the target decreases alpha.
        let mut ent_coef = EntCoef::new(&EntCoefMode::Auto(-1.0, 0.1), &device)?;
        let logp = Tensor::from_slice(&[-3.0f32, -3.0], (2,), &device)?;
        for _ in 0..10 {
            ent_coef.update(&logp)?;
        }
        assert!(ent_coef.value()? < 1.0);
        Ok(())
    }
}
