use super::{create_linear_layers, relu_forward, MlpConfig};
use anyhow::{Context, Result};
use candle_core::Tensor;
use candle_nn::{Linear, Module, VarBuilder};

/// Multilayer perceptron with ReLU activation function on hidden layers.
pub struct Mlp {
    hidden: Vec<Linear>,
    out: Linear,
}

impl Mlp {
    /// Constructs the network, registering its parameters in `vb`.
    pub fn build(vb: &VarBuilder, config: &MlpConfig) -> Result<Self> {
        let mut layers = create_linear_layers("mlp", vb, &config.dims())?;
        let out = layers.pop().context("MLP without layers")?;
        Ok(Self {
            hidden: layers,
            out,
        })
    }

    /// Forward pass on a batch of shape `(batch_size, in_dim)`.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let xs = relu_forward(xs, &self.hidden)?;
        Ok(self.out.forward(&xs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_output_shape() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(&vb, &MlpConfig::new(3, vec![8, 8], 2))?;
        assert_eq!(varmap.all_vars().len(), 6);

        let xs = Tensor::zeros((5, 3), DType::F32, &Device::Cpu)?;
        assert_eq!(mlp.forward(&xs)?.dims(), &[5, 2]);
        Ok(())
    }
}
