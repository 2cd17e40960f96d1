use super::{create_linear_layers, relu_forward, MlpConfig};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Multilayer perceptron that outputs two tensors of the same size.
///
/// Used as a Gaussian policy, the heads give the mean and the log standard deviation.
pub struct Mlp2 {
    hidden: Vec<Linear>,
    head1: Linear,
    head2: Linear,
}

impl Mlp2 {
    /// Constructs the network, registering its parameters in `vb`.
    pub fn build(vb: &VarBuilder, config: &MlpConfig) -> Result<Self> {
        let mut dims = config.dims();
        dims.pop();
        let in_dim = dims.last().copied().unwrap_or(config.in_dim);
        let hidden = create_linear_layers("mlp", vb, &dims)?;
        let head1 = linear(in_dim, config.out_dim, vb.pp("mean"))?;
        let head2 = linear(in_dim, config.out_dim, vb.pp("lstd"))?;
        Ok(Self {
            hidden,
            head1,
            head2,
        })
    }

    /// Forward pass returning the outputs of both heads.
    pub fn forward(&self, xs: &Tensor) -> Result<(Tensor, Tensor)> {
        let xs = relu_forward(xs, &self.hidden)?;
        Ok((self.head1.forward(&xs)?, self.head2.forward(&xs)?))
    }
}
