use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp) and [`Mlp2`](super::Mlp2).
pub struct MlpConfig {
    /// Input dimension.
    pub in_dim: usize,

    /// Sizes of the hidden layers.
    pub units: Vec<usize>,

    /// Output dimension.
    pub out_dim: usize,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
        }
    }

    /// Input dimension, hidden sizes and output dimension in order.
    pub(crate) fn dims(&self) -> Vec<usize> {
        std::iter::once(self.in_dim)
            .chain(self.units.iter().copied())
            .chain(std::iter::once(self.out_dim))
            .collect()
    }
}
