//! Multilayer perceptrons.
mod base;
mod config;
mod mlp2;
pub use base::Mlp;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};
pub use config::MlpConfig;
pub use mlp2::Mlp2;

/// Creates linear layers mapping `dims[i]` to `dims[i + 1]`, named `ln{i}` under `prefix`.
fn create_linear_layers(
    prefix: &str,
    vb: &VarBuilder,
    dims: &[usize],
) -> candle_core::Result<Vec<Linear>> {
    let vb = vb.pp(prefix);
    dims.windows(2)
        .enumerate()
        .map(|(i, w)| linear(w[0], w[1], vb.pp(format!("ln{}", i))))
        .collect()
}

/// Applies `layers` with ReLU after each of them.
fn relu_forward(xs: &Tensor, layers: &[Linear]) -> candle_core::Result<Tensor> {
    let mut xs = xs.clone();
    for layer in layers.iter() {
        xs = layer.forward(&xs)?.relu()?;
    }
    Ok(xs)
}
