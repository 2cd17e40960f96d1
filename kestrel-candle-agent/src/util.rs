//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{loss::mse, VarMap};
use log::trace;
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Critic loss type.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

impl CriticLoss {
    /// Loss between predictions and targets of the same shape.
    pub fn loss(&self, pred: &Tensor, tgt: &Tensor) -> Result<Tensor> {
        Ok(match self {
            Self::Mse => mse(pred, tgt)?,
            Self::SmoothL1 => smooth_l1_loss(pred, tgt)?,
        })
    }
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> candle_core::Result<Tensor> {
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?;
    let m2 = m1.affine(-1.0, 1.0)?;
    let quadratic = (m1 * d.sqr()?.affine(0.5, 0.0)?)?;
    let linear = (m2 * d.affine(1.0, -0.5)?)?;
    (quadratic + linear)?.mean_all()
}

/// Applies soft update on variables, identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("track(): tau = {}", tau);
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (k, v_dest) in dest.iter() {
        let v_src = src
            .get(k)
            .ok_or_else(|| anyhow!("Variable {} is not in the source", k))?;
        let t_src = v_src.as_tensor().affine(tau, 0.0)?;
        let t_dest = v_dest.as_tensor().affine(1.0 - tau, 0.0)?;
        v_dest.set(&(t_src + t_dest)?)?;
    }

    Ok(())
}

/// Converts a vector to a tensor of shape `(n,)`.
pub fn tensor1(x: &Array1<f32>, device: &Device) -> Result<Tensor> {
    Ok(Tensor::from_vec(x.to_vec(), x.len(), device)?)
}

/// Converts a matrix to a tensor of the same shape.
pub fn tensor2(x: ArrayView2<f32>, device: &Device) -> Result<Tensor> {
    let v = x.iter().copied().collect::<Vec<_>>();
    Ok(Tensor::from_vec(v, x.dim(), device)?)
}

/// Converts an array of three dimensions to a tensor of the same shape.
pub fn tensor3(x: &Array3<f32>, device: &Device) -> Result<Tensor> {
    let v = x.iter().copied().collect::<Vec<_>>();
    Ok(Tensor::from_vec(v, x.dim(), device)?)
}

/// Converts a mask to a `u8` tensor, `1` where the mask is `true`.
pub fn mask_tensor(mask: &Array2<bool>, device: &Device) -> Result<Tensor> {
    let v = mask.iter().map(|&m| m as u8).collect::<Vec<_>>();
    Ok(Tensor::from_vec(v, mask.dim(), device)?)
}

/// Stacks `n` copies of `state` with the rows of `actions`, shape `(n, state_dim + action_dim)`.
pub fn state_action_features(state: ArrayView1<f32>, actions: ArrayView2<f32>) -> Array2<f32> {
    let (n, action_dim) = actions.dim();
    let mut x = Array2::zeros((n, state.len() + action_dim));
    for (mut row, a) in x.outer_iter_mut().zip(actions.outer_iter()) {
        row.slice_mut(ndarray::s![..state.len()]).assign(&state);
        row.slice_mut(ndarray::s![state.len()..]).assign(&a);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::Init;
    use ndarray::array;

    fn varmap(value: &[f32]) -> Result<VarMap> {
        let vm = VarMap::new();
        vm.get((3,), "var1", Init::Const(0.0), DType::F32, &Device::Cpu)?;
        let t = Tensor::from_slice(value, (3,), &Device::Cpu)?;
        let data = vm.data().lock().map_err(|e| anyhow!("{}", e))?;
        data.get("var1")
            .ok_or_else(|| anyhow!("var1"))?
            .set(&t)?;
        drop(data);
        Ok(vm)
    }

    fn values(vm: &VarMap) -> Result<Vec<f32>> {
        let data = vm.data().lock().map_err(|e| anyhow!("{}", e))?;
        let v = data.get("var1").ok_or_else(|| anyhow!("var1"))?;
        Ok(v.as_tensor().to_vec1::<f32>()?)
    }

    #[test]
    fn test_track() -> Result<()> {
        let src = varmap(&[1.0, 2.0, 3.0])?;
        let dest = varmap(&[4.0, 5.0, 6.0])?;
        track(&dest, &src, 0.5)?;
        assert_eq!(values(&dest)?, vec![2.5, 3.5, 4.5]);

        track(&dest, &src, 1.0)?;
        assert_eq!(values(&dest)?, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_smooth_l1_loss() -> Result<()> {
        let x = Tensor::from_slice(&[0.0f32, 3.0], (2,), &Device::Cpu)?;
        let y = Tensor::from_slice(&[0.5f32, 0.0], (2,), &Device::Cpu)?;
        // (0.5 * 0.25 + (3 - 0.5)) / 2
        let loss = smooth_l1_loss(&x, &y)?.to_scalar::<f32>()?;
        assert!((loss - 1.3125).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_state_action_features() {
        let x = state_action_features(array![1.0f32, 2.0].view(), array![[0.0f32], [3.0]].view());
        assert_eq!(x, array![[1.0f32, 2.0, 0.0], [1.0, 2.0, 3.0]]);
    }
}
