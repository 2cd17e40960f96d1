//! Ridge regression with sufficient statistics.
use crate::AgentError;
use anyhow::Result;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Inverts a square matrix by Gauss-Jordan elimination with partial pivoting.
pub(crate) fn inverse(a: &Array2<f32>) -> Result<Array2<f32>> {
    let n = a.nrows();
    let mut m = a.clone();
    let mut inv = Array2::eye(n);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[[i, col]].abs().total_cmp(&m[[j, col]].abs()))
            .unwrap_or(col);
        if m[[pivot, col]].abs() < 1e-12 {
            return Err(AgentError::SingularMatrix.into());
        }
        if pivot != col {
            for k in 0..n {
                m.swap([pivot, k], [col, k]);
                inv.swap([pivot, k], [col, k]);
            }
        }

        let p = m[[col, col]];
        m.row_mut(col).mapv_inplace(|v| v / p);
        inv.row_mut(col).mapv_inplace(|v| v / p);

        for row in 0..n {
            if row == col {
                continue;
            }
            let f = m[[row, col]];
            if f == 0.0 {
                continue;
            }
            let m_col = m.row(col).to_owned();
            let inv_col = inv.row(col).to_owned();
            m.row_mut(row).scaled_add(-f, &m_col);
            inv.row_mut(row).scaled_add(-f, &inv_col);
        }
    }

    Ok(inv)
}

/// Linear regression with L2 regularization and an intercept.
///
/// Keeps `A = lambda I + sum_i w_i x_i x_i^T` and `b = sum_i w_i y_i x_i` over the
/// training data, where `x_i` is the feature vector extended with a constant `1`.
/// The coefficients are `theta = A^-1 b`.
#[derive(Clone, Debug)]
pub struct LinearRegression {
    feature_dim: usize,
    a: Array2<f32>,
    b: Array1<f32>,
    a_inv: Array2<f32>,
    theta: Array1<f32>,
}

impl LinearRegression {
    /// Creates a model of features of `feature_dim` dimensions.
    ///
    /// `l2_reg_lambda` must be positive.
    pub fn new(feature_dim: usize, l2_reg_lambda: f32) -> Self {
        let d = feature_dim + 1;
        Self {
            feature_dim,
            a: Array2::eye(d) * l2_reg_lambda,
            b: Array1::zeros(d),
            a_inv: Array2::eye(d) / l2_reg_lambda,
            theta: Array1::zeros(d),
        }
    }

    /// Dimension of features, excluding the intercept.
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Coefficients, the last one being the intercept.
    pub fn coefficients(&self) -> &Array1<f32> {
        &self.theta
    }

    fn check_dim(&self, dim: usize) -> Result<()> {
        if dim != self.feature_dim {
            return Err(AgentError::FeatureDimMismatch {
                expected: self.feature_dim,
                actual: dim,
            }
            .into());
        }
        Ok(())
    }

    fn extend(x: ArrayView1<f32>) -> Array1<f32> {
        x.iter().copied().chain(std::iter::once(1.0)).collect()
    }

    /// Updates the model with features `x` of shape `(n, feature_dim)` and targets `y`.
    ///
    /// Samples are weighted by `weight` if given, otherwise by 1.
    pub fn update(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView1<f32>,
        weight: Option<ArrayView1<f32>>,
    ) -> Result<()> {
        self.check_dim(x.ncols())?;

        for (i, xi) in x.axis_iter(Axis(0)).enumerate() {
            let w = weight.map_or(1.0, |w| w[i]);
            let xi = Self::extend(xi);
            let outer = xi
                .view()
                .insert_axis(Axis(1))
                .dot(&xi.view().insert_axis(Axis(0)));
            self.a.scaled_add(w, &outer);
            self.b.scaled_add(w * y[i], &xi);
        }

        self.a_inv = inverse(&self.a)?;
        self.theta = self.a_inv.dot(&self.b);
        Ok(())
    }

    /// Predicted target of features `x`.
    pub fn predict(&self, x: ArrayView1<f32>) -> Result<f32> {
        self.check_dim(x.len())?;
        Ok(Self::extend(x).dot(&self.theta))
    }

    /// Width of the confidence ellipsoid at `x`, `sqrt(x^T A^-1 x)`.
    pub fn uncertainty(&self, x: ArrayView1<f32>) -> Result<f32> {
        self.check_dim(x.len())?;
        let x = Self::extend(x);
        Ok(x.dot(&self.a_inv.dot(&x)).max(0.0).sqrt())
    }
}
