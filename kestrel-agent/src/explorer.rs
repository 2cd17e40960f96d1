//! Exploration modules.
//!
//! An explorer selects the index of an action from the scores of the available
//! actions computed by a policy learner.
use crate::argmax;
use ndarray::ArrayView1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Explorers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum Explorer {
    /// Takes the action with the highest value.
    Greedy,

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),

    /// Upper confidence bound: takes the action maximizing `value + alpha * uncertainty`.
    Ucb {
        /// Weight of the uncertainty.
        alpha: f32,
    },
}

impl Explorer {
    /// Selects an action among `values.len()` actions.
    ///
    /// `uncertainties` is used only by [`Explorer::Ucb`]. With `exploit = true`, the
    /// greedy action is selected without advancing the explorer.
    ///
    /// Panics if `values` is empty.
    pub fn select(
        &mut self,
        values: ArrayView1<f32>,
        uncertainties: ArrayView1<f32>,
        exploit: bool,
        rng: &mut impl Rng,
    ) -> usize {
        let greedy = || argmax(values).unwrap_or(0);
        if exploit {
            return greedy();
        }

        match self {
            Self::Greedy => greedy(),
            Self::EpsilonGreedy(eg) => eg.select(values, rng),
            Self::Ucb { alpha } => {
                let scores = &values + &(&uncertainties * *alpha);
                argmax(scores.view()).unwrap_or(0)
            }
        }
    }
}

/// Epsilon-greedy explorer, whose epsilon decays linearly from `eps_start` to
/// `eps_final` in `final_step` selections.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// The number of selections done so far.
    pub n_opts: usize,

    /// Epsilon at the beginning.
    pub eps_start: f32,

    /// Epsilon after `final_step` selections.
    pub eps_final: f32,

    /// The number of selections over which epsilon decays.
    pub final_step: usize,
}

#[allow(clippy::new_without_default)]
impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new() -> Self {
        Self {
            n_opts: 0,
            eps_start: 1.0,
            eps_final: 0.02,
            final_step: 100_000,
        }
    }

    /// Constructs epsilon-greedy explorer with a constant epsilon.
    pub fn constant(eps: f32) -> Self {
        Self {
            n_opts: 0,
            eps_start: eps,
            eps_final: eps,
            final_step: 1,
        }
    }

    /// Current value of epsilon.
    pub fn eps(&self) -> f32 {
        let d = (self.eps_start - self.eps_final) / (self.final_step.max(1) as f32);
        (self.eps_start - d * self.n_opts as f32).max(self.eps_final)
    }

    /// Selects an action uniformly with probability epsilon, greedily otherwise.
    pub fn select(&mut self, values: ArrayView1<f32>, rng: &mut impl Rng) -> usize {
        let is_random = rng.gen::<f32>() < self.eps();
        self.n_opts += 1;

        if is_random {
            rng.gen_range(0..values.len())
        } else {
            argmax(values).unwrap_or(0)
        }
    }

    /// Set the epsilon value at the final step.
    pub fn eps_final(mut self, v: f32) -> Self {
        self.eps_final = v;
        self
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f32) -> Self {
        self.eps_start = v;
        self
    }

    /// Set the number of selections over which epsilon decays.
    pub fn final_step(mut self, v: usize) -> Self {
        self.final_step = v;
        self
    }
}
