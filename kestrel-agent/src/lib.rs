//! Policy learners of kestrel.
//!
//! Learners implement [`PolicyLearner`](kestrel_core::PolicyLearner) and are plugged
//! into a [`LearningAgent`](kestrel_core::LearningAgent) together with a replay buffer.
//! Their behavior is composed of small modules: an [`action_representation`] applied
//! to raw actions, and an [`explorer`] selecting actions from scores.
pub mod action_representation;
pub mod error;
pub mod explorer;
pub mod linear_bandit;
pub mod tabular_q;
pub use error::AgentError;

use ndarray::ArrayView1;

/// Returns the index of the first maximum, `None` for an empty input.
pub(crate) fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
