//! Action representation modules.
//!
//! Replay buffers store raw actions, e.g., `[i]` for the `i`-th action of a discrete
//! action space. An action representation module converts them into the features
//! consumed by a policy learner. Applied to a [`TransitionBatch`], it re-encodes the
//! actions, the next actions and the padded available-action sets, while the masks
//! are left as they are.
use crate::AgentError;
use anyhow::Result;
use kestrel_core::replay_buffer::TransitionBatch;
use ndarray::{stack, Array2, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

/// Converts raw actions into their representation.
pub trait ActionRepresentation {
    /// Dimension of the representation of actions whose raw dimension is `action_dim`.
    fn representation_dim(&self, action_dim: usize) -> usize;

    /// Converts actions of shape `(n, action_dim)` into shape `(n, representation_dim)`.
    fn transform(&self, actions: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Converts sets of actions, shape `(batch_size, n, action_dim)`.
    fn transform_sets(&self, actions: ArrayView3<f32>) -> Result<Array3<f32>> {
        let sets = actions
            .outer_iter()
            .map(|set| self.transform(set))
            .collect::<Result<Vec<_>>>()?;
        let views = sets.iter().map(|set| set.view()).collect::<Vec<_>>();
        Ok(stack(Axis(0), &views)?)
    }

    /// Re-encodes the actions of a batch.
    fn transform_batch(&self, batch: TransitionBatch) -> Result<TransitionBatch> {
        Ok(TransitionBatch {
            action: self.transform(batch.action.view())?,
            next_action: match &batch.next_action {
                Some(a) => Some(self.transform(a.view())?),
                None => None,
            },
            curr_available_actions: match &batch.curr_available_actions {
                Some(a) => Some(self.transform_sets(a.view())?),
                None => None,
            },
            next_available_actions: match &batch.next_available_actions {
                Some(a) => Some(self.transform_sets(a.view())?),
                None => None,
            },
            ..batch
        })
    }
}

/// Uses raw actions as they are.
#[derive(Clone, Debug, Default)]
pub struct IdentityActionRepresentation;

impl ActionRepresentation for IdentityActionRepresentation {
    fn representation_dim(&self, action_dim: usize) -> usize {
        action_dim
    }

    fn transform(&self, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        Ok(actions.to_owned())
    }
}

/// One-hot encoding of action indices.
///
/// Raw actions must be of dimension 1, holding an index below `max_number_actions`.
/// Padding rows of available-action sets, which are zero, are encoded as the first
/// unit vector and must be excluded with their mask.
#[derive(Clone, Debug)]
pub struct OneHotActionRepresentation {
    max_number_actions: usize,
}

impl OneHotActionRepresentation {
    /// Constructs the module.
    pub fn new(max_number_actions: usize) -> Self {
        Self { max_number_actions }
    }

    /// The number of actions.
    pub fn max_number_actions(&self) -> usize {
        self.max_number_actions
    }
}

impl ActionRepresentation for OneHotActionRepresentation {
    fn representation_dim(&self, _action_dim: usize) -> usize {
        self.max_number_actions
    }

    fn transform(&self, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut out = Array2::zeros((actions.nrows(), self.max_number_actions));
        for (mut row, action) in out.outer_iter_mut().zip(actions.outer_iter()) {
            let index = if action.len() == 1 { action[0] } else { f32::NAN };
            if !(index >= 0.0)
                || index.fract() != 0.0
                || index as usize >= self.max_number_actions
            {
                return Err(AgentError::InvalidActionIndex {
                    index,
                    max_number_actions: self.max_number_actions,
                }
                .into());
            }
            row[index as usize] = 1.0;
        }
        Ok(out)
    }
}

/// Serializable selection of an action representation module.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum ActionRepresentationConfig {
    /// [`IdentityActionRepresentation`].
    Identity,

    /// [`OneHotActionRepresentation`].
    OneHot {
        /// The number of actions.
        max_number_actions: usize,
    },
}

impl Default for ActionRepresentationConfig {
    fn default() -> Self {
        Self::Identity
    }
}

impl ActionRepresentationConfig {
    /// Builds the module.
    pub fn build(&self) -> Box<dyn ActionRepresentation> {
        match self {
            Self::Identity => Box::new(IdentityActionRepresentation),
            Self::OneHot { max_number_actions } => {
                Box::new(OneHotActionRepresentation::new(*max_number_actions))
            }
        }
    }

    /// Cardinality to which available-action sets must be padded, if any.
    pub fn max_number_actions(&self) -> Option<usize> {
        match self {
            Self::Identity => None,
            Self::OneHot { max_number_actions } => Some(*max_number_actions),
        }
    }
}
