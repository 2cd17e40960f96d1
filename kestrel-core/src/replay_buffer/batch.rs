//! Batch of transitions.
use super::Transition;
use crate::error::KestrelError;
use anyhow::Result;
use ndarray::{stack, Array, Array1, Array2, Array3, ArrayView, Axis, Dimension, RemoveAxis};

/// A batch of transitions, each field stacked along a leading batch axis.
///
/// Padded available-action sets have shape `(batch_size, max_number_actions, action_dim)`
/// and their masks `(batch_size, max_number_actions)`, `true` on padding rows.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionBatch {
    /// States, `(batch_size, state_dim)`.
    pub state: Array2<f32>,

    /// Actions, `(batch_size, action_dim)`.
    pub action: Array2<f32>,

    /// Rewards.
    pub reward: Array1<f32>,

    /// Next states, `(batch_size, state_dim)`.
    pub next_state: Array2<f32>,

    /// Next actions, `(batch_size, action_dim)`.
    pub next_action: Option<Array2<f32>>,

    /// Available actions at `state`.
    pub curr_available_actions: Option<Array3<f32>>,

    /// Masks of `curr_available_actions`.
    pub curr_available_actions_mask: Option<Array2<bool>>,

    /// Available actions at `next_state`.
    pub next_available_actions: Option<Array3<f32>>,

    /// Masks of `next_available_actions`.
    pub next_available_actions_mask: Option<Array2<bool>>,

    /// `1.0` for transitions ending an episode, `0.0` otherwise.
    pub done: Array1<f32>,

    /// Per-sample weights; absent for uniform sampling.
    pub weight: Option<Array1<f32>>,
}

fn stack_views<A, D>(views: &[ArrayView<A, D>]) -> Result<Array<A, D::Larger>>
where
    A: Clone,
    D: Dimension,
    D::Larger: RemoveAxis,
{
    Ok(stack(Axis(0), views)?)
}

/// Stacks an optional field, which must be present for all transitions or none.
fn stack_optional<'a, A, D, F>(
    transitions: &[&'a Transition],
    name: &str,
    f: F,
) -> Result<Option<Array<A, D::Larger>>>
where
    A: Clone + 'a,
    D: Dimension + 'a,
    D::Larger: RemoveAxis,
    F: Fn(&'a Transition) -> Option<&'a Array<A, D>>,
{
    let views = transitions
        .iter()
        .filter_map(|&tr| f(tr).map(|x| x.view()))
        .collect::<Vec<_>>();

    if views.is_empty() {
        Ok(None)
    } else if views.len() == transitions.len() {
        Ok(Some(stack_views(&views)?))
    } else {
        Err(KestrelError::InconsistentTransitions(format!(
            "{} is given for {} of {} transitions",
            name,
            views.len(),
            transitions.len()
        ))
        .into())
    }
}

impl TransitionBatch {
    /// Stacks transitions into a batch.
    ///
    /// Fails if `transitions` is empty, if the transitions differ in shape, or if an
    /// optional field is given for some transitions but not all.
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        if transitions.is_empty() {
            return Err(KestrelError::InvalidBatchSize.into());
        }

        let state = transitions.iter().map(|tr| tr.state.view()).collect::<Vec<_>>();
        let action = transitions.iter().map(|tr| tr.action.view()).collect::<Vec<_>>();
        let next_state = transitions
            .iter()
            .map(|tr| tr.next_state.view())
            .collect::<Vec<_>>();

        Ok(Self {
            state: stack_views(&state)?,
            action: stack_views(&action)?,
            reward: transitions.iter().map(|tr| tr.reward).collect(),
            next_state: stack_views(&next_state)?,
            next_action: stack_optional(transitions, "next_action", |tr| tr.next_action.as_ref())?,
            curr_available_actions: stack_optional(transitions, "curr_available_actions", |tr| {
                tr.curr_available_actions.as_ref()
            })?,
            curr_available_actions_mask: stack_optional(
                transitions,
                "curr_available_actions_mask",
                |tr| tr.curr_available_actions_mask.as_ref(),
            )?,
            next_available_actions: stack_optional(transitions, "next_available_actions", |tr| {
                tr.next_available_actions.as_ref()
            })?,
            next_available_actions_mask: stack_optional(
                transitions,
                "next_available_actions_mask",
                |tr| tr.next_available_actions_mask.as_ref(),
            )?,
            done: transitions
                .iter()
                .map(|tr| if tr.done { 1.0 } else { 0.0 })
                .collect(),
            weight: None,
        })
    }

    /// The number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch holds no transition.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{replay_buffer::Experience, DiscreteActionSpace};
    use ndarray::array;

    fn transition(i: usize, available: Option<&[usize]>) -> Result<Transition> {
        let x = i as f32;
        let mut exp = Experience::new(array![x, x], array![0.0], x, array![x + 1.0, x], i % 2 == 1)
            .max_number_actions(4);
        if let Some(ixs) = available {
            let space = DiscreteActionSpace::from_indices(ixs)?;
            exp = exp
                .curr_available_actions(space.clone())
                .next_available_actions(space);
        }
        Transition::from_experience(exp)
    }

    #[test]
    fn test_stack_transitions() -> Result<()> {
        let t0 = transition(0, Some(&[0, 1]))?;
        let t1 = transition(1, Some(&[2]))?;
        let batch = TransitionBatch::from_transitions(&[&t0, &t1])?;

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.state, array![[0.0f32, 0.0], [1.0, 1.0]]);
        assert_eq!(batch.next_state, array![[1.0f32, 0.0], [2.0, 1.0]]);
        assert_eq!(batch.reward, array![0.0f32, 1.0]);
        assert_eq!(batch.done, array![0.0f32, 1.0]);
        assert_eq!(batch.next_action, None);
        assert_eq!(batch.weight, None);

        let actions = batch.curr_available_actions.unwrap();
        assert_eq!(actions.dim(), (2, 4, 1));
        assert_eq!(
            batch.curr_available_actions_mask,
            Some(array![[false, false, true, true], [false, true, true, true]])
        );
        Ok(())
    }

    #[test]
    fn test_partial_optional_field() -> Result<()> {
        let t0 = transition(0, Some(&[0, 1]))?;
        let t1 = transition(1, None)?;
        let err = TransitionBatch::from_transitions(&[&t0, &t1]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KestrelError>(),
            Some(KestrelError::InconsistentTransitions(_))
        ));
        Ok(())
    }
}
