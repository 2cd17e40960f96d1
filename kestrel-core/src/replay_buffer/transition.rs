//! Transition stored in replay buffers.
use super::{create_action_tensor_and_mask, Experience};
use crate::{Action, DiscreteActionSpace};
use anyhow::Result;
use ndarray::{Array1, Array2};

/// A single step `(s_t, a_t, r_t, s_t+1, done)` with padded available-action sets.
///
/// Transitions are created by replay buffers from [`Experience`]s and are not
/// modified afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// State.
    pub state: Array1<f32>,

    /// Raw action.
    pub action: Action,

    /// Reward.
    pub reward: f32,

    /// Next state.
    pub next_state: Array1<f32>,

    /// Raw action at the next step.
    pub next_action: Option<Action>,

    /// Available actions at `state`, shape `(max_number_actions, action_dim)`.
    pub curr_available_actions: Option<Array2<f32>>,

    /// `true` on padding rows of `curr_available_actions`.
    pub curr_available_actions_mask: Option<Array1<bool>>,

    /// Available actions at `next_state`, shape `(max_number_actions, action_dim)`.
    pub next_available_actions: Option<Array2<f32>>,

    /// `true` on padding rows of `next_available_actions`.
    pub next_available_actions_mask: Option<Array1<bool>>,

    /// Flag denoting the end of the episode.
    pub done: bool,
}

fn padded(
    exp: &Experience,
    available: &Option<DiscreteActionSpace>,
) -> Result<(Option<Array2<f32>>, Option<Array1<bool>>)> {
    match available {
        Some(space) => {
            let (actions, mask) =
                create_action_tensor_and_mask(exp.padding_cardinality(space), space)?;
            Ok((Some(actions), Some(mask)))
        }
        None => Ok((None, None)),
    }
}

impl Transition {
    /// Creates a transition, padding and masking the available-action sets.
    pub fn from_experience(exp: Experience) -> Result<Self> {
        let (curr_available_actions, curr_available_actions_mask) =
            padded(&exp, &exp.curr_available_actions)?;
        let (next_available_actions, next_available_actions_mask) =
            padded(&exp, &exp.next_available_actions)?;

        Ok(Self {
            state: exp.state,
            action: exp.action,
            reward: exp.reward,
            next_state: exp.next_state,
            next_action: exp.next_action,
            curr_available_actions,
            curr_available_actions_mask,
            next_available_actions,
            next_available_actions_mask,
            done: exp.done,
        })
    }

    /// Creates a transition ignoring available-action sets, for continuous actions.
    pub fn without_available_actions(exp: Experience) -> Self {
        Self {
            state: exp.state,
            action: exp.action,
            reward: exp.reward,
            next_state: exp.next_state,
            next_action: exp.next_action,
            curr_available_actions: None,
            curr_available_actions_mask: None,
            next_available_actions: None,
            next_available_actions_mask: None,
            done: exp.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::KestrelError, ActionSpace};
    use ndarray::array;

    #[test]
    fn test_dynamic_action_space_masks() -> Result<()> {
        let curr = DiscreteActionSpace::from_indices(&[0, 2, 4])?;
        let next = DiscreteActionSpace::from_indices(&[0, 3])?;
        let exp = Experience::new(Array1::zeros(3), array![2.0], 0.0, Array1::zeros(3), false)
            .curr_available_actions(curr)
            .next_available_actions(next)
            .max_number_actions(5);
        let tr = Transition::from_experience(exp)?;

        assert_eq!(
            tr.curr_available_actions,
            Some(array![[0.0f32], [2.0], [4.0], [0.0], [0.0]])
        );
        assert_eq!(
            tr.curr_available_actions_mask,
            Some(array![false, false, false, true, true])
        );
        assert_eq!(
            tr.next_available_actions,
            Some(array![[0.0f32], [3.0], [0.0], [0.0], [0.0]])
        );
        assert_eq!(
            tr.next_available_actions_mask,
            Some(array![false, false, true, true, true])
        );
        Ok(())
    }

    #[test]
    fn test_padding_from_reference_action_space() -> Result<()> {
        let reference: ActionSpace = DiscreteActionSpace::with_n(4)?.into();
        let available = DiscreteActionSpace::from_indices(&[1])?;
        let exp = Experience::new(array![0.0f32], array![1.0], 0.0, array![0.0f32], true)
            .curr_available_actions(available.clone())
            .next_available_actions(available)
            .action_space(reference);
        let tr = Transition::from_experience(exp)?;

        assert_eq!(
            tr.curr_available_actions_mask,
            Some(array![false, true, true, true])
        );
        Ok(())
    }

    #[test]
    fn test_max_number_actions_too_small() -> Result<()> {
        let exp = Experience::new(array![0.0f32], array![1.0], 0.0, array![0.0f32], false)
            .curr_available_actions(DiscreteActionSpace::with_n(3)?)
            .max_number_actions(2);
        let err = Transition::from_experience(exp).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KestrelError>(),
            Some(KestrelError::AvailableActionsExceedLimit { .. })
        ));
        Ok(())
    }
}
