//! Input of replay buffers.
use crate::{Action, ActionSpace, DiscreteActionSpace};
use ndarray::Array1;

/// Fields of a single environment step, pushed into a replay buffer.
///
/// The buffer turns an [`Experience`] into a [`Transition`](super::Transition),
/// materializing available-action sets as padded arrays with masks.
///
/// ```
/// use kestrel_core::{replay_buffer::Experience, DiscreteActionSpace};
/// use ndarray::array;
///
/// let space = DiscreteActionSpace::from_indices(&[0, 2, 4]).unwrap();
/// let exp = Experience::new(array![0.0, 1.0], array![2.0], -1.0, array![1.0, 1.0], false)
///     .curr_available_actions(space.clone())
///     .next_available_actions(space)
///     .max_number_actions(5);
/// ```
#[derive(Clone, Debug)]
pub struct Experience {
    /// State before the action.
    pub state: Array1<f32>,

    /// Action taken.
    pub action: Action,

    /// Reward.
    pub reward: f32,

    /// State after the action.
    pub next_state: Array1<f32>,

    /// Action taken at the next step, for on-policy learners.
    pub next_action: Option<Action>,

    /// Actions available at `state`.
    pub curr_available_actions: Option<DiscreteActionSpace>,

    /// Actions available at `next_state`.
    pub next_available_actions: Option<DiscreteActionSpace>,

    /// Flag denoting the end of the episode.
    pub done: bool,

    /// Cardinality to which available-action sets are padded.
    pub max_number_actions: Option<usize>,

    /// Reference action space, giving the padding cardinality when
    /// `max_number_actions` is not set.
    pub action_space: Option<ActionSpace>,
}

impl Experience {
    /// Constructs an experience without available-action sets.
    pub fn new(
        state: Array1<f32>,
        action: Action,
        reward: f32,
        next_state: Array1<f32>,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            next_action: None,
            curr_available_actions: None,
            next_available_actions: None,
            done,
            max_number_actions: None,
            action_space: None,
        }
    }

    /// Sets the action taken at the next step.
    pub fn next_action(mut self, action: Action) -> Self {
        self.next_action = Some(action);
        self
    }

    /// Sets the actions available at the current step.
    pub fn curr_available_actions(mut self, space: DiscreteActionSpace) -> Self {
        self.curr_available_actions = Some(space);
        self
    }

    /// Sets the actions available at the next step.
    pub fn next_available_actions(mut self, space: DiscreteActionSpace) -> Self {
        self.next_available_actions = Some(space);
        self
    }

    /// Sets the cardinality to which available-action sets are padded.
    pub fn max_number_actions(mut self, n: usize) -> Self {
        self.max_number_actions = Some(n);
        self
    }

    /// Sets the reference action space.
    pub fn action_space(mut self, space: ActionSpace) -> Self {
        self.action_space = Some(space);
        self
    }

    /// Cardinality to which `available` is padded.
    ///
    /// `max_number_actions` takes precedence over the reference action space;
    /// without either, the set is not padded.
    pub(crate) fn padding_cardinality(&self, available: &DiscreteActionSpace) -> usize {
        match (self.max_number_actions, &self.action_space) {
            (Some(n), _) => n,
            (None, Some(ActionSpace::Discrete(space))) => space.n(),
            _ => available.n(),
        }
    }
}
