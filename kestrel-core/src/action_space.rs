//! Action spaces.
//!
//! An action is represented by a raw 1-dimensional array. For discrete action spaces
//! built with [`DiscreteActionSpace::with_n`], the action with index `i` is `[i]`.
//! A discrete action space may also enumerate an arbitrary subset of actions, like
//! the legal moves at a particular step of a game; this is referred to as a dynamic
//! action space, whose cardinality can change from step to step.
use crate::error::KestrelError;
use anyhow::Result;
use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Raw representation of an action.
pub type Action = Array1<f32>;

/// A finite, ordered set of actions.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteActionSpace {
    actions: Vec<Action>,
    action_dim: usize,
}

impl DiscreteActionSpace {
    /// Creates an action space enumerating the given actions.
    ///
    /// Fails if `actions` is empty or the actions differ in dimension.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        let action_dim = actions
            .first()
            .ok_or(KestrelError::EmptyActionSpace)?
            .len();

        if let Some(a) = actions.iter().find(|a| a.len() != action_dim) {
            return Err(KestrelError::InconsistentActionDim {
                expected: action_dim,
                actual: a.len(),
            }
            .into());
        }

        Ok(Self {
            actions,
            action_dim,
        })
    }

    /// Creates the canonical action space `{[0], [1], ..., [n - 1]}`.
    pub fn with_n(n: usize) -> Result<Self> {
        Self::new((0..n).map(|i| Array1::from_elem(1, i as f32)).collect())
    }

    /// Creates an action space of the given action indices, in the given order.
    pub fn from_indices(ixs: &[usize]) -> Result<Self> {
        Self::new(ixs.iter().map(|&i| Array1::from_elem(1, i as f32)).collect())
    }

    /// The number of actions.
    pub fn n(&self) -> usize {
        self.actions.len()
    }

    /// Dimension of the raw representation of each action.
    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Actions in enumeration order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Returns the `i`-th action.
    pub fn get(&self, i: usize) -> Option<&Action> {
        self.actions.get(i)
    }

    /// Returns the position of the given action in the enumeration.
    pub fn position(&self, action: ArrayView1<f32>) -> Option<usize> {
        self.actions.iter().position(|a| a.view() == action)
    }

    /// Samples an action uniformly.
    pub fn sample(&self, rng: &mut impl Rng) -> Action {
        self.actions[rng.gen_range(0..self.actions.len())].clone()
    }
}

/// A box in a Euclidean space, for continuous actions.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxActionSpace {
    low: Array1<f32>,
    high: Array1<f32>,
}

impl BoxActionSpace {
    /// Creates an action space bounded elementwise by `low` and `high`.
    pub fn new(low: Array1<f32>, high: Array1<f32>) -> Result<Self> {
        if low.len() != high.len() {
            return Err(KestrelError::InconsistentActionDim {
                expected: low.len(),
                actual: high.len(),
            }
            .into());
        }
        Ok(Self { low, high })
    }

    /// Lower bounds.
    pub fn low(&self) -> &Array1<f32> {
        &self.low
    }

    /// Upper bounds.
    pub fn high(&self) -> &Array1<f32> {
        &self.high
    }

    /// Dimension of actions.
    pub fn action_dim(&self) -> usize {
        self.low.len()
    }

    /// Samples an action uniformly from the box.
    pub fn sample(&self, rng: &mut impl Rng) -> Action {
        self.low
            .iter()
            .zip(self.high.iter())
            .map(|(&lo, &hi)| lo + (hi - lo) * rng.gen::<f32>())
            .collect()
    }
}

/// Legal actions at a decision point.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionSpace {
    /// Finitely many actions, fixed or varying from step to step.
    Discrete(DiscreteActionSpace),

    /// Actions in a box.
    Continuous(BoxActionSpace),
}

impl ActionSpace {
    /// The number of actions, `None` for continuous action spaces.
    pub fn n(&self) -> Option<usize> {
        match self {
            Self::Discrete(space) => Some(space.n()),
            Self::Continuous(_) => None,
        }
    }

    /// Dimension of the raw representation of actions.
    pub fn action_dim(&self) -> usize {
        match self {
            Self::Discrete(space) => space.action_dim(),
            Self::Continuous(space) => space.action_dim(),
        }
    }

    /// Returns `true` for continuous action spaces.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::Continuous(_))
    }

    /// Returns the discrete action space, or an error if the space is continuous.
    pub fn as_discrete(&self) -> Result<&DiscreteActionSpace> {
        match self {
            Self::Discrete(space) => Ok(space),
            Self::Continuous(_) => Err(KestrelError::ContinuousActionSpace.into()),
        }
    }

    /// Samples an action uniformly.
    pub fn sample(&self, rng: &mut impl Rng) -> Action {
        match self {
            Self::Discrete(space) => space.sample(rng),
            Self::Continuous(space) => space.sample(rng),
        }
    }
}

impl From<DiscreteActionSpace> for ActionSpace {
    fn from(space: DiscreteActionSpace) -> Self {
        Self::Discrete(space)
    }
}

impl From<BoxActionSpace> for ActionSpace {
    fn from(space: BoxActionSpace) -> Self {
        Self::Continuous(space)
    }
}
