//! Small environments for testing agents.
mod bandit;
mod fixed_steps;
mod goal_grid;
pub use bandit::{TenTimesActionBanditEnv, TenTimesActionBanditEnvConfig};
pub use fixed_steps::{FixedNumberOfStepsEnv, FixedNumberOfStepsEnvConfig};
pub use goal_grid::{GoalGridEnv, GoalGridEnvConfig};
