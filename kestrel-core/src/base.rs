//! Core abstractions.
mod agent;
mod env;
mod history;
mod policy_learner;
mod replay_buffer;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use history::HistorySummarization;
pub use policy_learner::PolicyLearner;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use step::ActionResult;
