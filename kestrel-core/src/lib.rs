#![warn(missing_docs)]
//! Core of kestrel, a library for reinforcement learning and contextual bandits.
//!
//! This crate provides the backend-free parts of the library:
//!
//! * action spaces with fixed or per-step (dynamic) cardinality,
//! * replay buffers: a FIFO circular buffer and a hindsight relabeling buffer on top of it,
//!   with padding and masking of available-action sets into fixed-shape arrays,
//! * the [`Agent`], [`Env`], [`PolicyLearner`] and [`HistorySummarization`] abstractions,
//! * an online-learning driver connecting an agent to an environment.
pub mod action_space;
pub mod env;
pub mod error;
pub mod history_summarization;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    ActionResult, Agent, Env, ExperienceBufferBase, HistorySummarization, PolicyLearner,
    ReplayBufferBase,
};

mod learning_agent;
pub use learning_agent::LearningAgent;

mod online_learning;
pub use online_learning::{
    episode_return, run_episode, EpisodeStats, OnlineLearning, OnlineLearningConfig,
};

pub use action_space::{Action, ActionSpace, BoxActionSpace, DiscreteActionSpace};
pub use error::KestrelError;

/// Observation emitted by an environment.
pub type Observation = ndarray::Array1<f32>;

/// State of the agent, summarized from the history of observations.
pub type SubjectiveState = ndarray::Array1<f32>;
