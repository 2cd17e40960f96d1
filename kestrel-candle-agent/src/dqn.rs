//! Deep Q-learning over dynamic action spaces.
mod base;
mod config;
pub use base::{masked_max, DeepQLearning};
pub use config::DqnConfig;
