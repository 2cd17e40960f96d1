//! Tabular Q-learning.
mod base;
mod config;
pub use base::TabularQLearning;
pub use config::TabularQLearningConfig;
