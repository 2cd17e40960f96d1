//! Replay buffers.
//!
//! [`FifoReplayBuffer`] stores [`Transition`]s in a bounded circular buffer and
//! samples [`TransitionBatch`]es uniformly. [`HindsightReplayBuffer`] wraps it and
//! relabels the goals of finished episodes.
//!
//! Available-action sets of [`Experience`]s are converted into fixed-shape arrays
//! with [`create_action_tensor_and_mask`], so that batches of transitions with
//! different numbers of available actions can be stacked.
mod action_tensor;
mod batch;
mod config;
mod experience;
mod fifo;
mod hindsight;
mod transition;
pub use action_tensor::create_action_tensor_and_mask;
pub use batch::TransitionBatch;
pub use config::{FifoReplayBufferConfig, HindsightReplayBufferConfig};
pub use experience::Experience;
pub use fifo::FifoReplayBuffer;
pub use hindsight::{HindsightReplayBuffer, RewardFn};
pub use transition::Transition;
