//! Neural policy learners of kestrel implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! * [`dqn::DeepQLearning`]: Q-learning with a neural action-value function over
//!   dynamic action spaces.
//! * [`sac::SoftActorCritic`]: soft actor-critic for continuous action spaces.
//!
//! Both implement [`PolicyLearner`](kestrel_core::PolicyLearner) and are plugged into a
//! [`LearningAgent`](kestrel_core::LearningAgent) like the learners of `kestrel-agent`.
#![warn(missing_docs)]
pub mod critic;
pub mod dqn;
pub mod mlp;
pub mod opt;
pub mod sac;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum exists because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// A GPU device with the given ordinal.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = anyhow::Error;

    fn try_from(device: Device) -> Result<Self> {
        Ok(match device {
            Device::Cpu => candle_core::Device::Cpu,
            Device::Cuda(n) => candle_core::Device::new_cuda(n)?,
        })
    }
}
