//! Replay buffer interface.
//!
//! Storing transitions and generating batches are separated into two traits,
//! [`ExperienceBufferBase`] and [`ReplayBufferBase`]. Both are implemented by
//! [`FifoReplayBuffer`](crate::replay_buffer::FifoReplayBuffer) and
//! [`HindsightReplayBuffer`](crate::replay_buffer::HindsightReplayBuffer).
use anyhow::Result;

/// Interface for buffers that store experiences from environments.
///
/// A buffer may hold back pushed items before they become available for sampling;
/// [`HindsightReplayBuffer`](crate::replay_buffer::HindsightReplayBuffer) does so until
/// the end of an episode. [`ExperienceBufferBase::len`] counts sampleable items only.
///
/// ```
/// use kestrel_core::{
///     replay_buffer::{Experience, FifoReplayBuffer, FifoReplayBufferConfig},
///     ExperienceBufferBase,
/// };
/// use ndarray::array;
///
/// # fn main() -> anyhow::Result<()> {
/// let mut buffer = FifoReplayBuffer::build(&FifoReplayBufferConfig::default().capacity(2))?;
/// for i in 0..3 {
///     let s = i as f32;
///     buffer.push(Experience::new(array![s], array![0.0], 0.0, array![s + 1.0], false))?;
/// }
/// assert_eq!(buffer.len(), 2);
/// # Ok(())
/// # }
/// ```
pub trait ExperienceBufferBase {
    /// The type of items pushed into the buffer.
    type Item;

    /// Pushes a new experience into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// Returns the number of experiences available for sampling.
    fn len(&self) -> usize;

    /// Returns `true` if no experience is available for sampling.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all experiences.
    fn clear(&mut self);
}

/// Interface for replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// The type of batch generated for training.
    type Batch;

    /// Samples a batch of `size` experiences.
    ///
    /// Sampling does not remove experiences from the buffer.
    fn sample(&mut self, size: usize) -> Result<Self::Batch>;
}
