//! FIFO replay buffer.
use super::{Experience, FifoReplayBufferConfig, Transition, TransitionBatch};
use crate::{error::KestrelError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A bounded circular buffer of transitions with uniform sampling.
///
/// Pushing is O(1); once the buffer is full, each push overwrites the oldest
/// transition. Sampling is uniform with replacement and does not modify the buffer.
///
/// ```
/// use kestrel_core::{
///     replay_buffer::{Experience, FifoReplayBuffer, FifoReplayBufferConfig},
///     ExperienceBufferBase, ReplayBufferBase,
/// };
/// use ndarray::array;
///
/// # fn main() -> anyhow::Result<()> {
/// let mut buffer = FifoReplayBuffer::build(&FifoReplayBufferConfig::default().capacity(2))?;
/// for i in 0..3 {
///     let x = i as f32;
///     buffer.push(Experience::new(array![x], array![0.0], x, array![x + 1.0], false))?;
/// }
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.total_pushed(), 3);
///
/// let batch = buffer.sample(2)?;
/// assert_eq!(batch.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct FifoReplayBuffer {
    /// Maximum number of transitions.
    capacity: usize,

    /// Index of the slot overwritten by the next push once the buffer is full.
    i: usize,

    /// Stored transitions.
    storage: Vec<Transition>,

    /// Number of transitions pushed since construction or the last clear.
    total_pushed: usize,

    /// If `true`, available-action sets are ignored.
    is_action_continuous: bool,

    rng: StdRng,
}

impl FifoReplayBuffer {
    /// Creates an empty buffer.
    ///
    /// Fails if the capacity is zero.
    pub fn build(config: &FifoReplayBufferConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(KestrelError::InvalidCapacity(config.capacity).into());
        }

        Ok(Self {
            capacity: config.capacity,
            i: 0,
            storage: Vec::with_capacity(config.capacity),
            total_pushed: 0,
            is_action_continuous: config.is_action_continuous,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Converts an experience into a transition according to the buffer's setting.
    pub(crate) fn make_transition(&self, exp: Experience) -> Result<Transition> {
        if self.is_action_continuous {
            Ok(Transition::without_available_actions(exp))
        } else {
            Transition::from_experience(exp)
        }
    }

    /// Appends a transition, evicting the oldest one if the buffer is full.
    pub fn push_transition(&mut self, tr: Transition) {
        if self.storage.len() < self.capacity {
            self.storage.push(tr);
        } else {
            self.storage[self.i] = tr;
        }
        self.i = (self.i + 1) % self.capacity;
        self.total_pushed += 1;
        trace!(
            "FifoReplayBuffer::push_transition(): len = {}, total_pushed = {}",
            self.storage.len(),
            self.total_pushed
        );
    }

    /// Iterates over the stored transitions from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        // Before the first eviction, `i` equals the length and the oldest is at 0.
        let head = if self.storage.len() < self.capacity {
            0
        } else {
            self.i
        };
        let (newer, older) = self.storage.split_at(head);
        older.iter().chain(newer.iter())
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of transitions pushed so far, including evicted ones.
    pub fn total_pushed(&self) -> usize {
        self.total_pushed
    }

    /// Returns `true` if available-action sets are ignored.
    pub fn is_action_continuous(&self) -> bool {
        self.is_action_continuous
    }
}

impl ExperienceBufferBase for FifoReplayBuffer {
    type Item = Experience;

    fn push(&mut self, exp: Experience) -> Result<()> {
        let tr = self.make_transition(exp)?;
        self.push_transition(tr);
        Ok(())
    }

    fn len(&self) -> usize {
        self.storage.len()
    }

    fn clear(&mut self) {
        self.storage.clear();
        self.i = 0;
        self.total_pushed = 0;
    }
}

impl ReplayBufferBase for FifoReplayBuffer {
    type Batch = TransitionBatch;

    fn sample(&mut self, size: usize) -> Result<TransitionBatch> {
        let len = self.storage.len();
        if len == 0 || size > len {
            return Err(KestrelError::InsufficientData {
                requested: size,
                len,
            }
            .into());
        }
        if size == 0 {
            return Err(KestrelError::InvalidBatchSize.into());
        }

        let ixs = (0..size)
            .map(|_| self.rng.gen_range(0..len))
            .collect::<Vec<_>>();
        let transitions = ixs.iter().map(|&ix| &self.storage[ix]).collect::<Vec<_>>();

        TransitionBatch::from_transitions(&transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiscreteActionSpace;
    use ndarray::array;

    fn experience(i: usize) -> Experience {
        let x = i as f32;
        Experience::new(array![x], array![0.0], x, array![x + 1.0], false)
    }

    fn buffer(capacity: usize) -> Result<FifoReplayBuffer> {
        FifoReplayBuffer::build(&FifoReplayBufferConfig::default().capacity(capacity))
    }

    #[test]
    fn test_zero_capacity() {
        let err = buffer(0).err().unwrap();
        assert_eq!(
            err.downcast_ref::<KestrelError>(),
            Some(&KestrelError::InvalidCapacity(0))
        );
    }

    #[test]
    fn test_fifo_eviction() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let capacity = 5;

        for k in 0..12 {
            let mut buffer = buffer(capacity)?;
            for i in 0..capacity + k {
                buffer.push(experience(i))?;
            }
            assert_eq!(buffer.len(), capacity);
            assert_eq!(buffer.total_pushed(), capacity + k);

            let rewards = buffer.iter().map(|tr| tr.reward).collect::<Vec<_>>();
            let expected = (k..capacity + k).map(|i| i as f32).collect::<Vec<_>>();
            assert_eq!(rewards, expected);
        }
        Ok(())
    }

    #[test]
    fn test_iter_before_full() -> Result<()> {
        let mut buffer = buffer(5)?;
        for i in 0..3 {
            buffer.push(experience(i))?;
        }
        let rewards = buffer.iter().map(|tr| tr.reward).collect::<Vec<_>>();
        assert_eq!(rewards, vec![0.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_sample_bound() -> Result<()> {
        let mut buffer = buffer(10)?;
        let err = buffer.sample(1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<KestrelError>(),
            Some(&KestrelError::InsufficientData {
                requested: 1,
                len: 0
            })
        );
        assert_eq!(
            buffer.sample(0).unwrap_err().downcast_ref::<KestrelError>(),
            Some(&KestrelError::InsufficientData {
                requested: 0,
                len: 0
            })
        );

        for i in 0..4 {
            buffer.push(experience(i))?;
        }
        assert!(buffer.sample(5).is_err());
        assert_eq!(
            buffer.sample(0).unwrap_err().downcast_ref::<KestrelError>(),
            Some(&KestrelError::InvalidBatchSize)
        );

        let batch = buffer.sample(4)?;
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.state.dim(), (4, 1));
        for (s, r) in batch.state.column(0).iter().zip(batch.reward.iter()) {
            assert_eq!(s, r);
        }
        Ok(())
    }

    #[test]
    fn test_sample_is_non_destructive() -> Result<()> {
        let mut buffer = buffer(3)?;
        for i in 0..7 {
            buffer.push(experience(i))?;
        }
        let before = buffer.iter().cloned().collect::<Vec<_>>();
        for _ in 0..10 {
            let _ = buffer.sample(3)?;
        }
        let after = buffer.iter().cloned().collect::<Vec<_>>();
        assert_eq!(buffer.len(), 3);
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn test_dynamic_action_space_batch() -> Result<()> {
        let mut buffer = buffer(10)?;
        let exp = Experience::new(array![0.0, 0.0], array![2.0], 1.0, array![1.0, 0.0], false)
            .curr_available_actions(DiscreteActionSpace::from_indices(&[0, 2, 4])?)
            .next_available_actions(DiscreteActionSpace::from_indices(&[0, 3])?)
            .max_number_actions(5);
        buffer.push(exp)?;

        let batch = buffer.sample(1)?;
        assert_eq!(
            batch.curr_available_actions_mask,
            Some(array![[false, false, false, true, true]])
        );
        assert_eq!(
            batch.next_available_actions_mask,
            Some(array![[false, false, true, true, true]])
        );
        assert_eq!(
            batch.curr_available_actions,
            Some(array![[[0.0f32], [2.0], [4.0], [0.0], [0.0]]])
        );
        assert_eq!(
            batch.next_available_actions,
            Some(array![[[0.0f32], [3.0], [0.0], [0.0], [0.0]]])
        );
        Ok(())
    }

    #[test]
    fn test_continuous_actions_skip_available_sets() -> Result<()> {
        let mut buffer = FifoReplayBuffer::build(
            &FifoReplayBufferConfig::default()
                .capacity(4)
                .is_action_continuous(true),
        )?;
        let exp = experience(0).curr_available_actions(DiscreteActionSpace::with_n(3)?);
        buffer.push(exp)?;
        let batch = buffer.sample(1)?;
        assert_eq!(batch.curr_available_actions, None);
        assert_eq!(batch.curr_available_actions_mask, None);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let mut buffer = buffer(3)?;
        for i in 0..5 {
            buffer.push(experience(i))?;
        }
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.push(experience(9))?;
        assert_eq!(buffer.iter().map(|tr| tr.reward).collect::<Vec<_>>(), vec![9.0]);
        Ok(())
    }
}
