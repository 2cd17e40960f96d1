//! Policy learner.
use super::{ExperienceBufferBase, ReplayBufferBase};
use crate::{record::Record, replay_buffer::TransitionBatch, Action, ActionSpace};
use anyhow::Result;
use ndarray::ArrayView1;

/// Learns a policy from batches of transitions.
///
/// Implementors provide action selection and a batch update rule; the provided
/// [`PolicyLearner::learn`] runs [`PolicyLearner::training_rounds`] rounds of
/// sampling, preprocessing and updating.
pub trait PolicyLearner {
    /// Selects an action among `available_action_space` for the given subjective state.
    fn act(
        &mut self,
        subjective_state: ArrayView1<f32>,
        available_action_space: &ActionSpace,
        exploit: bool,
    ) -> Result<Action>;

    /// Updates the learner with a preprocessed batch.
    fn learn_batch(&mut self, batch: &TransitionBatch) -> Result<Record>;

    /// Converts a raw batch into the representation consumed by
    /// [`PolicyLearner::learn_batch`], e.g., one-hot encoding of actions.
    fn preprocess_batch(&self, batch: TransitionBatch) -> Result<TransitionBatch> {
        Ok(batch)
    }

    /// The number of transitions in a batch.
    fn batch_size(&self) -> usize;

    /// The number of batches consumed in [`PolicyLearner::learn`].
    fn training_rounds(&self) -> usize {
        1
    }

    /// Cardinality used to pad available-action sets, if the learner needs a fixed one.
    fn max_number_actions(&self) -> Option<usize> {
        None
    }

    /// If `true`, the agent clears its replay buffer after each learning step.
    fn on_policy(&self) -> bool {
        false
    }

    /// Learns from batches sampled from `buffer`.
    ///
    /// Returns an empty record, without learning, while the buffer holds fewer
    /// transitions than [`PolicyLearner::batch_size`].
    fn learn<R>(&mut self, buffer: &mut R) -> Result<Record>
    where
        R: ExperienceBufferBase + ReplayBufferBase<Batch = TransitionBatch>,
    {
        if buffer.len() < self.batch_size() {
            return Ok(Record::empty());
        }

        let mut record = Record::empty();
        for _ in 0..self.training_rounds() {
            let batch = buffer.sample(self.batch_size())?;
            let batch = self.preprocess_batch(batch)?;
            record = record.merge(self.learn_batch(&batch)?);
        }

        Ok(record)
    }
}
