use crate::{Observation, SubjectiveState};
use anyhow::Result;

/// Summarizes the history of observations into a subjective state.
pub trait HistorySummarization {
    /// Appends an observation to the history and returns the current subjective state.
    ///
    /// Fails when the observation does not match the dimension of the stored history.
    fn summarize(&mut self, observation: &Observation) -> Result<SubjectiveState>;

    /// Forgets the history, called at the beginning of an episode.
    fn reset(&mut self);
}
