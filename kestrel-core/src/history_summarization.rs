//! History summarization modules.
use crate::{HistorySummarization, KestrelError, Observation, SubjectiveState};
use anyhow::Result;
use ndarray::{concatenate, Array1, Axis};
use std::collections::VecDeque;

/// Uses the latest observation as the subjective state.
#[derive(Clone, Debug, Default)]
pub struct IdentityHistorySummarization;

impl HistorySummarization for IdentityHistorySummarization {
    fn summarize(&mut self, observation: &Observation) -> Result<SubjectiveState> {
        Ok(observation.clone())
    }

    fn reset(&mut self) {}
}

/// Concatenates the latest `history_length` observations, oldest first.
///
/// At the beginning of an episode, missing observations are filled with zeros.
#[derive(Clone, Debug)]
pub struct StackingHistorySummarization {
    history_length: usize,
    history: VecDeque<Observation>,
}

impl StackingHistorySummarization {
    /// Creates a module stacking `history_length` observations.
    pub fn new(history_length: usize) -> Self {
        Self {
            history_length,
            history: VecDeque::with_capacity(history_length),
        }
    }

    /// The number of stacked observations.
    pub fn history_length(&self) -> usize {
        self.history_length
    }
}

impl HistorySummarization for StackingHistorySummarization {
    fn summarize(&mut self, observation: &Observation) -> Result<SubjectiveState> {
        if self.history_length == 0 {
            return Ok(Array1::zeros(0));
        }
        if let Some(last) = self.history.back() {
            if last.len() != observation.len() {
                return Err(KestrelError::ObservationDimMismatch {
                    expected: last.len(),
                    actual: observation.len(),
                }
                .into());
            }
        }
        if self.history.len() == self.history_length {
            self.history.pop_front();
        }
        self.history.push_back(observation.clone());

        let zeros = Array1::zeros(observation.len());
        let padding = self.history_length - self.history.len();
        let views = (0..padding)
            .map(|_| zeros.view())
            .chain(self.history.iter().map(|o| o.view()))
            .collect::<Vec<_>>();

        Ok(concatenate(Axis(0), &views)?)
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_identity() -> Result<()> {
        let mut h = IdentityHistorySummarization;
        assert_eq!(h.summarize(&array![1.0, 2.0])?, array![1.0f32, 2.0]);
        Ok(())
    }

    #[test]
    fn test_stacking() -> Result<()> {
        let mut h = StackingHistorySummarization::new(3);
        assert_eq!(
            h.summarize(&array![1.0, 2.0])?,
            array![0.0f32, 0.0, 0.0, 0.0, 1.0, 2.0]
        );
        assert_eq!(
            h.summarize(&array![3.0, 4.0])?,
            array![0.0f32, 0.0, 1.0, 2.0, 3.0, 4.0]
        );
        h.summarize(&array![5.0, 6.0])?;
        assert_eq!(
            h.summarize(&array![7.0, 8.0])?,
            array![3.0f32, 4.0, 5.0, 6.0, 7.0, 8.0]
        );

        h.reset();
        assert_eq!(
            h.summarize(&array![9.0, 9.0])?,
            array![0.0f32, 0.0, 0.0, 0.0, 9.0, 9.0]
        );
        Ok(())
    }

    #[test]
    fn test_stacking_rejects_dimension_change() -> Result<()> {
        let mut h = StackingHistorySummarization::new(2);
        h.summarize(&array![1.0, 2.0])?;
        let err = h.summarize(&array![3.0]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<KestrelError>(),
            Some(&KestrelError::ObservationDimMismatch {
                expected: 2,
                actual: 1
            })
        );

        // A new episode may change the dimension.
        h.reset();
        assert_eq!(h.summarize(&array![3.0])?, array![0.0f32, 3.0]);
        Ok(())
    }
}
