//! Tabular Q-learning.
use super::TabularQLearningConfig;
use crate::{explorer::Explorer, AgentError};
use anyhow::Result;
use kestrel_core::{
    record::{Record, RecordValue},
    replay_buffer::TransitionBatch,
    Action, ActionSpace, PolicyLearner,
};
use log::trace;
use ndarray::{Array1, ArrayView1};
use ordered_float::OrderedFloat;
use rand::{rngs::SmallRng, SeedableRng};
use std::collections::HashMap;

type Key = Vec<OrderedFloat<f32>>;

fn key(x: ArrayView1<f32>) -> Key {
    x.iter().map(|&v| OrderedFloat(v)).collect()
}

/// Q-learning with a table of action values indexed by raw states and actions.
///
/// Action values not in the table are zero. Each transition `(s, a, r, s', done)` of a
/// batch updates the table as
///
/// `Q(s, a) += lr * (r + gamma * (1 - done) * max_a' Q(s', a') - Q(s, a))`,
///
/// where `a'` ranges over the actions available at `s'`, i.e., the rows of
/// `next_available_actions` not masked out. Batches must thus carry available actions.
pub struct TabularQLearning {
    learning_rate: f32,
    discount_factor: f32,
    explorer: Explorer,
    batch_size: usize,
    training_rounds: usize,
    max_number_actions: Option<usize>,
    q_values: HashMap<(Key, Key), f32>,
    rng: SmallRng,
}

impl TabularQLearning {
    /// Constructs the learner.
    pub fn build(config: TabularQLearningConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            explorer: config.explorer,
            batch_size: config.batch_size,
            training_rounds: config.training_rounds,
            max_number_actions: config.max_number_actions,
            q_values: HashMap::new(),
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    /// Returns the action value, zero for unseen pairs.
    pub fn q_value(&self, state: ArrayView1<f32>, action: ArrayView1<f32>) -> f32 {
        self.q_values
            .get(&(key(state), key(action)))
            .copied()
            .unwrap_or(0.0)
    }

    /// The number of state-action pairs in the table.
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    /// Returns `true` if no pair has been updated.
    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }

    /// Maximum action value at `state` over the unmasked next available actions of
    /// the `i`-th transition in `batch`.
    fn max_q_value(
        &self,
        state: ArrayView1<f32>,
        batch: &TransitionBatch,
        i: usize,
    ) -> Result<f32> {
        let actions = batch
            .next_available_actions
            .as_ref()
            .ok_or(AgentError::MissingNextAvailableActions)?;
        let actions = actions.index_axis(ndarray::Axis(0), i);
        let mask = batch
            .next_available_actions_mask
            .as_ref()
            .map(|m| m.row(i).to_owned());

        let max = actions
            .outer_iter()
            .enumerate()
            .filter(|(j, _)| mask.as_ref().map_or(true, |m| !m[*j]))
            .map(|(_, a)| self.q_value(state, a))
            .fold(f32::NEG_INFINITY, f32::max);

        Ok(if max.is_finite() { max } else { 0.0 })
    }
}

impl PolicyLearner for TabularQLearning {
    fn act(
        &mut self,
        subjective_state: ArrayView1<f32>,
        available_action_space: &ActionSpace,
        exploit: bool,
    ) -> Result<Action> {
        let space = available_action_space.as_discrete()?;
        let values = space
            .actions()
            .iter()
            .map(|a| self.q_value(subjective_state, a.view()))
            .collect::<Array1<f32>>();
        let uncertainties = Array1::zeros(values.len());
        let ix = self
            .explorer
            .select(values.view(), uncertainties.view(), exploit, &mut self.rng);
        Ok(space.actions()[ix].clone())
    }

    fn learn_batch(&mut self, batch: &TransitionBatch) -> Result<Record> {
        let mut sum_abs_td_error = 0.0;

        for i in 0..batch.len() {
            let state = batch.state.row(i);
            let action = batch.action.row(i);
            let next_state = batch.next_state.row(i);

            let next_value = self.max_q_value(next_state, batch, i)?;
            let target =
                batch.reward[i] + self.discount_factor * (1.0 - batch.done[i]) * next_value;
            let q = self.q_value(state, action);
            let td_error = target - q;
            self.q_values
                .insert((key(state), key(action)), q + self.learning_rate * td_error);
            sum_abs_td_error += td_error.abs();
        }

        trace!("TabularQLearning: {} entries", self.q_values.len());
        Ok(Record::from_slice(&[(
            "td_error",
            RecordValue::Scalar(sum_abs_td_error / batch.len() as f32),
        )]))
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn training_rounds(&self) -> usize {
        self.training_rounds
    }

    fn max_number_actions(&self) -> Option<usize> {
        self.max_number_actions
    }
}
