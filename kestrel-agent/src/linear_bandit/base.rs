//! Linear contextual bandit.
use super::{LinearBanditConfig, LinearRegression};
use crate::{
    action_representation::{ActionRepresentation, ActionRepresentationConfig},
    explorer::Explorer,
};
use anyhow::Result;
use kestrel_core::{
    record::{Record, RecordValue},
    replay_buffer::TransitionBatch,
    Action, ActionSpace, PolicyLearner,
};
use log::trace;
use ndarray::{concatenate, Array1, Array2, ArrayView1, Axis};
use rand::{rngs::SmallRng, SeedableRng};

/// Contextual bandit modeling the expected reward as a linear function of features.
///
/// The features of a state-action pair are the subjective state followed by the
/// representation of the action. With [`Explorer::Ucb`], an action maximizes
/// `theta^T x + alpha * sqrt(x^T A^-1 x)` (LinUCB).
///
/// Batches are expected to be sampled from a replay buffer storing bandit feedback,
/// i.e., only `state`, `action` and `reward` (and `weight` if present) are used.
pub struct LinearBandit {
    regression: LinearRegression,
    explorer: Explorer,
    action_representation_config: ActionRepresentationConfig,
    action_representation: Box<dyn ActionRepresentation>,
    batch_size: usize,
    training_rounds: usize,
    rng: SmallRng,
}

impl LinearBandit {
    /// Constructs the learner.
    pub fn build(config: LinearBanditConfig) -> Self {
        Self {
            regression: LinearRegression::new(config.feature_dim, config.l2_reg_lambda),
            explorer: config.explorer,
            action_representation: config.action_representation.build(),
            action_representation_config: config.action_representation,
            batch_size: config.batch_size,
            training_rounds: config.training_rounds,
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    /// The underlying regression model.
    pub fn regression(&self) -> &LinearRegression {
        &self.regression
    }

    fn features(&self, state: ArrayView1<f32>, actions: &[Action]) -> Result<Array2<f32>> {
        let action_dim = actions.first().map_or(0, |a| a.len());
        let mut raw = Array2::zeros((actions.len(), action_dim));
        for (mut row, a) in raw.outer_iter_mut().zip(actions.iter()) {
            row.assign(a);
        }
        let actions = self.action_representation.transform(raw.view())?;
        let states = state
            .broadcast((actions.nrows(), state.len()))
            .map(|s| s.to_owned())
            .unwrap_or_else(|| Array2::zeros((actions.nrows(), state.len())));
        Ok(concatenate(Axis(1), &[states.view(), actions.view()])?)
    }

    /// Expected rewards and their uncertainties for `actions` at `state`.
    pub fn scores(
        &self,
        state: ArrayView1<f32>,
        actions: &[Action],
    ) -> Result<(Array1<f32>, Array1<f32>)> {
        let features = self.features(state, actions)?;
        let values = features
            .outer_iter()
            .map(|x| self.regression.predict(x))
            .collect::<Result<Array1<f32>>>()?;
        let uncertainties = features
            .outer_iter()
            .map(|x| self.regression.uncertainty(x))
            .collect::<Result<Array1<f32>>>()?;
        Ok((values, uncertainties))
    }
}

impl PolicyLearner for LinearBandit {
    fn act(
        &mut self,
        subjective_state: ArrayView1<f32>,
        available_action_space: &ActionSpace,
        exploit: bool,
    ) -> Result<Action> {
        let space = available_action_space.as_discrete()?;
        let (values, uncertainties) = self.scores(subjective_state, space.actions())?;
        let ix = self
            .explorer
            .select(values.view(), uncertainties.view(), exploit, &mut self.rng);
        Ok(space.actions()[ix].clone())
    }

    fn learn_batch(&mut self, batch: &TransitionBatch) -> Result<Record> {
        let x = concatenate(Axis(1), &[batch.state.view(), batch.action.view()])?;

        let mse = x
            .outer_iter()
            .zip(batch.reward.iter())
            .map(|(xi, &y)| Ok((self.regression.predict(xi)? - y).powi(2)))
            .sum::<Result<f32>>()?
            / batch.len() as f32;

        self.regression.update(
            x.view(),
            batch.reward.view(),
            batch.weight.as_ref().map(|w| w.view()),
        )?;
        trace!("LinearBandit: mse before update {}", mse);

        Ok(Record::from_slice(&[("mse", RecordValue::Scalar(mse))]))
    }

    fn preprocess_batch(&self, batch: TransitionBatch) -> Result<TransitionBatch> {
        self.action_representation.transform_batch(batch)
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn training_rounds(&self) -> usize {
        self.training_rounds
    }

    fn max_number_actions(&self) -> Option<usize> {
        self.action_representation_config.max_number_actions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentError;
    use kestrel_core::{
        replay_buffer::{Experience, Transition},
        DiscreteActionSpace,
    };
    use ndarray::array;

    fn one_hot_bandit(alpha: f32) -> LinearBandit {
        LinearBandit::build(
            LinearBanditConfig::default()
                .feature_dim(4)
                .explorer(Explorer::Ucb { alpha })
                .action_representation(ActionRepresentationConfig::OneHot {
                    max_number_actions: 3,
                })
                .batch_size(1),
        )
    }

    fn batch(action: f32, reward: f32) -> Result<TransitionBatch> {
        let tr = Transition::without_available_actions(Experience::new(
            array![1.0],
            array![action],
            reward,
            array![1.0],
            true,
        ));
        TransitionBatch::from_transitions(&[&tr])
    }

    #[test]
    fn test_learns_best_arm() -> Result<()> {
        let mut bandit = one_hot_bandit(0.0);
        let space: ActionSpace = DiscreteActionSpace::with_n(3)?.into();

        for _ in 0..5 {
            for (a, r) in [(0.0, 0.0), (1.0, 1.0), (2.0, 3.0)].iter() {
                let b = bandit.preprocess_batch(batch(*a, *r)?)?;
                bandit.learn_batch(&b)?;
            }
        }

        let (values, _) = bandit.scores(array![1.0f32].view(), space.as_discrete()?.actions())?;
        assert!(values[2] > values[1] && values[1] > values[0]);
        assert_eq!(bandit.act(array![1.0f32].view(), &space, true)?, array![2.0f32]);
        Ok(())
    }

    #[test]
    fn test_ucb_prefers_untried_arm() -> Result<()> {
        let mut bandit = one_hot_bandit(10.0);
        let space: ActionSpace = DiscreteActionSpace::with_n(3)?.into();

        for _ in 0..10 {
            for (a, r) in [(0.0, 1.0), (1.0, 1.0)].iter() {
                let b = bandit.preprocess_batch(batch(*a, *r)?)?;
                bandit.learn_batch(&b)?;
            }
        }

        let (_, uncertainties) =
            bandit.scores(array![1.0f32].view(), space.as_discrete()?.actions())?;
        assert!(uncertainties[2] > uncertainties[0]);
        assert_eq!(bandit.act(array![1.0f32].view(), &space, false)?, array![2.0f32]);
        Ok(())
    }

    #[test]
    fn test_feature_dim_mismatch() -> Result<()> {
        let mut bandit = LinearBandit::build(LinearBanditConfig::default().feature_dim(3));
        let b = batch(0.0, 1.0)?;
        let err = bandit.learn_batch(&b).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AgentError>(),
            Some(&AgentError::FeatureDimMismatch {
                expected: 3,
                actual: 2
            })
        );
        Ok(())
    }

    #[test]
    fn test_max_number_actions() {
        assert_eq!(one_hot_bandit(1.0).max_number_actions(), Some(3));
        assert_eq!(
            LinearBandit::build(LinearBanditConfig::default()).max_number_actions(),
            None
        );
    }
}
