//! Deep Q-learning.
use super::DqnConfig;
use crate::{
    critic::Critic,
    util::{mask_tensor, state_action_features, tensor1, tensor2, tensor3, track, CriticLoss},
};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use kestrel_agent::{
    action_representation::{ActionRepresentation, ActionRepresentationConfig},
    explorer::Explorer,
    AgentError,
};
use kestrel_core::{
    record::{Record, RecordValue},
    replay_buffer::TransitionBatch,
    Action, ActionSpace, PolicyLearner,
};
use log::trace;
use ndarray::{Array1, Array2, ArrayView1};
use rand::{rngs::SmallRng, SeedableRng};
use std::{convert::TryFrom, fs, path::Path};

/// Value given to padded actions before taking the maximum over a set.
const MASKED_VALUE: f32 = -1e30;

/// Maximum over the last axis of `q`, shape `(batch_size, n)`, ignoring entries where
/// `mask`, a `u8` tensor of the same shape, is nonzero.
pub fn masked_max(q: &Tensor, mask: Option<&Tensor>) -> Result<Tensor> {
    let q = match mask {
        Some(mask) => {
            let masked = Tensor::full(MASKED_VALUE, q.dims(), q.device())?;
            mask.where_cond(&masked, q)?
        }
        None => q.clone(),
    };
    Ok(q.max(D::Minus1)?)
}

/// Q-learning with a neural network approximating `Q(s, a)`.
///
/// The network takes the concatenation of a state and the representation of an action
/// and returns a scalar, so that the set of actions may change from step to step. The
/// target of a transition is
///
/// `r + gamma * (1 - done) * max_a' Q_tgt(s', a')`,
///
/// where `a'` ranges over the unmasked rows of `next_available_actions` and `Q_tgt` is a
/// target network tracking the online network with soft updates.
pub struct DeepQLearning {
    qnet: Critic,
    qnet_tgt: Critic,
    action_representation: Box<dyn ActionRepresentation>,
    action_representation_config: ActionRepresentationConfig,
    max_number_actions: Option<usize>,
    explorer: Explorer,
    discount_factor: f64,
    tau: f64,
    soft_update_interval: usize,
    soft_update_counter: usize,
    batch_size: usize,
    training_rounds: usize,
    critic_loss: CriticLoss,
    device: Device,
    n_opts: usize,
    rng: SmallRng,
}

impl DeepQLearning {
    /// Constructs the learner, with a target network equal to the online network.
    pub fn build(config: DqnConfig) -> Result<Self> {
        let device = Device::try_from(config.device)?;
        let qnet = Critic::build(&config.critic_config, &device)?;
        let qnet_tgt = Critic::build(&config.critic_config, &device)?;
        track(qnet_tgt.varmap(), qnet.varmap(), 1.0)?;

        Ok(Self {
            qnet,
            qnet_tgt,
            action_representation: config.action_representation.build(),
            action_representation_config: config.action_representation,
            max_number_actions: config.max_number_actions,
            explorer: config.explorer,
            discount_factor: config.discount_factor,
            tau: config.tau,
            soft_update_interval: config.soft_update_interval,
            soft_update_counter: 0,
            batch_size: config.batch_size,
            training_rounds: config.training_rounds,
            critic_loss: config.critic_loss,
            device,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }

    /// The number of batches learned so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Action values of `actions`, raw actions stacked as rows, at `state`.
    pub fn q_values(&self, state: ArrayView1<f32>, actions: &[Action]) -> Result<Array1<f32>> {
        let action_dim = actions.first().map_or(0, |a| a.len());
        let mut raw = Array2::zeros((actions.len(), action_dim));
        for (mut row, a) in raw.outer_iter_mut().zip(actions.iter()) {
            row.assign(a);
        }
        let actions = self.action_representation.transform(raw.view())?;
        let xs = tensor2(state_action_features(state, actions.view()).view(), &self.device)?;
        let q = self.qnet.forward_features(&xs)?;
        Ok(Array1::from(q.to_vec1::<f32>()?))
    }

    /// Targets of the transitions in a batch, without gradient.
    fn targets(&self, batch: &TransitionBatch) -> Result<Tensor> {
        let next_actions = batch
            .next_available_actions
            .as_ref()
            .ok_or(AgentError::MissingNextAvailableActions)?;
        let (batch_size, n, action_dim) = next_actions.dim();
        let state_dim = batch.next_state.ncols();

        let next_state = tensor2(batch.next_state.view(), &self.device)?
            .unsqueeze(1)?
            .broadcast_as((batch_size, n, state_dim))?
            .contiguous()?;
        let next_actions = tensor3(next_actions, &self.device)?;
        let xs = Tensor::cat(&[&next_state, &next_actions], D::Minus1)?
            .reshape((batch_size * n, state_dim + action_dim))?;
        let q = self
            .qnet_tgt
            .forward_features(&xs)?
            .reshape((batch_size, n))?;

        let mask = match &batch.next_available_actions_mask {
            Some(mask) => Some(mask_tensor(mask, &self.device)?),
            None => None,
        };
        let next_q = masked_max(&q, mask.as_ref())?;

        let reward = tensor1(&batch.reward, &self.device)?;
        let not_done = tensor1(&batch.done, &self.device)?.affine(-1.0, 1.0)?;
        let tgt = (reward + (not_done * next_q)?.affine(self.discount_factor, 0.0)?)?;
        Ok(tgt.detach())
    }

    fn update_critic(&mut self, batch: &TransitionBatch) -> Result<f32> {
        let tgt = self.targets(batch)?;
        let state = tensor2(batch.state.view(), &self.device)?;
        let action = tensor2(batch.action.view(), &self.device)?;
        let pred = self.qnet.forward(&state, &action)?;

        let loss = self.critic_loss.loss(&pred, &tgt)?;
        self.qnet.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    /// Saves the networks in directory `path`.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        fs::create_dir_all(&path)?;
        self.qnet.save(path.as_ref().join("qnet.safetensors"))?;
        self.qnet_tgt
            .save(path.as_ref().join("qnet_tgt.safetensors"))?;
        Ok(())
    }

    /// Loads the networks from directory `path`.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.qnet.load(path.as_ref().join("qnet.safetensors"))?;
        self.qnet_tgt
            .load(path.as_ref().join("qnet_tgt.safetensors"))?;
        Ok(())
    }
}

impl PolicyLearner for DeepQLearning {
    fn act(
        &mut self,
        subjective_state: ArrayView1<f32>,
        available_action_space: &ActionSpace,
        exploit: bool,
    ) -> Result<Action> {
        let space = available_action_space.as_discrete()?;
        let values = self.q_values(subjective_state, space.actions())?;
        let uncertainties = Array1::zeros(values.len());
        let ix = self
            .explorer
            .select(values.view(), uncertainties.view(), exploit, &mut self.rng);
        Ok(space.actions()[ix].clone())
    }

    fn learn_batch(&mut self, batch: &TransitionBatch) -> Result<Record> {
        let loss = self.update_critic(batch)?;

        self.soft_update_counter += 1;
        if self.soft_update_counter >= self.soft_update_interval {
            self.soft_update_counter = 0;
            track(self.qnet_tgt.varmap(), self.qnet.varmap(), self.tau)?;
        }
        self.n_opts += 1;
        trace!("DeepQLearning: n_opts = {}, loss = {}", self.n_opts, loss);

        Ok(Record::from_slice(&[("loss_critic", RecordValue::Scalar(loss))]))
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
        self.max_number_actions
            .or_else(|| self.action_representation_config.max_number_actions())
    }
}
