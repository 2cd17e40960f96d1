//! Soft actor-critic.
use super::{Actor, EntCoef, SacConfig};
use crate::{
    critic::Critic,
    util::{tensor1, tensor2, track, CriticLoss},
};
use anyhow::{ensure, Result};
use candle_core::{Device, Tensor, D};
use kestrel_agent::AgentError;
use kestrel_core::{
    record::{Record, RecordValue},
    replay_buffer::TransitionBatch,
    Action, ActionSpace, KestrelError, PolicyLearner,
};
use log::trace;
use ndarray::{Array1, ArrayView1};
use std::{convert::TryFrom, fs, path::Path};

/// Log density of the standard normal distribution, summed over the last axis.
fn normal_logp(x: &Tensor) -> Result<Tensor> {
    let c = -0.5 * (2.0 * std::f64::consts::PI).ln();
    Ok(x.sqr()?.affine(-0.5, c)?.sum(D::Minus1)?)
}

/// Minimum of action values over critics, shape `(batch_size,)`.
fn q_min(critics: &[Critic], state: &Tensor, action: &Tensor) -> Result<Tensor> {
    let qs = critics
        .iter()
        .map(|critic| critic.forward(state, action))
        .collect::<Result<Vec<_>>>()?;
    Ok(Tensor::stack(&qs, 0)?.min(0)?)
}

/// Soft actor-critic with a tanh-squashed Gaussian policy.
///
/// Actions are sampled as `tanh(mean + std * z)` and then mapped affinely onto the box
/// of the configuration; critics see actions in that box. Each learning step updates
/// the critics towards
///
/// `r + gamma * (1 - done) * (min_i Q_tgt_i(s', a') - alpha * log pi(a' | s'))`,
///
/// then the actor, then the entropy coefficient, then the target critics.
pub struct SoftActorCritic {
    actor: Actor,
    critics: Vec<Critic>,
    critics_tgt: Vec<Critic>,
    ent_coef: EntCoef,
    action_dim: usize,
    action_scale: Tensor,
    action_bias: Tensor,
    discount_factor: f64,
    tau: f64,
    batch_size: usize,
    training_rounds: usize,
    epsilon: f64,
    min_lstd: f64,
    max_lstd: f64,
    critic_loss: CriticLoss,
    device: Device,
    n_opts: usize,
}

impl SoftActorCritic {
    /// Constructs the learner, with target critics equal to the critics.
    pub fn build(config: SacConfig) -> Result<Self> {
        let action_dim = config.action_low.len();
        if config.action_high.len() != action_dim {
            return Err(KestrelError::InconsistentActionDim {
                expected: action_dim,
                actual: config.action_high.len(),
            }
            .into());
        }
        ensure!(config.n_critics > 0, "SAC needs at least one critic");

        let device = Device::try_from(config.device)?;
        let actor = Actor::build(&config.actor_config, &device)?;
        let mut critics = vec![];
        let mut critics_tgt = vec![];
        for _ in 0..config.n_critics {
            let critic = Critic::build(&config.critic_config, &device)?;
            let critic_tgt = Critic::build(&config.critic_config, &device)?;
            track(critic_tgt.varmap(), critic.varmap(), 1.0)?;
            critics.push(critic);
            critics_tgt.push(critic_tgt);
        }
        let ent_coef = EntCoef::new(&config.ent_coef_mode, &device)?;

        let (scale, bias): (Vec<f32>, Vec<f32>) = config
            .action_low
            .iter()
            .zip(config.action_high.iter())
            .map(|(&lo, &hi)| ((hi - lo) / 2.0, (hi + lo) / 2.0))
            .unzip();
        let action_scale = Tensor::from_vec(scale, (action_dim,), &device)?;
        let action_bias = Tensor::from_vec(bias, (action_dim,), &device)?;

        Ok(Self {
            actor,
            critics,
            critics_tgt,
            ent_coef,
            action_dim,
            action_scale,
            action_bias,
            discount_factor: config.discount_factor,
            tau: config.tau,
            batch_size: config.batch_size,
            training_rounds: config.training_rounds,
            epsilon: config.epsilon,
            min_lstd: config.min_lstd,
            max_lstd: config.max_lstd,
            critic_loss: config.critic_loss,
            device,
            n_opts: 0,
        })
    }

    /// The number of batches learned so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// The current entropy coefficient.
    pub fn entropy_coef(&self) -> Result<f32> {
        self.ent_coef.value()
    }

    /// Minimum over critics of the value of `action` at `state`.
    pub fn q_value(&self, state: ArrayView1<f32>, action: ArrayView1<f32>) -> Result<f32> {
        let state = tensor1(&state.to_owned(), &self.device)?.unsqueeze(0)?;
        let action = tensor1(&action.to_owned(), &self.device)?.unsqueeze(0)?;
        let q = q_min(&self.critics, &state, &action)?;
        Ok(q.to_vec1::<f32>()?[0])
    }

    fn to_box(&self, a: &Tensor) -> Result<Tensor> {
        Ok(a
            .broadcast_mul(&self.action_scale)?
            .broadcast_add(&self.action_bias)?)
    }

    /// Samples actions in the box and their log probabilities, `(batch_size,)`.
    fn action_logp(&self, state: &Tensor) -> Result<(Tensor, Tensor)> {
        let (mean, lstd) = self.actor.forward(state)?;
        let lstd = lstd.clamp(self.min_lstd, self.max_lstd)?;
        let z = Tensor::randn(0f32, 1f32, mean.dims(), &self.device)?;
        let a = ((lstd.exp()? * &z)? + &mean)?.tanh()?;

        // Change of variables through tanh and the affine map onto the box.
        let correction = a
            .sqr()?
            .affine(-1.0, 1.0)?
            .broadcast_mul(&self.action_scale)?
            .affine(1.0, self.epsilon)?
            .log()?
            .sum(D::Minus1)?;
        let logp = ((normal_logp(&z)? - lstd.sum(D::Minus1)?)? - correction)?;

        Ok((self.to_box(&a)?, logp))
    }

    fn update_critic(&mut self, batch: &TransitionBatch) -> Result<f32> {
        let state = tensor2(batch.state.view(), &self.device)?;
        let action = tensor2(batch.action.view(), &self.device)?;
        let next_state = tensor2(batch.next_state.view(), &self.device)?;

        let tgt = {
            let (next_a, next_logp) = self.action_logp(&next_state)?;
            let next_q = q_min(&self.critics_tgt, &next_state, &next_a)?;
            let alpha = self.ent_coef.alpha()?;
            let next_v = (next_q - alpha.broadcast_mul(&next_logp)?)?;
            let reward = tensor1(&batch.reward, &self.device)?;
            let not_done = tensor1(&batch.done, &self.device)?.affine(-1.0, 1.0)?;
            (reward + (not_done * next_v)?.affine(self.discount_factor, 0.0)?)?.detach()
        };

        let mut loss_sum = 0f32;
        for critic in self.critics.iter_mut() {
            let pred = critic.forward(&state, &action)?;
            let loss = self.critic_loss.loss(&pred, &tgt)?;
            critic.backward_step(&loss)?;
            loss_sum += loss.to_scalar::<f32>()?;
        }
        Ok(loss_sum / self.critics.len() as f32)
    }

    fn update_actor(&mut self, state: &Tensor) -> Result<f32> {
        let (a, logp) = self.action_logp(state)?;
        let q = q_min(&self.critics, state, &a)?;
        let alpha = self.ent_coef.alpha()?;
        let loss = (alpha.broadcast_mul(&logp)? - q)?.mean_all()?;
        self.actor.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    fn update_ent_coef(&mut self, state: &Tensor) -> Result<()> {
        let (_, logp) = self.action_logp(state)?;
        self.ent_coef.update(&logp)
    }

    fn soft_update(&self) -> Result<()> {
        for (critic_tgt, critic) in self.critics_tgt.iter().zip(self.critics.iter()) {
            track(critic_tgt.varmap(), critic.varmap(), self.tau)?;
        }
        Ok(())
    }

    /// Saves the networks in directory `path`.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let dir = path.as_ref();
        fs::create_dir_all(dir)?;
        for (i, critic) in self.critics.iter().enumerate() {
            critic.save(dir.join(format!("critic_{}.safetensors", i)))?;
        }
        for (i, critic_tgt) in self.critics_tgt.iter().enumerate() {
            critic_tgt.save(dir.join(format!("critic_tgt_{}.safetensors", i)))?;
        }
        self.actor.save(dir.join("actor.safetensors"))?;
        self.ent_coef.save(dir.join("ent_coef.safetensors"))?;
        Ok(())
    }

    /// Loads the networks from directory `path`.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        let dir = path.as_ref();
        for (i, critic) in self.critics.iter_mut().enumerate() {
            critic.load(dir.join(format!("critic_{}.safetensors", i)))?;
        }
        for (i, critic_tgt) in self.critics_tgt.iter_mut().enumerate() {
            critic_tgt.load(dir.join(format!("critic_tgt_{}.safetensors", i)))?;
        }
        self.actor.load(dir.join("actor.safetensors"))?;
        self.ent_coef.load(dir.join("ent_coef.safetensors"))?;
        Ok(())
    }
}

impl PolicyLearner for SoftActorCritic {
    fn act(
        &mut self,
        subjective_state: ArrayView1<f32>,
        available_action_space: &ActionSpace,
        exploit: bool,
    ) -> Result<Action> {
        let space = match available_action_space {
            ActionSpace::Continuous(space) => space,
            ActionSpace::Discrete(_) => {
                return Err(AgentError::ContinuousActionSpaceRequired.into())
            }
        };
        if space.action_dim() != self.action_dim {
            return Err(KestrelError::InconsistentActionDim {
                expected: self.action_dim,
                actual: space.action_dim(),
            }
            .into());
        }

        let state = tensor1(&subjective_state.to_owned(), &self.device)?.unsqueeze(0)?;
        let a = if exploit {
            let (mean, _) = self.actor.forward(&state)?;
            self.to_box(&mean.tanh()?)?
        } else {
            self.action_logp(&state)?.0
        };
        Ok(Array1::from(a.squeeze(0)?.to_vec1::<f32>()?))
    }

    fn learn_batch(&mut self, batch: &TransitionBatch) -> Result<Record> {
        let loss_critic = self.update_critic(batch)?;
        let state = tensor2(batch.state.view(), &self.device)?;
        let loss_actor = self.update_actor(&state)?;
        self.update_ent_coef(&state)?;
        self.soft_update()?;

        self.n_opts += 1;
        let ent_coef = self.ent_coef.value()?;
        trace!(
            "SoftActorCritic: n_opts = {}, loss_critic = {}, loss_actor = {}",
            self.n_opts,
            loss_critic,
            loss_actor
        );

        Ok(Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(loss_critic)),
            ("loss_actor", RecordValue::Scalar(loss_actor)),
            ("ent_coef", RecordValue::Scalar(ent_coef)),
        ]))
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn training_rounds(&self) -> usize {
        self.training_rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{opt::OptimizerConfig, sac::EntCoefMode};
    use kestrel_core::{
        replay_buffer::{Experience, Transition},
        BoxActionSpace, DiscreteActionSpace,
    };
    use ndarray::array;
    use tempdir::TempDir;

    fn config() -> SacConfig {
        SacConfig::new(2, vec![0.0, -2.0], vec![1.0, 2.0], vec![16, 16])
    }

    fn space() -> Result<ActionSpace> {
        Ok(BoxActionSpace::new(array![0.0, -2.0], array![1.0, 2.0])?.into())
    }

    fn batch(reward: f32, done: bool) -> Result<TransitionBatch> {
        let trs = [
            array![0.5f32, -0.5],
            array![0.1f32, 0.3],
            array![-0.2f32, 0.8],
        ]
        .iter()
        .map(|s| {
            let exp = Experience::new(s.clone(), array![0.5, 1.0], reward, s.clone(), done);
            Transition::without_available_actions(exp)
        })
        .collect::<Vec<_>>();
        TransitionBatch::from_transitions(&trs.iter().collect::<Vec<_>>())
    }

    #[test]
    fn test_act_within_bounds() -> Result<()> {
        let mut learner = SoftActorCritic::build(config())?;
        let space = space()?;
        for exploit in [false, true].iter() {
            for _ in 0..50 {
                let a = learner.act(array![0.3f32, -0.7].view(), &space, *exploit)?;
                assert_eq!(a.len(), 2);
                assert!((0.0..=1.0).contains(&a[0]), "a = {}", a);
                assert!((-2.0..=2.0).contains(&a[1]), "a = {}", a);
            }
        }
        Ok(())
    }

    #[test]
    fn test_act_rejects_other_action_spaces() -> Result<()> {
        let mut learner = SoftActorCritic::build(config())?;

        let discrete: ActionSpace = DiscreteActionSpace::with_n(3)?.into();
        let err = learner
            .act(array![0.3f32, -0.7].view(), &discrete, false)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<AgentError>(),
            Some(&AgentError::ContinuousActionSpaceRequired)
        );

        let wide: ActionSpace = BoxActionSpace::new(array![0.0], array![1.0])?.into();
        let err = learner
            .act(array![0.3f32, -0.7].view(), &wide, false)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<KestrelError>(),
            Some(&KestrelError::InconsistentActionDim {
                expected: 2,
                actual: 1
            })
        );
        Ok(())
    }

    #[test]
    fn test_learn_batch_record() -> Result<()> {
        let mut learner = SoftActorCritic::build(config().batch_size(3))?;
        let record = learner.learn_batch(&batch(0.5, false)?)?;
        assert_eq!(learner.n_opts(), 1);
        assert!(record.get_scalar("loss_critic")?.is_finite());
        assert!(record.get_scalar("loss_actor")?.is_finite());
        assert!(record.get_scalar("ent_coef")? > 0.0);
        Ok(())
    }

    #[test]
    fn test_fixed_entropy_coefficient() -> Result<()> {
        let mut learner = SoftActorCritic::build(config().ent_coef_mode(EntCoefMode::Fix(0.2)))?;
        let b = batch(0.5, false)?;
        for _ in 0..5 {
            let record = learner.learn_batch(&b)?;
            assert!((record.get_scalar("ent_coef")? - 0.2).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_critic_fits_terminal_reward() -> Result<()> {
        let mut learner = SoftActorCritic::build(
            config().critic_opt_config(OptimizerConfig::Adam { lr: 1e-2 }),
        )?;
        let b = batch(1.0, true)?;
        for _ in 0..300 {
            learner.learn_batch(&b)?;
        }

        let q = learner.q_value(array![0.1f32, 0.3].view(), array![0.5f32, 1.0].view())?;
        assert!((q - 1.0).abs() < 0.1, "q = {}", q);
        Ok(())
    }

    #[test]
    fn test_invalid_bounds() {
        let config = SacConfig {
            action_high: vec![1.0],
            ..config()
        };
        assert!(SoftActorCritic::build(config).is_err());
    }

    #[test]
    fn test_save_load() -> Result<()> {
        let mut saved = SoftActorCritic::build(config())?;
        saved.learn_batch(&batch(0.5, false)?)?;
        let mut loaded = SoftActorCritic::build(config())?;

        let dir = TempDir::new("sac")?;
        saved.save(dir.path())?;
        loaded.load(dir.path())?;

        let (s, a) = (array![0.1f32, 0.3], array![0.5f32, 1.0]);
        assert_eq!(saved.q_value(s.view(), a.view())?, loaded.q_value(s.view(), a.view())?);

        let space = space()?;
        assert_eq!(
            saved.act(s.view(), &space, true)?,
            loaded.act(s.view(), &space, true)?
        );
        assert_eq!(saved.entropy_coef()?, loaded.entropy_coef()?);
        Ok(())
    }
}
