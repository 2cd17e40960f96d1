//! Online learning of [`Agent`]s.
mod config;
use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env,
};
use anyhow::Result;
pub use config::OnlineLearningConfig;
use log::info;

/// Summary of an episode.
#[derive(Debug, Clone, Default)]
pub struct EpisodeStats {
    /// Sum of rewards.
    pub episode_return: f32,

    /// The number of environment steps.
    pub steps: usize,

    /// Records of the learning steps done during the episode, merged.
    pub record: Record,
}

/// Runs an episode.
///
/// If `learn` is `true`, [`Agent::learn`] is called at the end of the episode when
/// `learn_after_episode` is `true`, or otherwise whenever the number of environment
/// steps since the start of learning, `total_steps` plus the steps of this episode,
/// is a multiple of `learn_every_k_steps`.
pub fn run_episode<A, E>(
    agent: &mut A,
    env: &mut E,
    learn: bool,
    exploit: bool,
    learn_after_episode: bool,
    learn_every_k_steps: usize,
    total_steps: usize,
) -> Result<EpisodeStats>
where
    A: Agent,
    E: Env,
{
    let (observation, available_action_space) = env.reset()?;
    let action_space = env.action_space().clone();
    agent.reset(&observation, &available_action_space, &action_space)?;

    let mut stats = EpisodeStats::default();
    loop {
        let action = agent.act(exploit)?;
        let action_result = env.step(&action)?;
        agent.observe(&action_result)?;
        stats.episode_return += action_result.reward;
        stats.steps += 1;

        if learn
            && !learn_after_episode
            && learn_every_k_steps > 0
            && (total_steps + stats.steps) % learn_every_k_steps == 0
        {
            stats.record = std::mem::take(&mut stats.record).merge(agent.learn()?);
        }

        if action_result.is_done() {
            break;
        }
    }

    if learn && learn_after_episode {
        stats.record = std::mem::take(&mut stats.record).merge(agent.learn()?);
    }

    Ok(stats)
}

/// Runs an episode and returns its return.
///
/// With `learn = true`, the agent learns after every step.
pub fn episode_return<A, E>(agent: &mut A, env: &mut E, learn: bool, exploit: bool) -> Result<f32>
where
    A: Agent,
    E: Env,
{
    Ok(run_episode(agent, env, learn, exploit, false, 1, 0)?.episode_return)
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs episodes of interaction between an agent and an environment, letting the
/// agent learn from its experience.
///
/// # Learning loop
///
/// For each of `number_of_episodes` episodes:
///
/// 1. Reset [`Env`] and give the initial observation and action space to
///    [`Agent::reset`].
/// 2. Repeat until the episode is terminated or truncated:
///     1. Get an action with [`Agent::act`] and apply it with [`Env::step`].
///     2. Give the [`ActionResult`] to [`Agent::observe`], which pushes a transition
///        into the agent's replay buffer.
///     3. Unless `learn_after_episode`, call [`Agent::learn`] every
///        `learn_every_k_steps` environment steps.
/// 3. If `learn_after_episode`, call [`Agent::learn`].
/// 4. Every `record_interval` episodes, log the episode return and write a record
///    with keys `"episode"`, `"episode_return"` and `"steps"`, merged with the
///    records of the learning steps, to the [`Recorder`].
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Action|B[Env]
///     B -->|ActionResult|A
///     A -->|Experience|C[ReplayBuffer]
///     C -->|TransitionBatch|D[PolicyLearner]
///     D -->|Record|E[Recorder]
/// ```
///
/// [`ActionResult`]: crate::ActionResult
pub struct OnlineLearning {
    config: OnlineLearningConfig,
}

impl OnlineLearning {
    /// Constructs the driver.
    pub fn build(config: OnlineLearningConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &OnlineLearningConfig {
        &self.config
    }

    /// Runs the learning loop and returns the return of each episode.
    pub fn run<A, E>(
        &self,
        agent: &mut A,
        env: &mut E,
        recorder: &mut dyn Recorder,
    ) -> Result<Vec<f32>>
    where
        A: Agent,
        E: Env,
    {
        let mut returns = Vec::with_capacity(self.config.number_of_episodes);
        let mut total_steps = 0;

        for episode in 1..=self.config.number_of_episodes {
            let stats = run_episode(
                agent,
                env,
                true,
                false,
                self.config.learn_after_episode,
                self.config.learn_every_k_steps,
                total_steps,
            )?;
            total_steps += stats.steps;
            returns.push(stats.episode_return);

            if self.config.record_interval > 0 && episode % self.config.record_interval == 0 {
                info!(
                    "episode {}, return = {}, steps = {}",
                    episode, stats.episode_return, stats.steps
                );
                let mut record = stats.record;
                record.insert("episode", Scalar(episode as f32));
                record.insert("episode_return", Scalar(stats.episode_return));
                record.insert("steps", Scalar(stats.steps as f32));
                recorder.write(record);
            }
        }

        Ok(returns)
    }
}
