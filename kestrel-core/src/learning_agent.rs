//! Agent composed of a policy learner, a history summarization module and a replay buffer.
use crate::{
    error::KestrelError,
    record::Record,
    replay_buffer::{Experience, TransitionBatch},
    Action, ActionResult, ActionSpace, Agent, ExperienceBufferBase, HistorySummarization,
    Observation, PolicyLearner, ReplayBufferBase, SubjectiveState,
};
use anyhow::Result;

/// An [`Agent`] learning from its own experience.
///
/// Observations are summarized into subjective states by `H`, which are the inputs of
/// the policy learner `P`. Each observed step is pushed to the replay buffer `R` as an
/// [`Experience`], whose available-action sets are padded to
/// [`PolicyLearner::max_number_actions`] or, if the learner does not specify it, to the
/// cardinality of the full action space given at the beginning of the episode.
pub struct LearningAgent<P, H, R> {
    policy_learner: P,
    history_summarization: H,
    replay_buffer: R,
    subjective_state: Option<SubjectiveState>,
    latest_action: Option<Action>,
    available_action_space: Option<ActionSpace>,
    episode_action_space: Option<ActionSpace>,
}

impl<P, H, R> LearningAgent<P, H, R>
where
    P: PolicyLearner,
    H: HistorySummarization,
    R: ExperienceBufferBase<Item = Experience> + ReplayBufferBase<Batch = TransitionBatch>,
{
    /// Creates an agent.
    pub fn new(policy_learner: P, history_summarization: H, replay_buffer: R) -> Self {
        Self {
            policy_learner,
            history_summarization,
            replay_buffer,
            subjective_state: None,
            latest_action: None,
            available_action_space: None,
            episode_action_space: None,
        }
    }

    /// The policy learner.
    pub fn policy_learner(&self) -> &P {
        &self.policy_learner
    }

    /// The policy learner.
    pub fn policy_learner_mut(&mut self) -> &mut P {
        &mut self.policy_learner
    }

    /// The history summarization module.
    pub fn history_summarization(&self) -> &H {
        &self.history_summarization
    }

    /// The replay buffer.
    pub fn replay_buffer(&self) -> &R {
        &self.replay_buffer
    }

    /// The replay buffer.
    pub fn replay_buffer_mut(&mut self) -> &mut R {
        &mut self.replay_buffer
    }

    /// The current subjective state, `None` before the first reset.
    pub fn subjective_state(&self) -> Option<&SubjectiveState> {
        self.subjective_state.as_ref()
    }

    fn make_experience(
        &self,
        state: SubjectiveState,
        action: Action,
        next_state: SubjectiveState,
        action_result: &ActionResult,
        curr_space: &ActionSpace,
        next_space: &ActionSpace,
    ) -> Experience {
        let mut exp = Experience::new(
            state,
            action,
            action_result.reward,
            next_state,
            action_result.is_done(),
        );
        if let ActionSpace::Discrete(space) = curr_space {
            exp = exp.curr_available_actions(space.clone());
        }
        if let ActionSpace::Discrete(space) = next_space {
            exp = exp.next_available_actions(space.clone());
        }
        if let Some(n) = self.policy_learner.max_number_actions() {
            exp = exp.max_number_actions(n);
        }
        if let Some(space) = &self.episode_action_space {
            exp = exp.action_space(space.clone());
        }
        exp
    }
}

impl<P, H, R> Agent for LearningAgent<P, H, R>
where
    P: PolicyLearner,
    H: HistorySummarization,
    R: ExperienceBufferBase<Item = Experience> + ReplayBufferBase<Batch = TransitionBatch>,
{
    fn act(&mut self, exploit: bool) -> Result<Action> {
        let (state, space) = match (&self.subjective_state, &self.available_action_space) {
            (Some(state), Some(space)) => (state, space),
            _ => return Err(KestrelError::AgentNotReset.into()),
        };
        let action = self.policy_learner.act(state.view(), space, exploit)?;
        self.latest_action = Some(action.clone());
        Ok(action)
    }

    fn observe(&mut self, action_result: &ActionResult) -> Result<()> {
        let (state, action, curr_space) = match (
            &self.subjective_state,
            &self.latest_action,
            &self.available_action_space,
        ) {
            (Some(state), Some(action), Some(space)) => {
                (state.clone(), action.clone(), space.clone())
            }
            _ => return Err(KestrelError::AgentNotReset.into()),
        };

        let next_state = self
            .history_summarization
            .summarize(&action_result.observation)?;
        let next_space = action_result
            .available_action_space
            .clone()
            .unwrap_or_else(|| curr_space.clone());

        let exp = self.make_experience(
            state,
            action,
            next_state.clone(),
            action_result,
            &curr_space,
            &next_space,
        );
        self.replay_buffer.push(exp)?;
        self.latest_action = None;

        self.subjective_state = Some(next_state);
        self.available_action_space = Some(next_space);
        Ok(())
    }

    fn learn(&mut self) -> Result<Record> {
        let record = self.policy_learner.learn(&mut self.replay_buffer)?;
        if self.policy_learner.on_policy() {
            self.replay_buffer.clear();
        }
        Ok(record)
    }

    fn reset(
        &mut self,
        observation: &Observation,
        available_action_space: &ActionSpace,
        action_space: &ActionSpace,
    ) -> Result<()> {
        self.history_summarization.reset();
        self.subjective_state = Some(self.history_summarization.summarize(observation)?);
        self.latest_action = None;
        self.available_action_space = Some(available_action_space.clone());
        self.episode_action_space = Some(action_space.clone());
        Ok(())
    }
}
