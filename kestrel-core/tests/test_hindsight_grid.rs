use anyhow::Result;
use kestrel_core::{
    env::{GoalGridEnv, GoalGridEnvConfig},
    history_summarization::IdentityHistorySummarization,
    record::{NullRecorder, Record},
    replay_buffer::{
        FifoReplayBufferConfig, HindsightReplayBuffer, HindsightReplayBufferConfig,
        TransitionBatch,
    },
    Action, ActionSpace, Env, ExperienceBufferBase, LearningAgent, OnlineLearning,
    OnlineLearningConfig, PolicyLearner,
};
use ndarray::{s, ArrayView1};
use rand::{rngs::SmallRng, SeedableRng};

const GOAL_DIM: usize = 2;

/// Acts uniformly at random and never updates.
struct RandomLearner {
    rng: SmallRng,
}

impl PolicyLearner for RandomLearner {
    fn act(
        &mut self,
        _subjective_state: ArrayView1<f32>,
        available_action_space: &ActionSpace,
        _exploit: bool,
    ) -> Result<Action> {
        Ok(available_action_space.sample(&mut self.rng))
    }

    fn learn_batch(&mut self, batch: &TransitionBatch) -> Result<Record> {
        // Relabeled and original transitions keep the goal of state and next state equal.
        for (s, s_next) in batch.state.outer_iter().zip(batch.next_state.outer_iter()) {
            assert_eq!(s.slice(s![GOAL_DIM..]), s_next.slice(s![GOAL_DIM..]));
        }
        Ok(Record::from_scalar("batch_size", batch.len() as f32))
    }

    fn batch_size(&self) -> usize {
        8
    }
}

#[test]
fn test_hindsight_buffer_with_goal_grid() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut env = GoalGridEnv::build(&GoalGridEnvConfig::default().max_steps(10), 42)?;
    let config = HindsightReplayBufferConfig::default()
        .fifo_config(FifoReplayBufferConfig::default().capacity(100_000))
        .goal_dim(GOAL_DIM);
    let buffer = HindsightReplayBuffer::build(&config, Some(env.reward_fn()))?;
    let learner = RandomLearner {
        rng: SmallRng::seed_from_u64(0),
    };
    let mut agent = LearningAgent::new(learner, IdentityHistorySummarization, buffer);

    let driver = OnlineLearning::build(OnlineLearningConfig::default().number_of_episodes(20));
    let returns = driver.run(&mut agent, &mut env, &mut NullRecorder::default())?;
    assert_eq!(returns.len(), 20);

    // Each step costs -1 except the one reaching the goal.
    let buffer = agent.replay_buffer();
    let total_steps = buffer.inner().total_pushed() / 2;
    assert_eq!(buffer.trajectory_len(), 0);
    assert_eq!(buffer.len(), 2 * total_steps);
    assert!(returns.iter().all(|&r| r <= 0.0 && r >= -10.0));

    // The relabeled copy of the last step of every episode reaches its substituted goal.
    let transitions = buffer.inner().iter().collect::<Vec<_>>();
    let n_done_relabeled = transitions
        .chunks(2)
        .filter(|pair| pair[1].done)
        .filter(|pair| pair[1].reward == 0.0)
        .count();
    assert_eq!(n_done_relabeled, 20);
    Ok(())
}
