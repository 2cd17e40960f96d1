use anyhow::Result;
use kestrel_agent::action_representation::{ActionRepresentation, OneHotActionRepresentation};
use kestrel_core::{
    replay_buffer::{Experience, FifoReplayBuffer, FifoReplayBufferConfig},
    DiscreteActionSpace, ExperienceBufferBase, ReplayBufferBase,
};
use ndarray::{array, Array1};

#[test]
fn test_dynamic_action_space_through_buffer() -> Result<()> {
    let mut buffer = FifoReplayBuffer::build(&FifoReplayBufferConfig::default().capacity(10))?;
    let exp = Experience::new(Array1::zeros(3), array![2.0], 1.0, Array1::ones(3), false)
        .curr_available_actions(DiscreteActionSpace::from_indices(&[0, 2, 4])?)
        .next_available_actions(DiscreteActionSpace::from_indices(&[0, 3])?)
        .max_number_actions(5);
    buffer.push(exp)?;

    let batch = buffer.sample(1)?;
    assert_eq!(batch.len(), 1);
    assert_eq!(
        batch.curr_available_actions,
        Some(array![[[0.0f32], [2.0], [4.0], [0.0], [0.0]]])
    );
    assert_eq!(
        batch.next_available_actions,
        Some(array![[[0.0f32], [3.0], [0.0], [0.0], [0.0]]])
    );
    let curr_mask = array![[false, false, false, true, true]];
    let next_mask = array![[false, false, true, true, true]];
    assert_eq!(batch.curr_available_actions_mask, Some(curr_mask.clone()));
    assert_eq!(batch.next_available_actions_mask, Some(next_mask.clone()));

    let batch = OneHotActionRepresentation::new(5).transform_batch(batch)?;
    assert_eq!(batch.action, array![[0.0f32, 0.0, 1.0, 0.0, 0.0]]);
    assert_eq!(
        batch.curr_available_actions,
        Some(array![[
            [1.0f32, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0, 0.0]
        ]])
    );
    assert_eq!(
        batch.next_available_actions,
        Some(array![[
            [1.0f32, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0, 0.0]
        ]])
    );
    assert_eq!(batch.curr_available_actions_mask, Some(curr_mask));
    assert_eq!(batch.next_available_actions_mask, Some(next_mask));
    assert_eq!(batch.state, array![[0.0f32, 0.0, 0.0]]);
    assert_eq!(batch.next_state, array![[1.0f32, 1.0, 1.0]]);
    assert_eq!(batch.reward, array![1.0f32]);
    Ok(())
}
