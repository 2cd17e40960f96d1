//! Padding and masking of available-action sets.
use crate::{error::KestrelError, DiscreteActionSpace};
use anyhow::Result;
use ndarray::{s, Array1, Array2};

/// Creates the padded action array and its mask for an available-action set.
///
/// The array has shape `(max_number_actions, action_dim)`. Its first `available.n()`
/// rows hold the raw actions of `available` in enumeration order and the remaining
/// rows are zero. The mask has shape `(max_number_actions,)` and is `true` exactly on
/// the padding rows, which consumers must exclude from arg-max or softmax.
///
/// Fails if `available` holds more than `max_number_actions` actions.
pub fn create_action_tensor_and_mask(
    max_number_actions: usize,
    available: &DiscreteActionSpace,
) -> Result<(Array2<f32>, Array1<bool>)> {
    let n = available.n();
    if n > max_number_actions {
        return Err(KestrelError::AvailableActionsExceedLimit {
            available: n,
            max: max_number_actions,
        }
        .into());
    }

    let mut actions = Array2::zeros((max_number_actions, available.action_dim()));
    for (mut row, action) in actions.outer_iter_mut().zip(available.actions()) {
        row.assign(action);
    }

    let mut mask = Array1::from_elem(max_number_actions, false);
    mask.slice_mut(s![n..]).fill(true);

    Ok((actions, mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_padding_and_mask() -> Result<()> {
        let available = DiscreteActionSpace::from_indices(&[0, 2, 4])?;
        let (actions, mask) = create_action_tensor_and_mask(5, &available)?;

        assert_eq!(actions, array![[0.0f32], [2.0], [4.0], [0.0], [0.0]]);
        assert_eq!(mask, array![false, false, false, true, true]);
        Ok(())
    }

    #[test]
    fn test_padding_rows_are_zero_for_any_size() -> Result<()> {
        let space = DiscreteActionSpace::new(vec![
            array![1.0f32, -1.0],
            array![2.0, 3.0],
            array![0.5, 0.5],
        ])?;

        for max in 3..7 {
            let (actions, mask) = create_action_tensor_and_mask(max, &space)?;
            assert_eq!(actions.dim(), (max, 2));
            assert_eq!(mask.iter().filter(|&&m| m).count(), max - 3);
            for (i, row) in actions.outer_iter().enumerate() {
                if i < 3 {
                    assert_eq!(row, space.actions()[i]);
                    assert!(!mask[i]);
                } else {
                    assert!(row.iter().all(|&v| v == 0.0));
                    assert!(mask[i]);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_no_padding_when_full() -> Result<()> {
        let space = DiscreteActionSpace::with_n(4)?;
        let (actions, mask) = create_action_tensor_and_mask(4, &space)?;
        assert_eq!(actions, array![[0.0f32], [1.0], [2.0], [3.0]]);
        assert!(mask.iter().all(|&m| !m));
        Ok(())
    }

    #[test]
    fn test_too_many_available_actions() -> Result<()> {
        let space = DiscreteActionSpace::with_n(4)?;
        let err = create_action_tensor_and_mask(3, &space).unwrap_err();
        assert_eq!(
            err.downcast_ref::<KestrelError>(),
            Some(&KestrelError::AvailableActionsExceedLimit {
                available: 4,
                max: 3
            })
        );
        Ok(())
    }
}
