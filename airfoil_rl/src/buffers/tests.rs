//! Test suite for the rollout buffer.
//!
//! Test categories:
//! 1. Allocation and shape contracts
//! 2. Recording, overwrite and bootstrap semantics
//! 3. Minibatch partitioning and seeding
//! 4. Failure modes (shape mismatch, index out of range, degenerate batch)

use std::collections::HashSet;

use proptest::prelude::*;

use super::*;
use crate::error::TrainError;
use crate::runners::config::ConfigError;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Fill every timestep of a buffer with values derived from (env, t).
fn fill(buffer: &mut RolloutBuffer) {
    let n = buffer.env_count();
    let obs = buffer.observation_size();
    let act = buffer.action_dim();
    for t in 0..buffer.horizon() {
        let observations: Vec<f32> = (0..n)
            .flat_map(|e| std::iter::repeat((e * 100 + t) as f32).take(obs))
            .collect();
        let actions: Vec<f32> = (0..n)
            .flat_map(|e| std::iter::repeat((e * 100 + t) as f32 * 0.01).take(act))
            .collect();
        let rewards: Vec<f32> = (0..n).map(|e| (e * 100 + t) as f32).collect();
        let values: Vec<f32> = (0..n).map(|e| -((e * 100 + t) as f32)).collect();
        let log_probs: Vec<f32> = (0..n).map(|e| (e * 100 + t) as f32 * -0.1).collect();
        buffer
            .record(t, &observations, &actions, &rewards, &values, &log_probs)
            .unwrap();
    }
    buffer.set_bootstrap_value(&vec![7.0; n]).unwrap();
}

fn timestep_sets(batches: &[Minibatch]) -> Vec<Vec<usize>> {
    batches.iter().map(|b| b.timesteps.clone()).collect()
}

// =============================================================================
// ALLOCATION
// =============================================================================

#[test]
fn test_allocate_sizes_every_table() {
    let buffer = RolloutBuffer::allocate(2, 4, &[2, 3], 2).unwrap();
    assert_eq!(buffer.observation_size(), 6);
    assert_eq!(buffer.observations().len(), 2 * 4 * 6);
    assert_eq!(buffer.actions().len(), 2 * 4 * 2);
    assert_eq!(buffer.rewards().len(), 8);
    assert_eq!(buffer.log_probs().len(), 8);
    assert_eq!(buffer.values().len(), 2 * 5, "values carry one bootstrap slot per env");
    assert_eq!(buffer.len(), 8);
}

#[test]
fn test_allocate_rejects_zero_counts() {
    assert!(matches!(
        RolloutBuffer::allocate(0, 4, &[3], 1),
        Err(TrainError::Config(ConfigError::InvalidCount { field: "env_count", .. }))
    ));
    assert!(matches!(
        RolloutBuffer::allocate(1, 4, &[], 1),
        Err(TrainError::Config(ConfigError::InvalidCount { .. }))
    ));
}

// =============================================================================
// RECORDING
// =============================================================================

#[test]
fn test_record_places_data_env_major() {
    let mut buffer = RolloutBuffer::allocate(2, 3, &[2], 1).unwrap();
    fill(&mut buffer);

    let tr = buffer.transition(1, 2).unwrap();
    assert_eq!(tr.observation, &[102.0, 102.0]);
    assert_eq!(tr.reward, 102.0);
    assert_eq!(tr.value, -102.0);
    assert!((tr.log_prob + 10.2).abs() < 1e-5);

    assert_eq!(buffer.env_rewards(0).unwrap(), &[0.0, 1.0, 2.0]);
    assert_eq!(buffer.env_values(1).unwrap(), &[-100.0, -101.0, -102.0, 7.0]);
}

#[test]
fn test_record_twice_last_write_wins() {
    let mut buffer = RolloutBuffer::allocate(1, 2, &[1], 1).unwrap();
    buffer.record(0, &[1.0], &[0.1], &[1.0], &[0.0], &[0.0]).unwrap();
    buffer.record(0, &[2.0], &[0.2], &[5.0], &[0.5], &[-1.0]).unwrap();

    let tr = buffer.transition(0, 0).unwrap();
    assert_eq!(tr.observation, &[2.0]);
    assert_eq!(tr.reward, 5.0);
    assert_eq!(buffer.recorded_steps(), 1);
}

#[test]
fn test_shape_mismatch_fails_before_any_write() {
    let mut buffer = RolloutBuffer::allocate(1, 2, &[3], 2).unwrap();
    let err = buffer
        .record(0, &[1.0, 2.0, 3.0], &[0.5], &[9.0], &[0.0], &[0.0])
        .unwrap_err();

    assert!(matches!(
        err,
        TrainError::ShapeMismatch { what: "actions", expected: 2, actual: 1 }
    ));
    assert_eq!(buffer.observations(), &[0.0; 6]);
    assert_eq!(buffer.rewards(), &[0.0, 0.0]);
    assert_eq!(buffer.recorded_steps(), 0);
}

#[test]
fn test_record_out_of_range_timestep() {
    let mut buffer = RolloutBuffer::allocate(1, 2, &[1], 1).unwrap();
    let err = buffer.record(2, &[0.0], &[0.0], &[0.0], &[0.0], &[0.0]).unwrap_err();
    assert!(matches!(
        err,
        TrainError::IndexOutOfRange { what: "timestep", index: 2, bound: 2 }
    ));
}

#[test]
fn test_completeness_tracks_pass() {
    let mut buffer = RolloutBuffer::allocate(1, 3, &[1], 1).unwrap();
    assert!(!buffer.is_complete());
    fill(&mut buffer);
    assert!(buffer.is_complete());

    buffer.begin_pass();
    assert!(!buffer.is_complete());
    assert!(matches!(
        buffer.ensure_complete(),
        Err(TrainError::IncompleteRollout { recorded: 0, horizon: 3, bootstrap: false })
    ));
}

#[test]
fn test_bootstrap_length_checked() {
    let mut buffer = RolloutBuffer::allocate(2, 3, &[1], 1).unwrap();
    assert!(matches!(
        buffer.set_bootstrap_value(&[1.0]),
        Err(TrainError::ShapeMismatch { what: "bootstrap values", .. })
    ));
}

// =============================================================================
// MINIBATCHES
// =============================================================================

#[test]
fn test_minibatches_horizon_ten_batch_three() {
    let mut buffer = RolloutBuffer::allocate(1, 10, &[1], 1).unwrap().with_seed(42);
    fill(&mut buffer);

    let batches = buffer.minibatches(3).unwrap();
    assert_eq!(batches.len(), 3);

    let mut seen = HashSet::new();
    for batch in &batches {
        assert_eq!(batch.timesteps.len(), 3);
        assert_eq!(batch.len(), 3);
        for &t in &batch.timesteps {
            assert!(t < 10);
            assert!(seen.insert(t), "timestep {} appeared twice", t);
        }
    }
    assert_eq!(seen.len(), 9, "one remainder timestep is dropped");
}

#[test]
fn test_minibatches_fixed_seed_is_reproducible() {
    let mut a = RolloutBuffer::allocate(1, 10, &[1], 1).unwrap().with_seed(7);
    let mut b = RolloutBuffer::allocate(1, 10, &[1], 1).unwrap().with_seed(7);

    let first_a = timestep_sets(&a.minibatches(3).unwrap());
    let first_b = timestep_sets(&b.minibatches(3).unwrap());
    assert_eq!(first_a, first_b);

    let second_a = timestep_sets(&a.minibatches(3).unwrap());
    let second_b = timestep_sets(&b.minibatches(3).unwrap());
    assert_eq!(second_a, second_b);
}

#[test]
fn test_successive_calls_draw_fresh_permutations() {
    let mut buffer = RolloutBuffer::allocate(1, 10, &[1], 1).unwrap().with_seed(3);
    let first = timestep_sets(&buffer.minibatches(3).unwrap());
    let differs = (0..8).any(|_| timestep_sets(&buffer.minibatches(3).unwrap()) != first);
    assert!(differs, "every later call repeated the first permutation");
}

#[test]
fn test_minibatch_rows_align_across_tables() {
    let mut buffer = RolloutBuffer::allocate(2, 4, &[2], 1).unwrap().with_seed(1);
    fill(&mut buffer);
    buffer
        .set_advantages((0..8).map(|i| i as f32).collect(), (0..8).map(|i| i as f32 * 2.0).collect())
        .unwrap();

    for batch in buffer.minibatches(2).unwrap() {
        assert_eq!(batch.observations.len(), 4 * 2);
        for env in 0..2 {
            for (k, &t) in batch.timesteps.iter().enumerate() {
                let row = env * batch.timesteps.len() + k;
                let key = (env * 100 + t) as f32;
                assert_eq!(batch.rewards[row], key);
                assert_eq!(batch.values[row], -key);
                assert_eq!(batch.observations[row * 2], key);
                assert_eq!(batch.advantages[row], (env * 4 + t) as f32);
                assert_eq!(batch.returns[row], (env * 4 + t) as f32 * 2.0);
            }
        }
    }
}

#[test]
fn test_degenerate_minibatch_size_is_error() {
    let mut buffer = RolloutBuffer::allocate(1, 4, &[1], 1).unwrap();
    assert!(matches!(
        buffer.minibatches(5),
        Err(TrainError::Config(ConfigError::DegenerateMinibatch { batch_size: 5, horizon: 4 }))
    ));
    assert!(buffer.minibatches(0).is_err());
}

#[test]
fn test_gather_rejects_out_of_range_index() {
    let buffer = RolloutBuffer::allocate(1, 4, &[1], 1).unwrap();
    assert!(matches!(
        buffer.gather(&[0, 4]),
        Err(TrainError::IndexOutOfRange { what: "timestep", index: 4, .. })
    ));
}

#[test]
fn test_minibatch_tensors_have_expected_dims() {
    use burn::backend::NdArray;
    type B = NdArray<f32>;
    let device = Default::default();

    let mut buffer = RolloutBuffer::allocate(2, 4, &[2, 3], 2).unwrap().with_seed(5);
    fill(&mut buffer);
    let batch = &buffer.minibatches(2).unwrap()[0];

    assert_eq!(batch.observations_tensor::<B>(&device).dims(), [4, 6]);
    assert_eq!(batch.actions_tensor::<B>(&device).dims(), [4, 2]);
    assert_eq!(batch.log_probs_tensor::<B>(&device).dims(), [4]);
    assert_eq!(batch.returns_tensor::<B>(&device).dims(), [4]);
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    #[test]
    fn prop_minibatches_are_disjoint_and_sized(
        horizon in 1usize..64,
        batch in 1usize..64,
        seed in any::<u64>(),
    ) {
        prop_assume!(batch <= horizon);
        let mut buffer = RolloutBuffer::allocate(1, horizon, &[1], 1).unwrap().with_seed(seed);
        let batches = buffer.minibatches(batch).unwrap();

        prop_assert_eq!(batches.len(), horizon / batch);
        let mut seen = HashSet::new();
        for b in &batches {
            prop_assert_eq!(b.timesteps.len(), batch);
            for &t in &b.timesteps {
                prop_assert!(t < horizon);
                prop_assert!(seen.insert(t));
            }
        }
        prop_assert_eq!(seen.len(), horizon - horizon % batch);
    }
}
