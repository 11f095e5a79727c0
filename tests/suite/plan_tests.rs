//! Plan compilation tests.

use einsum_plan::{EinsumConfig, EinsumError, EinsumPlan, Operand, OperandLayout, PlanKind};
use half::f16;
use pretty_assertions::assert_eq;

fn layout(shape: &[i64]) -> OperandLayout {
    OperandLayout::new(shape)
}

#[test]
fn test_explicit_matmul_shape() {
    let plan = EinsumPlan::<f32>::new("ij,jk->ik", &layout(&[2, 3]), Some(&layout(&[3, 4]))).unwrap();
    assert_eq!(plan.output_shape(), &[2, 4]);
    assert_eq!(plan.modes_a(), "ij");
    assert_eq!(plan.modes_b(), "jk");
    assert_eq!(plan.modes_c(), "ik");
    assert_eq!(plan.kind(), PlanKind::Contraction);
}

#[test]
fn test_implicit_matmul_shape() {
    let plan = EinsumPlan::<f32>::new("ij,jk", &layout(&[2, 3]), Some(&layout(&[3, 4]))).unwrap();
    assert_eq!(plan.modes_c(), "ik");
    assert_eq!(plan.output_shape(), &[2, 4]);
}

#[test]
fn test_single_operand_reduction_shape() {
    let plan = EinsumPlan::<f32>::new("ij->i", &layout(&[2, 3]), None).unwrap();
    assert_eq!(plan.output_shape(), &[2]);
    assert_eq!(plan.kind(), PlanKind::Reduction);
}

#[test]
fn test_full_reduction_to_scalar() {
    let plan = EinsumPlan::<f64>::new("ijk->", &layout(&[2, 3, 4]), None).unwrap();
    assert!(plan.output_shape().is_empty());
    assert_eq!(plan.output_len(), Some(1));
}

#[test]
fn test_mode_count_mismatch_fails() {
    let result = EinsumPlan::<f32>::new("ijk", &layout(&[2, 3]), None);
    let err = result.unwrap_err();
    assert!(err.is_format_error());
    assert_eq!(
        err,
        EinsumError::ModeCountMismatch {
            operand: Operand::A,
            modes: 3,
            extents: 2
        }
    );
}

#[test]
fn test_broadcast_marker_fails_regardless_of_shapes() {
    let result = EinsumPlan::<f32>::new("...ij,jk->ik", &layout(&[2, 3]), Some(&layout(&[3, 4])));
    assert_eq!(result.unwrap_err(), EinsumError::BroadcastUnsupported);

    let result = EinsumPlan::<f32>::new("i...", &layout(&[2]), None);
    assert_eq!(result.unwrap_err(), EinsumError::BroadcastUnsupported);
}

#[test]
fn test_compilation_is_idempotent() {
    let a = layout(&[5, 2, 3]);
    let b = layout(&[3, 7]);
    let first = EinsumPlan::<f32>::new("bij,jk", &a, Some(&b)).unwrap();
    let second = EinsumPlan::<f32>::new("bij,jk", &a, Some(&b)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.output_shape(), second.output_shape());
    assert_eq!(first.modes_c(), second.modes_c());
}

#[test]
fn test_implicit_order_independent_of_operand_order() {
    let a = layout(&[2, 3]);
    let b = layout(&[3, 4]);
    let forward = EinsumPlan::<f32>::new("kj,ja", &a, Some(&b)).unwrap();
    let swapped = EinsumPlan::<f32>::new("ja,kj", &b, Some(&a)).unwrap();

    assert_eq!(forward.modes_c(), "ak");
    assert_eq!(swapped.modes_c(), "ak");
    assert_eq!(forward.output_shape(), &[4, 2]);
    assert_eq!(swapped.output_shape(), &[4, 2]);
}

#[test]
fn test_implicit_sort_uses_character_value() {
    let plan = EinsumPlan::<f32>::new("bA,Ac", &layout(&[2, 3]), Some(&layout(&[3, 4]))).unwrap();
    assert_eq!(plan.modes_c(), "bc");

    let plan = EinsumPlan::<f32>::new("ba", &layout(&[2, 3]), None).unwrap();
    assert_eq!(plan.modes_c(), "ab");
    assert_eq!(plan.output_shape(), &[3, 2]);
}

#[test]
fn test_output_extents_follow_owning_operand() {
    let plan = EinsumPlan::<f32>::new("ij,jk->kji", &layout(&[2, 3]), Some(&layout(&[3, 5]))).unwrap();
    assert_eq!(plan.output_shape(), &[5, 3, 2]);
}

#[test]
fn test_shared_mode_extent_mismatch() {
    let result = EinsumPlan::<f32>::new("ij,jk->ik", &layout(&[2, 3]), Some(&layout(&[5, 4])));
    assert_eq!(
        result.unwrap_err(),
        EinsumError::ExtentMismatch {
            mode: 'j',
            expected: 3,
            found: 5
        }
    );
}

#[test]
fn test_repeated_mode_extent_mismatch_against_b() {
    let result = EinsumPlan::<f64>::new("ii,i->i", &layout(&[2, 3]), Some(&layout(&[3])));
    assert_eq!(
        result.unwrap_err(),
        EinsumError::ExtentMismatch {
            mode: 'i',
            expected: 2,
            found: 3
        }
    );
}

#[test]
fn test_repeated_mode_extent_mismatch_within_a() {
    let result = EinsumPlan::<f64>::new("ii->i", &layout(&[2, 3]), None);
    assert!(matches!(
        result,
        Err(EinsumError::ExtentMismatch { mode: 'i', expected: 2, found: 3 })
    ));

    let plan = EinsumPlan::<f64>::new("ii->i", &layout(&[3, 3]), None).unwrap();
    assert_eq!(plan.output_shape(), &[3]);
}

#[test]
fn test_repeated_output_mode_rejected() {
    let result = EinsumPlan::<f64>::new("i->ii", &layout(&[2]), None);
    let err = result.unwrap_err();
    assert!(err.is_format_error());
    assert_eq!(err, EinsumError::RepeatedOutputMode { mode: 'i' });
}

#[test]
fn test_implicit_output_of_diagonal_keeps_mode_once() {
    let plan = EinsumPlan::<f64>::new("ii", &layout(&[3, 3]), None).unwrap();
    assert_eq!(plan.modes_c(), "i");
    assert_eq!(plan.output_shape(), &[3]);
}

#[test]
fn test_output_mode_missing_from_inputs() {
    let result = EinsumPlan::<f32>::new("ij,jk->iq", &layout(&[2, 3]), Some(&layout(&[3, 4])));
    assert_eq!(result.unwrap_err(), EinsumError::OutputModeNotInInputs { mode: 'q' });
}

#[test]
fn test_max_modes_per_operand() {
    let config = EinsumConfig::new().with_max_modes(3);
    let shape = [1, 1, 1, 1];

    let result = EinsumPlan::<f32>::with_config("abcd->a", &layout(&shape), None, &config);
    assert!(matches!(
        result,
        Err(EinsumError::TooManyModes { operand: Operand::A, count: 4, max: 3 })
    ));

    let result = EinsumPlan::<f32>::with_config(
        "a,abcd->a",
        &layout(&[1]),
        Some(&layout(&shape)),
        &config,
    );
    assert!(matches!(
        result,
        Err(EinsumError::TooManyModes { operand: Operand::B, .. })
    ));

    let result = EinsumPlan::<f32>::with_config("abc->abcaa", &layout(&[1, 1, 1]), None, &config);
    assert!(matches!(
        result,
        Err(EinsumError::TooManyModes { operand: Operand::C, count: 5, .. })
    ));
}

#[test]
fn test_default_max_modes_allows_forty() {
    let modes: String = (0..40u32).map(|i| char::from_u32('A' as u32 + i).unwrap()).collect();
    let shape = vec![1i64; 40];
    let equation = format!("{}->{}", modes, modes);
    let plan = EinsumPlan::<f32>::new(&equation, &layout(&shape), None).unwrap();
    assert_eq!(plan.num_modes_c(), 40);

    let modes41: String = (0..41u32).map(|i| char::from_u32('A' as u32 + i).unwrap()).collect();
    let shape41 = vec![1i64; 41];
    let result = EinsumPlan::<f32>::new(&modes41, &layout(&shape41), None);
    assert!(matches!(result, Err(EinsumError::TooManyModes { count: 41, .. })));
}

#[test]
fn test_strides_must_match_modes() {
    let a = OperandLayout::new(&[2, 3]).with_strides(&[1]);
    let result = EinsumPlan::<f32>::new("ij->i", &a, None);
    assert!(matches!(
        result,
        Err(EinsumError::StrideCountMismatch { operand: Operand::A, modes: 2, strides: 1 })
    ));
}

#[test]
fn test_negative_extent_rejected() {
    let result = EinsumPlan::<f32>::new("ij->i", &layout(&[2, -3]), None);
    assert!(matches!(result, Err(EinsumError::NegativeExtent { mode: 'j', .. })));
}

#[test]
fn test_half_precision_plan() {
    let plan = EinsumPlan::<f16>::new("ij,jk->ik", &layout(&[8, 8]), Some(&layout(&[8, 8]))).unwrap();
    assert_eq!(plan.output_shape(), &[8, 8]);
}

#[test]
fn test_plan_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EinsumPlan<f32>>();
    assert_send_sync::<EinsumPlan<f16>>();
}
