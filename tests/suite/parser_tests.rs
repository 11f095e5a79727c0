//! Parser tests for einsum equations.

use einsum_plan::notation::{infer_output_modes, parse_equation};
use einsum_plan::EinsumError;
use pretty_assertions::assert_eq;

fn labels(equation: &str) -> (String, Option<String>, Option<String>) {
    let parsed = parse_equation(equation).unwrap();
    (
        parsed.a.label(),
        parsed.b.map(|b| b.label()),
        parsed.output.map(|c| c.label()),
    )
}

#[test]
fn test_parse_basic_matmul() {
    assert_eq!(
        labels("ij,jk->ik"),
        ("ij".into(), Some("jk".into()), Some("ik".into()))
    );
}

#[test]
fn test_parse_batched_matmul() {
    assert_eq!(
        labels("bij,bjk->bik"),
        ("bij".into(), Some("bjk".into()), Some("bik".into()))
    );
}

#[test]
fn test_parse_attention() {
    assert_eq!(
        labels("bhqd,bhkd->bhqk"),
        ("bhqd".into(), Some("bhkd".into()), Some("bhqk".into()))
    );
}

#[test]
fn test_parse_transpose() {
    assert_eq!(labels("ij->ji"), ("ij".into(), None, Some("ji".into())));
}

#[test]
fn test_parse_implicit_output() {
    let parsed = parse_equation("ij,jk").unwrap();
    assert!(parsed.is_implicit());
    let output = infer_output_modes(&parsed.a, parsed.b.as_ref());
    assert_eq!(output.label(), "ik");
}

#[test]
fn test_parse_empty_operand_after_comma() {
    assert_eq!(labels("i,->i"), ("i".into(), Some(String::new()), Some("i".into())));
}

#[test]
fn test_parse_non_ascii_modes() {
    assert_eq!(labels("αβ,βγ->αγ"), ("αβ".into(), Some("βγ".into()), Some("αγ".into())));
}

#[test]
fn test_parse_ellipsis_rejected_everywhere() {
    for equation in ["...ij->ij", "ij,...jk->ik", "ij,jk->...ik", "..."] {
        assert_eq!(parse_equation(equation), Err(EinsumError::BroadcastUnsupported));
    }
}

#[test]
fn test_parse_chain_rejected() {
    assert!(parse_equation("ij,jk,kl->il").is_err());
}
