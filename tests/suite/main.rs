//! Integration tests for einsum-plan.

mod parser_tests;
mod plan_tests;
