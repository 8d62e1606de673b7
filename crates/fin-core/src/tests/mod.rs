//! Test module for fin-core
//!
//! Scenario tests that drive a whole [`Session`](crate::Session) against an
//! in-memory provider and shell:
//! - Query to results to action flow
//! - Poll loop cancellation and stale batch handling
//! - Clear, hide and history recall
//! - Navigation properties of the selection and history ring

// Test modules use exact float comparisons
#![allow(clippy::float_cmp)]

mod poll_tests;
