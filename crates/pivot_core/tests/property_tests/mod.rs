//! Property-based tests for pivot_core
//!
//! Exact linear algebra is checked against algebraic identities; the root
//! finders are checked against each other on functions with a known root.

mod linear_algebra_properties;
mod root_finding_properties;
