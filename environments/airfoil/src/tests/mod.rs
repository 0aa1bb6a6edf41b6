//! Airfoil environment tests.
//!
//! - `geometry_tests`: hull, normalization and observation layout
//! - `env_tests`: reset/step behavior and reward substitution
//! - `integration_tests`: training the core against the environment

pub mod geometry_tests;
