//! Cross-module tests for the arena engine.
//!
//! - `determinism.rs`: same seed, same match
//! - `integration.rs`: scenarios that run the full tick pipeline
//! - `helpers.rs`: world setup and scripted strategies

mod determinism;
mod helpers;
