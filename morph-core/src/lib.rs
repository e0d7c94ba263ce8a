//! Core library for the animated KD-partition morph.
//!
//! Main components:
//! - [`channel`] — bounded channel between the generator worker and the render loop.
//! - [`tree`] — interpolating KD partition tree, rebuilt every frame.
//! - [`animation`] — per-frame state machine advancing the morph parameter.
//! - [`sampler`] — density-weighted rejection sampling and the uniform seed grid.
//! - [`noise`] — 1-D simplex noise with an explicitly owned permutation table.
//! - [`worker`] — background generation thread and its gating policies.
//! - [`config`] — tunable parameters for the pipeline.
//! - [`error`] — shared error type.
//! - [`types`] — shared type aliases.

pub mod animation;
pub mod channel;
pub mod config;
pub mod error;
pub mod noise;
pub mod sampler;
pub mod tree;
pub mod types;
pub mod worker;
