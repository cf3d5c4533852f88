//! `expo-sim`: per-realisation exposure pipeline.
//!
//! # Two-phase realisation
//!
//! ```text
//! for each realisation r:
//!   ① Agents: for every home record (parallel with the `parallel` feature):
//!                 rng       = AgentRng(seed, r, agent)
//!                 schedule  = Profile::build(home, ctx, rng)
//!                 slices    = resample(schedule, dataset timestep grid)
//!                 sampled   = ExposureSampler::sample_schedule(..)
//!                 aggregate = per activity + per day
//!   ── barrier: every agent finished ──
//!   ② Apply: in ascending AgentId order on one thread:
//!                 Ok   → RunObserver::on_agent
//!                 Err  → RunObserver::on_agent_failed, then FailurePolicy
//! ```
//!
//! Realisations share nothing mutable; the weekly combination runs later on
//! their persisted day summaries.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Runs the agent phase on Rayon (`workers` sizes the pool). |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use expo_profile::ProfileKind;
//! use expo_sim::{NoopObserver, PipelineBuilder, PipelineConfig};
//!
//! let pipeline = PipelineBuilder::new(
//!     PipelineConfig::default(),
//!     ProfileKind::HomemakerBufferWorkday.instantiate(),
//!     registry,
//!     cube,
//! )
//! .build()?;
//! let summary = pipeline.run_realisation(1, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod pipeline;


pub use builder::PipelineBuilder;
pub use config::{FailurePolicy, PipelineConfig};
pub use error::{AgentError, SimError, SimResult};
pub use observer::{NoopObserver, RunObserver};
pub use pipeline::{AgentExposure, Pipeline, RealisationSummary};
