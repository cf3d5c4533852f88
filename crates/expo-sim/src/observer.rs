//! Run observer trait for progress reporting and artifact collection.

use expo_core::{AgendaClock, AgentId};

use crate::{AgentError, AgentExposure, RealisationSummary};

/// Callbacks invoked by [`Pipeline::run_realisation`][crate::Pipeline::run_realisation].
///
/// The per-agent hooks run on the calling thread after the parallel phase,
/// once per agent in ascending `AgentId` order, so an implementation can
/// append to a file without any locking.
///
/// All methods have default no-op implementations.
///
/// # Example: failure counter
///
/// ```rust,ignore
/// struct Failures(usize);
///
/// impl RunObserver for Failures {
///     fn on_agent_failed(&mut self, _r: u32, _agent: AgentId, _error: &AgentError) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait RunObserver {
    /// Called before any agent is processed.
    fn on_realisation_start(
        &mut self,
        _realisation: u32,
        _variables:   &[String],
        _clock:       &AgendaClock,
    ) {}

    /// One agent's finished slices, activities and day summary.
    fn on_agent(&mut self, _realisation: u32, _exposure: &AgentExposure) {}

    /// An agent whose pipeline failed.  Under
    /// [`FailurePolicy::AbortRun`][crate::FailurePolicy::AbortRun] this is the
    /// last hook before the run returns the error.
    fn on_agent_failed(&mut self, _realisation: u32, _agent: AgentId, _error: &AgentError) {}

    /// Called once after every agent was delivered.  Not called when the
    /// realisation aborts.
    fn on_realisation_end(&mut self, _summary: &RealisationSummary) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
