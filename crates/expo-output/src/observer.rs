//! `ArtifactObserver<W>`: bridges `RunObserver` to an `OutputWriter`.

use expo_core::{AgendaClock, AgentId};
use expo_sim::{AgentError, AgentExposure, RealisationSummary, RunObserver};

use crate::row::{DailyRow, activity_rows, slice_rows};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`RunObserver`] that writes every delivered agent to any
/// [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Agents arrive in ascending `AgentId` order on one thread, so records of
/// different agents never interleave.  Errors from the writer are stored
/// internally because `RunObserver` methods have no return value.  After
/// `run_realisation` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct ArtifactObserver<W: OutputWriter> {
    writer:     W,
    clock:      AgendaClock,
    next_slice: u64,
    written:    usize,
    failed:     Vec<AgentId>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ArtifactObserver<W> {
    /// Create an observer backed by `writer`, using `clock` to format slice
    /// timestamps and activity durations.
    pub fn new(writer: W, clock: AgendaClock) -> Self {
        Self {
            writer,
            clock,
            next_slice: 0,
            written:    0,
            failed:     Vec::new(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any).
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Agents written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Agents left out of the artifact because their pipeline failed.
    pub fn failed(&self) -> &[AgentId] {
        &self.failed
    }

    /// Close the writer without waiting for `on_realisation_end`, e.g. after
    /// an aborted realisation.
    pub fn close(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                tracing::error!(error = %e, "artifact write failed");
                self.last_error = Some(e);
            }
        }
    }

    fn write_agent(&mut self, exposure: &AgentExposure) -> OutputResult<()> {
        let slices = slice_rows(exposure, &self.clock, self.next_slice);
        self.next_slice += slices.len() as u64;
        self.writer.write_slices(&slices)?;
        self.writer.write_activities(&activity_rows(exposure, &self.clock))?;
        self.writer.write_daily(&DailyRow::from(&exposure.daily))?;
        Ok(())
    }
}

impl<W: OutputWriter> RunObserver for ArtifactObserver<W> {
    fn on_agent(&mut self, _realisation: u32, exposure: &AgentExposure) {
        if self.last_error.is_some() {
            return;
        }
        let result = self.write_agent(exposure);
        if result.is_ok() {
            self.written += 1;
        }
        self.store_err(result);
    }

    fn on_agent_failed(&mut self, _realisation: u32, agent: AgentId, _error: &AgentError) {
        self.failed.push(agent);
    }

    fn on_realisation_end(&mut self, summary: &RealisationSummary) {
        let result = self.writer.finish();
        self.store_err(result);
        tracing::info!(
            realisation = summary.realisation,
            written = self.written,
            failed = self.failed.len(),
            "artifact closed"
        );
    }
}
