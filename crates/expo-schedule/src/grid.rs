//! `TimestepGrid`: fixed temporal windows of the exposure dataset.

use expo_core::Tick;

use crate::{ScheduleError, ScheduleResult};

/// One half-open grid window `[start, end)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Window {
    pub start: Tick,
    pub end:   Tick,
}

impl Window {
    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    #[inline]
    pub fn contains(&self, t: Tick) -> bool {
        self.start <= t && t < self.end
    }
}

/// Immutable ordered sequence of contiguous, non-empty windows.
///
/// Construction rejects zero-width or out-of-order windows, so consumers may
/// rely on `windows()[i].end == windows()[i + 1].start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestepGrid {
    windows: Vec<Window>,
}

impl TimestepGrid {
    /// `count` windows of `window_ticks` each, starting at `start`.
    ///
    /// 24 hourly windows on a one-minute clock is
    /// `TimestepGrid::uniform(Tick(0), 60, 24)`.
    pub fn uniform(start: Tick, window_ticks: u64, count: usize) -> ScheduleResult<Self> {
        if window_ticks == 0 {
            return Err(ScheduleError::InvalidGrid("window width must be positive".into()));
        }
        if count == 0 {
            return Err(ScheduleError::InvalidGrid("grid needs at least one window".into()));
        }
        let windows = (0..count as u64)
            .map(|i| Window {
                start: start + i * window_ticks,
                end:   start + (i + 1) * window_ticks,
            })
            .collect();
        Ok(Self { windows })
    }

    /// Windows between consecutive `boundaries`; `n` boundaries yield
    /// `n - 1` windows.
    pub fn from_boundaries(boundaries: &[Tick]) -> ScheduleResult<Self> {
        if boundaries.len() < 2 {
            return Err(ScheduleError::InvalidGrid(format!(
                "need at least two boundaries, got {}",
                boundaries.len()
            )));
        }
        let mut windows = Vec::with_capacity(boundaries.len() - 1);
        for pair in boundaries.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if end <= start {
                return Err(ScheduleError::InvalidGrid(format!(
                    "boundaries not strictly increasing at {start} → {end}"
                )));
            }
            windows.push(Window { start, end });
        }
        Ok(Self { windows })
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn start(&self) -> Tick {
        self.windows.first().map(|w| w.start).unwrap_or_default()
    }

    pub fn end(&self) -> Tick {
        self.windows.last().map(|w| w.end).unwrap_or_default()
    }

    /// Total grid length in ticks.
    pub fn span(&self) -> u64 {
        self.end() - self.start()
    }
}
