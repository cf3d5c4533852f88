use expo_core::{AgentId, Tick};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{agent}: activities sum to {actual} ticks, agenda is {expected} ticks")]
    Imbalance {
        agent:    AgentId,
        expected: u64,
        actual:   u64,
    },

    #[error("{agent}: activity #{ordinal} ends at {end}, outside [{cursor}, {agenda_end}]")]
    Overrun {
        agent:      AgentId,
        ordinal:    u32,
        cursor:     Tick,
        end:        Tick,
        agenda_end: Tick,
    },

    #[error("{agent}: activity #{ordinal} has zero duration")]
    EmptyActivity { agent: AgentId, ordinal: u32 },

    #[error("{agent}: agenda [{start}, {end}) is empty")]
    EmptyAgenda { agent: AgentId, start: Tick, end: Tick },

    #[error("{agent}: schedule spans [{schedule_start}, {schedule_end}), grid spans [{grid_start}, {grid_end})")]
    SpanMismatch {
        agent:          AgentId,
        schedule_start: Tick,
        schedule_end:   Tick,
        grid_start:     Tick,
        grid_end:       Tick,
    },

    #[error("{agent}: activity #{ordinal} starts at {found}, expected {expected}")]
    Discontiguous {
        agent:    AgentId,
        ordinal:  u32,
        expected: Tick,
        found:    Tick,
    },

    #[error("{agent}: slices sum to {actual} ticks, schedule is {expected} ticks")]
    PartitionMismatch {
        agent:    AgentId,
        expected: u64,
        actual:   u64,
    },

    #[error("invalid timestep grid: {0}")]
    InvalidGrid(String),
}

impl ScheduleError {
    /// `true` for the structural partition failures of the resampler (as
    /// opposed to schedule construction failures).
    pub fn is_partition_failure(&self) -> bool {
        matches!(
            self,
            ScheduleError::SpanMismatch { .. }
                | ScheduleError::Discontiguous { .. }
                | ScheduleError::PartitionMismatch { .. }
        )
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
