use thiserror::Error;

use expo_core::AgentId;
use expo_schedule::ScheduleError;
use expo_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{agent}: no suitable work location after {attempts} attempts")]
    NoSuitableWork { agent: AgentId, attempts: u32 },

    #[error("unknown profile {0:?}")]
    UnknownProfile(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProfileResult<T> = Result<T, ProfileError>;
