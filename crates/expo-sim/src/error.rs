use expo_core::{AgentId, ExpoError};
use expo_exposure::ExposureError;
use expo_profile::ProfileError;
use expo_schedule::ScheduleError;
use thiserror::Error;

/// Failure of one agent's pipeline.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Exposure(#[from] ExposureError),
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("pipeline configuration error: {0}")]
    Config(String),

    #[error("variable {0:?} is not in the exposure dataset")]
    UnknownVariable(String),

    #[error("agent {agent} failed: {source}")]
    Agent {
        agent:  AgentId,
        #[source]
        source: AgentError,
    },

    #[error(transparent)]
    Core(#[from] ExpoError),

    #[error(transparent)]
    Exposure(#[from] ExposureError),

    #[error("invalid pipeline config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
