use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("invalid time '{0}', expected HH:MM:SS")]
    InvalidTime(String),
    #[error("service '{0}' already exists in schedule")]
    DuplicateService(String),
    #[error("stop '{0}' not found in schedule")]
    MissingStop(String),
    #[error("route '{0}' not found in schedule")]
    MissingRoute(String),
    #[error("service '{0}' not found in schedule")]
    MissingService(String),
    #[error("failure applying attributes to stop '{0}': {1}")]
    AttributeError(String, crate::model::attribute::AttributeError),
}
