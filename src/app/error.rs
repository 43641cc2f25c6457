use crate::routine::RoutineType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("routine list is empty, nothing to run")]
    EmptyRoutineList,
    #[error("controller returned a result for '{actual}' while '{expected}' was requested")]
    ProtocolMismatch {
        expected: RoutineType,
        actual: RoutineType,
    },
    #[error("routine result carries neither a simple nor a power outcome")]
    UnclassifiableResult,
    #[error("completed routine has no result to classify")]
    MissingResult,
    #[error("result for '{0}' was already settled")]
    AlreadySettled(RoutineType),
    #[error("completion of '{0}' was already awaited")]
    AlreadyAwaited(RoutineType),
    #[error("failed to load manifest: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to serialize run summary: {0}")]
    Serialize(#[from] serde_json::Error),
}
