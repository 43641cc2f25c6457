use crate::routine::{RoutineResult, RoutineType};
use serde_derive::{Deserialize, Serialize};

/// Lifecycle of a routine or of a routine group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionProgress {
    NotStarted,
    Running,
    Completed,
    Cancelled,
    Skipped,
    Warning,
}

impl Default for ExecutionProgress {
    fn default() -> Self {
        ExecutionProgress::NotStarted
    }
}

/// Snapshot of one routine's state. Transitions produce a new item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultStatusItem {
    pub routine: RoutineType,
    pub progress: ExecutionProgress,
    pub result: Option<RoutineResult>,
}

impl ResultStatusItem {
    pub fn new(routine: RoutineType, progress: ExecutionProgress) -> Self {
        Self {
            routine,
            progress,
            result: None,
        }
    }

    pub fn not_started(routine: RoutineType) -> Self {
        Self::new(routine, ExecutionProgress::NotStarted)
    }

    pub fn completed(routine: RoutineType, result: RoutineResult) -> Self {
        Self {
            routine,
            progress: ExecutionProgress::Completed,
            result: Some(result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineProperties {
    pub routine: RoutineType,
    #[serde(default = "default_blocking")]
    pub blocking: bool,
}

fn default_blocking() -> bool {
    true
}

impl RoutineProperties {
    pub fn new(routine: RoutineType, blocking: bool) -> Self {
        Self { routine, blocking }
    }

    pub fn blocking(routine: RoutineType) -> Self {
        Self::new(routine, true)
    }

    pub fn non_blocking(routine: RoutineType) -> Self {
        Self::new(routine, false)
    }
}
