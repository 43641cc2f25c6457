use crate::app::error::Error;
use crate::routine::{
    normalize_result, ExecutionProgress, ResultStatusItem, RoutineProperties, RoutineType,
    StandardRoutineResult,
};
use serde_derive::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// A named set of routines displayed under one composite status.
///
/// `failed_test` is written once (first failure wins) and `in_warning_state`
/// only ever goes from `false` to `true`. Cloning yields an independent
/// snapshot that shares the routine properties.
#[derive(Debug, Clone, Serialize)]
pub struct RoutineGroup {
    #[serde(skip)]
    routine_properties: Arc<Vec<RoutineProperties>>,
    routines: Vec<RoutineType>,
    #[serde(skip)]
    non_blocking_routines: HashSet<RoutineType>,
    group_name: String,
    progress: ExecutionProgress,
    failed_test: Option<RoutineType>,
    in_warning_state: bool,
}

impl RoutineGroup {
    pub fn new<S: Into<String>>(routine_properties: Vec<RoutineProperties>, group_name: S) -> Self {
        let routines = routine_properties.iter().map(|p| p.routine).collect();
        let non_blocking_routines = routine_properties
            .iter()
            .filter(|p| !p.blocking)
            .map(|p| p.routine)
            .collect();
        Self {
            routine_properties: Arc::new(routine_properties),
            routines,
            non_blocking_routines,
            group_name: group_name.into(),
            progress: ExecutionProgress::NotStarted,
            failed_test: None,
            in_warning_state: false,
        }
    }

    pub fn add_routine(&mut self, props: RoutineProperties) {
        self.routines.push(props.routine);
        if !props.blocking {
            self.non_blocking_routines.insert(props.routine);
        }
        Arc::make_mut(&mut self.routine_properties).push(props);
    }

    /// Folds one routine status into the group's composite progress.
    pub fn set_status(&mut self, status: &ResultStatusItem) -> Result<(), Error> {
        if status.progress != ExecutionProgress::Completed {
            if !self.in_warning_state {
                self.progress = status.progress;
            }
            return Ok(());
        }

        let is_last_routine = self.routines.last() == Some(&status.routine);
        if normalize_result(status.result.as_ref())? == StandardRoutineResult::Failed {
            if self.failed_test.is_none() {
                self.failed_test = Some(status.routine);
            }
            if !self.non_blocking_routines.contains(&status.routine) {
                debug!(
                    "Blocking routine '{}' failed, finalizing group '{}'",
                    status.routine, self.group_name
                );
                self.progress = ExecutionProgress::Completed;
                return Ok(());
            }
            self.in_warning_state = true;
        }

        self.progress = if is_last_routine {
            ExecutionProgress::Completed
        } else if self.in_warning_state {
            ExecutionProgress::Warning
        } else {
            ExecutionProgress::Running
        };
        Ok(())
    }

    /// True when the first failure in the group came from a blocking routine.
    pub fn has_blocking_failure(&self) -> bool {
        match self.failed_test {
            Some(routine) => {
                !self.non_blocking_routines.contains(&routine) && !self.in_warning_state
            }
            None => false,
        }
    }

    pub fn mark_skipped(&mut self) {
        self.progress = ExecutionProgress::Skipped;
    }

    pub fn contains(&self, routine: RoutineType) -> bool {
        self.routines.contains(&routine)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.group_name
    }

    #[inline]
    pub fn routines(&self) -> &[RoutineType] {
        &self.routines
    }

    #[inline]
    pub fn routine_properties(&self) -> &[RoutineProperties] {
        &self.routine_properties
    }

    #[inline]
    pub fn progress(&self) -> ExecutionProgress {
        self.progress
    }

    #[inline]
    pub fn failed_test(&self) -> Option<RoutineType> {
        self.failed_test
    }

    #[inline]
    pub fn in_warning_state(&self) -> bool {
        self.in_warning_state
    }
}
