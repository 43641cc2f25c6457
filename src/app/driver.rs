use crate::app::error::Error;
use crate::app::executor::RoutineListExecutor;
use crate::app::group::RoutineGroup;
use crate::app::hooks::StatusObserver;
use crate::app::projection::ResultsList;
use crate::connection::RoutineController;
use crate::routine::{ExecutionProgress, ResultStatusItem, RoutineType};
use derivative::*;
use serde_derive::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Final state of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: uuid::Uuid,
    pub progress: ExecutionProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_test: Option<RoutineType>,
    pub results: ResultsList,
}

/// Drives flat routine lists or routine groups through one executor.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct RoutineRunner {
    #[derivative(Debug = "ignore")]
    controller: Arc<dyn RoutineController>,
    executor: Arc<RoutineListExecutor>,
}

impl RoutineRunner {
    pub fn new(controller: Arc<dyn RoutineController>) -> Self {
        let executor = Arc::new(RoutineListExecutor::new(controller.clone()));
        Self {
            controller,
            executor,
        }
    }

    /// Handle used to cancel or close the run from outside.
    pub fn executor(&self) -> Arc<RoutineListExecutor> {
        self.executor.clone()
    }

    async fn supported(&self) -> HashSet<RoutineType> {
        self.controller
            .get_supported_routines()
            .await
            .into_iter()
            .collect()
    }

    pub async fn filter_supported_routines(&self, routines: Vec<RoutineType>) -> Vec<RoutineType> {
        let supported = self.supported().await;
        routines
            .into_iter()
            .filter(|routine| {
                let keep = supported.contains(routine);
                if !keep {
                    info!("Routine '{}' is not supported, dropping it", routine);
                }
                keep
            })
            .collect()
    }

    /// Rebuilds every group with its supported routines only; groups left
    /// without routines are dropped.
    pub async fn filter_supported_groups(&self, groups: Vec<RoutineGroup>) -> Vec<RoutineGroup> {
        let supported = self.supported().await;
        groups
            .into_iter()
            .filter_map(|group| {
                let mut filtered = RoutineGroup::new(Vec::new(), group.name());
                for props in group.routine_properties() {
                    if supported.contains(&props.routine) {
                        filtered.add_routine(props.clone());
                    } else {
                        info!("Routine '{}' is not supported, dropping it", props.routine);
                    }
                }
                if filtered.routines().is_empty() {
                    info!("Group '{}' has no supported routines, dropping it", group.name());
                    None
                } else {
                    Some(filtered)
                }
            })
            .collect()
    }

    pub async fn run_routines(
        &self,
        routines: Vec<RoutineType>,
        observer: &mut dyn StatusObserver,
    ) -> Result<RunSummary, Error> {
        let run_id = uuid::Uuid::new_v4();
        let routines = self.filter_supported_routines(routines).await;
        if routines.is_empty() {
            return Err(Error::EmptyRoutineList);
        }
        info!("Starting run {} with {} routines", run_id, routines.len());

        let mut list = ResultsList::initialize_routines(&routines);
        let mut failure = None;
        let progress = self
            .executor
            .run_routines(&routines, |item| {
                forward(&mut list, &mut failure, observer, item)
            })
            .await?;
        if let Some(e) = failure {
            return Err(e);
        }
        observer.on_run_complete(progress);
        summarize(run_id, progress, list)
    }

    /// Runs groups one after another. A blocking failure in a group skips
    /// every group that has not started yet.
    pub async fn run_groups(
        &self,
        groups: Vec<RoutineGroup>,
        observer: &mut dyn StatusObserver,
    ) -> Result<RunSummary, Error> {
        let run_id = uuid::Uuid::new_v4();
        let groups = self.filter_supported_groups(groups).await;
        if groups.is_empty() {
            return Err(Error::EmptyRoutineList);
        }
        info!("Starting run {} with {} groups", run_id, groups.len());

        let mut list = ResultsList::initialize_groups(groups);
        observer.on_groups_updated(list.groups());
        let mut progress = ExecutionProgress::NotStarted;
        for index in 0..list.groups().len() {
            let group = &list.groups()[index];
            if group.progress() != ExecutionProgress::NotStarted {
                continue;
            }
            info!("Running group '{}'", group.name());
            let routines = group.routines().to_vec();
            list.begin_group(index);
            let mut failure = None;
            progress = self
                .executor
                .run_routines(&routines, |item| {
                    forward(&mut list, &mut failure, observer, item)
                })
                .await?;
            if let Some(e) = failure {
                return Err(e);
            }

            let group = &list.groups()[index];
            if group.has_blocking_failure() {
                warn!(
                    "Group '{}' failed on blocking routine '{:?}', stopping",
                    group.name(),
                    group.failed_test()
                );
                if list.skip_remaining() > 0 {
                    observer.on_groups_updated(list.groups());
                }
                progress = ExecutionProgress::Completed;
                break;
            }
        }
        observer.on_run_complete(progress);
        summarize(run_id, progress, list)
    }
}

/// Applies one executor event to the list and forwards it when accepted.
/// The first classification error is kept and later events are ignored.
fn forward(
    list: &mut ResultsList,
    failure: &mut Option<Error>,
    observer: &mut dyn StatusObserver,
    item: ResultStatusItem,
) {
    if failure.is_some() {
        return;
    }
    match list.on_status(&item) {
        Ok(true) => {
            observer.on_status(&item);
            if !list.groups().is_empty() {
                observer.on_groups_updated(list.groups());
            }
        }
        Ok(false) => {}
        Err(e) => {
            error!("Failed to apply status of '{}': {}", item.routine, e);
            *failure = Some(e);
        }
    }
}

fn summarize(
    run_id: uuid::Uuid,
    progress: ExecutionProgress,
    list: ResultsList,
) -> Result<RunSummary, Error> {
    let (failed_group, failed_test) = match list.first_failure()? {
        Some((group, routine)) => (group, Some(routine)),
        None => (None, None),
    };
    Ok(RunSummary {
        run_id,
        progress,
        failed_group,
        failed_test,
        results: list,
    })
}
