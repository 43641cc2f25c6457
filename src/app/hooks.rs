use crate::app::group::RoutineGroup;
use crate::routine::{ExecutionProgress, ResultStatusItem};

/// Presentation-side consumer of run progress.
pub trait StatusObserver {
    fn on_status(&mut self, item: &ResultStatusItem);

    /// Called with fresh group snapshots after every forwarded grouped update.
    fn on_groups_updated(&mut self, _groups: &[RoutineGroup]) {}

    fn on_run_complete(&mut self, progress: ExecutionProgress);
}

/// Observer that reports every transition through the logger.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl StatusObserver for LoggingObserver {
    fn on_status(&mut self, item: &ResultStatusItem) {
        match &item.result {
            Some(result) => info!("{}: {:?} ({:?})", item.routine, item.progress, result),
            None => info!("{}: {:?}", item.routine, item.progress),
        }
    }

    fn on_groups_updated(&mut self, groups: &[RoutineGroup]) {
        for group in groups {
            debug!("Group '{}' is {:?}", group.name(), group.progress());
        }
    }

    fn on_run_complete(&mut self, progress: ExecutionProgress) {
        info!("Run finished with {:?}", progress);
    }
}
