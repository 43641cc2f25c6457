use crate::app::context::ExecutionContext;
use crate::app::error::Error;
use crate::connection::RoutineController;
use crate::routine::{ExecutionProgress, ResultStatusItem, RoutineType};
use derivative::*;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ExecutorState {
    cancelled: bool,
    current: Option<Arc<ExecutionContext>>,
}

/// Runs routines strictly one at a time against a controller.
///
/// Cancellation is sticky: once `cancel` was called every routine that has not
/// started yet is reported as cancelled without being dispatched.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct RoutineListExecutor {
    #[derivative(Debug = "ignore")]
    controller: Arc<dyn RoutineController>,
    state: Mutex<ExecutorState>,
}

impl RoutineListExecutor {
    pub fn new(controller: Arc<dyn RoutineController>) -> Self {
        Self {
            controller,
            state: Mutex::new(ExecutorState::default()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        lock!(self.state).cancelled
    }

    /// Runs `routines` in order, reporting `Running` and then exactly one
    /// terminal status for each of them.
    ///
    /// Resolves with the terminal progress of the last routine.
    pub async fn run_routines<F>(
        &self,
        routines: &[RoutineType],
        mut on_status: F,
    ) -> Result<ExecutionProgress, Error>
    where
        F: FnMut(ResultStatusItem),
    {
        if routines.is_empty() {
            return Err(Error::EmptyRoutineList);
        }
        let mut last = ExecutionProgress::NotStarted;
        for &routine in routines {
            if self.is_cancelled() {
                debug!("Skipping '{}', run was cancelled", routine);
                on_status(ResultStatusItem::new(routine, ExecutionProgress::Cancelled));
                last = ExecutionProgress::Cancelled;
                continue;
            }

            on_status(ResultStatusItem::new(routine, ExecutionProgress::Running));
            let context = Arc::new(ExecutionContext::new(routine));
            let dispatch = {
                let mut state = lock!(self.state);
                if state.cancelled {
                    false
                } else {
                    state.current = Some(context.clone());
                    true
                }
            };
            if dispatch {
                context.start(self.controller.as_ref());
            } else {
                context.cancel();
            }

            let completion = context.when_complete().await;
            self.release(&context);
            match completion? {
                None => {
                    warn!("Routine '{}' was cancelled", routine);
                    lock!(self.state).cancelled = true;
                    on_status(ResultStatusItem::new(routine, ExecutionProgress::Cancelled));
                    last = ExecutionProgress::Cancelled;
                }
                Some(info) => {
                    if info.routine != routine {
                        error!(
                            "Controller answered '{}' for requested '{}'",
                            info.routine, routine
                        );
                        return Err(Error::ProtocolMismatch {
                            expected: routine,
                            actual: info.routine,
                        });
                    }
                    debug!("Routine '{}' completed with {:?}", routine, info.result);
                    on_status(ResultStatusItem::completed(routine, info.result));
                    last = ExecutionProgress::Completed;
                }
            }
        }
        Ok(last)
    }

    /// Records cancellation and resolves the outstanding invocation, if any.
    pub fn cancel(&self) {
        let mut state = lock!(self.state);
        if !state.cancelled {
            info!("Cancelling routine run");
        }
        state.cancelled = true;
        if let Some(context) = &state.current {
            context.cancel();
        }
    }

    /// Releases the outstanding invocation without touching finished routines.
    pub fn close(&self) {
        let current = lock!(self.state).current.take();
        if let Some(context) = current {
            debug!("Closing outstanding invocation of '{}'", context.routine());
            context.close();
        }
    }

    fn release(&self, context: &Arc<ExecutionContext>) {
        let mut state = lock!(self.state);
        if matches!(&state.current, Some(current) if Arc::ptr_eq(current, context)) {
            state.current = None;
        }
        drop(state);
        context.close();
    }
}
