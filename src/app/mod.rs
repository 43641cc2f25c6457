macro_rules! lock {
    ($name: expr) => {
        match $name.lock() {
            Ok(locked) => locked,
            Err(e) => panic!("{:#?}", e),
        }
    };
}

pub(crate) mod context;
pub(crate) mod driver;
pub(crate) mod error;
pub(crate) mod executor;
pub(crate) mod group;
pub(crate) mod hooks;
pub(crate) mod projection;
#[cfg(test)]
pub(crate) mod testing;

use crate::app::driver::{RoutineRunner, RunSummary};
use crate::app::error::Error;
use crate::app::executor::RoutineListExecutor;
use crate::app::hooks::LoggingObserver;
use crate::configuration::manifest::{Manifest, RunPlan};
use crate::connection::ScriptedController;
use std::sync::Arc;
use std::time::Duration;

pub struct App {
    name: String,
    plan: RunPlan,
    runner: RoutineRunner,
    timeout: Option<Duration>,
}

impl App {
    /// `groups` narrows a grouped manifest; `timeout` overrides the manifest's.
    pub fn new(
        manifest: Manifest,
        groups: &[String],
        timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        let controller = ScriptedController::from_entries(&manifest.controller_entries())?;
        let plan = manifest.plan(groups)?;
        Ok(App {
            timeout: timeout.or(manifest.timeout),
            name: manifest.name,
            plan,
            runner: RoutineRunner::new(Arc::new(controller)),
        })
    }

    pub fn executor(&self) -> Arc<RoutineListExecutor> {
        self.runner.executor()
    }

    pub async fn run(self) -> Result<RunSummary, Error> {
        info!("Starting pipeline '{}'", self.name);
        let watchdog = self.timeout.map(|timeout| {
            let executor = self.runner.executor();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                warn!("Run exceeded {:?}, cancelling", timeout);
                executor.cancel();
            })
        });

        let mut observer = LoggingObserver::default();
        let result = match self.plan {
            RunPlan::Routines(routines) => {
                info!("Registered {} routines", routines.len());
                self.runner.run_routines(routines, &mut observer).await
            }
            RunPlan::Groups(groups) => {
                info!("Registered {} groups", groups.len());
                self.runner.run_groups(groups, &mut observer).await
            }
        };

        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }
        self.runner.executor().close();
        result
    }
}
