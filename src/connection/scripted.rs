use crate::app::error::Error;
use crate::configuration::manifest::ControllerEntry;
use crate::connection::{RoutineController, RoutineResultSink};
use crate::routine::{RoutineResult, RoutineResultInfo, RoutineType, StandardRoutineResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::time::Duration;

#[derive(Debug, Clone)]
struct ScriptedRoutine {
    result: RoutineResult,
    delay: Duration,
    respond: bool,
}

/// Controller that replays outcomes declared in the manifest.
#[derive(Debug, Default)]
pub struct ScriptedController {
    script: HashMap<RoutineType, ScriptedRoutine>,
}

impl ScriptedController {
    pub fn from_entries(entries: &HashMap<RoutineType, ControllerEntry>) -> Result<Self, Error> {
        let mut script = HashMap::with_capacity(entries.len());
        for (routine, entry) in entries {
            let result = RoutineResult::try_from(entry.result.clone())?;
            script.insert(
                *routine,
                ScriptedRoutine {
                    result,
                    delay: entry.delay,
                    respond: entry.respond,
                },
            );
        }
        Ok(Self { script })
    }
}

#[async_trait]
impl RoutineController for ScriptedController {
    fn run_routine(&self, routine: RoutineType, sink: Box<dyn RoutineResultSink>) {
        let scripted = match self.script.get(&routine) {
            Some(scripted) => scripted.clone(),
            None => {
                warn!("Routine '{}' is not scripted, reporting unable to run", routine);
                ScriptedRoutine {
                    result: RoutineResult::simple(StandardRoutineResult::UnableToRun),
                    delay: Duration::default(),
                    respond: true,
                }
            }
        };
        if !scripted.respond {
            debug!("Routine '{}' is scripted to never respond", routine);
            // Keep the sink alive for the lifetime of the runtime so the
            // request stays outstanding until the caller cancels it.
            tokio::spawn(async move {
                let _sink = sink;
                futures::future::pending::<()>().await;
            });
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(scripted.delay).await;
            let info = RoutineResultInfo::new(routine, scripted.result);
            if let Err(e) = sink.on_result(info) {
                warn!("Result of '{}' was not accepted: {}", routine, e);
            }
        });
    }

    async fn get_supported_routines(&self) -> Vec<RoutineType> {
        let mut routines: Vec<RoutineType> = self.script.keys().copied().collect();
        routines.sort();
        routines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::RoutineResultRecord;
    use std::sync::{Arc, Mutex};

    struct CollectingSink(Arc<Mutex<Vec<RoutineResultInfo>>>);

    impl RoutineResultSink for CollectingSink {
        fn on_result(self: Box<Self>, info: RoutineResultInfo) -> Result<(), Error> {
            self.0.lock().unwrap().push(info);
            Ok(())
        }
    }

    fn entry(routine: RoutineType, outcome: StandardRoutineResult) -> ControllerEntry {
        ControllerEntry {
            routine,
            result: RoutineResultRecord {
                simple: Some(outcome),
                power: None,
            },
            delay: Duration::from_millis(5),
            respond: true,
        }
    }

    #[tokio::test]
    async fn test_supported_routines_are_scripted_ones() {
        let mut entries = HashMap::new();
        entries.insert(
            RoutineType::CpuCache,
            entry(RoutineType::CpuCache, StandardRoutineResult::Passed),
        );
        entries.insert(
            RoutineType::CpuStress,
            entry(RoutineType::CpuStress, StandardRoutineResult::Failed),
        );
        let controller = ScriptedController::from_entries(&entries).unwrap();

        let supported = controller.get_supported_routines().await;

        assert_eq!(supported, vec![RoutineType::CpuStress, RoutineType::CpuCache]);
    }

    #[tokio::test]
    async fn test_delivers_scripted_result_after_delay() {
        let mut entries = HashMap::new();
        entries.insert(
            RoutineType::Memory,
            entry(RoutineType::Memory, StandardRoutineResult::Failed),
        );
        let controller = ScriptedController::from_entries(&entries).unwrap();
        let collected = Arc::new(Mutex::new(Vec::new()));

        controller.run_routine(RoutineType::Memory, Box::new(CollectingSink(collected.clone())));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let collected = collected.lock().unwrap();
        assert_eq!(
            *collected,
            vec![RoutineResultInfo::new(
                RoutineType::Memory,
                RoutineResult::simple(StandardRoutineResult::Failed)
            )]
        );
    }

    #[test]
    fn test_unclassifiable_entry_is_rejected() {
        let mut entries = HashMap::new();
        entries.insert(
            RoutineType::Memory,
            ControllerEntry {
                routine: RoutineType::Memory,
                result: RoutineResultRecord::default(),
                delay: Duration::default(),
                respond: true,
            },
        );
        let result = ScriptedController::from_entries(&entries);
        assert!(matches!(result, Err(Error::UnclassifiableResult)));
    }
}
