use crate::app::group::RoutineGroup;
use crate::app::hooks::StatusObserver;
use crate::connection::{RoutineController, RoutineResultSink};
use crate::routine::{
    ExecutionProgress, ResultStatusItem, RoutineResult, RoutineResultInfo, RoutineType,
    StandardRoutineResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub(crate) type Request = (RoutineType, Box<dyn RoutineResultSink>);

/// Controller that hands every request to the test for manual resolution.
pub(crate) struct MockController {
    requests: UnboundedSender<Request>,
    supported: Vec<RoutineType>,
}

impl MockController {
    pub fn new() -> (Self, UnboundedReceiver<Request>) {
        Self::with_supported(Vec::new())
    }

    pub fn with_supported(supported: Vec<RoutineType>) -> (Self, UnboundedReceiver<Request>) {
        let (requests, receiver) = unbounded_channel();
        (
            Self {
                requests,
                supported,
            },
            receiver,
        )
    }
}

#[async_trait]
impl RoutineController for MockController {
    fn run_routine(&self, routine: RoutineType, sink: Box<dyn RoutineResultSink>) {
        // A closed receiver means the test stopped listening; the sink is dropped.
        let _ = self.requests.send((routine, sink));
    }

    async fn get_supported_routines(&self) -> Vec<RoutineType> {
        self.supported.clone()
    }
}

pub(crate) fn outcome(routine: RoutineType, outcome: StandardRoutineResult) -> RoutineResultInfo {
    RoutineResultInfo::new(routine, RoutineResult::simple(outcome))
}

pub(crate) fn completed(routine: RoutineType, outcome: StandardRoutineResult) -> ResultStatusItem {
    ResultStatusItem::completed(routine, RoutineResult::simple(outcome))
}

/// Status callback that records everything it sees.
pub(crate) fn recorder() -> (
    Arc<Mutex<Vec<ResultStatusItem>>>,
    impl FnMut(ResultStatusItem) + Send + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |item| sink.lock().unwrap().push(item))
}

/// Controller that answers synchronously from a fixed table of outcomes.
pub(crate) struct ImmediateController {
    outcomes: HashMap<RoutineType, StandardRoutineResult>,
    supported: Vec<RoutineType>,
    dispatched: Mutex<Vec<RoutineType>>,
}

impl ImmediateController {
    pub fn new(outcomes: Vec<(RoutineType, StandardRoutineResult)>) -> Self {
        let supported = outcomes.iter().map(|(routine, _)| *routine).collect();
        Self {
            outcomes: outcomes.into_iter().collect(),
            supported,
            dispatched: Mutex::new(Vec::new()),
        }
    }

    pub fn supporting(mut self, supported: Vec<RoutineType>) -> Self {
        self.supported = supported;
        self
    }

    pub fn dispatched(&self) -> Vec<RoutineType> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutineController for ImmediateController {
    fn run_routine(&self, routine: RoutineType, sink: Box<dyn RoutineResultSink>) {
        self.dispatched.lock().unwrap().push(routine);
        let result = self
            .outcomes
            .get(&routine)
            .copied()
            .unwrap_or(StandardRoutineResult::Passed);
        sink.on_result(outcome(routine, result)).unwrap();
    }

    async fn get_supported_routines(&self) -> Vec<RoutineType> {
        self.supported.clone()
    }
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub statuses: Vec<ResultStatusItem>,
    pub group_updates: Vec<Vec<RoutineGroup>>,
    pub completed: Vec<ExecutionProgress>,
}

impl StatusObserver for RecordingObserver {
    fn on_status(&mut self, item: &ResultStatusItem) {
        self.statuses.push(item.clone());
    }

    fn on_groups_updated(&mut self, groups: &[RoutineGroup]) {
        self.group_updates.push(groups.to_vec());
    }

    fn on_run_complete(&mut self, progress: ExecutionProgress) {
        self.completed.push(progress);
    }
}
