use crate::app::error::Error;
use crate::connection::{RoutineController, RoutineResultSink};
use crate::routine::{RoutineResultInfo, RoutineType};
use derivative::*;
use futures::channel::oneshot;
use std::sync::{Arc, Mutex};

/// `None` means the invocation was cancelled before a result arrived.
type Completion = Option<RoutineResultInfo>;
type SettleSlot = Arc<Mutex<Option<oneshot::Sender<Completion>>>>;

/// One outstanding routine invocation and its single-fire completion.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ExecutionContext {
    routine: RoutineType,
    #[derivative(Debug = "ignore")]
    slot: SettleSlot,
    #[derivative(Debug = "ignore")]
    receiver: Mutex<Option<oneshot::Receiver<Completion>>>,
}

struct ContextSink {
    routine: RoutineType,
    slot: SettleSlot,
}

/// Resolves the slot if nobody did it before; returns whether this call won.
fn settle(slot: &SettleSlot, completion: Completion) -> bool {
    let sender = lock!(slot).take();
    match sender {
        Some(sender) => {
            // The receiver may already be gone if the context was dropped.
            let _ = sender.send(completion);
            true
        }
        None => false,
    }
}

impl RoutineResultSink for ContextSink {
    fn on_result(self: Box<Self>, info: RoutineResultInfo) -> Result<(), Error> {
        trace!("Result delivered for '{}': {:?}", self.routine, info.result);
        if settle(&self.slot, Some(info)) {
            Ok(())
        } else {
            error!("Rejected second resolution of '{}'", self.routine);
            Err(Error::AlreadySettled(self.routine))
        }
    }
}

impl ExecutionContext {
    pub fn new(routine: RoutineType) -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            routine,
            slot: Arc::new(Mutex::new(Some(sender))),
            receiver: Mutex::new(Some(receiver)),
        }
    }

    #[inline]
    pub fn routine(&self) -> RoutineType {
        self.routine
    }

    /// Issues the invocation, handing the controller a sink bound to this context.
    pub fn start(&self, controller: &dyn RoutineController) {
        trace!("Dispatching '{}' to controller", self.routine);
        let sink = ContextSink {
            routine: self.routine,
            slot: self.slot.clone(),
        };
        controller.run_routine(self.routine, Box::new(sink));
    }

    /// Waits for the result, or `None` when cancelled or closed first.
    pub async fn when_complete(&self) -> Result<Completion, Error> {
        let receiver = lock!(self.receiver).take();
        match receiver {
            Some(receiver) => Ok(receiver.await.unwrap_or(None)),
            None => Err(Error::AlreadyAwaited(self.routine)),
        }
    }

    pub fn cancel(&self) {
        if settle(&self.slot, None) {
            debug!("Cancelled pending invocation of '{}'", self.routine);
        }
    }

    /// Drops the handle the controller would resolve. Safe to call repeatedly.
    pub fn close(&self) {
        if lock!(self.slot).take().is_some() {
            trace!("Closed context of '{}'", self.routine);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::MockController;
    use crate::routine::{RoutineResult, StandardRoutineResult};

    fn passed(routine: RoutineType) -> RoutineResultInfo {
        RoutineResultInfo::new(routine, RoutineResult::simple(StandardRoutineResult::Passed))
    }

    #[tokio::test]
    async fn test_resolves_with_delivered_result() {
        let (controller, mut requests) = MockController::new();
        let context = ExecutionContext::new(RoutineType::CpuStress);

        context.start(&controller);
        let (routine, sink) = requests.recv().await.unwrap();
        assert_eq!(routine, RoutineType::CpuStress);
        sink.on_result(passed(routine)).unwrap();

        let completion = context.when_complete().await.unwrap();
        assert_eq!(completion, Some(passed(RoutineType::CpuStress)));
    }

    #[tokio::test]
    async fn test_cancel_resolves_with_none_and_rejects_late_result() {
        let (controller, mut requests) = MockController::new();
        let context = ExecutionContext::new(RoutineType::Memory);

        context.start(&controller);
        let (routine, sink) = requests.recv().await.unwrap();
        context.cancel();

        assert_eq!(context.when_complete().await.unwrap(), None);
        let late = sink.on_result(passed(routine));
        assert!(matches!(late, Err(Error::AlreadySettled(RoutineType::Memory))));
    }

    #[tokio::test]
    async fn test_cancel_after_result_is_noop() {
        let (controller, mut requests) = MockController::new();
        let context = ExecutionContext::new(RoutineType::DnsLatency);

        context.start(&controller);
        let (routine, sink) = requests.recv().await.unwrap();
        sink.on_result(passed(routine)).unwrap();
        context.cancel();

        assert_eq!(
            context.when_complete().await.unwrap(),
            Some(passed(RoutineType::DnsLatency))
        );
    }

    #[tokio::test]
    async fn test_second_await_is_rejected() {
        let context = ExecutionContext::new(RoutineType::CpuCache);
        context.cancel();

        assert_eq!(context.when_complete().await.unwrap(), None);
        assert!(matches!(
            context.when_complete().await,
            Err(Error::AlreadyAwaited(RoutineType::CpuCache))
        ));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_releases_waiter() {
        let context = ExecutionContext::new(RoutineType::CpuPrime);
        context.close();
        context.close();

        assert_eq!(context.when_complete().await.unwrap(), None);
    }
}
