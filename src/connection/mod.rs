pub mod scripted;

use crate::app::error::Error;
use crate::routine::{RoutineResultInfo, RoutineType};
use async_trait::async_trait;

pub use self::scripted::ScriptedController;

/// Receives the outcome of a single `run_routine` request.
///
/// The sink is consumed on delivery, so each one can be resolved at most once.
pub trait RoutineResultSink: Send {
    fn on_result(self: Box<Self>, info: RoutineResultInfo) -> Result<(), Error>;
}

/// Remote service that actually executes diagnostic routines.
#[async_trait]
pub trait RoutineController: Send + Sync {
    /// Fire-and-forget request. The controller calls `sink` once when the
    /// routine finishes, or never if it goes away.
    fn run_routine(&self, routine: RoutineType, sink: Box<dyn RoutineResultSink>);

    async fn get_supported_routines(&self) -> Vec<RoutineType>;
}
