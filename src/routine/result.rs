use crate::app::error::Error;
use crate::routine::RoutineType;
use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardRoutineResult {
    Passed,
    Failed,
    ExecutionError,
    UnableToRun,
    NotRun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRoutineResult {
    pub simple_result: StandardRoutineResult,
    #[serde(default)]
    pub is_charging: bool,
    #[serde(default)]
    pub percent_delta: f64,
    #[serde(default)]
    pub time_delta_seconds: i64,
}

/// Outcome of one routine execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineResult {
    Simple(StandardRoutineResult),
    Power(PowerRoutineResult),
}

/// A result as it arrives from configuration, before its variant is known.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutineResultRecord {
    pub simple: Option<StandardRoutineResult>,
    pub power: Option<PowerRoutineResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineResultInfo {
    pub routine: RoutineType,
    pub result: RoutineResult,
}

impl RoutineResult {
    pub fn simple(outcome: StandardRoutineResult) -> Self {
        RoutineResult::Simple(outcome)
    }

    pub fn power(
        outcome: StandardRoutineResult,
        is_charging: bool,
        percent_delta: f64,
        time_delta_seconds: i64,
    ) -> Self {
        RoutineResult::Power(PowerRoutineResult {
            simple_result: outcome,
            is_charging,
            percent_delta,
            time_delta_seconds,
        })
    }
}

impl TryFrom<RoutineResultRecord> for RoutineResult {
    type Error = Error;

    fn try_from(record: RoutineResultRecord) -> Result<Self, Self::Error> {
        match (record.simple, record.power) {
            (Some(outcome), None) => Ok(RoutineResult::Simple(outcome)),
            (None, Some(power)) => Ok(RoutineResult::Power(power)),
            _ => Err(Error::UnclassifiableResult),
        }
    }
}

impl RoutineResultInfo {
    pub fn new(routine: RoutineType, result: RoutineResult) -> Self {
        Self { routine, result }
    }
}

/// Reduces any result variant to its standard outcome.
///
/// A missing result means the caller asked about a routine that never
/// completed, which is reported rather than guessed.
pub fn normalize_result(result: Option<&RoutineResult>) -> Result<StandardRoutineResult, Error> {
    match result {
        Some(RoutineResult::Simple(outcome)) => Ok(*outcome),
        Some(RoutineResult::Power(power)) => Ok(power.simple_result),
        None => Err(Error::MissingResult),
    }
}
