use crate::app::group::RoutineGroup;
use crate::routine::{RoutineProperties, RoutineResultRecord, RoutineType};
use config::{Config, ConfigError, File};
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default, with = "crate::configuration::deserialize::duration::option")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub routines: Vec<RoutineType>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    #[serde(default)]
    pub controller: Vec<ControllerEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GroupEntry {
    pub name: String,
    pub routines: Vec<RoutineProperties>,
}

/// Outcome the scripted controller delivers for one routine.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerEntry {
    pub routine: RoutineType,
    pub result: RoutineResultRecord,
    #[serde(default, with = "crate::configuration::deserialize::duration")]
    pub delay: Duration,
    #[serde(default = "default_respond")]
    pub respond: bool,
}

fn default_respond() -> bool {
    true
}

/// What a manifest asks to run.
#[derive(Debug)]
pub enum RunPlan {
    Routines(Vec<RoutineType>),
    Groups(Vec<RoutineGroup>),
}

impl Manifest {
    pub fn from(file: PathBuf) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(file))
            .build()?
            .try_deserialize()
    }

    pub fn controller_entries(&self) -> HashMap<RoutineType, ControllerEntry> {
        self.controller
            .iter()
            .map(|entry| (entry.routine, entry.clone()))
            .collect()
    }

    /// Builds the run plan, keeping only the groups named in `only` when it is
    /// not empty.
    pub fn plan(&self, only: &[String]) -> Result<RunPlan, ConfigError> {
        match (self.routines.is_empty(), self.groups.is_empty()) {
            (false, true) => Ok(RunPlan::Routines(self.routines.clone())),
            (true, false) => {
                let groups: Vec<RoutineGroup> = self
                    .groups
                    .iter()
                    .filter(|entry| only.is_empty() || only.contains(&entry.name))
                    .map(|entry| RoutineGroup::new(entry.routines.clone(), entry.name.as_str()))
                    .collect();
                if groups.is_empty() {
                    return Err(ConfigError::Message(format!(
                        "none of the groups {:?} is defined in '{}'",
                        only, self.name
                    )));
                }
                Ok(RunPlan::Groups(groups))
            }
            (true, true) => Err(ConfigError::Message(format!(
                "manifest '{}' defines neither routines nor groups",
                self.name
            ))),
            (false, false) => Err(ConfigError::Message(format!(
                "manifest '{}' defines both routines and groups",
                self.name
            ))),
        }
    }
}
