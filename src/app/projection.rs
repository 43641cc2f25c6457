use crate::app::error::Error;
use crate::app::group::RoutineGroup;
use crate::routine::{
    normalize_result, ExecutionProgress, ResultStatusItem, RoutineType, StandardRoutineResult,
};
use serde_derive::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entries {
    Routines(Vec<ResultStatusItem>),
    Groups(Vec<RoutineGroup>),
}

/// Maps routine status events onto the list a results view displays.
///
/// Every applied update replaces the stored entry with a new value, so
/// previously handed out snapshots never change underneath their owner.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsList {
    entries: Entries,
    halted: bool,
    /// Group currently handed to the executor.
    #[serde(skip)]
    current: Option<usize>,
    /// First flat entry whose routine has not reached a terminal state.
    #[serde(skip)]
    cursor: usize,
}

impl ResultsList {
    pub fn initialize_routines(routines: &[RoutineType]) -> Self {
        Self {
            entries: Entries::Routines(
                routines
                    .iter()
                    .map(|routine| ResultStatusItem::not_started(*routine))
                    .collect(),
            ),
            halted: false,
            current: None,
            cursor: 0,
        }
    }

    pub fn initialize_groups(groups: Vec<RoutineGroup>) -> Self {
        Self {
            entries: Entries::Groups(groups),
            halted: false,
            current: None,
            cursor: 0,
        }
    }

    /// Routes following updates to the group at `index`.
    pub fn begin_group(&mut self, index: usize) {
        self.current = Some(index);
    }

    /// Applies `status`, returning whether it should be forwarded.
    ///
    /// Flat lists are updated in run order, so a routine listed twice fills
    /// its entries one after another. Grouped lists apply the update to the
    /// group passed to [`begin_group`](Self::begin_group). Once a group
    /// reports a blocking failure no further update is applied and every
    /// group that has not started is marked skipped.
    pub fn on_status(&mut self, status: &ResultStatusItem) -> Result<bool, Error> {
        if self.halted {
            trace!("Dropping update for '{}' after blocking failure", status.routine);
            return Ok(false);
        }
        match &mut self.entries {
            Entries::Routines(items) => {
                let found = items
                    .iter()
                    .skip(self.cursor)
                    .position(|item| item.routine == status.routine);
                let index = match found {
                    Some(offset) => self.cursor + offset,
                    None => return Ok(false),
                };
                items[index] = status.clone();
                if matches!(
                    status.progress,
                    ExecutionProgress::Completed | ExecutionProgress::Cancelled
                ) {
                    self.cursor = index + 1;
                }
                Ok(true)
            }
            Entries::Groups(groups) => {
                let index = match self.current {
                    Some(index)
                        if groups
                            .get(index)
                            .map_or(false, |group| group.contains(status.routine)) =>
                    {
                        index
                    }
                    _ => {
                        trace!("Update for '{}' matches no running group", status.routine);
                        return Ok(false);
                    }
                };
                let mut group = groups[index].clone();
                group.set_status(status)?;
                let blocking = group.has_blocking_failure();
                groups[index] = group;
                if blocking {
                    self.halted = true;
                    self.skip_remaining();
                }
                Ok(true)
            }
        }
    }

    /// Marks all not yet started groups as skipped, returning how many changed.
    pub fn skip_remaining(&mut self) -> usize {
        let groups = match &mut self.entries {
            Entries::Groups(groups) => groups,
            Entries::Routines(_) => return 0,
        };
        let mut skipped = 0;
        for group in groups
            .iter_mut()
            .filter(|group| group.progress() == ExecutionProgress::NotStarted)
        {
            warn!("Skipping group '{}'", group.name());
            let mut snapshot = group.clone();
            snapshot.mark_skipped();
            *group = snapshot;
            skipped += 1;
        }
        skipped
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn items(&self) -> &[ResultStatusItem] {
        match &self.entries {
            Entries::Routines(items) => items,
            Entries::Groups(_) => &[],
        }
    }

    pub fn groups(&self) -> &[RoutineGroup] {
        match &self.entries {
            Entries::Groups(groups) => groups,
            Entries::Routines(_) => &[],
        }
    }

    /// The first failure shown in the list, with its group name when grouped.
    pub fn first_failure(&self) -> Result<Option<(Option<String>, RoutineType)>, Error> {
        match &self.entries {
            Entries::Groups(groups) => Ok(groups.iter().find_map(|group| {
                group
                    .failed_test()
                    .map(|routine| (Some(group.name().to_owned()), routine))
            })),
            Entries::Routines(items) => {
                for item in items {
                    if item.progress == ExecutionProgress::Completed
                        && normalize_result(item.result.as_ref())? == StandardRoutineResult::Failed
                    {
                        return Ok(Some((None, item.routine)));
                    }
                }
                Ok(None)
            }
        }
    }
}
