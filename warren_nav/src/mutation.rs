// Deferred cell edits applied atomically by `Snapshot::apply()`.
//
// A `MutationBatch` records at most one `CellEdit` per cell, keyed by `Coord`
// in a `BTreeMap` so replay order is deterministic. Recording the same cell
// twice merges the two requests:
//
// - `set_cost` after `set_cost`: last write wins.
// - `create_door` / `remove_door`: last write wins over any earlier door edit.
//   `create_door` then `remove_door` on a cell that is not yet a door leaves
//   only the removal, which panics at replay because the cell is not a door.
// - door-state edits (`set_door_open`, `toggle_door_open`,
//   `set_door_open_cost`) fold into a pending `create_door` or door update,
//   so "create closed, then toggle" records "create open". Two toggles
//   cancel. A door-state edit after `remove_door` on the same cell panics.
// - mixing a cost edit and a door edit on one cell panics.
//
// Preconditions that need the engine state (is this cell a door?) are
// checked at replay, by the `Connectivity` edit that the record maps to.
// Preconditions visible from the edit alone (cell inside the domain, door
// open-cost not impassable) are checked at record time.
//
// See also: `snapshot.rs` for `apply()`, `connectivity.rs` for the edits
// themselves.

use crate::connectivity::Connectivity;
use crate::domain::Domain;
use crate::types::{Coord, Cost, PATH_COST_INFINITE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Requested change to a door's open state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenChange {
    Set(bool),
    Toggle,
}

impl OpenChange {
    /// The state after applying this change to `current`.
    pub fn resolve(self, current: bool) -> bool {
        match self {
            OpenChange::Set(open) => open,
            OpenChange::Toggle => !current,
        }
    }

    /// Compose `self` followed by `next` into one change (`None` = identity).
    fn then(self, next: OpenChange) -> Option<OpenChange> {
        match (self, next) {
            (_, OpenChange::Set(open)) => Some(OpenChange::Set(open)),
            (OpenChange::Set(open), OpenChange::Toggle) => Some(OpenChange::Set(!open)),
            (OpenChange::Toggle, OpenChange::Toggle) => None,
        }
    }
}

/// The net edit recorded for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellEdit {
    /// Change a non-door cell's terrain cost.
    SetCost(Cost),
    /// Turn the cell into a door.
    CreateDoor { open: bool, open_cost: Cost },
    /// Turn a door back into terrain with `new_cost`.
    RemoveDoor { new_cost: Cost },
    /// Change an existing door. `open_cost` is applied before `open`.
    UpdateDoor {
        open: Option<OpenChange>,
        open_cost: Option<Cost>,
    },
}

impl CellEdit {
    fn is_door_edit(&self) -> bool {
        !matches!(self, CellEdit::SetCost(_))
    }
}

/// A set of per-cell edits against one domain, replayed in coordinate order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationBatch {
    domain: Domain,
    #[serde(with = "crate::types::coord_map")]
    edits: BTreeMap<Coord, CellEdit>,
}

impl MutationBatch {
    /// An empty batch for maps over `domain`. Usually obtained from
    /// `Snapshot::mutator()`.
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            edits: BTreeMap::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// The net edit recorded for `coord`, if any.
    pub fn get(&self, coord: Coord) -> Option<CellEdit> {
        self.edits.get(&coord).copied()
    }

    /// Recorded edits in replay order.
    pub fn edits(&self) -> impl Iterator<Item = (Coord, CellEdit)> + '_ {
        self.edits.iter().map(|(&coord, &edit)| (coord, edit))
    }

    pub fn set_cost(&mut self, coord: Coord, cost: Cost) -> &mut Self {
        self.record(coord, CellEdit::SetCost(cost))
    }

    pub fn create_door(&mut self, coord: Coord, open: bool, open_cost: Cost) -> &mut Self {
        assert_open_cost(coord, open_cost);
        self.record(coord, CellEdit::CreateDoor { open, open_cost })
    }

    pub fn remove_door(&mut self, coord: Coord, new_cost: Cost) -> &mut Self {
        self.record(coord, CellEdit::RemoveDoor { new_cost })
    }

    pub fn set_door_open(&mut self, coord: Coord, open: bool) -> &mut Self {
        self.record(
            coord,
            CellEdit::UpdateDoor {
                open: Some(OpenChange::Set(open)),
                open_cost: None,
            },
        )
    }

    pub fn toggle_door_open(&mut self, coord: Coord) -> &mut Self {
        self.record(
            coord,
            CellEdit::UpdateDoor {
                open: Some(OpenChange::Toggle),
                open_cost: None,
            },
        )
    }

    pub fn set_door_open_cost(&mut self, coord: Coord, cost: Cost) -> &mut Self {
        assert_open_cost(coord, cost);
        self.record(
            coord,
            CellEdit::UpdateDoor {
                open: None,
                open_cost: Some(cost),
            },
        )
    }

    fn record(&mut self, coord: Coord, edit: CellEdit) -> &mut Self {
        assert!(
            self.domain.contains(coord),
            "edit at {coord} is outside domain {:?}",
            self.domain
        );
        let merged = match self.edits.get(&coord) {
            None => edit,
            Some(&previous) => merge(coord, previous, edit),
        };
        self.edits.insert(coord, merged);
        self
    }

    /// Run every recorded edit against `engine`, in coordinate order.
    pub(crate) fn replay(&self, engine: &mut Connectivity) {
        for (&coord, &edit) in &self.edits {
            match edit {
                CellEdit::SetCost(cost) => engine.set_cost(coord, cost),
                CellEdit::CreateDoor { open, open_cost } => {
                    engine.create_door(coord, open, open_cost);
                }
                CellEdit::RemoveDoor { new_cost } => engine.remove_door(coord, new_cost),
                CellEdit::UpdateDoor { open, open_cost } => {
                    assert!(engine.is_door(coord), "cell {coord} is not a door");
                    if let Some(cost) = open_cost {
                        engine.set_door_open_cost(coord, cost);
                    }
                    match open {
                        Some(OpenChange::Set(open)) => engine.set_door_open(coord, open),
                        Some(OpenChange::Toggle) => engine.toggle_door_open(coord),
                        None => {}
                    }
                }
            }
        }
    }
}

fn assert_open_cost(coord: Coord, cost: Cost) {
    assert!(
        cost != PATH_COST_INFINITE,
        "door at {coord} cannot have an impassable open cost"
    );
}

fn merge(coord: Coord, previous: CellEdit, next: CellEdit) -> CellEdit {
    assert!(
        previous.is_door_edit() == next.is_door_edit(),
        "cell {coord} mixes cost and door edits in one batch"
    );
    let CellEdit::UpdateDoor { open, open_cost } = next else {
        return next;
    };
    match previous {
        CellEdit::CreateDoor {
            open: was_open,
            open_cost: was_cost,
        } => CellEdit::CreateDoor {
            open: open.map_or(was_open, |change| change.resolve(was_open)),
            open_cost: open_cost.unwrap_or(was_cost),
        },
        CellEdit::UpdateDoor {
            open: prev_open,
            open_cost: prev_cost,
        } => CellEdit::UpdateDoor {
            open: match (prev_open, open) {
                (prev, None) => prev,
                (None, next) => next,
                (Some(prev), Some(next)) => prev.then(next),
            },
            open_cost: open_cost.or(prev_cost),
        },
        CellEdit::RemoveDoor { .. } => {
            panic!("door state edit at {coord} after remove_door in the same batch")
        }
        CellEdit::SetCost(_) => unreachable!("category checked above"),
    }
}
