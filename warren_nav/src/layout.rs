// Initial map description handed to a full rebuild.
//
// A `MapLayout` is the engine's input boundary: one cost per cell plus an
// ordered door table. It carries no colors or partitions; those are derived
// by `Connectivity::from_layout()`. Layouts come from the text loader
// (`map_text.rs`), from code (tests, generators), or from an existing
// snapshot (`Snapshot::to_layout()`), which is how a from-scratch rebuild of
// the current state is produced.
//
// A door entry overrides the cell's cost: the engine derives a door cell's
// cost from its open state.

use crate::domain::Domain;
use crate::types::{Coord, Cost, Door, PATH_COST_INFINITE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Costs and doors for every cell of a domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLayout {
    domain: Domain,
    costs: Vec<Cost>,
    #[serde(with = "crate::types::coord_map")]
    doors: BTreeMap<Coord, Door>,
}

impl MapLayout {
    /// A layout with every cell at `fill` and no doors.
    pub fn new(domain: Domain, fill: Cost) -> Self {
        Self {
            domain,
            costs: vec![fill; domain.len()],
            doors: BTreeMap::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Set a cell's terrain cost. Panics if `coord` is outside the domain.
    pub fn set_cost(&mut self, coord: Coord, cost: Cost) -> &mut Self {
        let index = self.domain.index(coord);
        self.costs[index] = cost;
        self
    }

    /// Mark `coord` as a door. Panics if `coord` is outside the domain or
    /// `cost_when_open` is the impassable cost.
    pub fn add_door(&mut self, coord: Coord, open: bool, cost_when_open: Cost) -> &mut Self {
        assert!(
            cost_when_open != PATH_COST_INFINITE,
            "door at {coord} cannot have an impassable open cost"
        );
        assert!(
            self.domain.contains(coord),
            "door at {coord} is outside domain {:?}",
            self.domain
        );
        self.doors.insert(coord, Door::new(open, cost_when_open));
        self
    }

    /// Terrain cost of `coord`, ignoring any door entry.
    pub fn cost(&self, coord: Coord) -> Cost {
        self.costs[self.domain.index(coord)]
    }

    pub fn door(&self, coord: Coord) -> Option<Door> {
        self.doors.get(&coord).copied()
    }

    pub fn doors(&self) -> &BTreeMap<Coord, Door> {
        &self.doors
    }
}
