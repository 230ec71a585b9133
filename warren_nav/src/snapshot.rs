// Immutable, shareable engine state.
//
// A `Snapshot` wraps a frozen `Connectivity` in an `Arc`. Cloning a snapshot
// is a pointer copy; queries take `&self` and never write, so a snapshot can
// be read from any number of threads at once (`paths()` does exactly that
// with rayon).
//
// Mutation goes through `apply()`: clone the engine (grid chunks are shared,
// see `grid.rs`), replay a `MutationBatch` with dynamic regeneration
// deferred, flatten both partitions, and wrap the result as a new snapshot.
// The source snapshot is never touched, so callers can keep pathing against
// the old state while a speculative one is built, or branch several children
// off one parent.
//
// See also: `mutation.rs` for batch recording and merge rules,
// `connectivity.rs` for the engine, `debug.rs` for `DiagnosticView`.
//
// **Critical constraint: no hidden mutation on read.** Every partition is
// flattened before the engine is frozen; query paths only use the `&self`
// `find()`.

use crate::config::NavConfig;
use crate::connectivity::Connectivity;
use crate::debug::DiagnosticView;
use crate::domain::{Domain, Neighbors};
use crate::layout::MapLayout;
use crate::mutation::MutationBatch;
use crate::pathfinding::{self, Path};
use crate::types::{Color, Coord, Cost, Door};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A frozen, cheaply clonable navigation state.
#[derive(Clone, Debug)]
pub struct Snapshot {
    inner: Arc<Connectivity>,
}

impl Snapshot {
    /// Full rebuild from a layout.
    pub fn from_layout(layout: &MapLayout, config: &NavConfig) -> Self {
        let mut engine = Connectivity::from_layout(layout, config.grid_chunk_cells);
        engine.freeze();
        Self {
            inner: Arc::new(engine),
        }
    }

    /// An empty batch for this snapshot's domain.
    pub fn mutator(&self) -> MutationBatch {
        MutationBatch::new(self.domain())
    }

    /// Produce a new snapshot with `batch` applied. `self` is unchanged.
    ///
    /// Panics if the batch was built for a different domain, or if an edit
    /// violates its precondition against this state (e.g. a door operation
    /// on a cell that is not a door).
    pub fn apply(&self, batch: &MutationBatch) -> Snapshot {
        assert_eq!(
            batch.domain(),
            self.domain(),
            "mutation batch domain does not match snapshot domain"
        );
        let mut engine = Connectivity::clone(&self.inner);
        engine.begin_batch();
        batch.replay(&mut engine);
        let regenerated = engine.finish_batch();
        let (shared, total) = engine.shared_chunks(&self.inner);
        debug!(
            edits = batch.len(),
            regenerated, shared, total, "applied mutation batch"
        );
        Snapshot {
            inner: Arc::new(engine),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn domain(&self) -> Domain {
        self.inner.domain()
    }

    /// Cheapest path between two cells; see `pathfinding::find_path`.
    pub fn path(&self, src: Coord, dst: Coord) -> Path {
        pathfinding::find_path(&self.inner, src, dst)
    }

    /// Answer many independent path queries in parallel.
    pub fn paths(&self, queries: &[(Coord, Coord)]) -> Vec<Path> {
        queries
            .par_iter()
            .map(|&(src, dst)| self.path(src, dst))
            .collect()
    }

    pub fn path_exists(&self, src: Coord, dst: Coord) -> bool {
        self.inner.path_exists(src, dst)
    }

    pub fn is_door(&self, coord: Coord) -> bool {
        self.inner.is_door(coord)
    }

    pub fn is_passable(&self, coord: Coord) -> bool {
        self.inner.is_passable(coord)
    }

    pub fn is_transparent(&self, coord: Coord) -> bool {
        self.inner.is_transparent(coord)
    }

    pub fn move_cost(&self, from: Coord, to: Coord) -> f64 {
        self.inner.move_cost(from, to)
    }

    pub fn cost(&self, coord: Coord) -> Cost {
        self.inner.cost(coord)
    }

    pub fn color(&self, coord: Coord) -> Color {
        self.inner.color(coord)
    }

    pub fn adjacent(&self, coord: Coord) -> Neighbors {
        self.inner.adjacent(coord)
    }

    pub fn door(&self, coord: Coord) -> Option<Door> {
        self.inner.door(coord)
    }

    /// Every door, ordered by coordinate.
    pub fn get_doors(&self) -> &BTreeMap<Coord, Door> {
        self.inner.doors()
    }

    /// Read-only access to colors and partitions, for dumps and invariant
    /// checks.
    pub fn diagnostics(&self) -> &dyn DiagnosticView {
        &*self.inner
    }

    /// The current state as a layout (costs plus door table).
    pub fn to_layout(&self) -> MapLayout {
        self.inner.to_layout()
    }

    /// Grid chunks physically shared with `other`, out of this snapshot's
    /// total.
    pub fn shared_chunks(&self, other: &Snapshot) -> (usize, usize) {
        self.inner.shared_chunks(&other.inner)
    }
}
