// Incremental connectivity engine.
//
// `Connectivity` owns the cost grid, the color grid, the door table, and two
// union-find partitions over colors:
//
// - **static**: connectivity through walls/floors only. Two ordinary colors
//   share a static set iff their cells are joined by orthogonal moves over
//   transparent (non-door, passable) cells. Doors are static singletons.
// - **dynamic**: the static partition plus, for every open door, a union of
//   the door's color with each passable orthogonal neighbor's color. Two
//   passable cells are mutually reachable iff their colors share a dynamic
//   set. This is the O(1) answer to `path_exists`.
//
// Colors partition cells: a maximal orthogonal region of transparent cells
// starts with one ordinary color, and later edits may merge several colors
// into one static set (union-find cannot split, so a split is handled by
// re-coloring the pieces). Every door has its own negative color. Walls carry
// `Color::IMPASSABLE`.
//
// ## Structural transitions
//
// Each public edit is composed from private primitives:
//
//   wall -> transparent      adopt a neighbor's color, union with the rest
//   transparent -> wall      local simple-point test; re-flood pieces if the
//                            cell may have been a cut vertex
//   wall -> closed door      fresh door color, door table entry
//   closed -> open door      dynamic union with passable neighbors
//   open -> closed door      dynamic partition regenerated
//   closed door -> wall      drop door entry
//
// Only closing a door or splitting a region can *remove* a dynamic
// connection. Both invalidate the dynamic partition, which is rebuilt from
// the static one plus all open doors. During a mutation batch the rebuild is
// deferred to the end of the batch (`begin_batch` / `finish_batch`), so a
// batch closing a hundred doors regenerates once.
//
// See also: `disjoint_set.rs` for the partitions, `mutation.rs` for the batch
// that drives these edits, `snapshot.rs` for the frozen, shareable wrapper.
//
// **Critical constraint: single writer.** An engine being edited is owned
// exclusively (a clone of a snapshot's engine). Queries on a frozen engine
// never write.

use crate::disjoint_set::DisjointSet;
use crate::domain::{Domain, Neighbors};
use crate::grid::DenseGrid;
use crate::layout::MapLayout;
use crate::types::{Color, Coord, Cost, Door, INVALID_MOVE, PATH_COST_INFINITE};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, trace};

/// Grid state plus static and dynamic color partitions.
#[derive(Clone, Debug)]
pub struct Connectivity {
    costs: DenseGrid<Cost>,
    colors: DenseGrid<Color>,
    doors: Arc<BTreeMap<Coord, Door>>,
    static_sets: DisjointSet<Color>,
    dynamic_sets: DisjointSet<Color>,
    next_color: i32,
    next_door_color: i32,
    /// Number of cells carrying each cost value, for the search heuristic.
    cost_histogram: Box<[u32; 256]>,
    deferring: bool,
    dynamic_stale: bool,
}

impl Connectivity {
    /// Build an engine from scratch: flood-fill every transparent region,
    /// give each door its own color, and derive both partitions.
    /// O(cells + doors).
    pub fn from_layout(layout: &MapLayout, chunk_cells: usize) -> Self {
        let domain = layout.domain();
        let mut cost_histogram = Box::new([0u32; 256]);
        cost_histogram[usize::from(PATH_COST_INFINITE)] =
            u32::try_from(domain.len()).expect("domain exceeds u32 cells");

        let mut engine = Self {
            costs: DenseGrid::with_chunk_cells(domain, PATH_COST_INFINITE, chunk_cells),
            colors: DenseGrid::with_chunk_cells(domain, Color::UNKNOWN, chunk_cells),
            doors: Arc::new(layout.doors().clone()),
            static_sets: DisjointSet::new(),
            dynamic_sets: DisjointSet::new(),
            next_color: Color::FIRST_ORDINARY.0,
            next_door_color: Color::FIRST_DOOR.0,
            cost_histogram,
            deferring: false,
            dynamic_stale: false,
        };

        for coord in domain.iter() {
            engine.write_cost(coord, layout.cost(coord));
        }
        let door_cells: Vec<(Coord, Door)> =
            layout.doors().iter().map(|(&c, &d)| (c, d)).collect();
        for &(coord, door) in &door_cells {
            assert!(
                door.cost_when_open != PATH_COST_INFINITE,
                "door at {coord} cannot have an impassable open cost"
            );
            engine.write_cost(coord, door.current_cost());
            // Opaque to the flood fill below.
            engine.colors.set(coord, Color::MULTIPLE);
        }

        for coord in domain.iter() {
            if engine.colors.get(coord) != Color::UNKNOWN {
                continue;
            }
            if engine.costs.get(coord) == PATH_COST_INFINITE {
                engine.colors.set(coord, Color::IMPASSABLE);
            } else {
                let color = engine.alloc_color();
                engine.flood(coord, color);
            }
        }

        for &(coord, _) in &door_cells {
            let color = engine.alloc_door_color();
            engine.colors.set(coord, color);
        }
        engine.regenerate_dynamic();

        debug!(
            rows = domain.rows,
            cols = domain.cols,
            layers = domain.layers,
            regions = engine.next_color,
            doors = door_cells.len(),
            "full rebuild complete"
        );
        engine
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn domain(&self) -> Domain {
        self.costs.domain()
    }

    /// Current cost of a cell (a door reports its open/closed cost).
    pub fn cost(&self, coord: Coord) -> Cost {
        self.costs.get(coord)
    }

    pub fn color(&self, coord: Coord) -> Color {
        self.colors.get(coord)
    }

    pub fn door(&self, coord: Coord) -> Option<Door> {
        self.doors.get(&coord).copied()
    }

    pub fn doors(&self) -> &BTreeMap<Coord, Door> {
        &self.doors
    }

    pub fn is_door(&self, coord: Coord) -> bool {
        let is_door = self.colors.get(coord).is_door();
        debug_assert_eq!(is_door, self.doors.contains_key(&coord));
        is_door
    }

    pub fn is_passable(&self, coord: Coord) -> bool {
        self.costs.get(coord) != PATH_COST_INFINITE
    }

    /// Passable regardless of any door state: a non-door floor cell.
    pub fn is_transparent(&self, coord: Coord) -> bool {
        if self.costs.get(coord) == PATH_COST_INFINITE {
            return false;
        }
        let color = self.colors.get(coord);
        !color.is_door() && color != Color::MULTIPLE
    }

    /// The movement stencil around `coord`.
    pub fn adjacent(&self, coord: Coord) -> Neighbors {
        self.costs.adjacent(coord)
    }

    /// Representative of `color` in the static partition.
    pub fn static_component(&self, color: Color) -> Color {
        self.static_sets.find(color)
    }

    /// Representative of `color` in the dynamic partition.
    pub fn dynamic_component(&self, color: Color) -> Color {
        debug_assert!(!self.dynamic_stale, "dynamic partition read mid-batch");
        self.dynamic_sets.find(color)
    }

    /// Whether some path connects `from` and `to` under the current door
    /// states. Out-of-domain or impassable endpoints are never connected.
    /// O(1) on a frozen engine.
    pub fn path_exists(&self, from: Coord, to: Coord) -> bool {
        let domain = self.domain();
        if !domain.contains(from) || !domain.contains(to) {
            return false;
        }
        if !self.is_passable(from) || !self.is_passable(to) {
            return false;
        }
        self.dynamic_component(self.colors.get(from)) == self.dynamic_component(self.colors.get(to))
    }

    /// Cost of stepping from `from` to the stencil neighbor `to`, or
    /// `INVALID_MOVE`.
    ///
    /// - same cell: 0
    /// - vertical (same row and col, adjacent layer): cost of `to`
    /// - orthogonal in-layer: cost of `to`
    /// - diagonal in-layer: cost of `to` times sqrt(2), only if at least one
    ///   of the two corner cells is passable
    /// - anything else, or an impassable endpoint: `INVALID_MOVE`
    ///
    /// Panics if either coordinate is outside the domain.
    pub fn move_cost(&self, from: Coord, to: Coord) -> f64 {
        if from == to {
            return 0.0;
        }
        let from_cost = self.costs.get(from);
        let to_cost = self.costs.get(to);
        if from_cost == PATH_COST_INFINITE || to_cost == PATH_COST_INFINITE {
            return INVALID_MOVE;
        }
        let d_row = from.row.abs_diff(to.row);
        let d_col = from.col.abs_diff(to.col);
        let d_layer = from.layer.abs_diff(to.layer);
        let cost = f64::from(to_cost);

        if d_layer != 0 {
            return if d_layer == 1 && d_row == 0 && d_col == 0 {
                cost
            } else {
                INVALID_MOVE
            };
        }
        match (d_row, d_col) {
            (0, 1) | (1, 0) => cost,
            (1, 1) => {
                let corner_a = Coord::new(from.row, to.col, from.layer);
                let corner_b = Coord::new(to.row, from.col, from.layer);
                if self.is_passable(corner_a) || self.is_passable(corner_b) {
                    cost * std::f64::consts::SQRT_2
                } else {
                    INVALID_MOVE
                }
            }
            _ => INVALID_MOVE,
        }
    }

    /// Smallest cost carried by any passable cell, or `None` if every cell is
    /// impassable.
    pub fn min_passable_cost(&self) -> Option<Cost> {
        self.cost_histogram[..usize::from(PATH_COST_INFINITE)]
            .iter()
            .position(|&count| count > 0)
            .map(|cost| cost as Cost)
    }

    /// Grid chunks (cost and color) physically shared with `other`, and the
    /// total chunk count of this engine.
    pub(crate) fn shared_chunks(&self, other: &Self) -> (usize, usize) {
        (
            self.costs.shared_chunks(&other.costs) + self.colors.shared_chunks(&other.colors),
            self.costs.chunk_count() + self.colors.chunk_count(),
        )
    }

    /// The current state as a fresh layout, suitable for a from-scratch
    /// rebuild.
    pub fn to_layout(&self) -> MapLayout {
        let domain = self.domain();
        let mut layout = MapLayout::new(domain, PATH_COST_INFINITE);
        for coord in domain.iter() {
            match self.door(coord) {
                Some(door) => {
                    layout.add_door(coord, door.open, door.cost_when_open);
                }
                None => {
                    layout.set_cost(coord, self.costs.get(coord));
                }
            }
        }
        layout
    }

    // -----------------------------------------------------------------------
    // Public edits
    // -----------------------------------------------------------------------

    /// Change a non-door cell's terrain cost. Crossing the passable /
    /// impassable boundary triggers the matching structural transition; any
    /// other change just rewrites the cost. Panics on a door cell.
    pub fn set_cost(&mut self, coord: Coord, cost: Cost) {
        assert!(
            !self.is_door(coord),
            "set_cost on door cell {coord}; use the door operations"
        );
        let old = self.costs.get(coord);
        if old == cost {
            return;
        }
        if old == PATH_COST_INFINITE {
            self.wall_to_transparent(coord, cost);
        } else if cost == PATH_COST_INFINITE {
            self.transparent_to_wall(coord);
        } else {
            self.write_cost(coord, cost);
        }
    }

    /// Turn a non-door cell into a door. A passable cell is walled first.
    /// Panics if the cell is already a door or `open_cost` is impassable.
    pub fn create_door(&mut self, coord: Coord, open: bool, open_cost: Cost) {
        assert!(!self.is_door(coord), "cell {coord} is already a door");
        assert!(
            open_cost != PATH_COST_INFINITE,
            "door at {coord} cannot have an impassable open cost"
        );
        if self.is_passable(coord) {
            self.transparent_to_wall(coord);
        }
        self.wall_to_closed_door(coord, open_cost);
        if open {
            self.closed_to_open(coord);
        }
    }

    /// Turn a door back into a wall, then into floor with `new_cost` unless
    /// that is the impassable cost. Panics if the cell is not a door.
    pub fn remove_door(&mut self, coord: Coord, new_cost: Cost) {
        let door = self.expect_door(coord);
        if door.open {
            self.open_to_closed(coord);
        }
        self.closed_door_to_wall(coord);
        if new_cost != PATH_COST_INFINITE {
            self.wall_to_transparent(coord, new_cost);
        }
    }

    /// Open or close a door. Opening is O(degree); closing regenerates the
    /// dynamic partition. Setting the current state is a no-op.
    pub fn set_door_open(&mut self, coord: Coord, open: bool) {
        let door = self.expect_door(coord);
        if door.open == open {
            return;
        }
        if open {
            self.closed_to_open(coord);
        } else {
            self.open_to_closed(coord);
        }
    }

    pub fn toggle_door_open(&mut self, coord: Coord) {
        let door = self.expect_door(coord);
        self.set_door_open(coord, !door.open);
    }

    /// Change what a door costs while open. Topology is untouched.
    pub fn set_door_open_cost(&mut self, coord: Coord, cost: Cost) {
        assert!(
            cost != PATH_COST_INFINITE,
            "door at {coord} cannot have an impassable open cost"
        );
        let door = self.expect_door(coord);
        if door.cost_when_open == cost {
            return;
        }
        if let Some(entry) = Arc::make_mut(&mut self.doors).get_mut(&coord) {
            entry.cost_when_open = cost;
        }
        if door.open {
            self.write_cost(coord, cost);
        }
    }

    // -----------------------------------------------------------------------
    // Batch lifecycle
    // -----------------------------------------------------------------------

    /// Defer dynamic-partition regeneration until `finish_batch`.
    pub(crate) fn begin_batch(&mut self) {
        self.deferring = true;
    }

    /// Regenerate the dynamic partition if any edit invalidated it, then
    /// freeze. Returns whether a regeneration ran.
    pub(crate) fn finish_batch(&mut self) -> bool {
        self.deferring = false;
        let regenerated = self.dynamic_stale;
        if regenerated {
            self.regenerate_dynamic();
        }
        self.freeze();
        regenerated
    }

    /// Flatten both partitions so `find` on the frozen engine is O(1).
    pub(crate) fn freeze(&mut self) {
        self.static_sets.flatten();
        self.dynamic_sets.flatten();
    }

    // -----------------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------------

    fn expect_door(&self, coord: Coord) -> Door {
        self.door(coord)
            .unwrap_or_else(|| panic!("cell {coord} is not a door"))
    }

    fn write_cost(&mut self, coord: Coord, cost: Cost) {
        let old = self.costs.get(coord);
        if old == cost {
            return;
        }
        self.cost_histogram[usize::from(old)] -= 1;
        self.cost_histogram[usize::from(cost)] += 1;
        self.costs.set(coord, cost);
    }

    fn alloc_color(&mut self) -> Color {
        let color = Color(self.next_color);
        self.next_color = self
            .next_color
            .checked_add(1)
            .unwrap_or_else(|| panic!("ordinary color space exhausted"));
        self.static_sets.insert(color);
        self.dynamic_sets.insert(color);
        color
    }

    fn alloc_door_color(&mut self) -> Color {
        let color = Color(self.next_door_color);
        assert!(color.is_door(), "door color space exhausted");
        self.next_door_color -= 1;
        self.static_sets.insert(color);
        self.dynamic_sets.insert(color);
        color
    }

    /// Paint `fill` over the orthogonal region of transparent cells around
    /// `seed` (which must itself be transparent). Returns the cell count.
    fn flood(&mut self, seed: Coord, fill: Color) -> usize {
        let domain = self.domain();
        let mut queue = VecDeque::new();
        self.colors.set(seed, fill);
        queue.push_back(seed);
        let mut painted = 1;
        while let Some(current) = queue.pop_front() {
            for next in domain.orthogonal(current) {
                if self.colors.get(next) != fill && self.is_transparent(next) {
                    self.colors.set(next, fill);
                    painted += 1;
                    queue.push_back(next);
                }
            }
        }
        painted
    }

    fn open_door_neighbor(&self, coord: Coord) -> bool {
        self.colors.get(coord).is_door() && self.is_passable(coord)
    }

    fn wall_to_transparent(&mut self, coord: Coord, cost: Cost) {
        debug_assert!(!self.is_passable(coord) && !self.colors.get(coord).is_door());
        self.write_cost(coord, cost);
        let neighbors = self.domain().orthogonal(coord);

        let mut adopted = None;
        for &n in &neighbors {
            if !self.is_transparent(n) {
                continue;
            }
            let n_color = self.colors.get(n);
            match adopted {
                None => adopted = Some(n_color),
                Some(color) if color != n_color => {
                    self.static_sets.union(color, n_color);
                    self.dynamic_sets.union(color, n_color);
                }
                Some(_) => {}
            }
        }
        let color = match adopted {
            Some(color) => color,
            None => self.alloc_color(),
        };
        self.colors.set(coord, color);

        for &n in &neighbors {
            if self.open_door_neighbor(n) {
                self.dynamic_sets.union(color, self.colors.get(n));
            }
        }
        trace!(%coord, %color, "wall -> transparent");
    }

    fn transparent_to_wall(&mut self, coord: Coord) {
        let old = self.colors.get(coord);
        debug_assert!(old.is_ordinary(), "transparent cell {coord} has color {old}");
        self.write_cost(coord, PATH_COST_INFINITE);
        self.colors.set(coord, Color::IMPASSABLE);

        let neighbors = self.domain().orthogonal(coord);
        let touches_open_door = neighbors.iter().any(|&n| self.open_door_neighbor(n));

        if self.may_split(coord) {
            let old_root = self.static_sets.find_mut(old);
            let mut pieces = 0;
            for &n in &neighbors {
                if self.is_transparent(n)
                    && self.static_sets.find_mut(self.colors.get(n)) == old_root
                {
                    let fresh = self.alloc_color();
                    let painted = self.flood(n, fresh);
                    trace!(%coord, %fresh, painted, "re-colored region piece");
                    pieces += 1;
                }
            }
            trace!(%coord, pieces, "transparent -> wall (re-flooded)");
            self.invalidate_dynamic();
        } else {
            trace!(%coord, "transparent -> wall (simple point)");
            if touches_open_door {
                self.invalidate_dynamic();
            }
        }
    }

    /// Whether walling `coord` might disconnect its transparent neighbors.
    ///
    /// `false` is exact: at most one transparent neighbor, or all orthogonal
    /// neighbors are linked through one arc of the same-layer 3x3 ring.
    /// `true` may be conservative (vertical neighbors always answer `true`).
    fn may_split(&self, coord: Coord) -> bool {
        let domain = self.domain();
        let vertical = [coord.offset(0, 0, -1), coord.offset(0, 0, 1)]
            .into_iter()
            .flatten()
            .filter(|&c| domain.contains(c) && self.is_transparent(c))
            .count();
        let open = domain
            .ring(coord)
            .map(|cell| cell.is_some_and(|c| self.is_transparent(c)));
        let orthogonal = (0..8).step_by(2).filter(|&i| open[i]).count();

        if orthogonal + vertical <= 1 {
            return false;
        }
        if vertical > 0 {
            return true;
        }
        let Some(start) = (0..8).find(|&i| !open[i]) else {
            return false;
        };

        let mut arcs = 0;
        let mut in_arc = false;
        let mut arc_has_orthogonal = false;
        for step in 1..=8 {
            let i = (start + step) % 8;
            if open[i] {
                in_arc = true;
                arc_has_orthogonal |= i % 2 == 0;
            } else {
                if in_arc && arc_has_orthogonal {
                    arcs += 1;
                }
                in_arc = false;
                arc_has_orthogonal = false;
            }
        }
        arcs > 1
    }

    fn wall_to_closed_door(&mut self, coord: Coord, open_cost: Cost) {
        debug_assert!(!self.is_passable(coord) && !self.colors.get(coord).is_door());
        let color = self.alloc_door_color();
        self.colors.set(coord, color);
        Arc::make_mut(&mut self.doors).insert(coord, Door::new(false, open_cost));
        trace!(%coord, %color, "wall -> closed door");
    }

    fn closed_to_open(&mut self, coord: Coord) {
        let cost = {
            let doors = Arc::make_mut(&mut self.doors);
            let door = doors
                .get_mut(&coord)
                .unwrap_or_else(|| panic!("cell {coord} is not a door"));
            door.open = true;
            door.cost_when_open
        };
        self.write_cost(coord, cost);
        self.join_open_door(coord);
        trace!(%coord, "closed door -> open door");
    }

    fn open_to_closed(&mut self, coord: Coord) {
        if let Some(door) = Arc::make_mut(&mut self.doors).get_mut(&coord) {
            door.open = false;
        }
        self.write_cost(coord, PATH_COST_INFINITE);
        self.invalidate_dynamic();
        trace!(%coord, "open door -> closed door");
    }

    fn closed_door_to_wall(&mut self, coord: Coord) {
        debug_assert!(!self.is_passable(coord));
        Arc::make_mut(&mut self.doors).remove(&coord);
        self.colors.set(coord, Color::IMPASSABLE);
        trace!(%coord, "closed door -> wall");
    }

    /// Dynamically union an open door with every passable orthogonal
    /// neighbor.
    fn join_open_door(&mut self, coord: Coord) {
        let door_color = self.colors.get(coord);
        for n in self.domain().orthogonal(coord) {
            if self.is_passable(n) {
                self.dynamic_sets.union(door_color, self.colors.get(n));
            }
        }
    }

    fn invalidate_dynamic(&mut self) {
        self.dynamic_stale = true;
        if !self.deferring {
            self.regenerate_dynamic();
        }
    }

    /// Reset the dynamic partition to the static one, then re-join every
    /// open door. O(colors + doors).
    fn regenerate_dynamic(&mut self) {
        self.dynamic_sets.copy_partition_from(&self.static_sets);
        let open_doors: Vec<Coord> = self
            .doors
            .iter()
            .filter(|(_, door)| door.open)
            .map(|(&coord, _)| coord)
            .collect();
        for &coord in &open_doors {
            self.join_open_door(coord);
        }
        self.dynamic_stale = false;
        trace!(open_doors = open_doors.len(), "dynamic partition regenerated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DEFAULT_CHUNK_CELLS;
    use crate::types::Door;

    fn open_map(rows: u16, cols: u16) -> Connectivity {
        Connectivity::from_layout(&MapLayout::new(Domain::flat(rows, cols), 1), DEFAULT_CHUNK_CELLS)
    }

    /// Two rooms split by a vertical wall at `col`, with a closed door in the
    /// middle row.
    fn two_rooms(rows: u16, cols: u16, col: u16) -> (Connectivity, Coord) {
        let mut layout = MapLayout::new(Domain::flat(rows, cols), 1);
        for row in 0..rows {
            layout.set_cost(Coord::flat(row, col), PATH_COST_INFINITE);
        }
        let door = Coord::flat(rows / 2, col);
        layout.add_door(door, false, 1);
        (Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS), door)
    }

    #[test]
    fn open_map_is_one_region() {
        let engine = open_map(6, 6);
        let first = engine.color(Coord::flat(0, 0));
        assert!(first.is_ordinary());
        for coord in engine.domain().iter() {
            assert_eq!(engine.color(coord), first);
        }
        assert!(engine.path_exists(Coord::flat(0, 0), Coord::flat(5, 5)));
    }

    #[test]
    fn rebuild_colors_walls_and_doors() {
        let (engine, door) = two_rooms(5, 7, 3);
        assert_eq!(engine.color(Coord::flat(0, 3)), Color::IMPASSABLE);
        assert!(engine.color(door).is_door());
        assert!(engine.is_door(door));
        assert!(!engine.is_passable(door));
        let left = engine.color(Coord::flat(0, 0));
        let right = engine.color(Coord::flat(0, 6));
        assert!(left.is_ordinary() && right.is_ordinary());
        assert_ne!(left, right);
        assert_ne!(engine.static_component(left), engine.static_component(right));
    }

    #[test]
    fn closed_door_blocks_open_door_connects() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        let a = Coord::flat(2, 2);
        let b = Coord::flat(2, 4);
        assert!(!engine.path_exists(a, b));

        engine.set_door_open(door, true);
        assert!(engine.path_exists(a, b));
        assert_eq!(engine.cost(door), 1);
        // Opening a door never touches the static partition.
        assert_ne!(
            engine.static_component(engine.color(a)),
            engine.static_component(engine.color(b))
        );

        engine.set_door_open(door, false);
        assert!(!engine.path_exists(a, b));
        assert_eq!(engine.cost(door), PATH_COST_INFINITE);
    }

    #[test]
    fn toggle_flips_state() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        engine.toggle_door_open(door);
        assert_eq!(engine.door(door), Some(Door::new(true, 1)));
        engine.toggle_door_open(door);
        assert_eq!(engine.door(door), Some(Door::new(false, 1)));
    }

    #[test]
    fn initially_open_door_connects_after_rebuild() {
        let mut layout = MapLayout::new(Domain::flat(3, 5), 1);
        for row in 0..3 {
            layout.set_cost(Coord::flat(row, 2), PATH_COST_INFINITE);
        }
        layout.add_door(Coord::flat(1, 2), true, 4);
        let engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        assert!(engine.path_exists(Coord::flat(0, 0), Coord::flat(2, 4)));
        assert_eq!(engine.cost(Coord::flat(1, 2)), 4);
    }

    #[test]
    fn wall_on_bridge_splits_and_floor_rejoins() {
        // A one-cell bridge at (1, 2) joins two rooms.
        let mut layout = MapLayout::new(Domain::flat(3, 5), 1);
        for row in 0..3 {
            layout.set_cost(Coord::flat(row, 2), PATH_COST_INFINITE);
        }
        layout.set_cost(Coord::flat(1, 2), 1);
        let mut engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        let a = Coord::flat(0, 0);
        let b = Coord::flat(2, 4);
        let bridge = Coord::flat(1, 2);
        assert!(engine.path_exists(a, b));

        engine.set_cost(bridge, PATH_COST_INFINITE);
        assert!(!engine.path_exists(a, b));
        assert_eq!(engine.color(bridge), Color::IMPASSABLE);
        assert_ne!(engine.color(a), engine.color(b));

        engine.set_cost(bridge, 1);
        assert!(engine.path_exists(a, b));
        assert_eq!(
            engine.static_component(engine.color(a)),
            engine.static_component(engine.color(b))
        );
    }

    #[test]
    fn walling_a_simple_point_keeps_colors() {
        let mut engine = open_map(5, 5);
        let before = engine.color(Coord::flat(0, 0));
        let allocated = engine.next_color;
        engine.set_cost(Coord::flat(2, 2), PATH_COST_INFINITE);
        // The ring around (2, 2) is fully open, so no re-flood happens.
        assert_eq!(engine.next_color, allocated);
        assert_eq!(engine.color(Coord::flat(4, 4)), before);
        assert!(engine.path_exists(Coord::flat(1, 2), Coord::flat(3, 2)));
    }

    #[test]
    fn may_split_detects_corridor_cut() {
        // Horizontal corridor: walling the middle cuts it.
        let mut layout = MapLayout::new(Domain::flat(3, 5), PATH_COST_INFINITE);
        for col in 0..5 {
            layout.set_cost(Coord::flat(1, col), 1);
        }
        let engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        assert!(engine.may_split(Coord::flat(1, 2)));
        // The corridor's end has a single neighbor.
        assert!(!engine.may_split(Coord::flat(1, 0)));
    }

    #[test]
    fn may_split_false_on_fully_open_ring() {
        let engine = open_map(3, 3);
        assert!(!engine.may_split(Coord::flat(1, 1)));
    }

    #[test]
    fn walling_corridor_end_keeps_rest_connected() {
        let mut layout = MapLayout::new(Domain::flat(1, 6), 1);
        layout.set_cost(Coord::flat(0, 5), 1);
        let mut engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        engine.set_cost(Coord::flat(0, 0), PATH_COST_INFINITE);
        assert!(engine.path_exists(Coord::flat(0, 1), Coord::flat(0, 5)));
        assert!(!engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 5)));
    }

    #[test]
    fn set_cost_within_passable_range_keeps_topology() {
        let mut engine = open_map(3, 3);
        let color = engine.color(Coord::flat(1, 1));
        engine.set_cost(Coord::flat(1, 1), 9);
        assert_eq!(engine.cost(Coord::flat(1, 1)), 9);
        assert_eq!(engine.color(Coord::flat(1, 1)), color);
    }

    #[test]
    fn set_cost_same_value_is_noop() {
        let (mut engine, _) = two_rooms(5, 7, 3);
        let colors: Vec<_> = engine.domain().iter().map(|c| engine.color(c)).collect();
        engine.set_cost(Coord::flat(0, 0), 1);
        engine.set_cost(Coord::flat(0, 3), PATH_COST_INFINITE);
        let after: Vec<_> = engine.domain().iter().map(|c| engine.color(c)).collect();
        assert_eq!(colors, after);
    }

    #[test]
    fn create_door_on_floor_walls_it_first() {
        // Corridor of floor; a closed door in the middle cuts it.
        let mut engine = open_map(1, 5);
        let cell = Coord::flat(0, 2);
        engine.create_door(cell, false, 2);
        assert!(engine.is_door(cell));
        assert!(!engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 4)));

        engine.set_door_open(cell, true);
        assert!(engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 4)));
        assert_eq!(engine.cost(cell), 2);
    }

    #[test]
    fn create_then_remove_door_restores_wall() {
        let (mut engine, _) = two_rooms(5, 7, 3);
        let cell = Coord::flat(0, 3);
        engine.create_door(cell, true, 1);
        assert!(engine.path_exists(Coord::flat(0, 2), Coord::flat(0, 4)));

        engine.remove_door(cell, PATH_COST_INFINITE);
        assert!(!engine.is_door(cell));
        assert_eq!(engine.color(cell), Color::IMPASSABLE);
        assert_eq!(engine.cost(cell), PATH_COST_INFINITE);
        assert!(!engine.path_exists(Coord::flat(0, 2), Coord::flat(0, 4)));
    }

    #[test]
    fn remove_door_with_floor_cost_joins_statically() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        engine.remove_door(door, 3);
        assert!(!engine.is_door(door));
        assert_eq!(engine.cost(door), 3);
        let left = engine.color(Coord::flat(0, 0));
        let right = engine.color(Coord::flat(0, 6));
        assert_eq!(engine.static_component(left), engine.static_component(right));
    }

    #[test]
    fn door_open_cost_updates_live_cost_only_when_open() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        engine.set_door_open_cost(door, 6);
        assert_eq!(engine.cost(door), PATH_COST_INFINITE);
        engine.set_door_open(door, true);
        assert_eq!(engine.cost(door), 6);
        engine.set_door_open_cost(door, 2);
        assert_eq!(engine.cost(door), 2);
        assert_eq!(engine.door(door), Some(Door::new(true, 2)));
    }

    #[test]
    fn adjacent_open_doors_chain() {
        // Two doors side by side in a corridor.
        let mut layout = MapLayout::new(Domain::flat(1, 6), 1);
        layout.add_door(Coord::flat(0, 2), true, 1);
        layout.add_door(Coord::flat(0, 3), false, 1);
        let mut engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        assert!(!engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 5)));
        engine.set_door_open(Coord::flat(0, 3), true);
        assert!(engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 5)));
    }

    #[test]
    fn walling_cell_next_to_open_door_drops_connection() {
        // Room | door | single cell | wall. Walling the single cell must
        // disconnect it from the room even though no region split occurs.
        let mut layout = MapLayout::new(Domain::flat(1, 4), 1);
        layout.add_door(Coord::flat(0, 1), true, 1);
        layout.set_cost(Coord::flat(0, 3), PATH_COST_INFINITE);
        let mut engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        assert!(engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 2)));
        engine.set_cost(Coord::flat(0, 2), PATH_COST_INFINITE);
        engine.set_cost(Coord::flat(0, 3), 1);
        assert!(!engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 3)));
    }

    #[test]
    fn floor_next_to_open_door_joins_dynamically() {
        let mut layout = MapLayout::new(Domain::flat(1, 4), 1);
        layout.add_door(Coord::flat(0, 1), true, 1);
        layout.set_cost(Coord::flat(0, 2), PATH_COST_INFINITE);
        let mut engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        assert!(!engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 3)));
        engine.set_cost(Coord::flat(0, 2), 1);
        assert!(engine.path_exists(Coord::flat(0, 0), Coord::flat(0, 3)));
    }

    #[test]
    fn vertical_connectivity_in_3d() {
        let mut layout = MapLayout::new(Domain::new(3, 3, 2), PATH_COST_INFINITE);
        layout.set_cost(Coord::new(0, 0, 0), 1);
        layout.set_cost(Coord::new(0, 0, 1), 1);
        layout.set_cost(Coord::new(0, 1, 1), 1);
        let mut engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        assert!(engine.path_exists(Coord::new(0, 0, 0), Coord::new(0, 1, 1)));
        engine.set_cost(Coord::new(0, 0, 1), PATH_COST_INFINITE);
        assert!(!engine.path_exists(Coord::new(0, 0, 0), Coord::new(0, 1, 1)));
    }

    #[test]
    fn move_cost_rules() {
        let mut layout = MapLayout::new(Domain::new(3, 3, 2), 2);
        layout.set_cost(Coord::flat(0, 1), PATH_COST_INFINITE);
        layout.set_cost(Coord::flat(1, 0), PATH_COST_INFINITE);
        let engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        let o = Coord::flat(1, 1);

        assert_eq!(engine.move_cost(o, o), 0.0);
        assert_eq!(engine.move_cost(o, Coord::flat(1, 2)), 2.0);
        assert_eq!(engine.move_cost(o, Coord::new(1, 1, 1)), 2.0);
        let diagonal = engine.move_cost(o, Coord::flat(2, 2));
        assert!((diagonal - 2.0 * std::f64::consts::SQRT_2).abs() < 1e-12);
        // Both corners of (1,1)->(0,0) are walls.
        assert_eq!(engine.move_cost(o, Coord::flat(0, 0)), INVALID_MOVE);
        assert_eq!(engine.move_cost(Coord::flat(0, 0), o), INVALID_MOVE);
        // Diagonal across layers and long jumps are illegal.
        assert_eq!(engine.move_cost(o, Coord::new(2, 2, 1)), INVALID_MOVE);
        assert_eq!(engine.move_cost(Coord::flat(0, 0), Coord::flat(0, 2)), INVALID_MOVE);
        // Impassable endpoints.
        assert_eq!(engine.move_cost(o, Coord::flat(0, 1)), INVALID_MOVE);
        assert_eq!(engine.move_cost(Coord::flat(0, 1), o), INVALID_MOVE);
    }

    #[test]
    fn min_passable_cost_tracks_edits() {
        let mut engine = open_map(2, 2);
        assert_eq!(engine.min_passable_cost(), Some(1));
        for coord in engine.domain().iter() {
            engine.set_cost(coord, 4);
        }
        assert_eq!(engine.min_passable_cost(), Some(4));
        engine.set_cost(Coord::flat(0, 0), 0);
        assert_eq!(engine.min_passable_cost(), Some(0));
        for coord in engine.domain().iter() {
            engine.set_cost(coord, PATH_COST_INFINITE);
        }
        assert_eq!(engine.min_passable_cost(), None);
    }

    #[test]
    fn to_layout_rebuild_preserves_reachability() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        engine.set_cost(Coord::flat(0, 0), 3);
        engine.set_door_open(door, true);
        let rebuilt = Connectivity::from_layout(&engine.to_layout(), DEFAULT_CHUNK_CELLS);
        for a in engine.domain().iter() {
            for b in [Coord::flat(0, 0), Coord::flat(4, 6), door] {
                assert_eq!(engine.path_exists(a, b), rebuilt.path_exists(a, b));
            }
            assert_eq!(engine.cost(a), rebuilt.cost(a));
        }
    }

    #[test]
    fn deferred_batch_regenerates_once_at_end() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        engine.set_door_open(door, true);
        engine.begin_batch();
        engine.set_door_open(door, false);
        assert!(engine.dynamic_stale);
        engine.set_door_open(door, true);
        assert!(engine.finish_batch());
        assert!(!engine.dynamic_stale);
        assert!(engine.path_exists(Coord::flat(2, 0), Coord::flat(2, 6)));
    }

    #[test]
    #[should_panic(expected = "is not a door")]
    fn door_op_on_floor_panics() {
        open_map(2, 2).set_door_open(Coord::flat(0, 0), true);
    }

    #[test]
    #[should_panic(expected = "use the door operations")]
    fn set_cost_on_door_panics() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        engine.set_cost(door, 1);
    }

    #[test]
    #[should_panic(expected = "already a door")]
    fn create_door_twice_panics() {
        let (mut engine, door) = two_rooms(5, 7, 3);
        engine.create_door(door, false, 1);
    }

    #[test]
    #[should_panic(expected = "impassable open cost")]
    fn create_door_with_infinite_cost_panics() {
        open_map(2, 2).create_door(Coord::flat(0, 0), false, PATH_COST_INFINITE);
    }
}
