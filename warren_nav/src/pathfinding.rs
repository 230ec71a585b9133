// A* search over the live cost grid.
//
// Standard A* using a `BinaryHeap` (min-heap via reversed ordering). Scores
// and came-from data are stored in `Vec`s indexed by the domain's linear
// index for O(1) access and deterministic behavior (no `HashMap`). Frontier
// entries with equal `f` pop in ascending `Coord` order.
//
// The search is gated by `Connectivity::path_exists()`: an unreachable goal
// is rejected in O(1) before any allocation, so the search itself only runs
// when it is known to succeed. Exhausting the frontier after a positive
// gate is an engine bug and panics.
//
// The heuristic is straight-line (Euclidean) distance times the smallest
// passable cost on the map. Every step of length `l` costs at least
// `l * min_cost` (orthogonal and vertical steps cost the destination cost,
// diagonals cost it times sqrt(2)), so the heuristic is admissible and
// consistent, including on maps with zero-cost terrain, where it degrades to
// Dijkstra.
//
// See also: `connectivity.rs` for `move_cost()` and the stencil, `snapshot.rs`
// which exposes `path()` and the parallel `paths()`.

use crate::connectivity::Connectivity;
use crate::types::{Coord, INVALID_MOVE, NO_PATH_LENGTH};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Result of a path query: the visited cells from source to destination
/// (inclusive) and the total movement cost. An unreachable destination
/// yields no cells and `NO_PATH_LENGTH`.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub cells: Vec<Coord>,
    pub length: f64,
}

impl Path {
    pub fn unreachable() -> Self {
        Self {
            cells: Vec::new(),
            length: NO_PATH_LENGTH,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.cells.is_empty()
    }
}

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    coord: Coord,
    f_score: f64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest f_score is "greatest".
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

/// Cheapest path from `src` to `dst` under the current costs and door
/// states.
pub fn find_path(engine: &Connectivity, src: Coord, dst: Coord) -> Path {
    if !engine.path_exists(src, dst) {
        return Path::unreachable();
    }
    if src == dst {
        return Path {
            cells: vec![src],
            length: 0.0,
        };
    }

    let domain = engine.domain();
    let n = domain.len();
    // `path_exists` succeeded, so at least the endpoints are passable.
    let min_cost = f64::from(engine.min_passable_cost().unwrap_or(0));

    let mut g_score = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<Coord>> = vec![None; n];
    let mut closed = vec![false; n];

    g_score[domain.index(src)] = 0.0;
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        coord: src,
        f_score: heuristic(src, dst, min_cost),
    });

    while let Some(current) = open.pop() {
        let ci = domain.index(current.coord);
        if current.coord == dst {
            return reconstruct_path(engine, &came_from, src, dst, g_score[ci]);
        }
        if closed[ci] {
            continue;
        }
        closed[ci] = true;
        let current_g = g_score[ci];

        for neighbor in engine.adjacent(current.coord) {
            let ni = domain.index(neighbor);
            if closed[ni] {
                continue;
            }
            let step = engine.move_cost(current.coord, neighbor);
            if step == INVALID_MOVE {
                continue;
            }
            let tentative_g = current_g + step;
            if tentative_g < g_score[ni] {
                g_score[ni] = tentative_g;
                came_from[ni] = Some(current.coord);
                open.push(OpenEntry {
                    coord: neighbor,
                    f_score: tentative_g + heuristic(neighbor, dst, min_cost),
                });
            }
        }
    }

    panic!("search from {src} to {dst} exhausted after a positive reachability check");
}

fn heuristic(from: Coord, to: Coord, min_cost: f64) -> f64 {
    from.euclidean_distance(to) * min_cost
}

fn reconstruct_path(
    engine: &Connectivity,
    came_from: &[Option<Coord>],
    src: Coord,
    dst: Coord,
    length: f64,
) -> Path {
    let domain = engine.domain();
    let mut cells = vec![dst];
    let mut current = dst;
    while current != src {
        match came_from[domain.index(current)] {
            Some(previous) => {
                cells.push(previous);
                current = previous;
            }
            None => panic!("broken came-from chain at {current} while reconstructing path"),
        }
    }
    cells.reverse();
    Path { cells, length }
}
