// Reference implementations for cross-validating `warren_nav`.
//
// Everything here is deliberately naive and built only on `warren_nav`'s
// public surface: per-cell queries, the adjacency stencils, `move_cost()`,
// `to_layout()`, and the read-only `DiagnosticView`. The incremental engine
// is trusted only as far as these slow answers agree with it:
//
// - `component_labels()`: BFS over passable cells, the reachability truth.
// - `dijkstra()`: plain Dijkstra over `adjacent()` + `move_cost()`, the
//   path-length truth.
// - `rebuild()`: a from-scratch snapshot of the current state.
// - `check_invariants()`: structural checks on colors, doors, and both
//   partitions.
// - `check_reachability()`: every cell pair's `path_exists()` against BFS.
// - `random_layout()` / `random_batch()`: seeded generators of maps and
//   valid edit batches.
//
// See also: `tests/cross_validation.rs` for the suites that drive these.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use warren_nav::{
    Color, Coord, Cost, DiagnosticView, Domain, INVALID_MOVE, MapLayout, MutationBatch,
    NO_PATH_LENGTH, NavConfig, PATH_COST_INFINITE, Snapshot,
};

// ---------------------------------------------------------------------------
// Reachability
// ---------------------------------------------------------------------------

/// Label every passable cell with its connected component (orthogonal and
/// vertical steps between passable cells). Impassable cells get `None`.
/// Labels are dense, in order of each component's first cell.
pub fn component_labels(snapshot: &Snapshot) -> Vec<Option<usize>> {
    flood_labels(snapshot.domain(), |c| snapshot.is_passable(c))
}

/// BFS component labels over the cells accepted by `include`.
fn flood_labels(domain: Domain, include: impl Fn(Coord) -> bool) -> Vec<Option<usize>> {
    let mut labels = vec![None; domain.len()];
    let mut next = 0;
    let mut queue = VecDeque::new();
    for start in domain.iter() {
        if labels[domain.index(start)].is_some() || !include(start) {
            continue;
        }
        labels[domain.index(start)] = Some(next);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            for n in domain.orthogonal(cell) {
                let ni = domain.index(n);
                if labels[ni].is_none() && include(n) {
                    labels[ni] = Some(next);
                    queue.push_back(n);
                }
            }
        }
        next += 1;
    }
    labels
}

/// Whether `to` is reachable from `from` by BFS.
pub fn reachable(snapshot: &Snapshot, from: Coord, to: Coord) -> bool {
    let domain = snapshot.domain();
    if !domain.contains(from) || !domain.contains(to) {
        return false;
    }
    let labels = component_labels(snapshot);
    labels[domain.index(from)].is_some() && labels[domain.index(from)] == labels[domain.index(to)]
}

/// Check `path_exists()` for every ordered cell pair against BFS.
pub fn check_reachability(snapshot: &Snapshot) -> Result<(), String> {
    let domain = snapshot.domain();
    let labels = component_labels(snapshot);
    for a in domain.iter() {
        for b in domain.iter() {
            let la = labels[domain.index(a)];
            let expected = la.is_some() && la == labels[domain.index(b)];
            if snapshot.path_exists(a, b) != expected {
                return Err(format!(
                    "path_exists({a}, {b}) = {}, flood fill says {expected}",
                    !expected
                ));
            }
        }
    }
    Ok(())
}

/// Check `path_exists()` for every cell pair against a from-scratch rebuild
/// of the same state.
pub fn check_against_rebuild(snapshot: &Snapshot) -> Result<(), String> {
    let fresh = rebuild(snapshot);
    let domain = snapshot.domain();
    for a in domain.iter() {
        if snapshot.cost(a) != fresh.cost(a) {
            return Err(format!("cost mismatch at {a}"));
        }
        for b in domain.iter() {
            if snapshot.path_exists(a, b) != fresh.path_exists(a, b) {
                return Err(format!("path_exists({a}, {b}) differs from rebuild"));
            }
        }
    }
    if snapshot.get_doors() != fresh.get_doors() {
        return Err("door table differs from rebuild".into());
    }
    Ok(())
}

/// A from-scratch snapshot of `snapshot`'s current costs and doors.
pub fn rebuild(snapshot: &Snapshot) -> Snapshot {
    Snapshot::from_layout(&snapshot.to_layout(), &NavConfig::default())
}

// ---------------------------------------------------------------------------
// Path lengths
// ---------------------------------------------------------------------------

struct Frontier {
    coord: Coord,
    dist: f64,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

/// Cheapest path length from `src` to `dst`, or `NO_PATH_LENGTH`.
pub fn dijkstra(snapshot: &Snapshot, src: Coord, dst: Coord) -> f64 {
    let domain = snapshot.domain();
    if !domain.contains(src)
        || !domain.contains(dst)
        || !snapshot.is_passable(src)
        || !snapshot.is_passable(dst)
    {
        return NO_PATH_LENGTH;
    }
    let mut dist = vec![f64::INFINITY; domain.len()];
    dist[domain.index(src)] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(Frontier {
        coord: src,
        dist: 0.0,
    });
    while let Some(Frontier { coord, dist: d }) = heap.pop() {
        if coord == dst {
            return d;
        }
        if d > dist[domain.index(coord)] {
            continue;
        }
        for n in snapshot.adjacent(coord) {
            let step = snapshot.move_cost(coord, n);
            if step == INVALID_MOVE {
                continue;
            }
            let candidate = d + step;
            let ni = domain.index(n);
            if candidate < dist[ni] {
                dist[ni] = candidate;
                heap.push(Frontier {
                    coord: n,
                    dist: candidate,
                });
            }
        }
    }
    NO_PATH_LENGTH
}

/// Check that `path()` agrees with Dijkstra on length and that the returned
/// cells form a valid walk of that length.
pub fn check_path(snapshot: &Snapshot, src: Coord, dst: Coord) -> Result<(), String> {
    let path = snapshot.path(src, dst);
    let expected = dijkstra(snapshot, src, dst);
    if expected == NO_PATH_LENGTH {
        return if path.is_found() || path.length != NO_PATH_LENGTH {
            Err(format!("path {src} -> {dst} found but Dijkstra says unreachable"))
        } else {
            Ok(())
        };
    }
    if (path.length - expected).abs() > 1e-6 {
        return Err(format!(
            "path {src} -> {dst} length {} != Dijkstra {expected}",
            path.length
        ));
    }
    if path.cells.first() != Some(&src) || path.cells.last() != Some(&dst) {
        return Err(format!("path {src} -> {dst} has wrong endpoints"));
    }
    let walked: f64 = path
        .cells
        .windows(2)
        .map(|pair| snapshot.move_cost(pair[0], pair[1]))
        .try_fold(0.0, |acc, step| (step != INVALID_MOVE).then_some(acc + step))
        .ok_or_else(|| format!("path {src} -> {dst} contains an invalid move"))?;
    if (walked - path.length).abs() > 1e-6 {
        return Err(format!(
            "path {src} -> {dst} steps sum to {walked}, reported {}",
            path.length
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Structural invariants
// ---------------------------------------------------------------------------

/// Check color, door, and partition invariants of an engine state.
pub fn check_invariants(view: &dyn DiagnosticView) -> Result<(), String> {
    let domain = view.domain();
    let mut door_colors = std::collections::BTreeSet::new();
    let mut door_cells = 0;

    for coord in domain.iter() {
        let cost = view.cost_at(coord);
        let color = view.color_at(coord);
        let door = view.door_at(coord);
        match (color, door) {
            (c, Some(d)) if c.is_door() => {
                door_cells += 1;
                if !door_colors.insert(c) {
                    return Err(format!("door color {c} reused at {coord}"));
                }
                if cost != d.current_cost() {
                    return Err(format!("door at {coord} has cost {cost}, state {d:?}"));
                }
                if d.cost_when_open == PATH_COST_INFINITE {
                    return Err(format!("door at {coord} has impassable open cost"));
                }
            }
            (c, None) if c == Color::IMPASSABLE => {
                if cost != PATH_COST_INFINITE {
                    return Err(format!("wall color at passable {coord}"));
                }
            }
            (c, None) if c.is_ordinary() => {
                if cost == PATH_COST_INFINITE {
                    return Err(format!("region color {c} on impassable {coord}"));
                }
            }
            (c, d) => return Err(format!("cell {coord} has color {c} and door {d:?}")),
        }
    }
    if door_cells != view.door_count() {
        return Err(format!(
            "{door_cells} door cells but {} door table entries",
            view.door_count()
        ));
    }

    let transparent = |c: Coord| view.color_at(c).is_ordinary();
    let passable = |c: Coord| view.cost_at(c) != PATH_COST_INFINITE;

    for coord in domain.iter() {
        let color = view.color_at(coord);
        for n in domain.orthogonal(coord) {
            let n_color = view.color_at(n);
            if transparent(coord)
                && transparent(n)
                && view.static_component(color) != view.static_component(n_color)
            {
                return Err(format!("adjacent floor {coord} and {n} in different static sets"));
            }
            if color.is_door()
                && passable(coord)
                && passable(n)
                && view.dynamic_component(color) != view.dynamic_component(n_color)
            {
                return Err(format!("open door {coord} not joined with neighbor {n}"));
            }
        }
        if color != Color::IMPASSABLE
            && view.static_component(color) != view.static_component(view.static_component(color))
        {
            return Err(format!("static representative of {color} is not a root"));
        }
    }

    // Each side must have exactly as many classes as BFS components, so no
    // spurious unions survive.
    let static_components = count_labels(&flood_labels(domain, transparent));
    let static_roots = distinct(domain, transparent, |c| view.static_component(view.color_at(c)));
    if static_components != static_roots {
        return Err(format!(
            "{static_roots} static classes over {static_components} floor components"
        ));
    }
    let dynamic_components = count_labels(&flood_labels(domain, passable));
    let dynamic_roots = distinct(domain, passable, |c| view.dynamic_component(view.color_at(c)));
    if dynamic_components != dynamic_roots {
        return Err(format!(
            "{dynamic_roots} dynamic classes over {dynamic_components} passable components"
        ));
    }
    Ok(())
}

fn count_labels(labels: &[Option<usize>]) -> usize {
    labels.iter().flatten().max().map_or(0, |&max| max + 1)
}

fn distinct(
    domain: Domain,
    include: impl Fn(Coord) -> bool,
    key: impl Fn(Coord) -> Color,
) -> usize {
    domain
        .iter()
        .filter(|&c| include(c))
        .map(key)
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn random_cost(rng: &mut fastrand::Rng) -> Cost {
    if rng.u8(..10) == 0 { 0 } else { rng.u8(1..=9) }
}

/// A random map: each cell a wall with probability `wall_percent`, a door
/// with probability `door_percent`, otherwise floor of cost 0..=9.
pub fn random_layout(
    rng: &mut fastrand::Rng,
    domain: Domain,
    wall_percent: u8,
    door_percent: u8,
) -> MapLayout {
    let mut layout = MapLayout::new(domain, 1);
    for coord in domain.iter() {
        let roll = rng.u8(..100);
        if roll < wall_percent {
            layout.set_cost(coord, PATH_COST_INFINITE);
        } else if roll < wall_percent.saturating_add(door_percent) {
            layout.add_door(coord, rng.bool(), rng.u8(1..=9));
        } else {
            layout.set_cost(coord, random_cost(rng));
        }
    }
    layout
}

/// Up to `edits` random edits, each valid against `snapshot`'s current
/// state. Each cell is edited at most once.
pub fn random_batch(rng: &mut fastrand::Rng, snapshot: &Snapshot, edits: usize) -> MutationBatch {
    let domain = snapshot.domain();
    let mut batch = snapshot.mutator();
    for _ in 0..edits {
        let coord = domain.coord(rng.usize(..domain.len()));
        if batch.get(coord).is_some() {
            continue;
        }
        if snapshot.is_door(coord) {
            match rng.u8(..5) {
                0 => batch.toggle_door_open(coord),
                1 => batch.set_door_open(coord, rng.bool()),
                2 => batch.set_door_open_cost(coord, rng.u8(1..=9)),
                3 => batch.remove_door(coord, PATH_COST_INFINITE),
                _ => batch.remove_door(coord, random_cost(rng)),
            };
        } else {
            match rng.u8(..10) {
                0..=3 => batch.set_cost(coord, PATH_COST_INFINITE),
                4..=7 => batch.set_cost(coord, random_cost(rng)),
                _ => batch.create_door(coord, rng.bool(), rng.u8(1..=9)),
            };
        }
    }
    batch
}

/// Pretty JSON of a batch, for failure messages.
pub fn describe_batch(batch: &MutationBatch) -> String {
    serde_json::to_string(batch).unwrap_or_else(|e| format!("<unserializable batch: {e}>"))
}
