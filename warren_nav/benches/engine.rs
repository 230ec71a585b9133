// Engine benchmarks: full rebuild, door batches, wall placement, and path
// queries on a generated grid of rooms.
//
// The map is a square of 16x16-cell rooms separated by one-cell walls, with
// a door in the middle of every shared wall. All doors start open.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use warren_nav::{Coord, Domain, MapLayout, NavConfig, PATH_COST_INFINITE, Snapshot};

const ROOM: u16 = 16;

fn rooms_layout(rooms_per_side: u16) -> MapLayout {
    let side = rooms_per_side * (ROOM + 1) + 1;
    let mut layout = MapLayout::new(Domain::flat(side, side), 1);
    for i in 0..side {
        for j in (0..side).step_by(usize::from(ROOM) + 1) {
            layout.set_cost(Coord::flat(i, j), PATH_COST_INFINITE);
            layout.set_cost(Coord::flat(j, i), PATH_COST_INFINITE);
        }
    }
    let half = ROOM / 2 + 1;
    for room_row in 0..rooms_per_side {
        for room_col in 0..rooms_per_side {
            let top = room_row * (ROOM + 1);
            let left = room_col * (ROOM + 1);
            if room_col + 1 < rooms_per_side {
                layout.add_door(Coord::flat(top + half, left + ROOM + 1), true, 1);
            }
            if room_row + 1 < rooms_per_side {
                layout.add_door(Coord::flat(top + ROOM + 1, left + half), true, 1);
            }
        }
    }
    layout
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_rebuild");
    for rooms in [4u16, 16] {
        let layout = rooms_layout(rooms);
        group.bench_with_input(BenchmarkId::from_parameter(rooms), &layout, |b, layout| {
            b.iter(|| Snapshot::from_layout(black_box(layout), &NavConfig::default()));
        });
    }
    group.finish();
}

fn bench_door_batch(c: &mut Criterion) {
    let snapshot = Snapshot::from_layout(&rooms_layout(16), &NavConfig::default());
    let doors: Vec<Coord> = snapshot.get_doors().keys().copied().collect();
    let mut close_all = snapshot.mutator();
    for &door in &doors {
        close_all.set_door_open(door, false);
    }
    let mut toggle_one = snapshot.mutator();
    toggle_one.toggle_door_open(doors[doors.len() / 2]);

    c.bench_function("close_all_doors", |b| {
        b.iter(|| snapshot.apply(black_box(&close_all)));
    });
    c.bench_function("toggle_one_door", |b| {
        b.iter(|| snapshot.apply(black_box(&toggle_one)));
    });
}

fn bench_walls(c: &mut Criterion) {
    let snapshot = Snapshot::from_layout(&rooms_layout(16), &NavConfig::default());
    // A wall in a room interior (simple point) and a wall that cuts a room
    // corridor-style line of walls.
    let mut interior = snapshot.mutator();
    interior.set_cost(Coord::flat(5, 5), PATH_COST_INFINITE);
    let mut splitting = snapshot.mutator();
    for col in 1..=ROOM {
        splitting.set_cost(Coord::flat(8, col), PATH_COST_INFINITE);
    }

    c.bench_function("wall_interior_cell", |b| {
        b.iter(|| snapshot.apply(black_box(&interior)));
    });
    c.bench_function("wall_split_room", |b| {
        b.iter(|| snapshot.apply(black_box(&splitting)));
    });
}

fn bench_paths(c: &mut Criterion) {
    let snapshot = Snapshot::from_layout(&rooms_layout(8), &NavConfig::default());
    let far = Coord::flat(8 * (ROOM + 1) - 2, 8 * (ROOM + 1) - 2);
    let queries: Vec<(Coord, Coord)> = (1..=ROOM)
        .map(|i| (Coord::flat(i, 1), far))
        .collect();

    c.bench_function("path_exists", |b| {
        b.iter(|| snapshot.path_exists(black_box(Coord::flat(1, 1)), black_box(far)));
    });
    c.bench_function("path_corner_to_corner", |b| {
        b.iter(|| snapshot.path(black_box(Coord::flat(1, 1)), black_box(far)));
    });
    c.bench_function("paths_parallel_16", |b| {
        b.iter(|| snapshot.paths(black_box(&queries)));
    });
}

criterion_group!(benches, bench_rebuild, bench_door_batch, bench_walls, bench_paths);
criterion_main!(benches);
