// warren_nav: incremental grid connectivity and pathfinding with doors.
//
// This crate maintains, for a 2D or layered 3D cost grid with doors, a
// partition of cells into connected regions that is updated incrementally as
// walls, floors, and doors change. Reachability queries are O(1) against that
// partition, and weighted A* search runs only when the goal is known to be
// reachable. State lives in immutable snapshots; edits are batched and
// applied to produce a new snapshot that shares untouched storage with its
// source.
//
// Module overview:
// - `types.rs`:         Coord, Cost and its sentinels, Color, Door.
// - `domain.rs`:        Rectangular index space + adjacency stencils.
// - `grid.rs`:          Dense chunked copy-on-write grid.
// - `disjoint_set.rs`:  Union-find over opaque labels.
// - `connectivity.rs`:  The engine: colors, static/dynamic partitions, edits.
// - `mutation.rs`:      MutationBatch: per-cell edits with merge rules.
// - `snapshot.rs`:      Snapshot: frozen engine, apply(), parallel queries.
// - `pathfinding.rs`:   A* over the cost grid, gated by path_exists.
// - `layout.rs`:        MapLayout: costs + door table, the rebuild input.
// - `map_text.rs`:      Map text format parser and writer.
// - `cache.rs`:         MapCache: explicit cache of parsed maps.
// - `config.rs`:        NavConfig: loader costs and grid chunking, from JSON.
// - `debug.rs`:         DiagnosticView trait + color/component/ASCII dumps.
// - `error.rs`:         Typed errors for text, config, and file input.
//
// The companion crate `warren_oracle` holds reference implementations
// (flood fill, Dijkstra, invariant checks) used to cross-validate this one.
//
// **Critical constraint: determinism.** Given the same layout and the same
// batches, every color, partition, and path is identical across runs. Door
// tables and batches are `BTreeMap`s keyed by `Coord`; hash maps are only
// used where iteration order is never observed.

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod debug;
pub mod disjoint_set;
pub mod domain;
pub mod error;
pub mod grid;
pub mod layout;
pub mod map_text;
pub mod mutation;
pub mod pathfinding;
pub mod snapshot;
pub mod types;

pub use cache::MapCache;
pub use config::NavConfig;
pub use debug::{DiagnosticView, Partition};
pub use domain::Domain;
pub use error::{ConfigError, MapError, MapParseError};
pub use layout::MapLayout;
pub use mutation::{CellEdit, MutationBatch, OpenChange};
pub use pathfinding::Path;
pub use snapshot::Snapshot;
pub use types::{Color, Coord, Cost, Door, INVALID_MOVE, NO_PATH_LENGTH, PATH_COST_INFINITE};
