// Core types shared across the navigation engine.
//
// Defines grid coordinates (`Coord`), terrain cost constants, the per-cell
// `Color` label that partitions the grid into regions and door identities,
// and the `Door` record. All plain-data types derive `Serialize` and
// `Deserialize` so configs, layouts, and diagnostics can be exchanged as JSON.
//
// See also: `domain.rs` for the index space over `Coord`, `connectivity.rs`
// for how colors are assigned and maintained.
//
// **Critical constraint: determinism.** `Coord` ordering is lexicographic
// (row, col, layer) and is the iteration order of every ordered collection
// keyed by coordinates. Search tie-breaking relies on it.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position in the grid. Each component is a cell index.
///
/// 2D maps use a single layer (`layer == 0`). Ordering is lexicographic on
/// `(row, col, layer)`, which matches the linear index order of `Domain`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: u16,
    pub col: u16,
    pub layer: u16,
}

impl Coord {
    pub const fn new(row: u16, col: u16, layer: u16) -> Self {
        Self { row, col, layer }
    }

    /// A coordinate on layer 0, for 2D maps.
    pub const fn flat(row: u16, col: u16) -> Self {
        Self { row, col, layer: 0 }
    }

    /// Straight-line distance between two cell centers, in cells.
    pub fn euclidean_distance(self, other: Self) -> f64 {
        let dr = f64::from(self.row) - f64::from(other.row);
        let dc = f64::from(self.col) - f64::from(other.col);
        let dl = f64::from(self.layer) - f64::from(other.layer);
        (dr * dr + dc * dc + dl * dl).sqrt()
    }

    /// Offset this coordinate by signed deltas. Returns `None` if any
    /// component would leave the `u16` range (the domain check is separate).
    pub fn offset(self, d_row: i32, d_col: i32, d_layer: i32) -> Option<Self> {
        let shift = |v: u16, d: i32| u16::try_from(i32::from(v) + d).ok();
        Some(Self {
            row: shift(self.row, d_row)?,
            col: shift(self.col, d_col)?,
            layer: shift(self.layer, d_layer)?,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.row, self.col, self.layer)
    }
}

// ---------------------------------------------------------------------------
// Terrain cost
// ---------------------------------------------------------------------------

/// Traversal cost of a single cell. `PATH_COST_INFINITE` marks a wall.
pub type Cost = u8;

/// Reserved cost meaning "impassable". Every other value (0–254) is an
/// ordinary terrain weight.
pub const PATH_COST_INFINITE: Cost = u8::MAX;

/// Returned by `move_cost` for moves that may not be attempted.
pub const INVALID_MOVE: f64 = -1.0;

/// Path length reported when no path exists.
pub const NO_PATH_LENGTH: f64 = -1.0;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Per-cell region label.
///
/// - `>= 0`: an ordinary region of orthogonally connected transparent cells.
///   New ordinary colors count upward from 0.
/// - `-1, -2, ...`: one unique label per door. New door colors count downward.
/// - `IMPASSABLE`: walls.
/// - `UNKNOWN` / `MULTIPLE`: transient markers used only during a full rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color(pub i32);

impl Color {
    pub const IMPASSABLE: Color = Color(i32::MIN);
    pub const UNKNOWN: Color = Color(i32::MIN + 1);
    pub const MULTIPLE: Color = Color(i32::MIN + 2);

    /// First ordinary color handed out by a fresh engine.
    pub const FIRST_ORDINARY: Color = Color(0);
    /// First door color handed out by a fresh engine.
    pub const FIRST_DOOR: Color = Color(-1);

    pub fn is_ordinary(self) -> bool {
        self.0 >= 0
    }

    pub fn is_door(self) -> bool {
        self.0 < 0 && self.0 > Self::MULTIPLE.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::IMPASSABLE => write!(f, "impassable"),
            Self::UNKNOWN => write!(f, "unknown"),
            Self::MULTIPLE => write!(f, "multiple"),
            Color(c) if c < 0 => write!(f, "door{}", -c),
            Color(c) => write!(f, "region{c}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Doors
// ---------------------------------------------------------------------------

/// A door cell. When closed its cost is `PATH_COST_INFINITE`; when open it
/// costs `cost_when_open`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub open: bool,
    pub cost_when_open: Cost,
}

impl Door {
    pub const fn new(open: bool, cost_when_open: Cost) -> Self {
        Self {
            open,
            cost_when_open,
        }
    }

    /// The cost the cell currently carries in the cost grid.
    pub fn current_cost(self) -> Cost {
        if self.open {
            self.cost_when_open
        } else {
            PATH_COST_INFINITE
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Serde adapter for `BTreeMap<Coord, V>` fields: written as a list of
/// `[coord, value]` pairs, since JSON object keys must be strings.
pub(crate) mod coord_map {
    use super::Coord;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S, V>(map: &BTreeMap<Coord, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<Coord, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        Ok(Vec::<(Coord, V)>::deserialize(deserializer)?
            .into_iter()
            .collect())
    }
}
