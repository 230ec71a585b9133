// Rectangular index space over grid coordinates.
//
// A `Domain` is `[0, rows) x [0, cols) x [0, layers)`. It maps every valid
// `Coord` to exactly one linear index and back, iterating in row-major order
// with the layer varying fastest, so index order equals `Coord` order.
//
// The domain also owns the fixed adjacency stencil:
// - `adjacent()`: the movement stencil. Same-layer orthogonal and diagonal
//   neighbors plus pure vertical neighbors (never diagonal across layers).
// - `orthogonal()`: the connectivity stencil used by every flood fill and
//   union. Diagonals are a movement-cost concept only.
//
// See also: `grid.rs` for dense storage indexed through a domain,
// `pathfinding.rs` which walks `adjacent()`.

use crate::types::Coord;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Same-layer orthogonal offsets: N, E, S, W (row, col).
const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Same-layer diagonal offsets: NE, SE, SW, NW (row, col).
const DIAGONAL: [(i32, i32); 4] = [(-1, 1), (1, 1), (1, -1), (-1, -1)];

/// Neighbor list sized for the full movement stencil (8 + 2).
pub type Neighbors = SmallVec<[Coord; 10]>;

/// The enumerable coordinate space of one map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub rows: u16,
    pub cols: u16,
    pub layers: u16,
}

impl Domain {
    pub const fn new(rows: u16, cols: u16, layers: u16) -> Self {
        Self { rows, cols, layers }
    }

    /// A single-layer domain.
    pub const fn flat(rows: u16, cols: u16) -> Self {
        Self::new(rows, cols, 1)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols) * usize::from(self.layers)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols && coord.layer < self.layers
    }

    /// Linear index of `coord`, or `None` if it lies outside the domain.
    pub fn try_index(&self, coord: Coord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let cols = usize::from(self.cols);
        let layers = usize::from(self.layers);
        let cell = usize::from(coord.row) * cols + usize::from(coord.col);
        Some(cell * layers + usize::from(coord.layer))
    }

    /// Linear index of `coord`.
    ///
    /// Panics if `coord` is outside the domain: addressing a cell that does
    /// not exist is a caller bug.
    pub fn index(&self, coord: Coord) -> usize {
        self.try_index(coord)
            .unwrap_or_else(|| panic!("coordinate {coord} is outside domain {self:?}"))
    }

    /// Inverse of `index()`. Panics if `index >= len()`.
    pub fn coord(&self, index: usize) -> Coord {
        assert!(
            index < self.len(),
            "index {index} is outside domain {self:?} of {} cells",
            self.len()
        );
        let layers = usize::from(self.layers);
        let cols = usize::from(self.cols);
        let layer = index % layers;
        let rest = index / layers;
        // Each component is bounded by the matching u16 extent.
        Coord::new((rest / cols) as u16, (rest % cols) as u16, layer as u16)
    }

    /// All coordinates in index order.
    pub fn iter(&self) -> DomainIter {
        DomainIter {
            domain: *self,
            front: 0,
            back: self.len(),
        }
    }

    fn shifted(&self, coord: Coord, d_row: i32, d_col: i32, d_layer: i32) -> Option<Coord> {
        coord
            .offset(d_row, d_col, d_layer)
            .filter(|c| self.contains(*c))
    }

    /// The movement stencil around `coord`, clipped to the domain: 4
    /// orthogonal and 4 diagonal same-layer neighbors, then the cells directly
    /// above and below.
    pub fn adjacent(&self, coord: Coord) -> Neighbors {
        let mut out = Neighbors::new();
        for &(dr, dc) in ORTHOGONAL.iter().chain(DIAGONAL.iter()) {
            out.extend(self.shifted(coord, dr, dc, 0));
        }
        out.extend(self.shifted(coord, 0, 0, -1));
        out.extend(self.shifted(coord, 0, 0, 1));
        out
    }

    /// The connectivity stencil around `coord`: same-layer orthogonal
    /// neighbors plus vertical ones, clipped to the domain.
    pub fn orthogonal(&self, coord: Coord) -> SmallVec<[Coord; 6]> {
        let mut out = SmallVec::new();
        for &(dr, dc) in &ORTHOGONAL {
            out.extend(self.shifted(coord, dr, dc, 0));
        }
        out.extend(self.shifted(coord, 0, 0, -1));
        out.extend(self.shifted(coord, 0, 0, 1));
        out
    }

    /// The 8 same-layer cells around `coord` in clockwise order starting at
    /// north. Entries outside the domain are `None`. Even positions are the
    /// orthogonal neighbors; consecutive entries are orthogonally adjacent.
    pub fn ring(&self, coord: Coord) -> [Option<Coord>; 8] {
        const RING: [(i32, i32); 8] = [
            (-1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
            (1, 0),
            (1, -1),
            (0, -1),
            (-1, -1),
        ];
        RING.map(|(dr, dc)| self.shifted(coord, dr, dc, 0))
    }
}

/// Iterator over a domain's coordinates in index order.
#[derive(Clone, Debug)]
pub struct DomainIter {
    domain: Domain,
    front: usize,
    back: usize,
}

impl Iterator for DomainIter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.front >= self.back {
            return None;
        }
        let coord = self.domain.coord(self.front);
        self.front += 1;
        Some(coord)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for DomainIter {
    fn next_back(&mut self) -> Option<Coord> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.domain.coord(self.back))
    }
}

impl ExactSizeIterator for DomainIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrips_every_coord() {
        let domain = Domain::new(4, 5, 3);
        assert_eq!(domain.len(), 60);
        for (i, coord) in domain.iter().enumerate() {
            assert_eq!(domain.index(coord), i);
            assert_eq!(domain.coord(i), coord);
        }
    }

    #[test]
    fn iteration_order_matches_coord_order() {
        let domain = Domain::new(3, 2, 2);
        let coords: Vec<_> = domain.iter().collect();
        let mut sorted = coords.clone();
        sorted.sort();
        assert_eq!(coords, sorted);
        assert_eq!(coords[1], Coord::new(0, 0, 1));
        assert_eq!(coords[2], Coord::new(0, 1, 0));
    }

    #[test]
    fn reverse_iteration() {
        let domain = Domain::flat(2, 2);
        let back: Vec<_> = domain.iter().rev().collect();
        assert_eq!(back[0], Coord::flat(1, 1));
        assert_eq!(back[3], Coord::flat(0, 0));
    }

    #[test]
    fn try_index_out_of_range() {
        let domain = Domain::flat(3, 3);
        assert_eq!(domain.try_index(Coord::flat(3, 0)), None);
        assert_eq!(domain.try_index(Coord::new(0, 0, 1)), None);
    }

    #[test]
    #[should_panic(expected = "outside domain")]
    fn index_panics_out_of_range() {
        Domain::flat(3, 3).index(Coord::flat(0, 3));
    }

    #[test]
    fn adjacent_interior_cell_2d() {
        let domain = Domain::flat(5, 5);
        let n = domain.adjacent(Coord::flat(2, 2));
        assert_eq!(n.len(), 8);
        assert!(n.contains(&Coord::flat(1, 1)));
        assert!(n.contains(&Coord::flat(3, 2)));
    }

    #[test]
    fn adjacent_is_clipped_at_corner() {
        let domain = Domain::flat(5, 5);
        let n = domain.adjacent(Coord::flat(0, 0));
        assert_eq!(n.len(), 3);
    }

    #[test]
    fn adjacent_never_moves_diagonally_across_layers() {
        let domain = Domain::new(3, 3, 3);
        let center = Coord::new(1, 1, 1);
        let n = domain.adjacent(center);
        assert_eq!(n.len(), 10);
        for c in &n {
            if c.layer != center.layer {
                assert_eq!((c.row, c.col), (center.row, center.col));
            }
        }
    }

    #[test]
    fn orthogonal_stencil_3d() {
        let domain = Domain::new(3, 3, 3);
        assert_eq!(domain.orthogonal(Coord::new(1, 1, 1)).len(), 6);
        assert_eq!(domain.orthogonal(Coord::new(0, 0, 0)).len(), 3);
    }

    #[test]
    fn ring_even_slots_are_orthogonal() {
        let domain = Domain::flat(3, 3);
        let ring = domain.ring(Coord::flat(1, 1));
        assert_eq!(ring[0], Some(Coord::flat(0, 1)));
        assert_eq!(ring[2], Some(Coord::flat(1, 2)));
        assert_eq!(ring[4], Some(Coord::flat(2, 1)));
        assert_eq!(ring[6], Some(Coord::flat(1, 0)));
        let corner = domain.ring(Coord::flat(0, 0));
        assert_eq!(corner[0], None);
        assert_eq!(corner[3], Some(Coord::flat(1, 1)));
    }
}
