// Dense grid storage indexed by coordinate.
//
// A `DenseGrid<T>` holds one value per cell of its `Domain`, stored in
// fixed-length chunks of `Arc<Vec<T>>`. Cloning a grid clones only the chunk
// pointers; the first write to a shared chunk copies that chunk alone
// (`Arc::make_mut`). This is what lets a mutation batch produce a new
// snapshot that shares every untouched chunk with its source.
//
// Reads and writes are O(1). Out-of-domain access panics; the engine treats
// an invalid coordinate as a caller bug.
//
// The engine keeps two grids of this type: terrain costs (`Cost`) and
// region colors (`Color`).
//
// See also: `domain.rs` for index mapping and the adjacency stencil,
// `connectivity.rs` which owns the cost and color grids.

use crate::domain::{Domain, Neighbors};
use crate::types::Coord;
use std::sync::Arc;

/// Default number of cells per copy-on-write chunk.
pub const DEFAULT_CHUNK_CELLS: usize = 4096;

/// Dense, chunked, copy-on-write grid.
#[derive(Clone, Debug)]
pub struct DenseGrid<T> {
    domain: Domain,
    chunk_cells: usize,
    chunks: Vec<Arc<Vec<T>>>,
}

impl<T: Copy> DenseGrid<T> {
    /// Create a grid over `domain` with every cell set to `fill`, stored in
    /// chunks of `chunk_cells`. Panics if `chunk_cells` is zero.
    pub fn with_chunk_cells(domain: Domain, fill: T, chunk_cells: usize) -> Self {
        assert!(chunk_cells > 0, "grid chunk length must be positive");
        let total = domain.len();
        let mut chunks = Vec::with_capacity(total.div_ceil(chunk_cells));
        let mut remaining = total;
        while remaining > 0 {
            let len = remaining.min(chunk_cells);
            chunks.push(Arc::new(vec![fill; len]));
            remaining -= len;
        }
        Self {
            domain,
            chunk_cells,
            chunks,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        (index / self.chunk_cells, index % self.chunk_cells)
    }

    /// Read a cell. Panics if `coord` is outside the domain.
    pub fn get(&self, coord: Coord) -> T {
        let (chunk, offset) = self.locate(self.domain.index(coord));
        self.chunks[chunk][offset]
    }

    /// Write a cell, copying its chunk first if it is shared with another
    /// grid. Panics if `coord` is outside the domain.
    pub fn set(&mut self, coord: Coord, value: T) {
        let (chunk, offset) = self.locate(self.domain.index(coord));
        Arc::make_mut(&mut self.chunks[chunk])[offset] = value;
    }

    /// The movement stencil around `coord`. See `Domain::adjacent`.
    pub fn adjacent(&self, coord: Coord) -> Neighbors {
        self.domain.adjacent(coord)
    }

    /// Number of chunks whose storage is physically shared with `other`.
    pub fn shared_chunks(&self, other: &Self) -> usize {
        self.chunks
            .iter()
            .zip(other.chunks.iter())
            .filter(|(a, b)| Arc::ptr_eq(a, b))
            .count()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rows: u16, cols: u16, fill: u8) -> DenseGrid<u8> {
        DenseGrid::with_chunk_cells(Domain::flat(rows, cols), fill, DEFAULT_CHUNK_CELLS)
    }

    #[test]
    fn new_grid_is_filled() {
        let grid = DenseGrid::with_chunk_cells(Domain::new(4, 4, 2), 7u8, 5);
        assert_eq!(grid.chunk_count(), 7);
        for coord in grid.domain().iter() {
            assert_eq!(grid.get(coord), 7);
        }
    }

    #[test]
    fn set_and_get() {
        let mut grid = filled(8, 8, 0);
        let coord = Coord::flat(3, 5);
        grid.set(coord, 9);
        assert_eq!(grid.get(coord), 9);
        // Neighbors are untouched.
        assert_eq!(grid.get(Coord::flat(3, 4)), 0);
        assert_eq!(grid.get(Coord::flat(4, 5)), 0);
    }

    #[test]
    #[should_panic(expected = "outside domain")]
    fn get_out_of_range_panics() {
        filled(2, 2, 1).get(Coord::flat(0, 2));
    }

    #[test]
    #[should_panic(expected = "outside domain")]
    fn set_out_of_range_panics() {
        filled(2, 2, 1).set(Coord::new(0, 0, 1), 3);
    }

    #[test]
    fn chunks_cover_partial_tail() {
        let grid = DenseGrid::with_chunk_cells(Domain::flat(10, 10), 0u8, 32);
        assert_eq!(grid.chunk_count(), 4);
        assert_eq!(grid.get(Coord::flat(9, 9)), 0);
    }

    #[test]
    fn clone_shares_until_written() {
        let original = DenseGrid::with_chunk_cells(Domain::flat(16, 16), 0u8, 64);
        let mut copy = original.clone();
        assert_eq!(copy.shared_chunks(&original), 4);

        copy.set(Coord::flat(0, 1), 5);
        assert_eq!(copy.shared_chunks(&original), 3);
        assert_eq!(original.get(Coord::flat(0, 1)), 0);
        assert_eq!(copy.get(Coord::flat(0, 1)), 5);

        // A second write to the now-private chunk copies nothing further.
        copy.set(Coord::flat(0, 2), 6);
        assert_eq!(copy.shared_chunks(&original), 3);
    }
}
