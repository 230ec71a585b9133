// Read-only diagnostic access and text dumps.
//
// `DiagnosticView` is the narrow window test oracles and debugging tools get
// into engine internals: per-cell cost, color, and door, plus the static and
// dynamic representative of any color. It exposes no mutation and no
// union-find internals. `Connectivity` implements it; `Snapshot::diagnostics()`
// hands it out.
//
// The dump functions render one line per row, layers separated by `---`
// (the map text separator):
// - `color_map()`: one glyph per color.
// - `component_map()`: one glyph per static or dynamic component.
// - `render_ascii()`: terrain glyphs, with an optional path drawn as `.`.
//
// Glyphs for colors and components are handed out in first-seen (index)
// order, so two engines with the same topology render identically even if
// their color ids differ.

use crate::connectivity::Connectivity;
use crate::domain::Domain;
use crate::types::{Color, Coord, Cost, Door, PATH_COST_INFINITE};
use rustc_hash::{FxHashMap, FxHashSet};

/// Read-only view of engine state for oracles and dumps.
pub trait DiagnosticView {
    fn domain(&self) -> Domain;
    fn cost_at(&self, coord: Coord) -> Cost;
    fn color_at(&self, coord: Coord) -> Color;
    fn door_at(&self, coord: Coord) -> Option<Door>;
    /// Number of entries in the door table.
    fn door_count(&self) -> usize;
    /// Static representative of `color` (panics on an unknown color).
    fn static_component(&self, color: Color) -> Color;
    /// Dynamic representative of `color` (panics on an unknown color).
    fn dynamic_component(&self, color: Color) -> Color;
}

impl DiagnosticView for Connectivity {
    fn domain(&self) -> Domain {
        Connectivity::domain(self)
    }

    fn cost_at(&self, coord: Coord) -> Cost {
        self.cost(coord)
    }

    fn color_at(&self, coord: Coord) -> Color {
        self.color(coord)
    }

    fn door_at(&self, coord: Coord) -> Option<Door> {
        self.door(coord)
    }

    fn door_count(&self) -> usize {
        self.doors().len()
    }

    fn static_component(&self, color: Color) -> Color {
        Connectivity::static_component(self, color)
    }

    fn dynamic_component(&self, color: Color) -> Color {
        Connectivity::dynamic_component(self, color)
    }
}

/// Which partition `component_map()` draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Static,
    Dynamic,
}

const WALL_GLYPH: char = '*';
const DOOR_GLYPH: char = '#';
const OVERFLOW_GLYPH: char = '?';
const LABEL_GLYPHS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Assigns label glyphs in first-seen order.
#[derive(Default)]
struct GlyphTable {
    assigned: FxHashMap<Color, char>,
}

impl GlyphTable {
    fn glyph(&mut self, key: Color) -> char {
        let next = self.assigned.len();
        *self.assigned.entry(key).or_insert_with(|| {
            LABEL_GLYPHS
                .get(next)
                .map_or(OVERFLOW_GLYPH, |&b| char::from(b))
        })
    }
}

/// One glyph per cell, rows as lines, layers separated by `---`. Shared by
/// the dumps and the map text writer.
pub(crate) fn render_with(domain: Domain, mut glyph: impl FnMut(Coord) -> char) -> String {
    let mut out = String::with_capacity(domain.len() + usize::from(domain.rows) * 4);
    for layer in 0..domain.layers {
        if layer > 0 {
            out.push_str("---\n");
        }
        for row in 0..domain.rows {
            for col in 0..domain.cols {
                out.push(glyph(Coord::new(row, col, layer)));
            }
            out.push('\n');
        }
    }
    out
}

/// One glyph per color: walls `*`, doors `#`, ordinary colors labeled.
pub fn color_map(view: &dyn DiagnosticView) -> String {
    let mut glyphs = GlyphTable::default();
    render_with(view.domain(), |coord| {
        let color = view.color_at(coord);
        if color == Color::IMPASSABLE {
            WALL_GLYPH
        } else if color.is_door() {
            DOOR_GLYPH
        } else {
            glyphs.glyph(color)
        }
    })
}

/// One glyph per component of `partition`. Walls are `*`; doors are labeled
/// by their component like any other cell.
pub fn component_map(view: &dyn DiagnosticView, partition: Partition) -> String {
    let mut glyphs = GlyphTable::default();
    render_with(view.domain(), |coord| {
        let color = view.color_at(coord);
        if color == Color::IMPASSABLE {
            return WALL_GLYPH;
        }
        let root = match partition {
            Partition::Static => view.static_component(color),
            Partition::Dynamic => view.dynamic_component(color),
        };
        glyphs.glyph(root)
    })
}

/// Terrain render in the map text glyphs (`*` wall, ` ` floor, `d` open
/// door, `D` closed door) with `path` cells drawn as `.`.
pub fn render_ascii(view: &dyn DiagnosticView, path: Option<&[Coord]>) -> String {
    let on_path: FxHashSet<Coord> = path.unwrap_or_default().iter().copied().collect();
    render_with(view.domain(), |coord| {
        if on_path.contains(&coord) {
            return '.';
        }
        match view.door_at(coord) {
            Some(door) if door.open => 'd',
            Some(_) => 'D',
            None if view.cost_at(coord) == PATH_COST_INFINITE => WALL_GLYPH,
            None => ' ',
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DEFAULT_CHUNK_CELLS;
    use crate::layout::MapLayout;

    fn rooms() -> Connectivity {
        let mut layout = MapLayout::new(Domain::flat(2, 5), 1);
        layout
            .set_cost(Coord::flat(0, 2), PATH_COST_INFINITE)
            .add_door(Coord::flat(1, 2), true, 1);
        Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS)
    }

    #[test]
    fn color_map_labels_regions() {
        assert_eq!(color_map(&rooms()), "00*11\n00#11\n");
    }

    #[test]
    fn component_maps_differ_by_door_state() {
        let engine = rooms();
        assert_eq!(component_map(&engine, Partition::Static), "00*11\n00211\n");
        assert_eq!(component_map(&engine, Partition::Dynamic), "00*00\n00000\n");
    }

    #[test]
    fn render_marks_path_and_doors() {
        let mut engine = rooms();
        let path = [Coord::flat(1, 0), Coord::flat(1, 1)];
        assert_eq!(render_ascii(&engine, Some(&path)), "  *  \n..d  \n");
        engine.set_door_open(Coord::flat(1, 2), false);
        assert_eq!(render_ascii(&engine, None), "  *  \n  D  \n");
    }

    #[test]
    fn layers_are_separated() {
        let layout = MapLayout::new(Domain::new(1, 2, 2), 1);
        let engine = Connectivity::from_layout(&layout, DEFAULT_CHUNK_CELLS);
        assert_eq!(render_ascii(&engine, None), "  \n---\n  \n");
    }
}
