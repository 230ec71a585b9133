// Map text format: parse into a `MapLayout`, render back.
//
// One line per row, one character per cell:
//
//   ' '       floor, cost `NavConfig::floor_cost`
//   '*'       wall
//   'd', '_'  open door, open-cost `NavConfig::door_open_cost`
//   'D'       closed door, same open-cost
//
// Rows shorter than the widest row in the whole map are padded with floor.
// A line consisting of exactly `---` starts the next layer; every layer must
// have the same number of rows. `\r\n` line endings are accepted and blank
// lines at the very end of the text are ignored.
//
// `render_layout()` writes the same format (doors as `d`/`D`, impassable
// cells as `*`, everything else as floor), so parsing a rendered map built
// from these glyphs yields the same layout.
//
// See also: `cache.rs`, which loads map files through `parse_map()`,
// `debug.rs` for renders of live engine state.

use crate::config::NavConfig;
use crate::debug::render_with;
use crate::domain::Domain;
use crate::error::MapParseError;
use crate::layout::MapLayout;
use crate::types::{Coord, PATH_COST_INFINITE};

/// Line that separates layers.
pub const LAYER_SEPARATOR: &str = "---";

/// Parse map text into a layout using the loader costs from `config`.
pub fn parse_map(text: &str, config: &NavConfig) -> Result<MapLayout, MapParseError> {
    // (1-based line number, row text) grouped by layer.
    let mut layers: Vec<Vec<(usize, &str)>> = vec![Vec::new()];
    let mut lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .collect();
    while lines.last().is_some_and(|(_, line)| line.trim().is_empty()) {
        lines.pop();
    }
    for (number, line) in lines {
        if line == LAYER_SEPARATOR {
            layers.push(Vec::new());
        } else if let Some(layer) = layers.last_mut() {
            layer.push((number, line));
        }
    }

    let rows = layers[0].len();
    for (index, layer) in layers.iter().enumerate() {
        if layer.len() != rows {
            return Err(MapParseError::RaggedLayer {
                layer: index,
                expected: rows,
                found: layer.len(),
            });
        }
    }
    let cols = layers
        .iter()
        .flatten()
        .map(|(_, line)| line.chars().count())
        .max()
        .unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Err(MapParseError::Empty);
    }

    let domain = Domain::new(
        extent("row", rows)?,
        extent("column", cols)?,
        extent("layer", layers.len())?,
    );
    let mut layout = MapLayout::new(domain, config.floor_cost);

    for (layer_index, layer) in layers.iter().enumerate() {
        for (row_index, &(line_number, line)) in layer.iter().enumerate() {
            for (col_index, glyph) in line.chars().enumerate() {
                // Extents were checked above, so every index fits in u16.
                let coord = Coord::new(row_index as u16, col_index as u16, layer_index as u16);
                match glyph {
                    ' ' => {}
                    '*' => {
                        layout.set_cost(coord, PATH_COST_INFINITE);
                    }
                    'd' | '_' => {
                        layout.add_door(coord, true, config.door_open_cost);
                    }
                    'D' => {
                        layout.add_door(coord, false, config.door_open_cost);
                    }
                    other => {
                        return Err(MapParseError::UnknownGlyph {
                            line: line_number,
                            column: col_index + 1,
                            glyph: other,
                        });
                    }
                }
            }
        }
    }
    Ok(layout)
}

fn extent(axis: &'static str, count: usize) -> Result<u16, MapParseError> {
    u16::try_from(count).map_err(|_| MapParseError::TooLarge {
        axis,
        count,
        max: usize::from(u16::MAX),
    })
}

/// Write a layout in map text format.
pub fn render_layout(layout: &MapLayout) -> String {
    render_with(layout.domain(), |coord| match layout.door(coord) {
        Some(door) if door.open => 'd',
        Some(_) => 'D',
        None if layout.cost(coord) == PATH_COST_INFINITE => '*',
        None => ' ',
    })
}
