//! Plain-text rendering of grid graphs.
//!
//! Vertices are drawn on a character canvas at twice their lattice column and row, leaving one
//! character between neighbors for the passage joining them. Hexagonal column offsets and layout
//! jitter are ignored, only the lattice position of a vertex matters.

use crate::graph::Graph;

/// Character of an alive vertex.
const ALIVE: char = 'o';
/// Character of a dead vertex.
const DEAD: char = '.';
/// Character of the vertices and passages along a path.
const PATH: char = '*';

/// Renders a graph, overlaying the given path of pixel coordinates.
///
/// Every path point is mapped to its nearest vertex; consecutive path vertices also mark the
/// passage between them. Lines carry no trailing whitespace.
#[must_use]
pub fn render(graph: &Graph, path: &[(i32, i32)]) -> String {
    let columns = (graph.width() * 2).saturating_sub(1);
    let rows = (graph.height() * 2).saturating_sub(1);
    let mut canvas = vec![vec![' '; columns]; rows];

    for (src, dest) in graph.edges() {
        let (x, y) = midpoint(graph, src, dest);
        let glyph = passage(graph, src, dest);
        let merged = match canvas_get(&canvas, x, y) {
            Some('\\' | '/' | 'X') if glyph != '-' && glyph != '|' => 'X',
            _ => glyph,
        };
        put(&mut canvas, x, y, merged);
    }

    for node in graph.nodes() {
        let (column, row) = graph.grid_position(node.id());
        let glyph = if node.is_alive() { ALIVE } else { DEAD };
        put(&mut canvas, column * 2, row * 2, glyph);
    }

    let on_path: Vec<usize> = path
        .iter()
        .filter_map(|&(x, y)| graph.get_nearest_node_to(x, y))
        .collect();
    for &id in &on_path {
        let (column, row) = graph.grid_position(id);
        put(&mut canvas, column * 2, row * 2, PATH);
    }
    for pair in on_path.windows(2) {
        if let [src, dest] = *pair {
            if graph.is_adjacent(src, dest) {
                let (x, y) = midpoint(graph, src, dest);
                put(&mut canvas, x, y, PATH);
            }
        }
    }

    canvas
        .into_iter()
        .map(|line| line.into_iter().collect::<String>().trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the canvas cell between two vertices.
fn midpoint(graph: &Graph, src: usize, dest: usize) -> (usize, usize) {
    let (src_column, src_row) = graph.grid_position(src);
    let (dest_column, dest_row) = graph.grid_position(dest);
    (src_column + dest_column, src_row + dest_row)
}

/// Returns the glyph of the passage between two vertices.
fn passage(graph: &Graph, src: usize, dest: usize) -> char {
    let (src_column, src_row) = graph.grid_position(src);
    let (dest_column, dest_row) = graph.grid_position(dest);

    if src_row == dest_row {
        '-'
    } else if src_column == dest_column {
        '|'
    } else if (src_column < dest_column) == (src_row < dest_row) {
        '\\'
    } else {
        '/'
    }
}

/// Reads a canvas cell, `None` when it is out of bounds.
fn canvas_get(canvas: &[Vec<char>], x: usize, y: usize) -> Option<char> {
    canvas.get(y).and_then(|line| line.get(x)).copied()
}

/// Writes a canvas cell, ignoring out of bounds coordinates.
fn put(canvas: &mut [Vec<char>], x: usize, y: usize, glyph: char) {
    if let Some(cell) = canvas.get_mut(y).and_then(|line| line.get_mut(x)) {
        *cell = glyph;
    }
}
