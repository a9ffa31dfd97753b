//! Topology builders and maze carving module.
//!
//! This module builds the base grid graphs every maze and automaton starts from, and carves those
//! topologies into mazes either with a randomized depth-first search or with a biased variant of
//! Kruskal's algorithm.

use clap::ValueEnum;
use color_eyre::eyre::{bail, eyre, Result};
use log::debug;
use rand::{
    seq::{IndexedRandom as _, SliceRandom as _},
    Rng,
};
use serde::{Deserialize, Serialize};

use crate::{config::GridLayout, disjoint_set::DisjointSet, graph::Graph};

/// Shape of the base grid graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridShape {
    /// Four-neighborhood lattice.
    #[default]
    Orthogonal,
    /// Orthogonal lattice plus one diagonal per cell, with every other column shifted down by half
    /// a cell. This yields a six-neighborhood honeycomb.
    Hexagonal,
    /// Orthogonal lattice plus both diagonals, the eight-neighborhood.
    Laplacian,
}

impl GridShape {
    /// Builds a grid graph of this shape for the given layout.
    ///
    /// # Errors
    ///
    /// This function returns the same errors as [`create_orthogonal_grid_graph`].
    pub fn build<R>(self, layout: &GridLayout, rng: &mut R) -> Result<Graph>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Orthogonal => create_orthogonal_grid_graph(layout, rng),
            Self::Hexagonal => create_hexagonal_grid_graph(layout, rng),
            Self::Laplacian => create_orthogonal_grid_graph_laplacian(layout, rng),
        }
    }

    /// Returns the ids of the already placed neighbors of the cell at the given column and row.
    ///
    /// Builders visit cells column by column, so only neighbors in the previous column or the
    /// previous row need to be connected; the other half of each edge comes from the neighbor's
    /// own visit.
    fn backward_neighbors(self, column: usize, row: usize, height: usize) -> Vec<usize> {
        let mut neighbors = Vec::with_capacity(4);
        let id = column * height + row;
        let left = column.checked_sub(1).map(|previous| previous * height + row);

        if let Some(left) = left {
            neighbors.push(left);
        }
        if row > 0 {
            neighbors.push(id - 1);
        }

        let Some(left) = left else {
            return neighbors;
        };
        let up_left = (row > 0).then(|| left - 1);
        let down_left = (row + 1 < height).then_some(left + 1);

        match self {
            Self::Orthogonal => {}
            Self::Hexagonal if column % 2 == 0 => neighbors.extend(up_left),
            Self::Hexagonal => neighbors.extend(down_left),
            Self::Laplacian => {
                neighbors.extend(up_left);
                neighbors.extend(down_left);
            }
        }

        neighbors
    }
}

/// Creates a grid graph where each node is connected to its row and column predecessors.
///
/// Nodes sit `spacing` pixels apart with a one cell margin. When the layout asks for a non-grid
/// look, every node position is jittered by up to a quarter of the spacing; the adjacency is not
/// affected.
///
/// # Errors
///
/// This function returns an error if:
/// - The layout has a zero width, height or spacing
/// - A node coordinate does not fit in an `i32`
pub fn create_orthogonal_grid_graph<R>(layout: &GridLayout, rng: &mut R) -> Result<Graph>
where
    R: Rng + ?Sized,
{
    build_grid(GridShape::Orthogonal, layout, rng)
}

/// Creates a honeycomb grid graph.
///
/// Odd columns are shifted down by half the spacing, and each node gets one diagonal edge to the
/// previous column on top of the orthogonal ones.
///
/// # Errors
///
/// This function returns the same errors as [`create_orthogonal_grid_graph`].
pub fn create_hexagonal_grid_graph<R>(layout: &GridLayout, rng: &mut R) -> Result<Graph>
where
    R: Rng + ?Sized,
{
    build_grid(GridShape::Hexagonal, layout, rng)
}

/// Creates an eight-neighborhood grid graph, orthogonal edges plus both diagonals.
///
/// # Errors
///
/// This function returns the same errors as [`create_orthogonal_grid_graph`].
pub fn create_orthogonal_grid_graph_laplacian<R>(layout: &GridLayout, rng: &mut R) -> Result<Graph>
where
    R: Rng + ?Sized,
{
    build_grid(GridShape::Laplacian, layout, rng)
}

/// Lays out and connects the nodes of a grid graph of the given shape.
fn build_grid<R>(topology: GridShape, layout: &GridLayout, rng: &mut R) -> Result<Graph>
where
    R: Rng + ?Sized,
{
    layout.validate()?;

    let (width, height) = (layout.width, layout.height);
    let spacing = i32::try_from(layout.spacing)?;
    let jitter = spacing / 4;
    let mut graph = Graph::new(width, height);

    for column in 0..width {
        for row in 0..height {
            let id = column * height + row;
            let mut x = lattice_coordinate(column, spacing)?;
            let mut y = lattice_coordinate(row, spacing)?;

            if topology == GridShape::Hexagonal && column % 2 == 1 {
                y = y.saturating_add(spacing / 2);
            }
            if layout.non_grid && jitter > 0 {
                x = x.saturating_add(rng.random_range(-jitter..=jitter));
                y = y.saturating_add(rng.random_range(-jitter..=jitter));
            }
            graph.set_node(id, x, y);

            for neighbor in topology.backward_neighbors(column, row, height) {
                graph.add_edge(id, neighbor);
            }
        }
    }

    debug!(
        "built {topology:?} grid graph {width}x{height} with {} edges",
        graph.edge_count()
    );

    Ok(graph)
}

/// Converts a lattice index to a pixel coordinate, leaving a one cell margin.
fn lattice_coordinate(index: usize, spacing: i32) -> Result<i32> {
    i32::try_from(index)
        .ok()
        .and_then(|index| index.checked_add(1))
        .and_then(|cells| cells.checked_mul(spacing))
        .ok_or_else(|| eyre!("lattice index {index} overflows the pixel coordinate range"))
}

/// Carves a perfect maze out of the topology with a randomized depth-first search.
///
/// Starting at vertex 0, the search repeatedly walks to a random unvisited topology neighbor of
/// the vertex on top of the stack, keeping every edge it walks, and backtracks when there is none
/// left. Every edge that was never walked is dropped, so the result is a spanning tree of the
/// component containing vertex 0: exactly `v - 1` edges for a connected topology.
pub fn generate_maze_dfs<R>(topology: &Graph, rng: &mut R) -> Graph
where
    R: Rng + ?Sized,
{
    let mut maze = topology.create_copy();
    maze.strip_edges();
    if topology.v() == 0 {
        return maze;
    }

    let mut visited = vec![false; topology.v()];
    let mut stack = vec![0];
    if let Some(start) = visited.first_mut() {
        *start = true;
    }

    while let Some(&current) = stack.last() {
        let unvisited: Vec<usize> = topology
            .neighbors(current)
            .iter()
            .copied()
            .filter(|&neighbor| visited.get(neighbor).is_some_and(|seen| !seen))
            .collect();

        if let Some(&next) = unvisited.choose(rng) {
            maze.add_edge(current, next);
            if let Some(seen) = visited.get_mut(next) {
                *seen = true;
            }
            stack.push(next);
        } else {
            let _ = stack.pop();
        }
    }

    debug!("carved dfs maze with {} edges", maze.edge_count());

    maze
}

/// Tuning knobs of the biased Kruskal generator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KruskalBias {
    /// Share of the spanning tree edges that should run horizontally.
    horizontal: f64,
    /// Share of the spanning tree edges that should run vertically.
    vertical: f64,
    /// Share of the remaining topology edges to add back as loops.
    cycle: f64,
}

impl Default for KruskalBias {
    fn default() -> Self {
        Self {
            horizontal: 0.5,
            vertical: 0.5,
            cycle: 0.0,
        }
    }
}

impl KruskalBias {
    /// Tolerance allowed on the sum of the horizontal and vertical shares.
    const SUM_TOLERANCE: f64 = 1e-6;

    /// Builds a validated set of biases.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    /// - Any bias is outside `[0, 1]` or not a finite number
    /// - The horizontal and vertical biases do not sum to 1
    pub fn new(horizontal: f64, vertical: f64, cycle: f64) -> Result<Self> {
        for (name, value) in [
            ("horizontal", horizontal),
            ("vertical", vertical),
            ("cycle", cycle),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} bias must be within [0, 1], got {value}");
            }
        }
        if (horizontal + vertical - 1.0).abs() > Self::SUM_TOLERANCE {
            bail!("horizontal and vertical biases must sum to 1, got {horizontal} + {vertical}");
        }

        Ok(Self {
            horizontal,
            vertical,
            cycle,
        })
    }

    /// Returns the horizontal share.
    #[must_use]
    pub const fn horizontal(&self) -> f64 {
        self.horizontal
    }

    /// Returns the vertical share.
    #[must_use]
    pub const fn vertical(&self) -> f64 {
        self.vertical
    }

    /// Returns the cycle share.
    #[must_use]
    pub const fn cycle(&self) -> f64 {
        self.cycle
    }
}

/// Orientation of an edge on the lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    /// The edge crosses more columns than rows.
    Horizontal,
    /// The edge crosses at least as many rows as columns.
    Vertical,
}

impl Direction {
    /// Classifies the edge between two vertices by its larger lattice delta.
    fn of(graph: &Graph, src: usize, dest: usize) -> Self {
        let (src_column, src_row) = graph.grid_position(src);
        let (dest_column, dest_row) = graph.grid_position(dest);

        if src_column.abs_diff(dest_column) > src_row.abs_diff(dest_row) {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}

/// Bookkeeping shared by the phases of the Kruskal generator.
struct KruskalState {
    /// Maze being carved.
    maze: Graph,
    /// Components of the maze so far.
    sets: DisjointSet,
    /// Number of horizontal edges added.
    horizontal: usize,
    /// Number of vertical edges added.
    vertical: usize,
}

impl KruskalState {
    /// Adds an edge to the maze and records it in the components and counters.
    fn connect(&mut self, src: usize, dest: usize, direction: Direction) {
        self.maze.add_edge(src, dest);
        self.sets.merge(src, dest);
        match direction {
            Direction::Horizontal => self.horizontal += 1,
            Direction::Vertical => self.vertical += 1,
        }
    }

    /// Connects one random edge between two adjacent bands of the lattice.
    ///
    /// A band is a column or a row; `band_of` maps a vertex to the index of its band. Only edges
    /// joining two different components are considered.
    fn force_band<F>(&mut self, topology: &Graph, edges: &[(usize, usize)], band: usize, band_of: F)
    where
        F: Fn(usize) -> usize,
    {
        let candidate = edges.iter().copied().find(|&(src, dest)| {
            let (low, high) = if band_of(src) < band_of(dest) {
                (band_of(src), band_of(dest))
            } else {
                (band_of(dest), band_of(src))
            };
            low + 1 == band && high == band && !self.sets.same_set(src, dest)
        });

        if let Some((src, dest)) = candidate {
            self.connect(src, dest, Direction::of(topology, src, dest));
        }
    }
}

/// Scales a count by a fraction, rounding to the nearest integer and never exceeding the count.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The fraction is validated to lie in [0, 1], so the product is a non-negative value no larger than the count."
)]
fn share(count: usize, fraction: f64) -> usize {
    ((count as f64 * fraction).round() as usize).min(count)
}

/// Carves a maze with a biased variant of Kruskal's algorithm.
///
/// The spanning tree budget of `v - 1` edges is split between horizontal and vertical edges
/// according to the bias. The maze is first seeded with one random edge between every pair of
/// adjacent columns and every pair of adjacent rows, so no band is ever cut off. Random topology
/// edges joining two components are then added while their direction is under budget, and any
/// components still apart are joined regardless of direction. Finally a `cycle` share of the
/// topology edges left out of the tree is added back as loops.
///
/// A zero cycle bias yields a perfect maze; a cycle bias of one restores the full topology.
pub fn generate_maze_kruskal<R>(topology: &Graph, bias: &KruskalBias, rng: &mut R) -> Graph
where
    R: Rng + ?Sized,
{
    let mut maze = topology.create_copy();
    maze.strip_edges();
    let v = topology.v();
    if v == 0 {
        return maze;
    }

    let tree_budget = v - 1;
    let horizontal_target = share(tree_budget, bias.horizontal);
    let vertical_target = tree_budget - horizontal_target;

    let mut edges: Vec<(usize, usize)> = topology.edges().collect();
    edges.shuffle(rng);

    let mut state = KruskalState {
        maze,
        sets: DisjointSet::new(v),
        horizontal: 0,
        vertical: 0,
    };

    for column in 1..topology.width() {
        state.force_band(topology, &edges, column, |id| topology.grid_position(id).0);
    }
    for row in 1..topology.height() {
        state.force_band(topology, &edges, row, |id| topology.grid_position(id).1);
    }
    debug!(
        "kruskal forced {} horizontal and {} vertical band edges",
        state.horizontal, state.vertical
    );

    for &(src, dest) in &edges {
        let direction = Direction::of(topology, src, dest);
        let under_budget = match direction {
            Direction::Horizontal => state.horizontal < horizontal_target,
            Direction::Vertical => state.vertical < vertical_target,
        };
        if under_budget && !state.sets.same_set(src, dest) {
            state.connect(src, dest, direction);
        }
    }

    for &(src, dest) in &edges {
        if !state.sets.same_set(src, dest) {
            state.connect(src, dest, Direction::of(topology, src, dest));
        }
    }

    let tree_edges = state.maze.edge_count();
    let cycle_budget = share(topology.edge_count().saturating_sub(tree_edges), bias.cycle);
    let mut maze = state.maze;
    let mut added = 0;
    for &(src, dest) in &edges {
        if added >= cycle_budget {
            break;
        }
        if !maze.is_adjacent(src, dest) {
            maze.add_edge(src, dest);
            added += 1;
        }
    }

    debug!(
        "carved kruskal maze with {tree_edges} tree edges and {added} loop edges \
         ({} horizontal / {} vertical in the tree)",
        state.horizontal, state.vertical
    );

    maze
}
