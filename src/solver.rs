//! Shortest-path solving module.
//!
//! This module answers reachability and shortest-path queries over the alive part of a graph.
//! Only nodes that are alive and edges that are present are ever traversed, which lets the same
//! functions solve static mazes (where every node is alive) and cellular automaton generations
//! alike. Start and end points are given as pixel coordinates and mapped to the nearest node.

use std::collections::VecDeque;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::graph::{Graph, Node};

/// Sequence of pixel coordinates from the start node to the end node, both included.
pub type Path = Vec<(i32, i32)>;

/// Shortest-path algorithm to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Breadth-first search.
    #[default]
    Bfs,
    /// Dijkstra's algorithm with unit edge weights.
    Dijkstra,
    /// A* search guided by a [`Heuristic`].
    AStar,
}

/// Distance estimate used by A* to rank open vertices.
///
/// Estimates are measured in lattice cells between the columns and rows of the two vertices, so
/// they are independent of the pixel spacing and of any layout jitter. A* divides every estimate by
/// the largest estimate across a single edge of the graph, so on hexagonal and eight-neighborhood
/// lattices, where a diagonal step costs as much as an orthogonal one, the metric estimates still
/// never exceed the true number of steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Heuristic {
    /// Sum of the column and row deltas. Paths are always the shortest.
    Manhattan,
    /// Straight-line distance. Paths are always the shortest.
    #[default]
    Euclidean,
    /// Squared straight-line distance. It ranks vertices in the same order as the euclidean
    /// distance but grows faster than the step count, so paths are not guaranteed to be the
    /// shortest even after scaling.
    SquaredEuclidean,
    /// Constant zero, which turns A* into Dijkstra's algorithm.
    Zero,
}

impl Heuristic {
    /// Estimates the remaining distance between two vertices.
    #[expect(
        clippy::cast_precision_loss,
        reason = "Lattice deltas are far below the range where f64 loses integer precision."
    )]
    fn estimate(self, graph: &Graph, from: usize, to: usize) -> f64 {
        let (from_column, from_row) = graph.grid_position(from);
        let (to_column, to_row) = graph.grid_position(to);
        let dx = from_column.abs_diff(to_column) as f64;
        let dy = from_row.abs_diff(to_row) as f64;

        match self {
            Self::Manhattan => dx + dy,
            Self::Euclidean => dx.hypot(dy),
            Self::SquaredEuclidean => dx.mul_add(dx, dy * dy),
            Self::Zero => 0.0,
        }
    }

    /// Returns the largest estimate across a single edge of the graph, and at least one.
    ///
    /// Manhattan and euclidean distances are metrics, so dividing them by this value gives a
    /// consistent estimate for unit edge weights.
    fn step_scale(self, graph: &Graph) -> f64 {
        graph
            .edges()
            .map(|(src, dest)| self.estimate(graph, src, dest))
            .fold(1.0, f64::max)
    }
}

/// Checks whether the end point can be reached from the start point with the given algorithm.
///
/// The heuristic is only used by [`Algorithm::AStar`].
#[must_use]
pub fn is_solvable(
    graph: &Graph,
    start: (i32, i32),
    end: (i32, i32),
    algorithm: Algorithm,
    heuristic: Heuristic,
) -> bool {
    match algorithm {
        Algorithm::Bfs => is_maze_solvable_bfs(graph, start, end),
        Algorithm::Dijkstra => is_maze_solvable_dijkstra(graph, start, end),
        Algorithm::AStar => is_maze_solvable_a_star(graph, start, end, heuristic),
    }
}

/// Solves the maze with the given algorithm, returning an empty path when it is unsolvable.
///
/// The heuristic is only used by [`Algorithm::AStar`].
#[must_use]
pub fn solve(
    graph: &Graph,
    start: (i32, i32),
    end: (i32, i32),
    algorithm: Algorithm,
    heuristic: Heuristic,
) -> Path {
    match algorithm {
        Algorithm::Bfs => solve_maze_bfs(graph, start, end),
        Algorithm::Dijkstra => solve_maze_dijkstra(graph, start, end),
        Algorithm::AStar => solve_maze_a_star(graph, start, end, heuristic),
    }
}

/// Checks solvability with a breadth-first search.
#[must_use]
pub fn is_maze_solvable_bfs(graph: &Graph, start: (i32, i32), end: (i32, i32)) -> bool {
    endpoints(graph, start, end)
        .and_then(|(start, end)| bfs(graph, start, end))
        .is_some()
}

/// Solves the maze with a breadth-first search.
///
/// Neighbors are expanded in id order, so among several shortest paths the one through the
/// smallest ids is preferred.
#[must_use]
pub fn solve_maze_bfs(graph: &Graph, start: (i32, i32), end: (i32, i32)) -> Path {
    endpoints(graph, start, end)
        .and_then(|(start, end)| {
            bfs(graph, start, end).map(|previous| reconstruct(graph, &previous, start, end))
        })
        .unwrap_or_default()
}

/// Checks solvability with Dijkstra's algorithm.
///
/// With unit edge weights this is A* with a [`Heuristic::Zero`] estimate, and it shares that code
/// path.
#[must_use]
pub fn is_maze_solvable_dijkstra(graph: &Graph, start: (i32, i32), end: (i32, i32)) -> bool {
    is_maze_solvable_a_star(graph, start, end, Heuristic::Zero)
}

/// Solves the maze with Dijkstra's algorithm.
#[must_use]
pub fn solve_maze_dijkstra(graph: &Graph, start: (i32, i32), end: (i32, i32)) -> Path {
    solve_maze_a_star(graph, start, end, Heuristic::Zero)
}

/// Checks solvability with an A* search.
#[must_use]
pub fn is_maze_solvable_a_star(
    graph: &Graph,
    start: (i32, i32),
    end: (i32, i32),
    heuristic: Heuristic,
) -> bool {
    endpoints(graph, start, end)
        .and_then(|(start, end)| a_star(graph, start, end, heuristic))
        .is_some()
}

/// Solves the maze with an A* search.
///
/// Every heuristic but [`Heuristic::SquaredEuclidean`] yields a shortest path, on any of the
/// lattice shapes.
#[must_use]
pub fn solve_maze_a_star(
    graph: &Graph,
    start: (i32, i32),
    end: (i32, i32),
    heuristic: Heuristic,
) -> Path {
    endpoints(graph, start, end)
        .and_then(|(start, end)| {
            a_star(graph, start, end, heuristic)
                .map(|previous| reconstruct(graph, &previous, start, end))
        })
        .unwrap_or_default()
}

/// Maps the start and end points to their nearest nodes, provided both are alive.
fn endpoints(graph: &Graph, start: (i32, i32), end: (i32, i32)) -> Option<(usize, usize)> {
    let start = graph.get_nearest_node_to(start.0, start.1)?;
    let end = graph.get_nearest_node_to(end.0, end.1)?;

    (graph.is_alive(start) && graph.is_alive(end)).then_some((start, end))
}

/// Returns the alive neighbors of a vertex in ascending id order.
fn alive_neighbors(graph: &Graph, id: usize) -> Vec<usize> {
    let mut neighbors: Vec<usize> = graph
        .neighbors(id)
        .iter()
        .copied()
        .filter(|&neighbor| graph.is_alive(neighbor))
        .collect();
    neighbors.sort_unstable();
    neighbors
}

/// Runs a breadth-first search and returns the predecessor of every reached vertex.
#[expect(
    clippy::indexing_slicing,
    reason = "Vertex ids come from the graph itself and are always below its vertex count."
)]
fn bfs(graph: &Graph, start: usize, end: usize) -> Option<Vec<Option<usize>>> {
    let mut previous = vec![None; graph.v()];
    let mut visited = vec![false; graph.v()];
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(current) = queue.pop_front() {
        if current == end {
            debug!("bfs reached vertex {end} from vertex {start}");
            return Some(previous);
        }

        for neighbor in alive_neighbors(graph, current) {
            if !visited[neighbor] {
                visited[neighbor] = true;
                previous[neighbor] = Some(current);
                queue.push_back(neighbor);
            }
        }
    }

    debug!("bfs exhausted the reachable vertices without reaching vertex {end}");
    None
}

/// Returns the position in the open list of the vertex with the lowest score.
///
/// Ties go to the vertex that was opened first.
#[expect(
    clippy::indexing_slicing,
    reason = "Vertex ids come from the graph itself and are always below its vertex count."
)]
fn lowest_score(open: &[usize], f_score: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (position, &id) in open.iter().enumerate() {
        let score = f_score[id];
        if best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((position, score));
        }
    }

    best.map(|(position, _)| position)
}

/// Runs an A* search and returns the predecessor of every reached vertex.
///
/// The open list is a plain vector scanned for its minimum, which is plenty for grid sizes that
/// fit on a screen.
#[expect(
    clippy::indexing_slicing,
    reason = "Vertex ids come from the graph itself and are always below its vertex count."
)]
fn a_star(
    graph: &Graph,
    start: usize,
    end: usize,
    heuristic: Heuristic,
) -> Option<Vec<Option<usize>>> {
    let v = graph.v();
    let mut g_score = vec![f64::INFINITY; v];
    let mut f_score = vec![f64::INFINITY; v];
    let mut previous = vec![None; v];
    let mut closed = vec![false; v];
    let mut open = vec![start];
    let scale = heuristic.step_scale(graph);

    g_score[start] = 0.0;
    f_score[start] = heuristic.estimate(graph, start, end) / scale;

    while let Some(position) = lowest_score(&open, &f_score) {
        let current = open.remove(position);
        if current == end {
            debug!(
                "a* ({heuristic:?}) reached vertex {end} at cost {}",
                g_score[end]
            );
            return Some(previous);
        }
        closed[current] = true;

        for neighbor in alive_neighbors(graph, current) {
            if closed[neighbor] {
                continue;
            }

            let tentative = g_score[current] + 1.0;
            if tentative < g_score[neighbor] {
                previous[neighbor] = Some(current);
                g_score[neighbor] = tentative;
                f_score[neighbor] = tentative + heuristic.estimate(graph, neighbor, end) / scale;
                if !open.contains(&neighbor) {
                    open.push(neighbor);
                }
            }
        }
    }

    debug!("a* ({heuristic:?}) emptied the open list without reaching vertex {end}");
    None
}

/// Walks the predecessors back from the end vertex and returns the path in start to end order.
fn reconstruct(graph: &Graph, previous: &[Option<usize>], start: usize, end: usize) -> Path {
    let mut ids = vec![end];
    let mut current = end;

    while current != start {
        let Some(&Some(parent)) = previous.get(current) else {
            return Path::new();
        };
        ids.push(parent);
        current = parent;
    }

    ids.iter()
        .rev()
        .filter_map(|&id| graph.node(id))
        .map(Node::position)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng as _};

    use super::*;
    use crate::{config::GridLayout, generator};

    /// Returns the position of the node with the given id.
    fn position(graph: &Graph, id: usize) -> (i32, i32) {
        graph.node(id).expect("node should exist").position()
    }

    /// Returns the positions of the first and last nodes.
    fn corners(graph: &Graph) -> ((i32, i32), (i32, i32)) {
        (position(graph, 0), position(graph, graph.v() - 1))
    }

    /// Builds an orthogonal grid of the given size.
    fn grid(width: usize, height: usize, rng: &mut StdRng) -> Graph {
        let layout = GridLayout {
            width,
            height,
            ..GridLayout::default()
        };
        generator::create_orthogonal_grid_graph(&layout, rng).expect("failed to build grid")
    }

    /// Asserts that consecutive path points are joined by an edge of the graph.
    fn assert_walkable(graph: &Graph, path: &Path) {
        for pair in path.windows(2) {
            if let [from, to] = pair {
                let from = graph.get_nearest_node_to(from.0, from.1).expect("node");
                let to = graph.get_nearest_node_to(to.0, to.1).expect("node");
                assert!(graph.is_adjacent(from, to), "path steps along a missing edge");
                assert!(graph.is_alive(to), "path steps on a dead node");
            }
        }
    }

    #[test]
    fn test_three_by_three_dfs_maze_is_solvable() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generator::generate_maze_dfs(&grid(3, 3, &mut rng), &mut rng);
            let (start, end) = corners(&maze);

            assert!(is_maze_solvable_bfs(&maze, start, end));
            let path = solve_maze_bfs(&maze, start, end);
            assert!((3..=9).contains(&path.len()));
            assert_eq!(path.first(), Some(&start));
            assert_eq!(path.last(), Some(&end));
            assert_walkable(&maze, &path);
        }
    }

    #[test]
    fn test_bfs_on_open_grid_finds_manhattan_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = grid(5, 4, &mut rng);
        let (start, end) = corners(&graph);

        let path = solve_maze_bfs(&graph, start, end);

        assert_eq!(path.len(), 4 + 3 + 1);
        assert_walkable(&graph, &path);
    }

    #[test]
    fn test_endpoints_snap_to_nearest_nodes() {
        let mut rng = StdRng::seed_from_u64(2);
        let graph = grid(3, 3, &mut rng);

        let path = solve_maze_bfs(&graph, (-20, -20), (1_000, 1_000));

        assert_eq!(path.first(), Some(&position(&graph, 0)));
        assert_eq!(path.last(), Some(&position(&graph, 8)));
    }

    #[test]
    fn test_unsolvable_maze_gives_empty_path() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut graph = grid(4, 4, &mut rng);
        graph.isolate(15);
        let (start, end) = corners(&graph);

        for algorithm in [Algorithm::Bfs, Algorithm::Dijkstra, Algorithm::AStar] {
            assert!(!is_solvable(&graph, start, end, algorithm, Heuristic::Euclidean));
            assert!(solve(&graph, start, end, algorithm, Heuristic::Euclidean).is_empty());
        }
    }

    #[test]
    fn test_dead_nodes_are_not_traversed() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut graph = grid(3, 3, &mut rng);
        // Kill the middle column except its bottom cell, forcing a detour through id 5.
        for id in [3, 4] {
            graph.node_mut(id).expect("node").set_alive(false);
        }
        let (start, end) = corners(&graph);

        let path = solve_maze_bfs(&graph, start, end);

        assert_eq!(path.len(), 5);
        assert!(path.contains(&position(&graph, 5)));
        assert!(!path.contains(&position(&graph, 4)));
        assert_walkable(&graph, &path);

        graph.node_mut(5).expect("node").set_alive(false);
        assert!(!is_maze_solvable_bfs(&graph, start, end));
        assert!(!is_maze_solvable_a_star(&graph, start, end, Heuristic::Manhattan));
    }

    #[test]
    fn test_dead_endpoint_is_unsolvable() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut graph = grid(3, 3, &mut rng);
        graph.node_mut(8).expect("node").set_alive(false);
        let (start, end) = corners(&graph);

        assert!(!is_maze_solvable_bfs(&graph, start, end));
        assert!(solve_maze_dijkstra(&graph, start, end).is_empty());
    }

    #[test]
    fn test_start_equals_end() {
        let mut rng = StdRng::seed_from_u64(6);
        let graph = grid(2, 2, &mut rng);
        let start = position(&graph, 3);

        assert!(is_maze_solvable_dijkstra(&graph, start, start));
        assert_eq!(solve_maze_a_star(&graph, start, start, Heuristic::Zero), vec![start]);
    }

    #[test]
    fn test_algorithms_agree_on_path_length() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let topology = grid(8, 6, &mut rng);
            let bias = generator::KruskalBias::new(0.5, 0.5, 0.4).expect("valid bias");
            let maze = generator::generate_maze_kruskal(&topology, &bias, &mut rng);
            let (start, end) = corners(&maze);

            let bfs = solve_maze_bfs(&maze, start, end);
            let dijkstra = solve_maze_dijkstra(&maze, start, end);
            let zero = solve_maze_a_star(&maze, start, end, Heuristic::Zero);
            let manhattan = solve_maze_a_star(&maze, start, end, Heuristic::Manhattan);
            let euclidean = solve_maze_a_star(&maze, start, end, Heuristic::Euclidean);

            assert!(!bfs.is_empty());
            assert_eq!(dijkstra.len(), bfs.len());
            assert_eq!(zero.len(), bfs.len());
            assert_eq!(manhattan.len(), bfs.len());
            assert_eq!(euclidean.len(), bfs.len());
            for path in [&bfs, &dijkstra, &zero, &manhattan, &euclidean] {
                assert_walkable(&maze, path);
            }
        }
    }

    #[test]
    fn test_a_star_is_shortest_on_diagonal_lattices() {
        for shape in [generator::GridShape::Laplacian, generator::GridShape::Hexagonal] {
            for seed in 0..30 {
                let mut rng = StdRng::seed_from_u64(seed);
                let layout = GridLayout {
                    width: 10,
                    height: 10,
                    ..GridLayout::default()
                };
                let topology = shape.build(&layout, &mut rng).expect("failed to build grid");
                let bias = generator::KruskalBias::new(0.5, 0.5, 0.3).expect("valid bias");
                let maze = generator::generate_maze_kruskal(&topology, &bias, &mut rng);
                let (start, end) = corners(&maze);
                let bfs = solve_maze_bfs(&maze, start, end);

                for heuristic in [Heuristic::Manhattan, Heuristic::Euclidean] {
                    let path = solve_maze_a_star(&maze, start, end, heuristic);
                    assert_eq!(
                        path.len(),
                        bfs.len(),
                        "{heuristic:?} on {shape:?} with seed {seed}"
                    );
                    assert_walkable(&maze, &path);
                }
            }
        }
    }

    #[test]
    fn test_step_scale() {
        let mut rng = StdRng::seed_from_u64(9);
        let layout = GridLayout {
            width: 3,
            height: 3,
            ..GridLayout::default()
        };
        let orthogonal = grid(3, 3, &mut rng);
        let laplacian = generator::create_orthogonal_grid_graph_laplacian(&layout, &mut rng)
            .expect("failed to build grid");

        assert!((Heuristic::Manhattan.step_scale(&orthogonal) - 1.0).abs() < 1e-9);
        assert!((Heuristic::Manhattan.step_scale(&laplacian) - 2.0).abs() < 1e-9);
        assert!((Heuristic::Euclidean.step_scale(&laplacian) - std::f64::consts::SQRT_2).abs() < 1e-9);
        assert!((Heuristic::Zero.step_scale(&laplacian) - 1.0).abs() < 1e-9);
        assert!((Heuristic::Euclidean.step_scale(&Graph::new(2, 2)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_squared_euclidean_finds_a_walkable_path() {
        let mut rng = StdRng::seed_from_u64(7);
        let maze = generator::generate_maze_dfs(&grid(6, 6, &mut rng), &mut rng);
        let (start, end) = corners(&maze);

        let path = solve_maze_a_star(&maze, start, end, Heuristic::SquaredEuclidean);

        // A perfect maze has exactly one simple path.
        assert_eq!(path, solve_maze_bfs(&maze, start, end));
        assert_walkable(&maze, &path);
    }

    #[test]
    fn test_heuristic_estimates() {
        let mut rng = StdRng::seed_from_u64(8);
        let graph = grid(5, 5, &mut rng);
        let (from, to) = (0, graph.id_at(3, 4).expect("id"));

        assert!((Heuristic::Manhattan.estimate(&graph, from, to) - 7.0).abs() < 1e-9);
        assert!((Heuristic::Euclidean.estimate(&graph, from, to) - 5.0).abs() < 1e-9);
        assert!((Heuristic::SquaredEuclidean.estimate(&graph, from, to) - 25.0).abs() < 1e-9);
        assert!(Heuristic::Zero.estimate(&graph, from, to).abs() < 1e-9);
    }

    #[test]
    fn test_empty_graph_is_unsolvable() {
        let graph = Graph::new(0, 0);

        assert!(!is_maze_solvable_bfs(&graph, (0, 0), (0, 0)));
        assert!(solve_maze_a_star(&graph, (0, 0), (0, 0), Heuristic::Euclidean).is_empty());
    }
}
