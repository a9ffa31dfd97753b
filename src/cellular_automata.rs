//! Life-like cellular automaton module.
//!
//! The automaton works on three graphs of identical dimensions that play different roles:
//! - The [`Topology`] holds every edge that may ever exist between two cells.
//! - The [`Neighborhood`] decides which cells are counted when applying the birth/survival rules.
//! - The [`Current`] generation holds the alive cells and the edges actually present between them.
//!
//! Keeping each role in its own type means the rules can never count over the topology by mistake,
//! nor can edges be resolved from the neighborhood.
//!
//! The first and the last cell are pinned alive in every generation, so a solver always has both
//! endpoints to work with.

use std::ops::Range;

use color_eyre::eyre::{bail, Result};
use log::{debug, trace};
use rand::Rng;

use crate::{graph::Graph, rules::Rules};

/// Graph of every edge that may exist between two alive cells.
#[derive(Clone, Debug)]
pub struct Topology(Graph);

impl Topology {
    /// Returns the underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.0
    }
}

/// Graph whose edges decide which cells count as neighbors for the rules.
#[derive(Clone, Debug)]
pub struct Neighborhood(Graph);

impl Neighborhood {
    /// Returns the underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.0
    }

    /// Counts the alive neighbors of a cell in the given generation.
    fn alive_neighbors(&self, id: usize, current: &Current) -> usize {
        self.0
            .neighbors(id)
            .iter()
            .filter(|&&neighbor| current.0.is_alive(neighbor))
            .count()
    }
}

/// Alive cells of a generation and the edges present between them.
#[derive(Clone, Debug)]
pub struct Current(Graph);

impl Current {
    /// Returns the underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.0
    }

    /// Sets the liveness of a cell, ignoring unknown ids.
    fn set_alive(&mut self, id: usize, alive: bool) {
        if let Some(node) = self.0.node_mut(id) {
            node.set_alive(alive);
        }
    }

    /// Forces the first and the last cell alive.
    fn pin_endpoints(&mut self) {
        let last = self.0.v().saturating_sub(1);
        self.set_alive(0, true);
        self.set_alive(last, true);
    }

    /// Rebuilds the edges so that alive cells are connected to exactly their alive topology
    /// neighbors, and dead cells have no edges at all.
    fn resolve_edges(&mut self, topology: &Topology) {
        self.0.strip_edges();
        for (src, dest) in topology.0.edges() {
            if self.0.is_alive(src) && self.0.is_alive(dest) {
                self.0.add_edge(src, dest);
            }
        }
    }
}

/// Cellular automaton evolving a graph under birth/survival rules.
#[derive(Clone, Debug)]
pub struct CellularAutomata {
    /// Birth and survival conditions.
    rules: Rules,
    /// Edges that may exist.
    topology: Topology,
    /// Cells counted by the rules.
    neighborhood: Neighborhood,
    /// Generation being displayed and evolved.
    current: Current,
    /// Seeded generation restored by [`CellularAutomata::reset`].
    initialized: Current,
    /// Number of generations computed since seeding or the last reset.
    generation: usize,
}

impl CellularAutomata {
    /// Creates an automaton and seeds its first generation.
    ///
    /// When no neighborhood is given, the topology doubles as the neighborhood. The seed area is a
    /// square of `init_square` cells per side centered on the grid, clamped to the grid
    /// dimensions; `None` seeds the whole grid. Each cell inside the area starts alive with
    /// probability one half and every cell outside starts dead. A malformed rulestring is not an
    /// error: it degrades to empty rules under which every cell but the endpoints dies.
    ///
    /// # Errors
    ///
    /// This function returns an error if the neighborhood dimensions differ from the topology's.
    pub fn new<R>(
        rulestring: &str,
        topology: &Graph,
        neighborhood: Option<&Graph>,
        init_square: Option<usize>,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let neighborhood = neighborhood.unwrap_or(topology);
        if (neighborhood.width(), neighborhood.height()) != (topology.width(), topology.height()) {
            bail!(
                "neighborhood is {}x{} but the topology is {}x{}",
                neighborhood.width(),
                neighborhood.height(),
                topology.width(),
                topology.height()
            );
        }

        let topology = Topology(topology.create_copy());
        let neighborhood = Neighborhood(neighborhood.create_copy());
        let rules = Rules::parse_lenient(rulestring);

        let (width, height) = (topology.0.width(), topology.0.height());
        let columns = seed_range(width, init_square);
        let rows = seed_range(height, init_square);

        let mut current = Current(topology.0.create_copy());
        for id in 0..current.0.v() {
            let (column, row) = current.0.grid_position(id);
            let alive = columns.contains(&column) && rows.contains(&row) && rng.random_bool(0.5);
            current.set_alive(id, alive);
        }
        current.pin_endpoints();
        current.resolve_edges(&topology);

        debug!(
            "seeded {width}x{height} automaton with rules {rules}: {} of {} cells alive",
            current.0.alive_count(),
            current.0.v()
        );

        Ok(Self {
            rules,
            topology,
            neighborhood,
            initialized: current.clone(),
            current,
            generation: 0,
        })
    }

    /// Returns the current generation.
    #[must_use]
    pub const fn get_graph(&self) -> &Graph {
        &self.current.0
    }

    /// Returns the parsed rules.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Returns the topology graph.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns the neighborhood graph.
    #[must_use]
    pub const fn neighborhood(&self) -> &Neighborhood {
        &self.neighborhood
    }

    /// Returns the number of generations computed since seeding or the last reset.
    #[must_use]
    pub const fn generation(&self) -> usize {
        self.generation
    }

    /// Advances the automaton by one generation.
    ///
    /// Every cell counts its alive neighbors in the previous generation only, so the update is
    /// synchronous. The endpoints are then pinned alive and the edges are resolved against the
    /// topology.
    pub fn next_generation(&mut self) {
        let mut next = self.current.clone();
        for id in 0..next.0.v() {
            let count = self.neighborhood.alive_neighbors(id, &self.current);
            let alive = self.rules.next_state(self.current.0.is_alive(id), count);
            next.set_alive(id, alive);
        }
        next.pin_endpoints();
        next.resolve_edges(&self.topology);

        self.current = next;
        self.generation += 1;
        trace!(
            "generation {}: {} cells alive",
            self.generation,
            self.current.0.alive_count()
        );
    }

    /// Sets a cell of the current generation alive or dead and reconnects it.
    ///
    /// The endpoints stay alive whatever is asked. The seeded generation is not affected, so a
    /// [`CellularAutomata::reset`] undoes the edit.
    pub fn set_cell(&mut self, id: usize, alive: bool) {
        self.current.set_alive(id, alive);
        self.current.pin_endpoints();
        self.current.resolve_edges(&self.topology);
    }

    /// Restores the seeded generation and the generation counter.
    pub fn reset(&mut self) {
        self.current = self.initialized.clone();
        self.generation = 0;
    }
}

/// Returns the lattice indices covered by a centered seed square along one dimension.
fn seed_range(extent: usize, init_square: Option<usize>) -> Range<usize> {
    let side = init_square.map_or(extent, |side| side.min(extent));
    let start = (extent - side) / 2;
    start..start + side
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng as _};

    use super::*;
    use crate::{
        config::GridLayout,
        generator::{create_orthogonal_grid_graph, create_orthogonal_grid_graph_laplacian},
    };

    /// Builds a layout of the given dimensions with the default spacing.
    fn layout(width: usize, height: usize) -> GridLayout {
        GridLayout {
            width,
            height,
            ..GridLayout::default()
        }
    }

    /// Builds an orthogonal topology and a laplacian neighborhood of the given dimensions.
    fn grids(width: usize, height: usize) -> (Graph, Graph) {
        let mut rng = StdRng::seed_from_u64(0);
        let topology = create_orthogonal_grid_graph(&layout(width, height), &mut rng)
            .expect("failed to build topology");
        let neighborhood = create_orthogonal_grid_graph_laplacian(&layout(width, height), &mut rng)
            .expect("failed to build neighborhood");
        (topology, neighborhood)
    }

    /// Returns the sorted ids of the alive cells.
    fn alive_ids(graph: &Graph) -> Vec<usize> {
        (0..graph.v()).filter(|&id| graph.is_alive(id)).collect()
    }

    /// Checks that the edges of a generation are exactly the topology edges between alive cells.
    fn assert_edges_resolved(automaton: &CellularAutomata) {
        let current = automaton.get_graph();
        let topology = automaton.topology().graph();

        for (src, dest) in current.edges() {
            assert!(topology.is_adjacent(src, dest));
            assert!(current.is_alive(src) && current.is_alive(dest));
        }
        for (src, dest) in topology.edges() {
            if current.is_alive(src) && current.is_alive(dest) {
                assert!(current.is_adjacent(src, dest));
            }
        }
    }

    #[test]
    fn test_seed_range() {
        assert_eq!(seed_range(7, None), 0..7);
        assert_eq!(seed_range(7, Some(3)), 2..5);
        assert_eq!(seed_range(6, Some(3)), 1..4);
        assert_eq!(seed_range(4, Some(10)), 0..4);
        assert_eq!(seed_range(5, Some(0)), 2..2);
    }

    #[test]
    fn test_seeding_stays_inside_square() {
        let (topology, neighborhood) = grids(9, 9);
        let mut rng = StdRng::seed_from_u64(1);
        let automaton =
            CellularAutomata::new("B3/S1234", &topology, Some(&neighborhood), Some(3), &mut rng)
                .expect("failed to create automaton");
        let graph = automaton.get_graph();

        for id in alive_ids(graph) {
            let (column, row) = graph.grid_position(id);
            let inside = (3..6).contains(&column) && (3..6).contains(&row);
            assert!(inside || id == 0 || id == graph.v() - 1);
        }
        assert_eq!(automaton.generation(), 0);
        assert_edges_resolved(&automaton);
    }

    #[test]
    fn test_empty_seed_only_keeps_endpoints() {
        let (topology, _) = grids(4, 3);
        let mut rng = StdRng::seed_from_u64(2);
        let automaton = CellularAutomata::new("B3/S23", &topology, None, Some(0), &mut rng)
            .expect("failed to create automaton");

        assert_eq!(alive_ids(automaton.get_graph()), vec![0, 11]);
        assert_eq!(automaton.get_graph().edge_count(), 0);
    }

    #[test]
    fn test_whole_grid_seed_is_roughly_half_alive() {
        let (topology, _) = grids(20, 20);
        let mut rng = StdRng::seed_from_u64(3);
        let automaton = CellularAutomata::new("B3/S23", &topology, None, None, &mut rng)
            .expect("failed to create automaton");
        let alive = automaton.get_graph().alive_count();

        assert!((100..300).contains(&alive), "{alive} cells alive");
        assert_edges_resolved(&automaton);
    }

    #[test]
    fn test_blinker_oscillates() {
        let (topology, neighborhood) = grids(7, 7);
        let mut rng = StdRng::seed_from_u64(4);
        let mut automaton =
            CellularAutomata::new("B3/S23", &topology, Some(&neighborhood), Some(0), &mut rng)
                .expect("failed to create automaton");
        let id = |column: usize, row: usize| topology.id_at(column, row).expect("cell on grid");

        for row in 2..5 {
            automaton.set_cell(id(3, row), true);
        }
        automaton.next_generation();

        let mut expected = vec![0, id(2, 3), id(3, 3), id(4, 3), 48];
        expected.sort_unstable();
        assert_eq!(alive_ids(automaton.get_graph()), expected);
        assert_eq!(automaton.get_graph().edge_count(), 2);
        assert_eq!(automaton.generation(), 1);

        automaton.next_generation();

        let mut expected = vec![0, id(3, 2), id(3, 3), id(3, 4), 48];
        expected.sort_unstable();
        assert_eq!(alive_ids(automaton.get_graph()), expected);
        assert_edges_resolved(&automaton);
    }

    #[test]
    fn test_neighborhood_counts_cells_topology_does_not_connect() {
        let (topology, neighborhood) = grids(5, 5);
        let mut rng = StdRng::seed_from_u64(5);
        let mut automaton =
            CellularAutomata::new("B2/S", &topology, Some(&neighborhood), Some(0), &mut rng)
                .expect("failed to create automaton");
        let id = |column: usize, row: usize| topology.id_at(column, row).expect("cell on grid");

        automaton.set_cell(id(1, 2), true);
        automaton.set_cell(id(3, 2), true);
        automaton.next_generation();
        let graph = automaton.get_graph();

        // (1, 1) sees the pinned corner and (1, 2) through the diagonals.
        assert!(graph.is_alive(id(2, 2)));
        assert!(graph.is_alive(id(2, 1)));
        assert!(graph.is_alive(id(2, 3)));
        assert!(graph.is_alive(id(1, 1)));
        assert!(!graph.is_alive(id(1, 2)));
        assert!(graph.is_adjacent(id(2, 1), id(2, 2)));
        assert!(graph.is_adjacent(id(1, 1), id(2, 1)));
        assert!(!graph.is_adjacent(id(1, 1), id(2, 2)));
        assert_edges_resolved(&automaton);
    }

    #[test]
    fn test_malformed_rules_kill_everything_but_endpoints() {
        let (topology, neighborhood) = grids(6, 6);
        let mut rng = StdRng::seed_from_u64(6);
        let mut automaton =
            CellularAutomata::new("B3S23", &topology, Some(&neighborhood), None, &mut rng)
                .expect("malformed rules are not an error");

        automaton.next_generation();

        assert_eq!(automaton.rules(), &Rules::default());
        assert_eq!(alive_ids(automaton.get_graph()), vec![0, 35]);
        assert_eq!(automaton.get_graph().edge_count(), 0);
    }

    #[test]
    fn test_endpoints_stay_alive() {
        let (topology, neighborhood) = grids(8, 6);
        let mut rng = StdRng::seed_from_u64(7);
        let mut automaton =
            CellularAutomata::new("B3/S1234", &topology, Some(&neighborhood), None, &mut rng)
                .expect("failed to create automaton");

        automaton.set_cell(0, false);
        for _ in 0..20 {
            let graph = automaton.get_graph();
            assert!(graph.is_alive(0));
            assert!(graph.is_alive(graph.v() - 1));
            assert_edges_resolved(&automaton);
            automaton.next_generation();
        }
    }

    #[test]
    fn test_reset_restores_seed() {
        let (topology, neighborhood) = grids(8, 8);
        let mut rng = StdRng::seed_from_u64(8);
        let mut automaton =
            CellularAutomata::new("B3/S1234", &topology, Some(&neighborhood), None, &mut rng)
                .expect("failed to create automaton");
        let seeded = automaton.get_graph().clone();

        for _ in 0..5 {
            automaton.next_generation();
        }
        automaton.reset();

        assert_eq!(automaton.get_graph(), &seeded);
        assert_eq!(automaton.generation(), 0);
    }

    #[test]
    fn test_mismatched_neighborhood_is_rejected() {
        let (topology, _) = grids(4, 4);
        let (_, neighborhood) = grids(5, 4);
        let mut rng = StdRng::seed_from_u64(9);

        let result =
            CellularAutomata::new("B3/S23", &topology, Some(&neighborhood), None, &mut rng);

        assert!(result.is_err());
    }
}
