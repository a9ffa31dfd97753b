//! Cellular automaton convergence experiments.
//!
//! An experiment measures how many generations an automaton needs before its endpoints become
//! connected. For every seed square width, from a fully seeded grid down to an empty seed and up to
//! the grid size, a number of independent automata are stepped until the breadth-first solver finds
//! a path from the first to the last cell, or until a generation or time limit is hit.

use std::{
    fmt,
    time::{Duration, Instant},
};

use color_eyre::eyre::{OptionExt as _, Result};
use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::{
    cellular_automata::CellularAutomata,
    config::{GridLayout, DEFAULT_RULES},
    generator::GridShape,
    graph::Graph,
    solver::is_maze_solvable_bfs,
};

/// Parameters of an experiment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Experiment {
    /// Birth/survival rulestring of every automaton.
    pub rules: String,
    /// Shape of the topology graph.
    pub topology: GridShape,
    /// Shape of the neighborhood graph.
    pub neighborhood: GridShape,
    /// Independent automata per seed square width.
    pub runs: usize,
    /// Generations after which a run is given up.
    pub max_generations: usize,
    /// Wall-clock time after which a run is given up.
    pub time_limit: Duration,
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_owned(),
            topology: GridShape::Hexagonal,
            neighborhood: GridShape::Laplacian,
            runs: 100,
            max_generations: 1000,
            time_limit: Duration::from_secs(10),
        }
    }
}

/// Statistics over the runs sharing one seed square width.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SquareSummary {
    /// Seed square width, `None` for a fully seeded grid.
    pub init_square: Option<usize>,
    /// Runs that connected the endpoints within the limits.
    pub finished: usize,
    /// Mean generation count of the finished runs.
    pub mean: Option<f64>,
    /// Population standard deviation of the generation count of the finished runs.
    pub std_dev: Option<f64>,
}

impl SquareSummary {
    /// Computes the statistics of a batch of runs, `None` standing for a run that gave up.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "Generation counts and run counts stay far below 2^52."
    )]
    pub fn from_runs(init_square: Option<usize>, runs: &[Option<usize>]) -> Self {
        let finished: Vec<f64> = runs.iter().flatten().map(|&steps| steps as f64).collect();
        let count = finished.len() as f64;

        let mean = (!finished.is_empty()).then(|| finished.iter().sum::<f64>() / count);
        let std_dev = mean.map(|mean| {
            let variance = finished
                .iter()
                .map(|steps| (steps - mean).powi(2))
                .sum::<f64>()
                / count;
            variance.sqrt()
        });

        Self {
            init_square,
            finished: finished.len(),
            mean,
            std_dev,
        }
    }
}

impl fmt::Display for SquareSummary {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.init_square {
            Some(side) => write!(formatter, "init square {side:>3}")?,
            None => write!(formatter, "whole grid     ")?,
        }
        write!(formatter, "  finished: {:>4}", self.finished)?;
        match (self.mean, self.std_dev) {
            (Some(mean), Some(std_dev)) => {
                write!(formatter, "  avg: {mean:>8.2}  std dev: {std_dev:>8.2}")
            }
            _ => write!(formatter, "  avg:      n/a  std dev:      n/a"),
        }
    }
}

/// Outcome of an experiment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// Rulestring the automata ran with.
    pub rules: String,
    /// Independent automata per seed square width.
    pub runs: usize,
    /// One summary per seed square width, the fully seeded grid first.
    pub rows: Vec<SquareSummary>,
}

impl Report {
    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// This function returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "rules: {}", self.rules)?;
        writeln!(formatter, "runs: {}", self.runs)?;
        for row in &self.rows {
            writeln!(formatter, "{row}")?;
        }
        Ok(())
    }
}

impl Experiment {
    /// Runs the experiment on grids of the given layout.
    ///
    /// Seed square widths go from the fully seeded grid, then from zero up to one less than the
    /// smaller grid dimension.
    ///
    /// # Errors
    ///
    /// This function returns an error if the grid graphs cannot be built.
    pub fn run<R>(&self, layout: &GridLayout, rng: &mut R) -> Result<Report>
    where
        R: Rng + ?Sized,
    {
        let topology = self.topology.build(layout, rng)?;
        let neighborhood = self.neighborhood.build(layout, rng)?;
        let squares =
            std::iter::once(None).chain((0..layout.width.min(layout.height)).map(Some));

        let mut rows = Vec::new();
        for init_square in squares {
            let mut results = Vec::with_capacity(self.runs);
            for _ in 0..self.runs {
                results.push(self.run_once(&topology, &neighborhood, init_square, rng)?);
            }

            let row = SquareSummary::from_runs(init_square, &results);
            info!("{row}");
            rows.push(row);
        }

        Ok(Report {
            rules: self.rules.clone(),
            runs: self.runs,
            rows,
        })
    }

    /// Steps one fresh automaton until its endpoints connect, returning the generation count.
    ///
    /// `None` is returned when the generation or time limit is hit first.
    fn run_once<R>(
        &self,
        topology: &Graph,
        neighborhood: &Graph,
        init_square: Option<usize>,
        rng: &mut R,
    ) -> Result<Option<usize>>
    where
        R: Rng + ?Sized,
    {
        let mut automaton =
            CellularAutomata::new(&self.rules, topology, Some(neighborhood), init_square, rng)?;
        let (start, end) = automaton
            .get_graph()
            .endpoints()
            .ok_or_eyre("experiment grid has no cells")?;
        let started = Instant::now();

        while automaton.generation() < self.max_generations {
            automaton.next_generation();
            if is_maze_solvable_bfs(automaton.get_graph(), start, end) {
                debug!(
                    "run with init square {init_square:?} finished after {} generations",
                    automaton.generation()
                );
                return Ok(Some(automaton.generation()));
            }
            if started.elapsed() > self.time_limit {
                debug!("run with init square {init_square:?} timed out");
                return Ok(None);
            }
        }

        Ok(None)
    }
}
