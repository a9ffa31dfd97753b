//! Command-line argument definitions.
//!
//! Grid flags are global so they can be given before or after the subcommand. Every flag left out
//! falls back to the configuration file given with `--config`, then to the built-in defaults.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;

use crate::{
    config::Config,
    experiment::Experiment,
    generator::{GridShape, KruskalBias},
    solver::{Algorithm, Heuristic},
};

/// Build, solve and evolve graph mazes.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of grid columns
    #[arg(long, global = true)]
    pub width: Option<usize>,

    /// Number of grid rows
    #[arg(long, global = true)]
    pub height: Option<usize>,

    /// Distance in pixels between neighboring nodes
    #[arg(long, global = true)]
    pub spacing: Option<usize>,

    /// Jitter node positions instead of laying them on a regular lattice
    #[arg(long, global = true, default_value_t = false)]
    pub non_grid: bool,

    /// Random seed, for reproducible runs
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug messages
    #[arg(short, long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Action to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a maze and solve it
    Maze(MazeArgs),
    /// Evolve a cellular automaton and report its solvability
    Automaton(AutomatonArgs),
    /// Measure how fast automata connect their endpoints
    Experiment(ExperimentArgs),
}

/// Maze carving algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MazeAlgorithm {
    /// Randomized depth-first search, always a perfect maze.
    #[default]
    Dfs,
    /// Biased Kruskal, with tunable direction and cycle biases.
    Kruskal,
}

/// Arguments of the `maze` subcommand.
#[derive(Debug, Args)]
pub struct MazeArgs {
    /// Shape of the grid the maze is carved from
    #[arg(long, value_enum, default_value_t = GridShape::Orthogonal)]
    pub topology: GridShape,

    /// Carving algorithm
    #[arg(long, value_enum, default_value_t = MazeAlgorithm::Dfs)]
    pub algorithm: MazeAlgorithm,

    /// Share of horizontal passages for Kruskal
    #[arg(long, default_value_t = 0.5)]
    pub horizontal_bias: f64,

    /// Share of vertical passages for Kruskal
    #[arg(long, default_value_t = 0.5)]
    pub vertical_bias: f64,

    /// Fraction of the remaining grid edges Kruskal adds back as cycles
    #[arg(long, default_value_t = 0.0)]
    pub cycle_bias: f64,

    /// Shortest-path algorithm
    #[arg(long, value_enum, default_value_t = Algorithm::Bfs)]
    pub solver: Algorithm,

    /// Distance estimate for A*
    #[arg(long, value_enum, default_value_t = Heuristic::Euclidean)]
    pub heuristic: Heuristic,
}

impl MazeArgs {
    /// Returns the validated Kruskal biases.
    ///
    /// # Errors
    ///
    /// This function returns the errors of [`KruskalBias::new`].
    pub fn bias(&self) -> Result<KruskalBias> {
        KruskalBias::new(self.horizontal_bias, self.vertical_bias, self.cycle_bias)
    }
}

/// Arguments of the `automaton` subcommand.
#[derive(Debug, Args)]
pub struct AutomatonArgs {
    /// Birth/survival rulestring, such as B3/S1234
    #[arg(long)]
    pub rules: Option<String>,

    /// Shape of the graph edges are resolved from
    #[arg(long, value_enum, default_value_t = GridShape::Hexagonal)]
    pub topology: GridShape,

    /// Shape of the graph neighbors are counted on
    #[arg(long, value_enum, default_value_t = GridShape::Laplacian)]
    pub neighborhood: GridShape,

    /// Side of the centered seed square, the whole grid when left out
    #[arg(long)]
    pub init_square: Option<usize>,

    /// Generations to compute
    #[arg(long, default_value_t = 50)]
    pub generations: usize,

    /// Shortest-path algorithm
    #[arg(long, value_enum, default_value_t = Algorithm::Bfs)]
    pub solver: Algorithm,
}

/// Arguments of the `experiment` subcommand.
#[derive(Debug, Args)]
pub struct ExperimentArgs {
    /// Birth/survival rulestring, such as B3/S1234
    #[arg(long)]
    pub rules: Option<String>,

    /// Shape of the graph edges are resolved from
    #[arg(long, value_enum, default_value_t = GridShape::Hexagonal)]
    pub topology: GridShape,

    /// Shape of the graph neighbors are counted on
    #[arg(long, value_enum, default_value_t = GridShape::Laplacian)]
    pub neighborhood: GridShape,

    /// Independent automata per seed square width
    #[arg(long, default_value_t = 100)]
    pub runs: usize,

    /// Generations after which a run is given up
    #[arg(long, default_value_t = 1000)]
    pub max_generations: usize,

    /// Seconds after which a run is given up
    #[arg(long, default_value_t = 10)]
    pub time_limit: u64,

    /// File to write the JSON report to
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl ExperimentArgs {
    /// Builds the experiment parameters, taking the rulestring from the configuration when none
    /// was given.
    #[must_use]
    pub fn experiment(&self, config: &Config) -> Experiment {
        Experiment {
            rules: self.rules.clone().unwrap_or_else(|| config.rules.clone()),
            topology: self.topology,
            neighborhood: self.neighborhood,
            runs: self.runs,
            max_generations: self.max_generations,
            time_limit: Duration::from_secs(self.time_limit),
        }
    }
}

impl Cli {
    /// Builds the effective configuration.
    ///
    /// The file given with `--config` is read first, if any, and every grid flag given on the
    /// command line then overrides the matching value.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - The configuration file cannot be loaded
    /// - The resulting grid layout is invalid
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(width) = self.width {
            config.layout.width = width;
        }
        if let Some(height) = self.height {
            config.layout.height = height;
        }
        if let Some(spacing) = self.spacing {
            config.layout.spacing = spacing;
        }
        if self.non_grid {
            config.layout.non_grid = true;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.layout.validate()?;

        Ok(config)
    }
}
