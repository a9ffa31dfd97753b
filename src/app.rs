//! Command dispatch for the binary.
//!
//! Each subcommand builds its graphs from the effective configuration, runs the library routines
//! and writes a plain-text report to the given writer.

use std::{fs, io::Write};

use color_eyre::eyre::{OptionExt as _, Result, WrapErr as _};
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng as _};

use crate::{
    cellular_automata::CellularAutomata,
    cli::{AutomatonArgs, Cli, Command, ExperimentArgs, MazeAlgorithm, MazeArgs},
    config::Config,
    generator::{generate_maze_dfs, generate_maze_kruskal},
    graph::Graph,
    render::render,
    solver::{is_solvable, solve, Heuristic},
};

/// Runs the parsed command line, writing its report to standard output.
///
/// # Errors
///
/// This function returns any error raised while loading the configuration, building the graphs or
/// writing the report.
pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut out = std::io::stdout().lock();

    match &cli.command {
        Command::Maze(args) => run_maze(&mut out, &config, args, &mut rng),
        Command::Automaton(args) => run_automaton(&mut out, &config, args, &mut rng),
        Command::Experiment(args) => run_experiment(&mut out, &config, args, &mut rng),
    }
}

/// Returns the start and end positions of a graph.
fn endpoints(graph: &Graph) -> Result<((i32, i32), (i32, i32))> {
    graph.endpoints().ok_or_eyre("graph has no nodes")
}

/// Carves a maze, solves it from its first to its last node and prints both.
fn run_maze<W, R>(out: &mut W, config: &Config, args: &MazeArgs, rng: &mut R) -> Result<()>
where
    W: Write,
    R: Rng + ?Sized,
{
    let grid = args.topology.build(&config.layout, rng)?;
    let maze = match args.algorithm {
        MazeAlgorithm::Dfs => generate_maze_dfs(&grid, rng),
        MazeAlgorithm::Kruskal => generate_maze_kruskal(&grid, &args.bias()?, rng),
    };
    debug!("maze adjacency:\n{}", maze.adjacency_listing());

    let (start, end) = endpoints(&maze)?;
    let path = solve(&maze, start, end, args.solver, args.heuristic);
    info!(
        "{:?} maze with {} passages solved by {:?}",
        args.algorithm,
        maze.edge_count(),
        args.solver
    );

    writeln!(out, "{}", render(&maze, &path))?;
    writeln!(out, "solvable: {}", !path.is_empty())?;
    writeln!(out, "path length: {}", path.len())?;

    Ok(())
}

/// Evolves an automaton, printing the population and solvability of every generation and the
/// final picture with its shortest path.
fn run_automaton<W, R>(
    out: &mut W,
    config: &Config,
    args: &AutomatonArgs,
    rng: &mut R,
) -> Result<()>
where
    W: Write,
    R: Rng + ?Sized,
{
    let rules = args.rules.as_deref().unwrap_or(&config.rules);
    let topology = args.topology.build(&config.layout, rng)?;
    let neighborhood = args.neighborhood.build(&config.layout, rng)?;
    let mut automaton =
        CellularAutomata::new(rules, &topology, Some(&neighborhood), args.init_square, rng)?;
    let (start, end) = endpoints(automaton.get_graph())?;
    info!("running {} with {} generations", automaton.rules(), args.generations);

    for _ in 0..args.generations {
        automaton.next_generation();
        let graph = automaton.get_graph();
        let solvable = is_solvable(graph, start, end, args.solver, Heuristic::default());
        writeln!(
            out,
            "generation {:>4}: {:>5} alive, solvable: {solvable}",
            automaton.generation(),
            graph.alive_count()
        )?;
    }

    let graph = automaton.get_graph();
    let path = solve(graph, start, end, args.solver, Heuristic::default());
    writeln!(out, "{}", render(graph, &path))?;

    Ok(())
}

/// Runs an experiment, prints its summary and optionally saves it as JSON.
fn run_experiment<W, R>(
    out: &mut W,
    config: &Config,
    args: &ExperimentArgs,
    rng: &mut R,
) -> Result<()>
where
    W: Write,
    R: Rng + ?Sized,
{
    let report = args.experiment(config).run(&config.layout, rng)?;
    write!(out, "{report}")?;

    if let Some(path) = &args.output {
        fs::write(path, report.to_json()?)
            .wrap_err_with(|| format!("failed to write report to {}", path.display()))?;
        info!("wrote report to {}", path.display());
    }

    Ok(())
}
