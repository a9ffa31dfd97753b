//! Graph-based maze generation, solving and cellular automata.
//!
//! Every maze in this crate is a [`graph::Graph`] laid over a rectangular lattice. The
//! [`generator`] module builds orthogonal, hexagonal and eight-neighborhood lattices and carves
//! them into mazes, the [`solver`] module finds shortest paths through the alive part of a graph,
//! and the [`cellular_automata`] module evolves a graph under Life-like birth/survival rules so
//! that maze-like structures grow on their own. The remaining modules make up the command-line
//! front end.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

pub mod app;
pub mod cellular_automata;
pub mod cli;
pub mod config;
pub mod disjoint_set;
pub mod experiment;
pub mod generator;
pub mod graph;
pub mod logging;
pub mod render;
pub mod rules;
pub mod solver;
