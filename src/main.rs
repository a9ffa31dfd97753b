//! This crate contains the source code for the mazegraph binary.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use mazegraph::{app, cli::Cli, logging};

fn main() -> Result<()> {
    install()?;

    let cli = Cli::parse();
    logging::init(cli.debug)?;
    app::run(&cli)
}
