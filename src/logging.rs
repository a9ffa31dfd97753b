//! Logger setup for the binary.

use color_eyre::eyre::Result;
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the global logger.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Passing `debug` forces the `debug`
/// level for the whole crate regardless of the environment.
///
/// # Errors
///
/// This function returns an error if a global logger is already installed.
pub fn init(debug: bool) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if debug {
        let _ = builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).try_init()?;

    Ok(())
}
