//! Configuration data and loading module.
//!
//! This module contains the grid layout every topology builder takes as input, and the run
//! configuration that can be read from a JSON file and then overridden from the command line.

use std::{fs, path::Path};

use color_eyre::eyre::{bail, Result, WrapErr as _};
use log::debug;
use serde::{Deserialize, Serialize};

/// Default distance in pixels between two neighboring lattice nodes.
pub const DEFAULT_SPACING: usize = 50;

/// Default rulestring of the cellular automaton, a rule that grows maze-like corridors.
pub const DEFAULT_RULES: &str = "B3/S1234";

/// Dimensions and pixel spacing of a grid graph.
///
/// This structure replaces the window-size globals a drawing layer would otherwise share with the
/// builders: everything a builder needs to position its nodes is passed in explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Distance in pixels between neighboring nodes.
    pub spacing: usize,
    /// Whether node positions get a small random jitter.
    pub non_grid: bool,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            width: 24,
            height: 13,
            spacing: DEFAULT_SPACING,
            non_grid: false,
        }
    }
}

impl GridLayout {
    /// Checks that the layout describes a non-empty lattice.
    ///
    /// # Errors
    ///
    /// This function returns an error if the width, height or spacing is zero.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "grid dimensions must be positive, got {}x{}",
                self.width,
                self.height
            );
        }
        if self.spacing == 0 {
            bail!("grid spacing must be positive");
        }

        Ok(())
    }
}

/// Settings shared by every command of the binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout of the grid graphs to build.
    pub layout: GridLayout,
    /// Birth/survival rulestring of the cellular automaton.
    pub rules: String,
    /// Seed of the random number generator; a fresh OS seed is used when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: GridLayout::default(),
            rules: DEFAULT_RULES.to_owned(),
            seed: None,
        }
    }
}

impl Config {
    /// Reads a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - The file cannot be read
    /// - The contents are not valid JSON for a [`Config`]
    /// - The grid layout in the file is invalid
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read configuration file {}", path.display()))?;
        let config = Self::from_json(&contents)
            .wrap_err_with(|| format!("invalid configuration file {}", path.display()))?;

        debug!("loaded configuration from {}: {config:?}", path.display());

        Ok(config)
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// This function may return errors if the JSON is malformed or the layout is invalid.
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.layout.validate()?;

        Ok(config)
    }
}
