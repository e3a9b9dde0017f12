//! Loader utilities for the level catalog.
//!
//! Levels and mission settings are TOML-backed and validated as a whole
//! before any level is played.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use rover_data::LevelCatalog;

use crate::data_paths::data_path;

/// File name of the level catalog inside the data directory.
pub const LEVELS_FILE: &str = "levels.toml";

/// Load the level catalog from the data directory.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, or validation.
pub fn load_catalog() -> Result<LevelCatalog> {
    load_catalog_from(&data_path(LEVELS_FILE))
}

/// Load and validate a level catalog from `path`.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid TOML, or fails validation.
pub fn load_catalog_from(path: &Path) -> Result<LevelCatalog> {
    let text = fs::read_to_string(path).with_context(|| format!("reading level catalog {}", path.display()))?;
    let catalog = parse_catalog(&text).with_context(|| format!("loading level catalog {}", path.display()))?;
    info!("{} levels loaded from {}", catalog.level_count(), path.display());
    Ok(catalog)
}

/// Parse and validate catalog TOML.
///
/// # Errors
/// Returns an error for malformed TOML or an invalid catalog.
pub fn parse_catalog(text: &str) -> Result<LevelCatalog> {
    let catalog: LevelCatalog = toml::from_str(text).context("parsing level catalog TOML")?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Validate the catalog and return a single aggregated error.
fn validate_catalog(catalog: &LevelCatalog) -> Result<()> {
    let errors = rover_data::validate_catalog(catalog);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("level catalog validation failed:\n{details}");
}
