//! The generation pipeline: scan, shape, partition, emit.

use crate::config::Config;
use crate::emit::emit_package;
use crate::error::{EnumgenError, Result};
use crate::inspect::scan_package;
use crate::shaper::shape_type;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub package: String,
    pub type_count: usize,
    pub value_count: usize,
    /// Output path, absent when the package held nothing to generate.
    pub output: Option<PathBuf>,
    pub bytes_written: usize,
}

/// Runs the full pipeline for one source directory.
#[instrument(skip(config), fields(root = ?config.source_root))]
pub fn generate(config: &Config) -> Result<GenerationReport> {
    let mut pkg = scan_package(config)?;

    if pkg.types.is_empty() {
        warn!("No annotated types found in {:?}", config.source_root);
        return Ok(GenerationReport {
            package: pkg.name,
            type_count: 0,
            value_count: 0,
            output: None,
            bytes_written: 0,
        });
    }

    let mut errors = Vec::new();
    for ty in &mut pkg.types {
        if let Err(err) = shape_type(ty, config) {
            errors.push(err);
        }
    }
    EnumgenError::collect(errors)?;

    let value_count = pkg.types.iter().map(|t| t.value_count()).sum();
    let (output, bytes_written) = emit_package(&pkg, config)?;

    info!(
        "Generated {} types ({} values) for package {}",
        pkg.types.len(),
        value_count,
        pkg.name
    );
    Ok(GenerationReport {
        package: pkg.name,
        type_count: pkg.types.len(),
        value_count,
        output: Some(output),
        bytes_written,
    })
}
