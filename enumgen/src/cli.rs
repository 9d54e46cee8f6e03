//! Command-line interface definitions for enumgen.

use clap::Parser;
use enumgen_core::config::Config;
use enumgen_core::error::{EnumgenError, Result};
use std::path::PathBuf;

/// Enumgen - generates string conversion, marshalling, and validation
/// support for constant-declared enumerations
#[derive(Parser, Debug)]
#[command(name = "enumgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (one directory is one package)
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Path to enumgen.toml configuration file
    #[arg(short, long, env = "ENUMGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file path (default: enumgen.rs inside the package)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Identifier transform: snake, snake-upper, kebab, kebab-upper,
    /// upper, lower, camel, camel-lower, title, title-lower, first,
    /// first-upper, first-lower, whitespace
    #[arg(short, long)]
    pub transform: Option<String>,

    /// Comma-separated prefixes stripped from value names (longest wins)
    #[arg(long, value_delimiter = ',')]
    pub trim_prefix: Vec<String>,

    /// Prefix prepended to value names after trimming
    #[arg(long)]
    pub add_prefix: Option<String>,

    /// Use trailing line comments as display overrides
    #[arg(long)]
    pub line_comment: bool,

    /// Retry label lookups with the lowercased input
    #[arg(long)]
    pub accept_lower: bool,

    /// Skip the text marshalling layer (Display/FromStr)
    #[arg(long)]
    pub no_text: bool,

    /// Emit the JSON marshalling layer
    #[arg(long)]
    pub json: bool,

    /// Emit the YAML marshalling layer
    #[arg(long)]
    pub yaml: bool,

    /// Emit the SQL marshalling layer
    #[arg(long)]
    pub sql: bool,

    /// Emit the GraphQL marshalling layer
    #[arg(long)]
    pub gql: bool,

    /// Allow enum types to extend other enum types
    #[arg(long)]
    pub extend: bool,

    /// Free-form comment placed under the generated-file header
    #[arg(long)]
    pub comment: Option<String>,

    /// Enable verbose output (-v, -vv for increasing verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Builds the run configuration: file settings first, then flag
    /// overrides.
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let file = Config::load_file(path)?;
                let mut config = Config {
                    source_root: self.dir.clone(),
                    ..Config::default()
                };
                config.apply_file(&file)?;
                config
            }
            None => Config::for_source_root(&self.dir)?,
        };

        if let Some(output) = self.output {
            config.output_path = Some(output);
        }
        if let Some(transform) = self.transform {
            config.transform = Some(transform.parse().map_err(EnumgenError::config)?);
        }
        if !self.trim_prefix.is_empty() {
            config.trim_prefixes = self.trim_prefix;
        }
        if let Some(prefix) = self.add_prefix {
            config.add_prefix = Some(prefix);
        }
        if self.line_comment {
            config.use_line_comment = true;
        }
        if self.accept_lower {
            config.accept_lower = true;
        }
        if self.no_text {
            config.emit_text = false;
        }
        if self.json {
            config.emit_json = true;
        }
        if self.yaml {
            config.emit_yaml = true;
        }
        if self.sql {
            config.emit_sql = true;
        }
        if self.gql {
            config.emit_graphql = true;
        }
        if self.extend {
            config.allow_extend = true;
        }
        if let Some(comment) = self.comment {
            config.comment_header = Some(comment);
        }
        Ok(config)
    }
}
