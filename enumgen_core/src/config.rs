//! Generator configuration.
//!
//! A [`Config`] is built once at process start (from CLI flags, optionally
//! seeded by an `enumgen.toml` found by walking up from the source root)
//! and never mutated afterwards.

use crate::error::{EnumgenError, Result};
use crate::shaper::Transform;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{debug, trace, warn};

/// Frozen configuration for one generation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory to scan. One directory is one package.
    pub source_root: PathBuf,
    /// Target file path, resolved relative to the discovered package.
    /// Defaults to `enumgen.rs` inside the package directory.
    pub output_path: Option<PathBuf>,
    /// Identifier transform applied to every value name.
    pub transform: Option<Transform>,
    /// Prefixes stripped from value names before transforming. Longest
    /// match wins.
    pub trim_prefixes: Vec<String>,
    /// Prefix prepended after trimming.
    pub add_prefix: Option<String>,
    /// Record trailing line comments as display overrides.
    pub use_line_comment: bool,
    /// `set_string` retries with the lowercased input on miss.
    pub accept_lower: bool,
    pub emit_text: bool,
    pub emit_json: bool,
    pub emit_yaml: bool,
    pub emit_sql: bool,
    pub emit_graphql: bool,
    /// Enable extension semantics: a type whose base is another
    /// recognised enum type delegates lookups to it.
    pub allow_extend: bool,
    /// Free-form header comment prepended to the output.
    pub comment_header: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            output_path: None,
            transform: None,
            trim_prefixes: Vec::new(),
            add_prefix: None,
            use_line_comment: false,
            accept_lower: false,
            emit_text: true,
            emit_json: false,
            emit_yaml: false,
            emit_sql: false,
            emit_graphql: false,
            allow_extend: false,
            comment_header: None,
        }
    }
}

/// On-disk shape of `enumgen.toml`. Every field is optional; absent
/// fields keep the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub transform: Option<String>,
    #[serde(default)]
    pub trim_prefixes: Vec<String>,
    #[serde(default)]
    pub add_prefix: Option<String>,
    #[serde(default)]
    pub line_comment: Option<bool>,
    #[serde(default)]
    pub accept_lower: Option<bool>,
    #[serde(default)]
    pub text: Option<bool>,
    #[serde(default)]
    pub json: Option<bool>,
    #[serde(default)]
    pub yaml: Option<bool>,
    #[serde(default)]
    pub sql: Option<bool>,
    #[serde(default)]
    pub graphql: Option<bool>,
    #[serde(default)]
    pub extend: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Config {
    /// Builds a configuration for `source_root`, seeded from the nearest
    /// `enumgen.toml` if one exists.
    pub fn for_source_root(source_root: impl Into<PathBuf>) -> Result<Config> {
        let source_root = source_root.into();
        let mut config = Config {
            source_root: source_root.clone(),
            ..Config::default()
        };

        match Self::find_config_file(&source_root) {
            Some(path) => {
                debug!("Found configuration file at: {:?}", path);
                let file = Self::load_file(&path)?;
                config.apply_file(&file)?;
            }
            None => {
                trace!("No enumgen.toml found, using defaults");
            }
        }

        Ok(config)
    }

    /// Loads and parses a specific `enumgen.toml`.
    pub fn load_file(path: &Path) -> Result<FileConfig> {
        let contents = fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&contents)?;
        Ok(file)
    }

    /// Overlays file-level settings onto this configuration.
    pub fn apply_file(&mut self, file: &FileConfig) -> Result<()> {
        if let Some(output) = &file.output {
            self.output_path = Some(PathBuf::from(substitute_env_vars(output)?));
        }
        if let Some(transform) = &file.transform {
            self.transform = Some(transform.parse().map_err(EnumgenError::config)?);
        }
        if !file.trim_prefixes.is_empty() {
            self.trim_prefixes = file.trim_prefixes.clone();
        }
        if let Some(prefix) = &file.add_prefix {
            self.add_prefix = Some(prefix.clone());
        }
        if let Some(v) = file.line_comment {
            self.use_line_comment = v;
        }
        if let Some(v) = file.accept_lower {
            self.accept_lower = v;
        }
        if let Some(v) = file.text {
            self.emit_text = v;
        }
        if let Some(v) = file.json {
            self.emit_json = v;
        }
        if let Some(v) = file.yaml {
            self.emit_yaml = v;
        }
        if let Some(v) = file.sql {
            self.emit_sql = v;
        }
        if let Some(v) = file.graphql {
            self.emit_graphql = v;
        }
        if let Some(v) = file.extend {
            self.allow_extend = v;
        }
        if let Some(comment) = &file.comment {
            self.comment_header = Some(comment.clone());
        }
        Ok(())
    }

    /// Searches for `enumgen.toml` starting from `start` (or
    /// `CARGO_MANIFEST_DIR` when `start` is relative and the variable is
    /// set), walking up to the filesystem root.
    fn find_config_file(start: &Path) -> Option<PathBuf> {
        let base = if start.is_absolute() {
            start.to_path_buf()
        } else {
            env::var("CARGO_MANIFEST_DIR")
                .map(|dir| PathBuf::from(dir).join(start))
                .unwrap_or_else(|_| {
                    env::current_dir()
                        .map(|cwd| cwd.join(start))
                        .unwrap_or_else(|_| start.to_path_buf())
                })
        };

        for dir in base.ancestors() {
            let candidate = dir.join("enumgen.toml");
            trace!("Checking for config at: {:?}", candidate);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }
}

/// Substitutes `${VAR}` and `${VAR:-default}` references in config strings.
pub fn substitute_env_vars(value: &str) -> Result<String> {
    trace!("Substituting environment variables in: {}", value);
    let mut result = value.to_string();

    let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")
        .expect("Invalid regex for environment variable substitution");

    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let default_value = cap.get(2).map(|m| m.as_str());

        let replacement = match env::var(var_name) {
            Ok(val) => val,
            Err(_) => match default_value {
                Some(default) => {
                    warn!(
                        "Environment variable {} not set, using default: {}",
                        var_name, default
                    );
                    default.to_string()
                }
                None => {
                    return Err(EnumgenError::config(format!(
                        "environment variable {var_name} not set and no default given"
                    )));
                }
            },
        };

        result = result.replace(&cap[0], &replacement);
    }

    Ok(result)
}
