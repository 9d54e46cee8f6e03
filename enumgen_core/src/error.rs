use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnumgenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in file {file:?}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("No package: {root:?} contains no Rust source files")]
    NoPackage { root: PathBuf },

    #[error("Type {type_name} has no values")]
    NoValues { type_name: String },

    #[error("Invalid directive {directive:?} on {decl} in {file:?}")]
    InvalidDirective {
        directive: String,
        decl: String,
        file: PathBuf,
    },

    #[error("Type {type_name} has unsupported base type {base}")]
    UnsupportedBase { type_name: String, base: String },

    #[error("Bit flag {type_name}::{value_name} has index {numeric}, outside 0..=63")]
    InvalidBitIndex {
        type_name: String,
        value_name: String,
        numeric: i64,
    },

    #[error(
        "Label collision in type {type_name}: {first} and {second} both produce label {label:?}"
    )]
    LabelCollision {
        type_name: String,
        label: String,
        first: String,
        second: String,
    },

    #[error("Type {type_name} extends unknown base {base}")]
    UnknownBase { type_name: String, base: String },

    #[error("internal error: generated source failed to format: {0}")]
    EmitFormat(String),

    #[error("Failed to write {path:?}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{}", render_multiple(.0))]
    Multiple(Vec<EnumgenError>),
}

fn render_multiple(errors: &[EnumgenError]) -> String {
    let mut out = format!("{} errors during generation:", errors.len());
    for err in errors {
        let _ = write!(out, "\n  {err}");
    }
    out
}

impl From<toml::de::Error> for EnumgenError {
    fn from(err: toml::de::Error) -> Self {
        EnumgenError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EnumgenError>;

impl EnumgenError {
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EnumgenError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        EnumgenError::Config(message.into())
    }

    pub fn emit_format(message: impl Into<String>) -> Self {
        EnumgenError::EmitFormat(message.into())
    }

    pub fn write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EnumgenError::Write {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Collapses a collected error list: empty is `Ok`, a single error is
    /// returned as itself, more become `Multiple`.
    pub fn collect(mut errors: Vec<EnumgenError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(EnumgenError::Multiple(errors)),
        }
    }
}
