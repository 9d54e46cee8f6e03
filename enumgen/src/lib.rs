pub mod cli;

pub use enumgen_core::{Config, EnumgenError, GenerationReport, Result, generate};
