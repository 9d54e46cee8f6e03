// Enumgen - code generation for tagged enumerations declared as constants

pub mod config;
pub mod emit;
pub mod error;
pub mod generate;
pub mod inspect;
pub mod partition;
pub mod shaper;
pub mod value;

// Re-export the pipeline surface for convenience
pub use config::{Config, FileConfig};
pub use error::{EnumgenError, Result};
pub use generate::{GenerationReport, generate};
pub use partition::{Partition, Run, Strategy};
pub use shaper::Transform;
pub use value::{EnumType, Package, Repr, Value};
