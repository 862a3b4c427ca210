pub mod api;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod error;
pub mod generate;
pub mod language;
pub mod literal;
pub mod model;
pub mod pack;
pub mod predict;
pub mod template;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export public API: `estimator_port::port()` etc.
pub use api::*;
pub use error::{PortError, Result};
pub use language::{registry, LanguageDefinition};
pub use model::{CanonicalModelParameters, Family, Task};
pub use pack::{Blob, GeneratedArtifact, Method, PackagingMode};
pub use predict::{predict, predict_proba, Prediction};
