//! Packaging: where parameter data lives relative to the prediction logic.

use std::fmt;
use std::path::Path;

use crate::bind;
use crate::error::{PortError, Result};
use crate::model::Family;
use crate::template::{render_pattern, Bindings};

mod assemble;
mod data;


pub(crate) use assemble::assemble;
pub use data::{DataArray, NumberKind, Numbers};

/// Placement of numeric data relative to the generated logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackagingMode {
    /// Literals inline or as local arrays of the prediction function.
    Embedded,
    /// Arrays hoisted to named top-level constants in the same file.
    Split,
    /// Arrays in a separate JSON file loaded at startup.
    Externalized,
}

impl PackagingMode {
    pub const ALL: [PackagingMode; 3] = [
        PackagingMode::Embedded,
        PackagingMode::Split,
        PackagingMode::Externalized,
    ];

    /// Resolve a mode name or one of its aliases.
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "embedded" | "combined" => Ok(PackagingMode::Embedded),
            "split" | "attached" => Ok(PackagingMode::Split),
            "externalized" | "exported" => Ok(PackagingMode::Externalized),
            _ => Err(PortError::UnknownMode {
                mode: name.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PackagingMode::Embedded => "embedded",
            PackagingMode::Split => "split",
            PackagingMode::Externalized => "externalized",
        }
    }
}

impl fmt::Display for PackagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the generated function returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// A class index or a regression value.
    #[default]
    Predict,
    /// One probability per class, summing to one.
    PredictProba,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::Predict, Method::PredictProba];

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "predict" => Ok(Method::Predict),
            "predict_proba" => Ok(Method::PredictProba),
            _ => Err(PortError::UnknownMethod {
                method: name.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Predict => "predict",
            Method::PredictProba => "predict_proba",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named text artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub filename: String,
    pub contents: String,
}

/// Output of one generation call. Immutable once returned.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedArtifact {
    pub language: String,
    pub family: Family,
    pub mode: PackagingMode,
    pub method: Method,
    pub suffix: String,
    pub class_name: String,
    /// File stem shared by the logic and data blobs.
    pub stem: String,
    pub logic: Blob,
    pub data: Vec<Blob>,
    pub compile_pattern: Option<String>,
    pub execute_pattern: String,
}

impl GeneratedArtifact {
    /// Logic first, then data blobs in order.
    pub fn blobs(&self) -> impl Iterator<Item = &Blob> {
        std::iter::once(&self.logic).chain(self.data.iter())
    }

    /// BLAKE3 over every blob's filename and contents, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for blob in self.blobs() {
            hasher.update(blob.filename.as_bytes());
            hasher.update(&[0]);
            hasher.update(blob.contents.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize().to_hex().to_string()
    }

    fn command_bindings(&self, dir: &Path) -> Bindings<'static> {
        bind!(
            "src_path" => dir.join(&self.logic.filename).display().to_string(),
            "dest_path" => dir.join(&self.stem).display().to_string(),
            "dest_dir" => dir.display().to_string(),
            "class_name" => self.class_name.as_str(),
        )
    }

    /// Compile command for blobs written to `dir`; `None` for interpreted targets.
    pub fn compile_command(&self, dir: &Path) -> Result<Option<String>> {
        let Some(pattern) = &self.compile_pattern else {
            return Ok(None);
        };
        render_pattern(pattern, &self.command_bindings(dir), &self.language, "compile").map(Some)
    }

    /// Execute command for blobs written to `dir`. For externalized data the
    /// data file path is appended as the first argument; feature values go
    /// after it.
    pub fn execute_command(&self, dir: &Path) -> Result<String> {
        let mut command = render_pattern(
            &self.execute_pattern,
            &self.command_bindings(dir),
            &self.language,
            "execute",
        )?;
        for blob in &self.data {
            command.push(' ');
            command.push_str(&dir.join(&blob.filename).display().to_string());
        }
        Ok(command)
    }
}
