use rayon::prelude::*;

use crate::error::{PortError, Result};
use crate::generate::generator_for;
use crate::language::{registry, LanguageDefinition};
use crate::literal::MAX_PRECISION;
use crate::model::CanonicalModelParameters;
use crate::pack::{GeneratedArtifact, Method, PackagingMode};

#[cfg(test)]
mod tests;

/// Options controlling generation: what the emitted function returns, how
/// the program is named, and literal precision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortOptions {
    /// Class name for class-based targets; also the file stem.
    pub class_name: String,
    /// Name of the generated prediction function.
    pub method_name: String,
    /// Class index / value, or the class probability vector.
    pub method: Method,
    /// Significant digits for parameter literals; `None` round-trips exactly.
    pub precision: Option<usize>,
}

impl Default for PortOptions {
    fn default() -> Self {
        Self {
            class_name: "Estimator".to_string(),
            method_name: "predict".to_string(),
            method: Method::Predict,
            precision: None,
        }
    }
}

impl PortOptions {
    pub fn with_class_name(mut self, name: &str) -> Self {
        self.class_name = name.to_string();
        self
    }

    pub fn with_method_name(mut self, name: &str) -> Self {
        self.method_name = name.to_string();
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    /// Names must be plain identifiers in every target language.
    pub fn validate(&self) -> Result<()> {
        identifier("options.class_name", &self.class_name)?;
        identifier("options.method_name", &self.method_name)?;
        // Names the generated programs use for their own helpers.
        if GENERATED_NAMES.contains(&self.method_name.as_str()) {
            return Err(PortError::malformed(
                "options.method_name",
                format!("'{}' clashes with a generated function", self.method_name),
            ));
        }
        if let Some(p) = self.precision {
            if p == 0 || p > MAX_PRECISION {
                return Err(PortError::malformed(
                    "options.precision",
                    format!("precision must be within 1..={}, got {}", MAX_PRECISION, p),
                ));
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate), then reject names the target language
    /// reserves: keywords, and the built-ins the generated program calls.
    pub fn validate_for(&self, lang: &LanguageDefinition) -> Result<()> {
        self.validate()?;
        // The class name only reaches the source where there is a class.
        let has_class = lang.template("class_start").is_ok_and(|t| !t.is_empty());
        let names = [
            ("options.class_name", self.class_name.as_str(), has_class),
            ("options.method_name", self.method_name.as_str(), true),
        ];
        for (path, name, checked) in names {
            if checked && lang.is_reserved(name) {
                return Err(PortError::malformed(
                    path,
                    format!("'{}' is reserved in {}", name, lang.label),
                ));
            }
        }
        Ok(())
    }
}

/// Functions and `main` locals of every generated program.
const GENERATED_NAMES: &[&str] = &[
    "main",
    "loadData",
    "load_data",
    "features",
    "args",
    "argc",
    "argv",
    "probabilities",
];

fn identifier(path: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PortError::malformed(
            path,
            format!("'{}' is not a valid identifier", name),
        ))
    }
}

/// Generate code for `params` in the language `language` using the packaging
/// mode `mode` (`embedded`, `split`, `externalized` or an alias).
pub fn port(
    params: &CanonicalModelParameters,
    language: &str,
    mode: &str,
    options: &PortOptions,
) -> Result<GeneratedArtifact> {
    let lang = registry().get(language)?;
    let mode = PackagingMode::parse(mode)?;
    generator_for(params).generate(lang, mode, options)
}

/// Generate for several languages in parallel. Results come back in the
/// order of `languages`; one failure does not affect the others.
pub fn port_all(
    params: &CanonicalModelParameters,
    languages: &[&str],
    mode: &str,
    options: &PortOptions,
) -> Vec<Result<GeneratedArtifact>> {
    languages
        .par_iter()
        .map(|language| port(params, language, mode, options))
        .collect()
}
