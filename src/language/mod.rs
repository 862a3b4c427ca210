//! Target language definitions.
//!
//! A `LanguageDefinition` is an immutable record of syntax templates and
//! external command patterns. Generators only ever emit target syntax through
//! these templates, which keeps them language-agnostic.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::{PortError, Result};
use crate::template::{render_pattern, Bindings};

mod c;
mod go;
mod java;
mod js;
mod php;
mod ruby;


/// Template keys every language must define.
pub const REQUIRED_KEYS: &[&str] = &[
    "init",
    "if",
    "else",
    "endif",
    "indent",
    "join",
    "type",
    "in_brackets",
    "arr[]",
    "arr[][]",
    "arr[][][]",
    "int",
    "double",
];

/// Keys the procedural generators rely on in every packaging mode.
pub const PROCEDURE_KEYS: &[&str] = &[
    "ref",
    "global_ref",
    "use_global",
    "index",
    "set",
    "return",
    "for",
    "endfor",
    "while",
    "endwhile",
    "zeros[]",
    "global_arr[]",
    "global_arr[][]",
    "global_arr[][][]",
    "fn_start",
    "fn_end",
    "prelude",
    "import_math",
    "class_start",
    "class_end",
    "main",
    "print_int",
    "print_double",
    "exp",
    "log",
    "sqrt",
    "abs",
    "tanh",
    "pow",
];

/// Keys needed to load an external data artifact at startup.
pub const LOADER_KEYS: &[&str] = &[
    "import_json",
    "decl[]",
    "decl[][]",
    "decl[][][]",
    "load_start",
    "load_field[]",
    "load_field[][]",
    "load_field[][][]",
    "load_mid",
    "load_assign",
    "load_end",
    "load_call",
];

/// Keys for returning and printing the class probability vector.
pub const PROBA_KEYS: &[&str] = &["result[]", "array_type", "print_proba"];

/// Syntax and tooling description of one target language.
#[derive(Clone, Debug)]
pub struct LanguageDefinition {
    /// Short identifier used by callers (e.g. "go").
    pub key: String,
    /// Human-readable name (e.g. "Go").
    pub label: String,
    /// File suffix without the dot (e.g. "go").
    pub suffix: String,
    /// Runtime tools a harness needs on PATH (informational).
    pub dependencies: Vec<String>,
    /// Compile command pattern; `None` for interpreted targets.
    pub compile_command: Option<String>,
    /// Execute command pattern; runtime arguments are appended by the harness.
    pub execute_command: String,
    /// Width of the native integer type, `None` for arbitrary precision.
    pub int_bits: Option<u32>,
    /// Whether the source file must be named after the generated class.
    pub stem_is_class: bool,
    /// Keywords and built-ins a generated name must not shadow.
    reserved: Vec<String>,
    /// Whether identifiers compare case-insensitively (PHP functions).
    ignore_case: bool,
    templates: BTreeMap<String, String>,
}

impl LanguageDefinition {
    pub(crate) fn new(
        key: &str,
        label: &str,
        suffix: &str,
        dependencies: &[&str],
        compile_command: Option<&str>,
        execute_command: &str,
        templates: &[(&str, &str)],
    ) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            suffix: suffix.to_string(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            compile_command: compile_command.map(|c| c.to_string()),
            execute_command: execute_command.to_string(),
            int_bits: Some(64),
            stem_is_class: false,
            reserved: Vec::new(),
            ignore_case: false,
            templates: templates
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub(crate) fn with_int_bits(mut self, bits: Option<u32>) -> Self {
        self.int_bits = bits;
        self
    }

    pub(crate) fn with_class_stem(mut self) -> Self {
        self.stem_is_class = true;
        self
    }

    pub(crate) fn with_reserved(mut self, words: &[&str]) -> Self {
        self.reserved = words.iter().map(|w| w.to_string()).collect();
        self
    }

    pub(crate) fn with_case_insensitive_names(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Whether `name` is a keyword or a built-in of this language.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|w| {
            if self.ignore_case {
                w.eq_ignore_ascii_case(name)
            } else {
                w == name
            }
        })
    }

    /// Look up a template pattern, failing if the key is absent.
    pub fn template(&self, key: &str) -> Result<&str> {
        self.templates
            .get(key)
            .map(|s| s.as_str())
            .ok_or_else(|| PortError::MissingTemplate {
                language: self.key.clone(),
                key: key.to_string(),
            })
    }

    pub fn has_template(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    pub fn template_keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|k| k.as_str())
    }

    /// Whether the language defines a loader for externalized data.
    pub fn supports_external_data(&self) -> bool {
        self.has_template("load_start")
    }

    /// Check that every key in `keys` is present; reports the first missing one.
    pub fn require(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.template(key)?;
        }
        Ok(())
    }

    /// Copy of this definition without `key`. Used to exercise fail-fast paths.
    pub fn without_template(&self, key: &str) -> Self {
        let mut copy = self.clone();
        copy.templates.remove(key);
        copy
    }

    /// Render the compile command, if the language has one.
    pub fn render_compile(&self, bindings: &Bindings<'_>) -> Result<Option<String>> {
        match &self.compile_command {
            Some(pattern) => render_pattern(pattern, bindings, &self.key, "compile").map(Some),
            None => Ok(None),
        }
    }

    /// Render the execute command.
    pub fn render_execute(&self, bindings: &Bindings<'_>) -> Result<String> {
        render_pattern(&self.execute_command, bindings, &self.key, "execute")
    }
}

/// Process-wide, read-only set of built-in languages.
#[derive(Debug)]
pub struct Registry {
    languages: Vec<LanguageDefinition>,
}

impl Registry {
    fn builtin() -> Self {
        Self {
            languages: vec![
                c::definition(),
                go::definition(),
                java::definition(),
                js::definition(),
                php::definition(),
                ruby::definition(),
            ],
        }
    }

    /// Resolve a language by key.
    pub fn get(&self, key: &str) -> Result<&LanguageDefinition> {
        self.languages
            .iter()
            .find(|l| l.key == key)
            .ok_or_else(|| PortError::UnknownLanguage {
                key: key.to_string(),
            })
    }

    pub fn keys(&self) -> Vec<&str> {
        self.languages.iter().map(|l| l.key.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageDefinition> {
        self.languages.iter()
    }
}

/// The registry, built on first use and never mutated afterwards.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::builtin)
}
