use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::pack::Method;

/// File name searched for by [`PortConfig::find`].
pub const CONFIG_FILE: &str = "porter.toml";

/// Project defaults from the `[port]` section of porter.toml. Every field is
/// optional; command-line flags take precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortConfig {
    pub languages: Vec<String>,
    /// Packaging mode name (or alias).
    pub template: Option<String>,
    /// Output directory, resolved against the config file's directory.
    pub directory: Option<PathBuf>,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    /// `predict` or `predict_proba`.
    pub method: Option<Method>,
    pub precision: Option<usize>,
}

/// Parse a minimal TOML string array: `["a", "b", "c"]` → `vec!["a", "b", "c"]`.
fn parse_string_array(s: &str) -> Vec<String> {
    let s = s.trim();
    if !s.starts_with('[') || !s.ends_with(']') {
        return Vec::new();
    }
    let inner = &s[1..s.len() - 1];
    inner
        .split(',')
        .map(|part| part.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl PortConfig {
    /// Load defaults from a porter.toml file.
    pub fn load(toml_path: &Path) -> Result<PortConfig, Diagnostic> {
        let content = std::fs::read_to_string(toml_path).map_err(|e| {
            Diagnostic::error(format!("cannot read '{}': {}", toml_path.display(), e))
        })?;
        let root_dir = toml_path.parent().unwrap_or(Path::new("."));
        Self::parse(&content, root_dir)
    }

    /// Parse porter.toml text; relative paths resolve against `root_dir`.
    pub fn parse(content: &str, root_dir: &Path) -> Result<PortConfig, Diagnostic> {
        let mut config = PortConfig::default();
        let mut current_section = String::new();

        // Section-aware minimal TOML parsing
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                continue;
            };
            if current_section != "port" {
                continue;
            }
            let key = key.trim().trim_matches('"');
            let value = value.trim();
            match key {
                // A single language or an array of them.
                "language" | "languages" if value.starts_with('[') => {
                    config.languages = parse_string_array(value)
                }
                "language" | "languages" => {
                    config.languages = vec![value.trim_matches('"').to_string()]
                }
                "template" => config.template = Some(value.trim_matches('"').to_string()),
                "directory" => {
                    config.directory = Some(root_dir.join(value.trim_matches('"')))
                }
                "class_name" => config.class_name = Some(value.trim_matches('"').to_string()),
                "method_name" => config.method_name = Some(value.trim_matches('"').to_string()),
                "method" => {
                    let method = Method::parse(value.trim_matches('"'))
                        .map_err(|e| Diagnostic::from(&e).with_note(format!("in {}", CONFIG_FILE)))?;
                    config.method = Some(method);
                }
                "precision" => {
                    let digits = value.parse::<usize>().map_err(|_| {
                        Diagnostic::error(format!("invalid precision '{}' in {}", value, CONFIG_FILE))
                            .with_help("precision is a number of significant digits, 1 to 17".to_string())
                    })?;
                    config.precision = Some(digits);
                }
                _ => {
                    log::warn!("ignoring unknown key '{}' in {}", key, CONFIG_FILE);
                }
            }
        }
        Ok(config)
    }

    /// Where generated files go: the command-line flag, then the configured
    /// directory, then the working directory.
    pub fn output_directory(&self, flag: Option<PathBuf>, cwd: &Path) -> PathBuf {
        flag.or_else(|| self.directory.clone())
            .unwrap_or_else(|| cwd.to_path_buf())
    }

    /// Try to find a porter.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join(CONFIG_FILE);
        fs::write(
            &toml_path,
            r#"# defaults for this project
[port]
language = "go"
template = "exported"
directory = "out"
class_name = "Iris"
method = "predict_proba"
precision = 6
"#,
        )
        .unwrap();

        let config = PortConfig::load(&toml_path).unwrap();
        assert_eq!(config.languages, vec!["go".to_string()]);
        assert_eq!(config.template.as_deref(), Some("exported"));
        assert_eq!(config.directory, Some(dir.path().join("out")));
        assert_eq!(config.class_name.as_deref(), Some("Iris"));
        assert_eq!(config.method_name, None);
        assert_eq!(config.method, Some(Method::PredictProba));
        assert_eq!(config.precision, Some(6));
    }

    #[test]
    fn test_language_list_and_other_sections() {
        let config = PortConfig::parse(
            r#"[other]
language = "c"

[port]
languages = ["js", "ruby"]
"#,
            Path::new("."),
        )
        .unwrap();
        assert_eq!(config.languages, vec!["js", "ruby"]);
    }

    #[test]
    fn test_invalid_precision() {
        let err = PortConfig::parse("[port]\nprecision = high\n", Path::new(".")).unwrap_err();
        assert!(err.message.contains("invalid precision"));
        assert!(err.help.is_some());
    }

    #[test]
    fn test_unknown_method() {
        let err = PortConfig::parse("[port]\nmethod = \"decision_function\"\n", Path::new("."))
            .unwrap_err();
        assert!(err.message.contains("decision_function"));
        assert!(err.help.is_some());
    }

    #[test]
    fn test_output_directory_precedence() {
        let cwd = Path::new("/work");
        let mut config = PortConfig::default();
        assert_eq!(config.output_directory(None, cwd), PathBuf::from("/work"));
        config.directory = Some(PathBuf::from("/project/out"));
        assert_eq!(config.output_directory(None, cwd), PathBuf::from("/project/out"));
        assert_eq!(
            config.output_directory(Some(PathBuf::from("here")), cwd),
            PathBuf::from("here")
        );
    }

    #[test]
    fn test_find_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[port]\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(PortConfig::find(&nested), Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_parse_string_array() {
        assert_eq!(
            parse_string_array(r#"["a", "b", "c"]"#),
            vec!["a", "b", "c"]
        );
        assert_eq!(parse_string_array(r#"["single"]"#), vec!["single"]);
        assert!(parse_string_array("not_an_array").is_empty());
    }
}
