pub mod languages;
pub mod predict;
pub mod save;

use std::path::Path;
use std::process;

use estimator_port::config::PortConfig;
use estimator_port::diagnostic::Diagnostic;
use estimator_port::CanonicalModelParameters;

/// Render a diagnostic against a file and exit.
pub fn fail(diag: Diagnostic, filename: &str, source: &str) -> ! {
    if let Err(e) = diag.render(filename, source) {
        log::error!("cannot print diagnostic: {}", e);
    }
    process::exit(1);
}

/// Read and decode a parameter file, exiting with a rendered diagnostic on
/// any failure.
pub fn load_params(path: &Path) -> CanonicalModelParameters {
    let filename = path.display().to_string();
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", filename, e);
            process::exit(1);
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&source) {
        Ok(v) => v,
        Err(e) => fail(Diagnostic::json_syntax(&e, &source), &filename, &source),
    };
    match CanonicalModelParameters::from_value(value) {
        Ok(params) => params,
        Err(e) => fail(Diagnostic::from(&e), &filename, &source),
    }
}

/// porter.toml from the working directory or an ancestor, if any.
pub fn load_config() -> PortConfig {
    let cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let Some(path) = PortConfig::find(&cwd) else {
        return PortConfig::default();
    };
    log::debug!("using {}", path.display());
    match PortConfig::load(&path) {
        Ok(config) => config,
        Err(diag) => {
            let source = std::fs::read_to_string(&path).unwrap_or_default();
            fail(diag, &path.display().to_string(), &source)
        }
    }
}
