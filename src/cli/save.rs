use std::path::{Path, PathBuf};
use std::process;

use estimator_port::diagnostic::{render_diagnostics, Diagnostic};
use estimator_port::{port, port_all, GeneratedArtifact, Method, PortOptions};

use super::{load_config, load_params};

const DEFAULT_LANGUAGE: &str = "java";
const DEFAULT_TEMPLATE: &str = "embedded";

pub struct SaveArgs {
    pub input: PathBuf,
    pub languages: Vec<String>,
    pub template: Option<String>,
    pub directory: Option<PathBuf>,
    pub class_name: Option<String>,
    pub method_name: Option<String>,
    pub method: Option<String>,
    pub precision: Option<usize>,
}

pub fn cmd_save(args: SaveArgs) {
    let config = load_config();
    let params = load_params(&args.input);

    let languages = if !args.languages.is_empty() {
        args.languages
    } else if !config.languages.is_empty() {
        config.languages.clone()
    } else {
        vec![DEFAULT_LANGUAGE.to_string()]
    };
    let template = args
        .template
        .or(config.template.clone())
        .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let directory = config.output_directory(args.directory, &cwd);

    let mut options = PortOptions::default();
    if let Some(name) = args.class_name.or(config.class_name) {
        options = options.with_class_name(&name);
    }
    if let Some(name) = args.method_name.or(config.method_name) {
        options = options.with_method_name(&name);
    }
    let method = match args.method.as_deref().map(Method::parse).transpose() {
        Ok(method) => method.or(config.method).unwrap_or_default(),
        Err(e) => {
            report(&[Diagnostic::from(&e)], &args.input);
            process::exit(1);
        }
    };
    options = options
        .with_method(method)
        .with_precision(args.precision.or(config.precision));

    let keys: Vec<&str> = languages.iter().map(String::as_str).collect();
    let results = match keys.as_slice() {
        [single] => vec![port(&params, single, &template, &options)],
        _ => port_all(&params, &keys, &template, &options),
    };

    let mut failures = Vec::new();
    for (key, result) in keys.iter().zip(results) {
        match result {
            Ok(artifact) => {
                if let Err(e) = write_artifact(&artifact, &directory) {
                    failures.push(Diagnostic::error(format!(
                        "cannot write '{}' output to {}: {}",
                        key,
                        directory.display(),
                        e
                    )));
                }
            }
            Err(e) => failures.push(Diagnostic::from(&e)),
        }
    }
    if !failures.is_empty() {
        report(&failures, &args.input);
        process::exit(1);
    }
}

fn report(diagnostics: &[Diagnostic], input: &Path) {
    if let Err(e) = render_diagnostics(diagnostics, &input.display().to_string(), "") {
        log::error!("cannot print diagnostics: {}", e);
    }
}

fn write_artifact(artifact: &GeneratedArtifact, directory: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(directory)?;
    for blob in artifact.blobs() {
        let path = directory.join(&blob.filename);
        std::fs::write(&path, &blob.contents)?;
        println!("{}", path.display());
    }
    eprintln!("{} {} {}", artifact.language, artifact.mode, artifact.digest());
    if let Ok(Some(compile)) = artifact.compile_command(directory) {
        eprintln!("  compile: {}", compile);
    }
    if let Ok(execute) = artifact.execute_command(directory) {
        eprintln!("  execute: {} <features...>", execute);
    }
    Ok(())
}
