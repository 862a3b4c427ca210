use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(
    name = "porter",
    version,
    about = "Transpile fitted estimators into standalone programs"
)]
struct Cli {
    /// Log every generation step
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate code from a parameter file and write it to disk
    Save {
        /// Canonical model parameters as JSON
        input: PathBuf,
        /// Target language key; repeat for several languages
        #[arg(short, long = "language")]
        languages: Vec<String>,
        /// Packaging mode: embedded, split, externalized (or combined, attached, exported)
        #[arg(short, long)]
        template: Option<String>,
        /// Output directory (default: the working directory)
        #[arg(long)]
        directory: Option<PathBuf>,
        /// Class name, also used as the file stem
        #[arg(long)]
        class_name: Option<String>,
        /// Name of the prediction function
        #[arg(long)]
        method_name: Option<String>,
        /// What the function returns: predict (class or value) or predict_proba
        #[arg(short, long)]
        method: Option<String>,
        /// Significant digits for parameter literals (default: exact)
        #[arg(long)]
        precision: Option<usize>,
    },
    /// List the supported target languages
    Languages,
    /// Print the reference prediction for one input vector
    Predict {
        /// Canonical model parameters as JSON
        input: PathBuf,
        /// Feature values
        #[arg(allow_negative_numbers = true, required = true)]
        features: Vec<f64>,
        /// predict (class or value) or predict_proba (space-separated probabilities)
        #[arg(short, long)]
        method: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Save {
            input,
            languages,
            template,
            directory,
            class_name,
            method_name,
            method,
            precision,
        } => cli::save::cmd_save(cli::save::SaveArgs {
            input,
            languages,
            template,
            directory,
            class_name,
            method_name,
            method,
            precision,
        }),
        Command::Languages => cli::languages::cmd_languages(),
        Command::Predict {
            input,
            features,
            method,
        } => cli::predict::cmd_predict(input, features, method),
    }
}
