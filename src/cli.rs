//! Entry point for programs that define a workflow in Rust
//!
//! ```no_run
//! use ciscript::schema::{Job, Step, Trigger, Workflow};
//!
//! fn main() -> miette::Result<()> {
//!     let workflow = Workflow::builder("CI")
//!         .on(Trigger::push().branches(["main"]))
//!         .job(
//!             "test",
//!             Job::builder()
//!                 .runs_on("ubuntu-latest")
//!                 .step(Step::run("cargo test")),
//!         )
//!         .build();
//!     ciscript::cli::run(workflow, ".github/workflows/ci.yml")
//! }
//! ```
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ValidationError;
use crate::exporter;
use crate::schema::Workflow;

#[derive(Parser, Debug)]
#[command(
    about = "Write a GitHub Actions workflow defined in Rust",
    version,
    long_about = None
)]
pub struct Cli {
    /// Where to write the workflow YAML
    #[arg(short, long, env = "CISCRIPT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse arguments, set up logging and export `workflow`
///
/// `default_output` is used unless `--output` or `CISCRIPT_OUTPUT` says
/// otherwise. Returning the error from `main` renders it with miette and
/// exits nonzero.
pub fn run(
    workflow: Result<Workflow, ValidationError>,
    default_output: impl AsRef<Path>,
) -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = execute(&cli, workflow, default_output.as_ref())?;
    println!("{} Wrote {}", "✓".green(), output.display());
    Ok(())
}

/// Export with already-parsed arguments, returning the path written
pub fn execute(
    cli: &Cli,
    workflow: Result<Workflow, ValidationError>,
    default_output: &Path,
) -> miette::Result<PathBuf> {
    let workflow = workflow?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output.to_path_buf());
    debug!("Exporting workflow '{}' to {}", workflow.name, output.display());

    exporter::write_to_path(&workflow, &output)?;
    Ok(output)
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("ciscript=warn"),
        1 => EnvFilter::new("ciscript=info"),
        _ => EnvFilter::new("ciscript=debug"),
    };

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Job, Step, Trigger};
    use tempfile::TempDir;

    fn workflow() -> Result<Workflow, ValidationError> {
        Workflow::builder("CI")
            .on(Trigger::push())
            .job(
                "test",
                Job::builder()
                    .runs_on("ubuntu-latest")
                    .step(Step::run("cargo test")),
            )
            .build()
    }

    #[test]
    fn test_parse_output_and_verbosity() {
        let cli = Cli::try_parse_from(["ci", "-vv", "--output", "out/ci.yml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(PathBuf::from("out/ci.yml")));
    }

    #[test]
    fn test_execute_uses_default_output() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join(".github/workflows/ci.yml");
        let cli = Cli {
            output: None,
            verbose: 0,
        };

        let written = execute(&cli, workflow(), &default).unwrap();
        assert_eq!(written, default);
        assert!(default.exists());
    }

    #[test]
    fn test_execute_prefers_output_flag() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("default.yml");
        let chosen = dir.path().join("chosen.yml");
        let cli = Cli {
            output: Some(chosen.clone()),
            verbose: 0,
        };

        execute(&cli, workflow(), &default).unwrap();
        assert!(chosen.exists());
        assert!(!default.exists());
    }

    #[test]
    fn test_execute_reports_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ci.yml");
        let cli = Cli {
            output: None,
            verbose: 0,
        };
        let broken = Workflow::builder("CI").on(Trigger::push()).build();

        let err = execute(&cli, broken, &path).unwrap_err();
        assert_eq!(err.to_string(), "invalid workflow: `jobs` must not be empty");
        assert!(!path.exists());
    }
}
