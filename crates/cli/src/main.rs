//! Command-line interface for package expansion.
//!
//! This CLI stands in for the desktop window: the two positional/flag paths
//! are the pickers, running the command is the button, standard output is
//! the log view and a pre-launch error is printed in place of the dialog.

use clap::{Parser, Subcommand};
use expander::config::{default_settings_path, load_settings};
use expander::{
    ExpandError, ExpanderConfig, LogBuffer, LogLevel, LogLine, RunOutcome, SelectionState,
    Supervisor,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pkgexpand")]
#[command(version, about = "Expand macOS installer packages with pkgutil", long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a package into <OUT>/<package name>
    Expand {
        /// Installer package to expand
        package: PathBuf,

        /// Output folder (created if missing)
        #[arg(short, long)]
        out: PathBuf,

        /// Expansion tool to run instead of the configured one
        #[arg(long)]
        tool: Option<PathBuf>,

        /// Do not reveal the result in the file browser
        #[arg(long)]
        no_reveal: bool,

        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show where a package would be expanded, without expanding it
    Plan {
        /// Installer package
        package: PathBuf,

        /// Output folder
        #[arg(short, long)]
        out: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_settings(cli.settings);

    let result = match cli.command {
        Commands::Expand {
            package,
            out,
            tool,
            no_reveal,
            json,
        } => {
            let mut config = config;
            if let Some(tool) = tool {
                config.tool = tool;
            }
            if no_reveal {
                config.reveal_on_success = false;
            }
            handle_expand(config, package, out, json).await
        }
        Commands::Plan { package, out, json } => handle_plan(package, out, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.downcast_ref::<ExpandError>().and_then(ExpandError::suggestion) {
            eprintln!("Hint: {}", hint);
        }
        process::exit(1);
    }
}

fn resolve_settings(path: Option<PathBuf>) -> ExpanderConfig {
    match path.or_else(default_settings_path) {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            load_settings(&path)
        }
        None => {
            tracing::debug!("No config directory, using default settings");
            ExpanderConfig::default()
        }
    }
}

async fn handle_expand(
    config: ExpanderConfig,
    package: PathBuf,
    out: PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = if json {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
        spinner
    };

    let printer = spinner.clone();
    let log = LogBuffer::with_observer(move |line| {
        printer.suspend(|| print_line(line, json));
    });

    let state = SelectionState::with_log(config.clone(), log);
    state.set_input(package);
    state.set_output(out);

    let supervisor = Supervisor::new(config);
    spinner.set_message("Expanding...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = state.extract(&supervisor).await;
    spinner.finish_and_clear();

    let report = result?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    }

    match report.outcome {
        RunOutcome::Succeeded { .. } => Ok(()),
        RunOutcome::Failed { code } => {
            Err(format!("expansion tool exited with code {}", code).into())
        }
        RunOutcome::Terminated => Err("expansion tool was terminated".into()),
        RunOutcome::LaunchFailed { message } => {
            Err(format!("could not start expansion tool: {}", message).into())
        }
    }
}

fn handle_plan(
    package: PathBuf,
    out: PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = expander::plan(&package, &out)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("Package:     {}", plan.input.display());
        println!("Destination: {}", plan.destination.display());
    }
    Ok(())
}

fn print_line(line: &LogLine, json: bool) {
    if json {
        if let Ok(encoded) = serde_json::to_string(line) {
            println!("{}", encoded);
        }
        return;
    }

    match line.level {
        LogLevel::Output => println!("{}", line.text),
        LogLevel::Warning => println!("warning: {}", line.text),
        LogLevel::Info => println!("==> {}", line.text),
        LogLevel::Success => println!("✓ {}", line.text),
        LogLevel::Error => println!("✗ {}", line.text),
    }
}
