use anyhow::{Context, Result};
use attrform::{build_registry, describe_project, widget_catalog, LogMessageBar, Project, Settings};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// attrform - inspect and rewrite attribute form configuration of projects
#[derive(Parser, Debug)]
#[command(name = "attrform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Settings file to use instead of the one in the user config directory
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered editor widgets and the control classes they claim
    Widgets,

    /// Print the resolved editor widget of every column in a project
    Inspect {
        /// Project file to load
        project: PathBuf,
    },

    /// Load a project and write it back, upgrading legacy settings
    Resave {
        /// Project file to load
        input: PathBuf,
        /// Where to write the result
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting attrform v{}", env!("CARGO_PKG_VERSION"));

    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load().unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {:#}", e);
            Settings::default()
        }),
    };

    let mut project = Project::new();
    let registry = build_registry(&mut project, &settings, None, Some(Rc::new(LogMessageBar)));

    match cli.command {
        Command::Widgets => {
            for widget in widget_catalog(&registry) {
                let classes: Vec<String> = widget
                    .classes
                    .iter()
                    .map(|(class, priority)| format!("{}:{}", class, priority))
                    .collect();
                println!("{:<20} {:<20} {}", widget.id, widget.name, classes.join(" "));
            }
        }
        Command::Inspect { project: path } => {
            read_project(&mut project, &path)?;
            for report in describe_project(&project, &registry) {
                let config = serde_json::to_string(&report.config)?;
                println!(
                    "{:<16} {:<20} {:<18} {:<8} {}",
                    report.layer_id,
                    report.column,
                    report.widget_type,
                    if report.explicit { "explicit" } else { "auto" },
                    config
                );
            }
        }
        Command::Resave { input, output } => {
            read_project(&mut project, &input)?;
            let xml = project.write_string()?;
            std::fs::write(&output, xml)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote {}", output.display());
        }
    }

    Ok(())
}

fn read_project(project: &mut Project, path: &Path) -> Result<()> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project {}", path.display()))?;
    project
        .read_str(&xml)
        .with_context(|| format!("Failed to load project {}", path.display()))?;
    Ok(())
}
