use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use devhub::Config;
use devhub::DeviceManager;
use devhub::LineSource;
use devhub::LoadReport;
use devhub::TextFile;
use devhub::format_load_errors;
use devhub::parse_line;
use tracing::warn;
use tracing_subscriber::prelude::*;

const DEFAULT_CONFIG: &str = "devhub.toml";

/// Manage a small collection of devices stored in a text file.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Path to the config file [default: devhub.toml, if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device file to use instead of the configured one
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Save changes even if some lines of the device file failed to load.
    /// Those lines are dropped from the saved file.
    #[arg(long, global = true)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all devices
    List {
        /// Print devices as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one device
    Show { id: String },
    /// Report lines of the device file that cannot be loaded
    Check,
    /// Add a device given as a data-file line, e.g. "P-3,Desk,false,Linux"
    Add { line: String },
    /// Replace a device with a data-file line of the same id and kind
    Edit { line: String },
    /// Remove a device
    Remove { id: String },
    /// Turn a device on
    On { id: String },
    /// Turn a device off
    Off { id: String },
    /// Set a smartwatch's battery level
    Battery { id: String, level: i64 },
}

impl Command {
    fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::List { .. } | Command::Show { .. } | Command::Check
        )
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(config.logging.targets())
        .init();

    let data_file = cli
        .data
        .clone()
        .unwrap_or_else(|| config.storage.data_file.clone());
    let output_file = match &cli.data {
        Some(data) => data.clone(),
        None => config.storage.output_file().to_path_buf(),
    };

    let mut source = TextFile::new(&data_file);
    let lines = source
        .read_lines()
        .with_context(|| format!("Failed to load devices from {}", data_file.display()))?;
    let (mut manager, report) = DeviceManager::from_lines(&lines);
    if cli.command.mutates() {
        ensure_safe_to_save(&report, cli.force)?;
    }

    match &cli.command {
        Command::List { json } => {
            if *json {
                println!("{}", serde_json::to_string_pretty(manager.devices())?);
            } else {
                for line in manager.list_all() {
                    println!("{line}");
                }
            }
        }
        Command::Show { id } => match manager.device(id) {
            Some(device) => println!("{device}"),
            None => bail!("No device with id '{id}'"),
        },
        Command::Check => {
            let filename = data_file.display().to_string();
            eprint!("{}", format_load_errors(&report, &lines, &filename));
            println!(
                "{} devices loaded, {} lines skipped",
                report.loaded,
                report.failures.len()
            );
            if !report.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Add { line } => {
            let device = parse_line(line, 0).context("Invalid device line")?;
            manager.add_device(device)?;
        }
        Command::Edit { line } => {
            let device = parse_line(line, 0).context("Invalid device line")?;
            manager.edit_device(device)?;
        }
        Command::Remove { id } => {
            manager.remove_device(id)?;
        }
        Command::On { id } => manager.turn_on_device(id)?,
        Command::Off { id } => manager.turn_off_device(id)?,
        Command::Battery { id, level } => manager.set_battery_level(id, *level)?,
    }

    for event in manager.drain_events() {
        println!("{event}");
    }

    if cli.command.mutates() {
        manager
            .save_all(&mut TextFile::new(&output_file))
            .with_context(|| format!("Failed to save devices to {}", output_file.display()))?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Saving rewrites the file from loaded devices only, losing skipped lines.
fn ensure_safe_to_save(report: &LoadReport, force: bool) -> anyhow::Result<()> {
    let skipped = report.failures.len();
    if skipped == 0 {
        return Ok(());
    }
    if !force {
        bail!(
            "{skipped} lines of the device file failed to load and would be lost on save; \
             run `devhub check` to see them or pass --force"
        );
    }
    warn!("Saving without {} lines that failed to load", skipped);
    Ok(())
}

/// An explicit config path must exist; the default one is optional.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::from_file(DEFAULT_CONFIG)
            .with_context(|| format!("Failed to load config {DEFAULT_CONFIG}")),
        None => Ok(Config::default()),
    }
}
