//! CLI entry point for bms-cockpit-randomizer
//!
//! Provides the watcher plus commands for checking, listing and
//! reconciling a key file by hand.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use bms_cockpit_randomizer::{
    config::{KeyFileManager, ReconcileOutcome, Reconciler},
    core::{keyspace::scancode_label, KeyFile, LineKind, RequiredActionSet},
    input::{InjectorMode, KeyboardInjector, Randomizer},
    logging,
    session::SessionDriver,
    telemetry::SharedMemorySource,
};

#[derive(Parser)]
#[command(name = "bms-cockpit-randomizer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a ramp start and randomize the cockpit
    Watch {
        /// Key file to reconcile before BMS reports one
        #[arg(short, long)]
        keyfile: Option<PathBuf>,

        /// Log key presses instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Seconds between telemetry polls
        #[arg(short, long, default_value_t = 2)]
        interval: u64,
    },

    /// Report unbound required callbacks and keys bound twice
    Check {
        /// Path to the BMS key file
        #[arg(short, long)]
        keyfile: PathBuf,
    },

    /// List all assigned bindings
    List {
        /// Path to the BMS key file
        #[arg(short, long)]
        keyfile: PathBuf,
    },

    /// Bind every required callback, backing the key file up first
    Reconcile {
        /// Path to the BMS key file
        #[arg(short, long)]
        keyfile: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Watch {
            keyfile,
            dry_run,
            interval,
        } => watch(keyfile.as_deref(), dry_run, interval)?,
        Commands::Check { keyfile } => check_key_file(&keyfile)?,
        Commands::List { keyfile } => list_bindings(&keyfile)?,
        Commands::Reconcile { keyfile } => reconcile_key_file(&keyfile)?,
    }

    Ok(())
}

/// Expand tilde in path
fn expand(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

fn load(path: &Path) -> anyhow::Result<(PathBuf, KeyFile)> {
    let path = expand(path)?;
    let manager = KeyFileManager::new(path.clone())?;
    let key_file = manager
        .load()
        .with_context(|| format!("Key file could not be read: {}", path.display()))?;
    Ok((path, key_file))
}

/// Run the polling loop
fn watch(keyfile: Option<&Path>, dry_run: bool, interval: u64) -> anyhow::Result<()> {
    let mode = if dry_run {
        InjectorMode::DryRun
    } else {
        InjectorMode::Live
    };
    if mode == InjectorMode::Live && cfg!(not(windows)) {
        warn!("Key injection needs Windows; randomization will fail. Use --dry-run to test");
    }

    let randomizer = Randomizer::new(KeyboardInjector::new(mode), RequiredActionSet::STANDARD);
    let mut driver = SessionDriver::new(SharedMemorySource, randomizer, Reconciler::default())
        .interval(Duration::from_secs(interval));

    if let Some(path) = keyfile {
        driver.load_key_file(&expand(path)?)?;
    }

    driver.run()?;
    Ok(())
}

/// Check a key file for unbound required callbacks and shared keys
fn check_key_file(path: &Path) -> anyhow::Result<()> {
    let (path, key_file) = load(path)?;
    let required = RequiredActionSet::STANDARD;

    let usage = key_file.usage();

    println!("{} Parsing key file: {}", "→".cyan(), path.display());
    println!(
        "{} Found {} bindings ({} assigned)\n",
        "✓".green(),
        key_file.bindings().count(),
        usage.total_bindings()
    );

    let malformed: Vec<_> = key_file.malformed().collect();
    if !malformed.is_empty() {
        println!(
            "{} Skipped {} unreadable line{}:",
            "⚠".yellow(),
            malformed.len(),
            if malformed.len() == 1 { "" } else { "s" }
        );
        for line in malformed {
            if let LineKind::Malformed(reason) = &line.kind {
                println!("  {} {}", format!("line {}:", line.number).dimmed(), reason);
            }
        }
        println!();
    }

    let conflicts = usage.find_conflicts();
    for conflict in &conflicts {
        println!(
            "{} {}",
            "Shared key".yellow().bold(),
            format!("{}", conflict.key_code).cyan()
        );
        for (idx, binding) in conflict.conflicting_bindings.iter().enumerate() {
            println!("  {} {}", format!("{}.", idx + 1).dimmed(), binding.action);
        }
        println!();
    }

    let missing = key_file.missing_actions(&required);
    if missing.is_empty() {
        println!(
            "{} {}",
            "✓".green().bold(),
            format!("All {} required callbacks are bound!", required.len()).bold()
        );
        return Ok(());
    }

    println!(
        "{} {} of {} required callback{} unbound:\n",
        "✗".red().bold(),
        missing.len(),
        required.len(),
        if missing.len() == 1 { " is" } else { "s are" }
    );
    for action in &missing {
        println!("  {}", action.magenta());
    }
    println!(
        "\n{}",
        "Run `reconcile` or start `watch` to bind them automatically.".yellow()
    );
    std::process::exit(1);
}

/// List all assigned bindings in the key file
fn list_bindings(path: &Path) -> anyhow::Result<()> {
    let (path, key_file) = load(path)?;
    let required = RequiredActionSet::STANDARD;

    println!("{}", format!("Bindings from: {}\n", path.display()).bold());

    let mut total = 0;
    for binding in key_file.bindings() {
        let Some(key_code) = binding.key_code() else {
            continue;
        };
        total += 1;

        let key = match scancode_label(key_code.scancode) {
            Some(label) => format!("{} ({})", key_code, label),
            None => key_code.to_string(),
        };
        let action = if required.contains(&binding.action) {
            binding.action.green()
        } else {
            binding.action.normal()
        };

        println!("{} → {}", key.cyan().bold(), action);
    }

    println!("\n{} {} assigned bindings", "Total:".bold(), total);
    Ok(())
}

/// Run one reconciliation pass
fn reconcile_key_file(path: &Path) -> anyhow::Result<()> {
    let path = expand(path)?;
    let manager = KeyFileManager::new(path.clone())?;

    println!("{} Reconciling key file: {}", "→".cyan(), path.display());

    match Reconciler::default().reconcile(&manager)? {
        ReconcileOutcome::AlreadyComplete => {
            println!("{} {}", "✓".green().bold(), "Nothing to do, all callbacks bound".bold());
        }
        ReconcileOutcome::Updated {
            assignments,
            backup,
        } => {
            for assignment in &assignments {
                println!("  {} {}", "+".green(), assignment);
            }
            println!(
                "\n{} Bound {} callback{}, backup at {}",
                "✓".green().bold(),
                assignments.len(),
                if assignments.len() == 1 { "" } else { "s" },
                backup.display()
            );
        }
    }

    Ok(())
}
