use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use crate::command::{Invocation, MaturinCommand, Selector, USAGE};
use crate::config::{BuildConfig, DEFAULT_CRATE_DIR, DEFAULT_DIST_DIR, DEFAULT_TOOL};
use crate::manifest::{self, CargoManifest, IncludeOutcome};
use crate::staging;

#[derive(Parser)]
#[command(name = "distbuild")]
#[command(about = "Prepares a maturin extension crate for packaging and builds its sdist or wheel")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Project root holding pyproject.toml and the crate directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Crate directory, relative to the root
    #[arg(long, default_value = DEFAULT_CRATE_DIR)]
    pub crate_dir: PathBuf,

    /// Output directory for built distributions, relative to the root
    #[arg(long, default_value = DEFAULT_DIST_DIR)]
    pub dist_dir: PathBuf,

    /// Packaging tool to invoke
    #[arg(long, default_value = DEFAULT_TOOL)]
    pub tool: String,

    /// Print the planned invocation as JSON without touching any files
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// `sdist` or `wheel`, then arguments forwarded verbatim to the packaging tool
    #[arg(value_name = "SELECTOR", trailing_var_arg = true, allow_hyphen_values = true)]
    pub argv: Vec<String>,
}

impl Cli {
    /// First positional token, before it is checked against the known selectors.
    pub fn selector(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Everything after the selector.
    pub fn passthrough(&self) -> Vec<String> {
        self.argv.iter().skip(1).cloned().collect()
    }
}

#[derive(Debug, Serialize)]
struct DryRunPlan {
    manifest: PathBuf,
    include_entry: String,
    include_outcome: IncludeOutcome,
    copy_from: PathBuf,
    copy_to: PathBuf,
    invocation: Invocation,
}

/// Parses the command line and returns the exit code for the process.
pub fn run_cli() -> Result<i32> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Failed to resolve project root: {}", cli.root.display()))?;

    let config = BuildConfig::new(root)
        .with_crate_dir(&cli.crate_dir)
        .with_dist_dir(&cli.dist_dir)
        .with_tool(cli.tool.as_str());

    log::debug!("{:?}", config);

    if cli.dry_run {
        dry_run_command(&config, cli.selector(), cli.passthrough())
    } else {
        package_command(&config, cli.selector(), cli.passthrough())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Syncs the manifest and pyproject.toml, then runs the packaging tool.
///
/// The selector is checked only after both files are synced, so a usage
/// error still leaves the crate directory prepared.
pub fn package_command(config: &BuildConfig, selector: Option<&str>, passthrough: Vec<String>) -> Result<i32> {
    manifest::sync_manifest(config).context("Failed to sync Cargo manifest")?;
    staging::sync_pyproject(config).context("Failed to stage pyproject.toml")?;

    let Some(selector) = parse_selector(selector) else {
        eprintln!("{}", USAGE);
        return Ok(1);
    };

    build_invocation(config, selector, passthrough).run()
}

fn dry_run_command(config: &BuildConfig, selector: Option<&str>, passthrough: Vec<String>) -> Result<i32> {
    let Some(selector) = parse_selector(selector) else {
        eprintln!("{}", USAGE);
        return Ok(1);
    };

    let mut manifest = CargoManifest::load(config.manifest_path())?;
    let include_outcome = manifest.ensure_include(config.required_include())?;

    let plan = DryRunPlan {
        manifest: config.manifest_path(),
        include_entry: config.required_include().to_string(),
        include_outcome,
        copy_from: config.pyproject_source(),
        copy_to: config.pyproject_target(),
        invocation: build_invocation(config, selector, passthrough).invocation(),
    };

    let plan_json = serde_json::to_string_pretty(&plan).context("Failed to serialize dry-run plan")?;
    println!("{}", plan_json);

    Ok(0)
}

fn parse_selector(selector: Option<&str>) -> Option<Selector> {
    selector.and_then(|s| s.parse().ok())
}

fn build_invocation(config: &BuildConfig, selector: Selector, passthrough: Vec<String>) -> MaturinCommand {
    MaturinCommand::new(config.tool(), selector)
        .out_dir(config.dist_dir())
        .passthrough(passthrough)
        .current_dir(config.crate_dir())
}
