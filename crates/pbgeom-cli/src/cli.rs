use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "pbgeom developers",
    version,
    about = "pbgeom CLI - Assemble and validate periodic systems of rigid, coarse-grained charged molecules.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a system from a TOML description and write its charges and CG spheres.
    Assemble(AssembleArgs),
    /// Build a system and report whether it is free of overlaps.
    Check(CheckArgs),
}

/// Arguments shared by every command that builds a system.
#[derive(Args, Debug, Clone)]
pub struct SetupArgs {
    /// Path to the system description in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Seed for the CG sphere search. A random seed is drawn and logged if omitted.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub overrides: SetupOverrides,
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct SetupOverrides {
    /// Override `box.length`.
    #[arg(long, value_name = "FLOAT")]
    pub box_length: Option<f64>,

    /// Override `box.cutoff`.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Override `search.surface-tolerance`.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Override `search.n-trials`.
    #[arg(long, value_name = "INT")]
    pub n_trials: Option<usize>,

    /// Override `search.max-trials`.
    #[arg(long, value_name = "INT")]
    pub max_trials: Option<usize>,

    /// Override `search.beta`.
    #[arg(long, value_name = "FLOAT")]
    pub beta: Option<f64>,
}

/// Arguments for the `assemble` subcommand.
#[derive(Args, Debug)]
pub struct AssembleArgs {
    #[command(flatten)]
    pub setup: SetupArgs,

    /// Write one CSV row per placed charge to this path.
    #[arg(short, long, value_name = "PATH")]
    pub atoms: Option<PathBuf>,

    /// Write one CSV row per CG sphere to this path.
    #[arg(short, long, value_name = "PATH")]
    pub spheres: Option<PathBuf>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub setup: SetupArgs,
}
