use clap::{Args, Parser, Subcommand};
use gaudiview::engine::config::MultiStructureReduction;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "GaudiView Developers",
    version,
    about = "GaudiView CLI - Inspect, filter and structurally cluster the solutions of a GAUDI multi-objective optimization run.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Where configuration comes from, shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S clustering.rmsd-cutoff=1.0
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the objectives, row count and cluster summary of a results file.
    Info(InfoArgs),
    /// Sort the solutions by a column and write the result.
    Sort(SortArgs),
    /// Keep only the solutions matching a filter expression.
    Filter(FilterArgs),
    /// Cluster the solutions by structural similarity (RMSD).
    Cluster(ClusterArgs),
    /// Merge several results files that share the same objectives.
    Merge(MergeArgs),
    /// Export a results file as CSV.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the GAUDI results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct SortArgs {
    /// Path to the GAUDI results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the sorted results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Column to sort by: an objective name, 'Filename' or 'Cluster'.
    #[arg(long, required = true, value_name = "COLUMN")]
    pub by: String,

    /// Sort from largest to smallest.
    #[arg(long)]
    pub descending: bool,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Path to the GAUDI results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the filtered results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Filter expression, e.g. "Score > -6 and Energy < 11 or Score <= -7".
    #[arg(short = 'w', long = "where", required = true, value_name = "EXPR")]
    pub expression: String,

    /// Treat values within this distance of the threshold as equal for '=' and '≠'.
    #[arg(long, value_name = "EPS")]
    pub tolerance: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Path to the GAUDI results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the clustered results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Objective that orders the solutions. Defaults to the first objective.
    #[arg(long, value_name = "NAME")]
    pub objective: Option<String>,

    #[command(flatten)]
    pub direction: DirectionFlags,

    /// RMSD cutoff below which a solution joins a cluster.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// How per-structure RMSDs combine for multi-structure solutions.
    #[arg(long, value_name = "last|max|mean")]
    pub reduction: Option<MultiStructureReduction>,
}

/// A group to handle the mutually exclusive optimization direction flags.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct DirectionFlags {
    /// Higher objective values are better.
    #[arg(long)]
    pub maximize: bool,
    /// Lower objective values are better.
    #[arg(long)]
    pub minimize: bool,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Results files to merge, in order. The first one provides the preamble.
    #[arg(short, long = "input", required = true, num_args = 1.., value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Path for the merged results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the GAUDI results file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the CSV file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
