use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "qaagent",
    version,
    about = "Local code-quality analysis: collector orchestration, risk/coverage analyzers, and a read-only API over persisted runs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run collectors and analyzers against a target
    Analyze(AnalyzeArgs),
    /// Serve the read-only HTTP API
    Api(ApiArgs),
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub cmd: AnalyzeSub,
}

#[derive(Subcommand, Debug)]
pub enum AnalyzeSub {
    /// Create a run and execute every collector against a target directory
    Collectors(CollectorsArgs),
    /// Aggregate persisted findings/coverage/churn into per-component risks
    Risks(RunSelectorArgs),
    /// Derive recommendations from a run's risks and journey coverage
    Recommendations(RecommendationsArgs),
    /// List persisted runs, newest first
    ListRuns(ListRunsArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct CollectorsArgs {
    /// Directory to analyze; defaults to the current directory
    #[arg(default_value = ".")]
    pub target: PathBuf,

    /// Runs-root override (see QAAGENT_RUNS_DIR)
    #[arg(long)]
    pub runs_dir: Option<String>,

    /// Per-collector subprocess timeout, in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Probe tool presence only; do not invoke tools or write evidence
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunSelectorArgs {
    /// Run id; defaults to the most recently created run
    pub run_id: Option<String>,

    /// Runs-root override (see QAAGENT_RUNS_DIR)
    #[arg(long)]
    pub runs_dir: Option<String>,

    /// Risk-scoring config file (YAML); missing file uses defaults
    #[arg(long)]
    pub risk_config: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RecommendationsArgs {
    /// Run id; defaults to the most recently created run
    pub run_id: Option<String>,

    /// Runs-root override (see QAAGENT_RUNS_DIR)
    #[arg(long)]
    pub runs_dir: Option<String>,

    /// Risk-scoring config file (YAML); missing file uses defaults
    #[arg(long)]
    pub risk_config: Option<PathBuf>,

    /// Journey config file (YAML); missing file is an empty config
    #[arg(long)]
    pub journey_config: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListRunsArgs {
    /// Runs-root override (see QAAGENT_RUNS_DIR)
    #[arg(long)]
    pub runs_dir: Option<String>,

    /// Maximum number of runs to print
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ApiArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Runs-root override (see QAAGENT_RUNS_DIR)
    #[arg(long)]
    pub runs_dir: Option<String>,
}
