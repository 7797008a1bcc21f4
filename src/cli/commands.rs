use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "vuln-remediator", version, about = "Daily vulnerability scan that dispatches AI remediation sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scan flow once, right now
    Run(RunArgs),
    /// Serve the daily schedule until interrupted
    Serve(ServeArgs),
    /// List registered deployments and their next run
    Deployments(DeploymentsArgs),
    /// Create a single session from a prompt
    Create(CreateArgs),
    /// Show a session's status and structured output
    Check(CheckArgs),
}

#[derive(Args, Clone)]
pub struct RunArgs {
    /// JSON file of findings to use instead of the scanner
    #[arg(long)]
    pub findings: Option<String>,

    /// Print the run result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Cron expression for the daily deployment (overrides config)
    #[arg(long)]
    pub cron: Option<String>,

    /// Trigger the manual deployment once at startup
    #[arg(long)]
    pub run_now: bool,
}

#[derive(Args, Clone)]
pub struct DeploymentsArgs {
    /// Cron expression for the daily deployment (overrides config)
    #[arg(long)]
    pub cron: Option<String>,
}

#[derive(Args, Clone)]
pub struct CreateArgs {
    /// Prompt text, or @path to read it from a file
    #[arg(short, long)]
    pub prompt: String,

    /// Session title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Session tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Ask the API to reuse an identical existing session
    #[arg(long)]
    pub idempotent: bool,

    /// Wait for the session to report structured output
    #[arg(long)]
    pub wait: bool,

    /// Poll interval in seconds
    #[arg(long, default_value = "5")]
    pub interval: u64,

    /// Give up waiting after this many seconds
    #[arg(long, default_value = "1800")]
    pub timeout: u64,
}

#[derive(Args, Clone)]
pub struct CheckArgs {
    /// Session id or session URL
    pub session: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
