use std::path::PathBuf;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vuln_remediator::cli::{self, Commands};
use vuln_remediator::config;
use vuln_remediator::errors::RemediationError;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
            .init();
    }
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let result = run(cli).await;

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                RemediationError::Config(_) => 2,
                e if e.is_transport() => 3,
                RemediationError::Flow(_) => 4,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: cli::Cli) -> Result<(), RemediationError> {
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let config = config::load_config(config_path.as_deref()).await?;

    match cli.command {
        Commands::Run(args) => cli::run::handle_run(args, config).await,
        Commands::Serve(args) => cli::serve::handle_serve(args, config).await,
        Commands::Deployments(args) => cli::deployments::handle_deployments(args, config).await,
        Commands::Create(args) => cli::create::handle_create(args, config).await,
        Commands::Check(args) => cli::check::handle_check(args, config).await,
    }
}
