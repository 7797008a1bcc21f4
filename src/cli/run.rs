use std::path::PathBuf;
use crate::cli::commands::RunArgs;
use crate::config::RemediatorConfig;
use crate::errors::RemediationError;
use crate::reporting::formatter::format_run_result;
use crate::scheduler;
use super::{banner, build_flow};

pub async fn handle_run(args: RunArgs, mut config: RemediatorConfig) -> Result<(), RemediationError> {
    if let Some(path) = &args.findings {
        config.flow.findings_file = Some(PathBuf::from(path));
    }
    let flow = build_flow(&config)?;

    if !args.json {
        banner("RUNNING VULNERABILITY SCAN MANUALLY");
        println!("This is a manual run of the daily scheduled flow.");
        println!("When served, it runs on cron '{}'.\n", config.schedule.cron);
    }

    let outcome = scheduler::run_once(&flow).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    banner("MANUAL RUN COMPLETE");
    print!("{}", format_run_result(&outcome));
    println!("\nTo run on the daily schedule:");
    println!("   vuln-remediator serve");
    println!("Keep the process running to maintain the schedule.");
    println!("{}", "=".repeat(60));
    Ok(())
}
