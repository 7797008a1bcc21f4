use chrono::Utc;
use crate::cli::commands::DeploymentsArgs;
use crate::config::RemediatorConfig;
use crate::errors::RemediationError;
use crate::reporting::formatter::format_deployments;
use crate::scheduler;

pub async fn handle_deployments(args: DeploymentsArgs, mut config: RemediatorConfig) -> Result<(), RemediationError> {
    if let Some(cron) = args.cron {
        config.schedule.cron = cron;
    }
    let registry = scheduler::default_registry(&config.schedule)?;
    print!("{}", format_deployments(&registry, Utc::now()));
    Ok(())
}
