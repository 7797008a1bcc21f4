pub mod schedule;
pub mod deployment;
pub mod serve;

pub use schedule::CronSchedule;
pub use deployment::{Deployment, DeploymentRegistry};
pub use serve::{run_once, FlowRunner, Scheduler, ServeStats, TriggerHandle};

use crate::config::ScheduleConfig;
use crate::errors::RemediationError;

/// The two standard deployments: the daily cron run and an unscheduled one
/// for on-demand triggering.
pub fn default_registry(config: &ScheduleConfig) -> Result<DeploymentRegistry, RemediationError> {
    let schedule = CronSchedule::parse(&config.cron)?.with_timezone(config.timezone);
    let mut registry = DeploymentRegistry::new();
    registry.register(
        Deployment::scheduled(&config.deployment_name, schedule)
            .with_description(format!("Runs the vulnerability scan on cron '{}'", config.cron))
            .with_tags(["checkmarx", "daily", "automated"]),
    )?;
    registry.register(
        Deployment::manual(&config.manual_deployment_name)
            .with_description("Unscheduled deployment for manual test runs")
            .with_tags(["test"]),
    )?;
    Ok(registry)
}
