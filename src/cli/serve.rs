use chrono::Utc;
use tokio_util::sync::CancellationToken;
use crate::cli::commands::ServeArgs;
use crate::config::RemediatorConfig;
use crate::errors::RemediationError;
use crate::reporting::formatter::format_deployments;
use crate::scheduler::{self, Scheduler, TriggerHandle};
use super::{banner, build_flow};
use tracing::{info, warn};

pub async fn handle_serve(args: ServeArgs, mut config: RemediatorConfig) -> Result<(), RemediationError> {
    if let Some(cron) = args.cron {
        config.schedule.cron = cron;
    }
    let registry = scheduler::default_registry(&config.schedule)?;
    let flow = build_flow(&config)?;

    banner("SCHEDULED VULNERABILITY SCAN");
    print!("{}", format_deployments(&registry, Utc::now()));
    println!("Press Ctrl+C to stop the server");
    println!("{}\n", "=".repeat(60));

    let scheduler = Scheduler::new(registry);
    let triggers = scheduler.trigger_handle();
    if args.run_now {
        triggers.trigger(&config.schedule.manual_deployment_name)?;
    }

    let shutdown = CancellationToken::new();
    spawn_signal_listeners(shutdown.clone(), triggers, config.schedule.manual_deployment_name.clone());

    let stats = scheduler.serve(&flow, shutdown).await;
    info!(runs = stats.runs, succeeded = stats.succeeded, failed = stats.failed, "Server stopped");
    Ok(())
}

/// Ctrl+C stops the scheduler; on unix, SIGUSR1 triggers the manual deployment.
fn spawn_signal_listeners(shutdown: CancellationToken, triggers: TriggerHandle, manual: String) {
    let token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested, finishing any in-flight run");
            token.cancel();
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        let mut usr1 = match signal(SignalKind::user_defined1()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Could not install SIGUSR1 handler");
                return;
            }
        };
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = usr1.recv() => {
                    if received.is_none() {
                        break;
                    }
                    info!(deployment = %manual, "SIGUSR1 received, triggering manual run");
                    if triggers.trigger(&manual).is_err() {
                        break;
                    }
                }
            }
        }
    });

    #[cfg(not(unix))]
    {
        let _ = (shutdown, triggers, manual);
    }
}
