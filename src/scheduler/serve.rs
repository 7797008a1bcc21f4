use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};
use crate::errors::RemediationError;
use crate::flow::RemediationFlow;
use crate::models::FlowOutcome;
use super::deployment::DeploymentRegistry;

/// Something the scheduler can fire.
#[async_trait]
pub trait FlowRunner: Send + Sync {
    async fn run_flow(&self) -> Result<FlowOutcome, RemediationError>;
}

#[async_trait]
impl FlowRunner for RemediationFlow {
    async fn run_flow(&self) -> Result<FlowOutcome, RemediationError> {
        self.run().await
    }
}

/// Counters reported when `serve` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    pub runs: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Queues on-demand runs of a registered deployment.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl TriggerHandle {
    pub fn trigger(&self, deployment: &str) -> Result<(), RemediationError> {
        self.tx
            .send(deployment.to_string())
            .map_err(|_| RemediationError::Schedule("scheduler is no longer running".into()))
    }
}

pub struct Scheduler {
    registry: DeploymentRegistry,
    trigger_tx: mpsc::UnboundedSender<String>,
    trigger_rx: mpsc::UnboundedReceiver<String>,
}

impl Scheduler {
    pub fn new(registry: DeploymentRegistry) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        Self { registry, trigger_tx, trigger_rx }
    }

    pub fn trigger_handle(&self) -> TriggerHandle {
        TriggerHandle { tx: self.trigger_tx.clone() }
    }

    /// Fire `runner` for every scheduled tick and manual trigger until
    /// `shutdown` is cancelled. A failed run is logged and serving continues.
    /// Cancellation is only observed between runs, so a run in progress
    /// always finishes.
    pub async fn serve<R: FlowRunner + ?Sized>(mut self, runner: &R, shutdown: CancellationToken) -> ServeStats {
        let mut stats = ServeStats::default();
        info!(deployments = self.registry.len(), "Scheduler started");
        let mut last_fired: Option<DateTime<Utc>> = None;

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let now = Utc::now();
            let next = self
                .registry
                .next_fire(fire_floor(now, last_fired))
                .map(|(d, at)| (d.name.clone(), at));
            if let Some((name, at)) = &next {
                info!(deployment = %name, next_run = %at.to_rfc3339(), "Waiting for next scheduled run");
            }
            let wait = next
                .as_ref()
                .map(|(_, at)| (*at - now).to_std().unwrap_or(Duration::ZERO));

            let fired = tokio::select! {
                _ = shutdown.cancelled() => break,
                requested = self.trigger_rx.recv() => match requested {
                    Some(name) if self.registry.get(&name).is_some() => Some(name),
                    Some(name) => {
                        warn!(deployment = %name, "Ignoring trigger for unknown deployment");
                        None
                    }
                    None => None,
                },
                _ = sleep_or_forever(wait) => next.map(|(name, at)| {
                    last_fired = Some(at);
                    name
                }),
            };

            if let Some(name) = fired {
                stats.runs += 1;
                let span = info_span!("deployment", deployment = %name);
                match runner.run_flow().instrument(span).await {
                    Ok(outcome) => {
                        stats.succeeded += 1;
                        info!(deployment = %name, sessions_created = outcome.sessions_created(), "Scheduled run finished");
                    }
                    Err(e) => {
                        stats.failed += 1;
                        error!(deployment = %name, error = %e, "Scheduled run failed; waiting for next trigger");
                    }
                }
            }
        }

        info!(runs = stats.runs, failed = stats.failed, "Scheduler stopped");
        stats
    }
}

/// Lower bound for the next scheduled fire. An instant that already fired is
/// never scheduled again, even after the wall clock steps backwards.
fn fire_floor(now: DateTime<Utc>, last_fired: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last_fired {
        Some(fired) if fired > now => fired,
        _ => now,
    }
}

async fn sleep_or_forever(wait: Option<Duration>) {
    match wait {
        Some(d) => tokio::time::sleep(d).await,
        None => futures::future::pending::<()>().await,
    }
}

/// Run the flow a single time outside any schedule.
pub async fn run_once<R: FlowRunner + ?Sized>(runner: &R) -> Result<FlowOutcome, RemediationError> {
    let span = info_span!("deployment", deployment = "manual");
    let outcome = runner.run_flow().instrument(span).await;
    match &outcome {
        Ok(o) => info!(sessions_created = o.sessions_created(), "Manual run finished"),
        Err(e) => error!(error = %e, "Manual run failed"),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleTimezone;
    use crate::scheduler::{CronSchedule, Deployment};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fails the runs listed in `fail_on` (1-based) and cancels `shutdown`
    /// after `stop_after` runs.
    struct ScriptedRunner {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
        stop_after: usize,
        shutdown: CancellationToken,
    }

    #[async_trait]
    impl FlowRunner for ScriptedRunner {
        async fn run_flow(&self) -> Result<FlowOutcome, RemediationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.stop_after {
                self.shutdown.cancel();
            }
            if self.fail_on.contains(&n) {
                Err(RemediationError::Flow("fix session failed".into()))
            } else {
                Ok(FlowOutcome::NoVulnerabilities)
            }
        }
    }

    fn manual_registry() -> DeploymentRegistry {
        let mut registry = DeploymentRegistry::new();
        registry.register(Deployment::manual("test-immediate")).unwrap();
        registry
    }

    #[tokio::test]
    async fn test_failed_run_does_not_stop_serving() {
        let shutdown = CancellationToken::new();
        let runner = ScriptedRunner {
            calls: AtomicUsize::new(0),
            fail_on: vec![1],
            stop_after: 2,
            shutdown: shutdown.clone(),
        };
        let scheduler = Scheduler::new(manual_registry());
        let handle = scheduler.trigger_handle();
        handle.trigger("test-immediate").unwrap();
        handle.trigger("test-immediate").unwrap();

        let stats = scheduler.serve(&runner, shutdown).await;
        assert_eq!(stats, ServeStats { runs: 2, succeeded: 1, failed: 1 });
    }

    #[tokio::test]
    async fn test_unknown_trigger_ignored() {
        let shutdown = CancellationToken::new();
        let runner = ScriptedRunner {
            calls: AtomicUsize::new(0),
            fail_on: vec![],
            stop_after: 1,
            shutdown: shutdown.clone(),
        };
        let scheduler = Scheduler::new(manual_registry());
        let handle = scheduler.trigger_handle();
        handle.trigger("nope").unwrap();
        handle.trigger("test-immediate").unwrap();

        let stats = scheduler.serve(&runner, shutdown).await;
        assert_eq!(stats.runs, 1);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let runner = ScriptedRunner {
            calls: AtomicUsize::new(0),
            fail_on: vec![],
            stop_after: 1,
            shutdown: shutdown.clone(),
        };
        let scheduler = Scheduler::new(manual_registry());
        scheduler.trigger_handle().trigger("test-immediate").unwrap();

        let stats = scheduler.serve(&runner, shutdown).await;
        assert_eq!(stats.runs, 0);
    }

    struct SlowRunner {
        shutdown: CancellationToken,
        finished: AtomicBool,
    }

    #[async_trait]
    impl FlowRunner for SlowRunner {
        async fn run_flow(&self) -> Result<FlowOutcome, RemediationError> {
            self.shutdown.cancel();
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(FlowOutcome::NoVulnerabilities)
        }
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_in_flight_run() {
        let shutdown = CancellationToken::new();
        let runner = Arc::new(SlowRunner { shutdown: shutdown.clone(), finished: AtomicBool::new(false) });
        let scheduler = Scheduler::new(manual_registry());
        scheduler.trigger_handle().trigger("test-immediate").unwrap();

        let stats = scheduler.serve(runner.as_ref(), shutdown).await;
        assert_eq!(stats.succeeded, 1);
        assert!(runner.finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cron_tick_fires_flow() {
        let shutdown = CancellationToken::new();
        let runner = ScriptedRunner {
            calls: AtomicUsize::new(0),
            fail_on: vec![],
            stop_after: 1,
            shutdown: shutdown.clone(),
        };
        let every_second = CronSchedule::parse("* * * * * *").unwrap().with_timezone(ScheduleTimezone::Utc);
        let mut registry = DeploymentRegistry::new();
        registry.register(Deployment::scheduled("every-second", every_second)).unwrap();

        let stats = tokio::time::timeout(
            Duration::from_secs(5),
            Scheduler::new(registry).serve(&runner, shutdown),
        )
        .await
        .expect("scheduled run did not fire");
        assert_eq!(stats.runs, 1);
    }

    #[test]
    fn test_fire_floor_never_goes_back_past_last_fire() {
        use chrono::TimeZone;
        let fired = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let stepped_back = Utc.with_ymd_and_hms(2026, 10, 19, 7, 59, 30).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();

        assert_eq!(fire_floor(stepped_back, None), stepped_back);
        assert_eq!(fire_floor(stepped_back, Some(fired)), fired);
        assert_eq!(fire_floor(later, Some(fired)), later);

        let daily = CronSchedule::parse("0 8 * * *").unwrap().with_timezone(ScheduleTimezone::Utc);
        let mut registry = DeploymentRegistry::new();
        registry.register(Deployment::scheduled("daily", daily)).unwrap();
        let (_, next) = registry.next_fire(fire_floor(stepped_back, Some(fired))).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 20, 8, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_run_once_propagates_failure() {
        let runner = ScriptedRunner {
            calls: AtomicUsize::new(0),
            fail_on: vec![1],
            stop_after: 99,
            shutdown: CancellationToken::new(),
        };
        assert!(matches!(run_once(&runner).await, Err(RemediationError::Flow(_))));
    }
}
