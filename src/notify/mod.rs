pub mod terminal;
pub mod notification;

pub use terminal::{ConsoleNotifier, NoopNotifier};
pub use notification::Notification;

use std::sync::Arc;
use async_trait::async_trait;
use crate::config::NotifyConfig;
use crate::errors::RemediationError;

/// Receives the outcome of a completed run. Delivery failures are reported
/// to the caller, which logs them without failing the run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), RemediationError>;

    fn channel_name(&self) -> &str;
}

pub fn create_notifier(config: &NotifyConfig) -> Arc<dyn Notifier> {
    if config.enabled {
        Arc::new(ConsoleNotifier::new())
    } else {
        Arc::new(NoopNotifier)
    }
}
