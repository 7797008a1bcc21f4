use async_trait::async_trait;
use tracing::debug;
use crate::errors::RemediationError;
use crate::reporting::formatter::format_notification;
use super::notification::Notification;
use super::Notifier;

/// Prints the digest to stdout.
pub struct ConsoleNotifier {
    color: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self { color: ::console::colors_enabled() }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), RemediationError> {
        println!("{}", format_notification(notification, self.color));
        debug!(channel = self.channel_name(), "Notification printed");
        Ok(())
    }

    fn channel_name(&self) -> &str { "console" }
}

/// Used when notifications are disabled.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), RemediationError> {
        debug!("Notifications disabled, skipping");
        Ok(())
    }

    fn channel_name(&self) -> &str { "none" }
}
