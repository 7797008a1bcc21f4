pub mod commands;
pub mod run;
pub mod serve;
pub mod deployments;
pub mod create;
pub mod check;

pub use commands::{Cli, Commands};

use std::sync::Arc;
use crate::client::HttpSessionClient;
use crate::config::RemediatorConfig;
use crate::errors::RemediationError;
use crate::flow::{FlowSettings, RemediationFlow};
use crate::{notify, source};

/// Wire the flow from config. The API token is resolved here, so a missing
/// token fails before any request is sent.
pub fn build_flow(config: &RemediatorConfig) -> Result<RemediationFlow, RemediationError> {
    let sessions = Arc::new(HttpSessionClient::from_config(&config.api)?);
    let source = source::create_source(&config.flow);
    let notifier = notify::create_notifier(&config.notify);
    Ok(RemediationFlow::new(
        source,
        sessions,
        notifier,
        FlowSettings::from(&config.flow),
    ))
}

pub(crate) fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}
