use std::time::Duration;
use crate::cli::commands::CreateArgs;
use crate::client::{CreateSessionRequest, HttpSessionClient, SessionApi};
use crate::config::RemediatorConfig;
use crate::errors::RemediationError;
use crate::poll::{self, PollOutcome, PollSettings};
use tracing::info;

pub async fn handle_create(args: CreateArgs, config: RemediatorConfig) -> Result<(), RemediationError> {
    let client = HttpSessionClient::from_config(&config.api)?;
    let prompt = read_prompt(&args.prompt).await?;

    let mut request = CreateSessionRequest::new(prompt).with_tags(args.tags.iter().cloned());
    if args.idempotent {
        request = request.with_idempotent(true);
    }
    if let Some(title) = &args.title {
        request = request.with_title(title.clone());
    }

    info!("Creating session");
    let handle = client.create_session(&request).await?;
    println!("Session: {}", handle.url);

    if !args.wait {
        return Ok(());
    }

    let settings = PollSettings {
        interval: Duration::from_secs(args.interval.max(1)),
        timeout: Duration::from_secs(args.timeout),
    };
    match poll::wait_for_structured_output(&client, &handle.id, settings).await? {
        PollOutcome::Ready { output, status } => {
            println!("Got structured output (status: {})", status);
            println!("{}", output.to_pretty());
        }
        PollOutcome::TimedOut => {
            println!("Timeout waiting for structured output");
        }
    }
    Ok(())
}

/// `@path` reads the prompt from a file; anything else is the prompt itself.
async fn read_prompt(arg: &str) -> Result<String, RemediationError> {
    let prompt = match arg.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => arg.to_string(),
    };
    if prompt.trim().is_empty() {
        return Err(RemediationError::Config("prompt must not be empty".into()));
    }
    Ok(prompt)
}
