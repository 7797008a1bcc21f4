use crate::cli::commands::CheckArgs;
use crate::client::HttpSessionClient;
use crate::config::RemediatorConfig;
use crate::errors::RemediationError;
use crate::poll;
use crate::reporting::formatter::format_session_report;

pub async fn handle_check(args: CheckArgs, config: RemediatorConfig) -> Result<(), RemediationError> {
    let client = HttpSessionClient::from_config(&config.api)?;
    let report = poll::check_structured_output(&client, &args.session).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_session_report(&report));
    }
    Ok(())
}
