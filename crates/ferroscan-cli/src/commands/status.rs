use std::time::Instant;

use ferroscan_core::{EnvelopeError, HealthState};

use crate::error::CliError;
use crate::output::Table;

use super::{elapsed_ms, CommandResult, Context};

pub async fn run(ctx: &Context) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let health = ctx.source.health().await;

    let mut table = Table::new("Source health", vec!["SOURCE", "STATE", "MESSAGE", "CHECKED AT"]);
    table.push(vec![
        health.source.to_string(),
        health.state.as_str().to_owned(),
        health.message.clone(),
        health.checked_at.to_string(),
    ]);

    let errors = match health.state {
        HealthState::Connected => Vec::new(),
        HealthState::Degraded => vec![EnvelopeError::new(
            "source.degraded",
            health.message.clone(),
        )?
        .with_retryable(true)],
        HealthState::Disconnected => vec![EnvelopeError::new(
            "source.unavailable",
            health.message.clone(),
        )?
        .with_retryable(true)],
    };

    Ok(CommandResult::ok(serde_json::to_value(&health)?)
        .with_table(table)
        .with_errors(errors)
        .with_latency(elapsed_ms(started)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ferroscan_core::{MockAdapter, ScannerConfig};

    use super::*;

    #[tokio::test]
    async fn mock_source_is_always_connected() {
        let ctx = Context {
            config: ScannerConfig::default(),
            source: Arc::new(MockAdapter::new()),
        };

        let result = run(&ctx).await.expect("status");

        assert_eq!(result.data["state"], "connected");
        assert_eq!(result.data["source"], "mock");
        assert!(result.errors.is_empty());
    }
}
