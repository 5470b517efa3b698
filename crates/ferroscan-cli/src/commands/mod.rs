mod analyze;
mod criteria;
mod monitor;
mod scan;
mod status;

use std::sync::Arc;

use ferroscan_core::{
    Envelope, EnvelopeError, EnvelopeMeta, FinnhubAdapter, HttpClient, IbkrGatewayAdapter,
    MockAdapter, ProviderId, ReqwestHttpClient, ScannerConfig, SkippedTicker, SnapshotRequest,
    SnapshotSource, Symbol,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command, SourceSelector, TickerArgs};
use crate::error::CliError;
use crate::output::{Document, Table};

pub struct CommandResult {
    pub data: Value,
    pub tables: Vec<Table>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            tables: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Wraps the result in an envelope attributed to `source`.
    pub fn into_document(self, source: ProviderId) -> Result<Document, CliError> {
        let CommandResult {
            data,
            tables,
            warnings,
            errors,
            latency_ms,
        } = self;

        let mut meta = EnvelopeMeta::new(source, latency_ms);
        for warning in warnings {
            meta.push_warning(warning);
        }

        Ok(Document {
            envelope: Envelope::with_errors(meta, data, errors)?,
            tables,
        })
    }
}

/// Loaded configuration plus the snapshot source selected on the command line.
pub struct Context {
    pub config: ScannerConfig,
    pub source: Arc<dyn SnapshotSource>,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let config = ScannerConfig::load(cli.config.as_deref())?;
        let source = build_source(cli.source, &config);
        Ok(Self { config, source })
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }
}

pub fn build_source(selector: SourceSelector, config: &ScannerConfig) -> Arc<dyn SnapshotSource> {
    debug!(source = %selector.provider_id(), "snapshot source selected");
    match selector {
        SourceSelector::Mock => Arc::new(MockAdapter::new()),
        SourceSelector::Finnhub => {
            let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
            Arc::new(
                FinnhubAdapter::new(http_client, config.finnhub.api_key.clone())
                    .with_base_url(config.finnhub.base_url.as_str())
                    .with_calls_per_minute(config.finnhub.calls_per_minute),
            )
        }
        SourceSelector::Ibkr => {
            let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
            Arc::new(
                IbkrGatewayAdapter::new(http_client)
                    .with_gateway_url(config.ibkr.gateway_url.as_str()),
            )
        }
    }
}

/// Runs the selected command, handing every produced document to `emit`.
///
/// `monitor` emits once per cycle, every other command exactly once.
pub async fn run(
    cli: &Cli,
    ctx: &Context,
    emit: &mut dyn FnMut(Document) -> Result<(), CliError>,
) -> Result<(), CliError> {
    let source = ctx.source_id();
    let result = match &cli.command {
        Command::Scan(args) => scan::run(args, ctx).await?,
        Command::Analyze(args) => analyze::run(args, ctx).await?,
        Command::Criteria(args) => criteria::run(args, ctx)?,
        Command::Status => status::run(ctx).await?,
        Command::Monitor(args) => return monitor::run(args, ctx, emit).await,
    };

    emit(result.into_document(source)?)
}

/// Explicit tickers, else the configured watchlist. Empty means "let the
/// source discover candidates".
pub fn resolve_tickers(args: &TickerArgs, config: &ScannerConfig) -> Result<Vec<Symbol>, CliError> {
    if args.tickers.is_empty() {
        return Ok(config.monitor.tickers.clone());
    }
    Ok(Symbol::parse_list(&args.tickers)?)
}

pub fn snapshot_request(tickers: Vec<Symbol>) -> SnapshotRequest {
    SnapshotRequest::new(tickers).unwrap_or_else(|_| SnapshotRequest::discover())
}

pub fn skipped_warnings(skipped: &[SkippedTicker]) -> Vec<String> {
    skipped
        .iter()
        .map(|skipped| format!("{} skipped: {}", skipped.ticker, skipped.reason))
        .collect()
}

fn elapsed_ms(started: std::time::Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
