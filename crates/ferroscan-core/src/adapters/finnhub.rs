use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data_source::{
    HealthState, HealthStatus, SnapshotBatch, SnapshotRequest, SnapshotSource, SourceError,
};
use crate::http_client::{HttpClient, HttpRequest};
use crate::throttling::{BudgetDenial, RequestBudget};
use crate::{ProviderId, Stock, Symbol, UtcDateTime};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_CALLS_PER_MINUTE: u32 = 60;

/// Quote, profile and candle: three upstream calls per ticker.
pub const CALLS_PER_TICKER: u32 = 3;
const HEALTH_PROBE_SYMBOL: &str = "AAPL";
const CANDLE_LOOKBACK_SECS: i64 = 86_400;

/// Finnhub REST adapter.
///
/// Each snapshot combines `/quote`, `/stock/profile2` and `/stock/candle`.
/// Finnhub has no top-gainers endpoint, so discovery requests are rejected.
#[derive(Clone)]
pub struct FinnhubAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    api_key: Option<String>,
    budget: RequestBudget,
}

impl FinnhubAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            budget: RequestBudget::per_minute(DEFAULT_CALLS_PER_MINUTE),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_calls_per_minute(mut self, calls_per_minute: u32) -> Self {
        self.budget = RequestBudget::per_minute(calls_per_minute);
        self
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key.as_deref().ok_or_else(|| {
            SourceError::unauthorized(
                "finnhub api key is not configured; set FERROSCAN_FINNHUB_API_KEY",
            )
        })
    }

    fn request(&self, path: &str, api_key: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base_url))
            .with_timeout_ms(5_000)
            .with_query("token", api_key)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, FetchError> {
        debug!(url = %request.redacted_url(), "finnhub request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| FetchError::Ticker(format!("transport error: {}", error.message())))?;

        match response.status {
            401 | 403 => {
                return Err(FetchError::Source(SourceError::unauthorized(format!(
                    "finnhub rejected the api key (status {})",
                    response.status
                ))))
            }
            429 => {
                return Err(FetchError::Source(SourceError::rate_limited(
                    "finnhub rate limit exceeded upstream",
                )))
            }
            _ if !response.is_success() => {
                return Err(FetchError::Ticker(format!(
                    "finnhub returned status {}",
                    response.status
                )))
            }
            _ => {}
        }

        serde_json::from_str(&response.body)
            .map_err(|error| FetchError::Ticker(format!("malformed finnhub payload: {error}")))
    }

    async fn fetch_snapshot(&self, ticker: &Symbol, api_key: &str) -> Result<Stock, FetchError> {
        let quote: QuotePayload = self
            .get_json(self.request("/quote", api_key).with_query("symbol", ticker.as_str()))
            .await?;
        let profile: ProfilePayload = self
            .get_json(
                self.request("/stock/profile2", api_key)
                    .with_query("symbol", ticker.as_str()),
            )
            .await?;

        let now = UtcDateTime::now();
        let to = now.into_inner().unix_timestamp();
        let candles: CandlePayload = self
            .get_json(
                self.request("/stock/candle", api_key)
                    .with_query("symbol", ticker.as_str())
                    .with_query("resolution", "1")
                    .with_query("from", (to - CANDLE_LOOKBACK_SECS).to_string())
                    .with_query("to", to.to_string()),
            )
            .await?;

        let price = sentinel(quote.c);
        if price <= 0.0 {
            return Err(FetchError::Ticker(String::from("no quote for ticker")));
        }

        let timestamp = match quote.t {
            Some(seconds) if seconds > 0 => UtcDateTime::from_unix_seconds(seconds).unwrap_or(now),
            _ => now,
        };
        let (volume, avg_volume) = candles.volume_profile();
        let last_hod = Some(sentinel(quote.h)).filter(|high| *high > 0.0);

        Stock::from_raw_volume(
            ticker.clone(),
            price,
            sentinel(quote.dp),
            None,
            volume,
            avg_volume,
            sentinel(profile.share_outstanding) / 1_000_000.0,
            0.0,
            last_hod,
            timestamp,
        )
        .map_err(|error| FetchError::Ticker(format!("invalid snapshot: {error}")))
    }

    async fn fetch_batch(&self, req: SnapshotRequest) -> Result<SnapshotBatch, SourceError> {
        if req.is_discovery() {
            return Err(SourceError::invalid_request(
                "finnhub cannot discover tickers; pass an explicit list",
            ));
        }
        let api_key = self.api_key()?;

        let mut batch = SnapshotBatch::default();
        let mut tickers = req.tickers.into_iter();
        while let Some(ticker) = tickers.next() {
            let wait = match self.budget.try_acquire_n(CALLS_PER_TICKER) {
                Ok(()) => None,
                Err(BudgetDenial::Exhausted(wait)) => Some(wait),
                Err(BudgetDenial::ExceedsLimit { requested, limit }) => {
                    return Err(SourceError::invalid_request(format!(
                        "finnhub budget of {limit} calls per minute cannot cover the \
                         {requested} calls one ticker needs"
                    )));
                }
            };
            if let Some(wait) = wait {
                let message = format!(
                    "finnhub call budget exhausted; retry in {:.2}s",
                    wait.as_secs_f64()
                );
                if batch.snapshots.is_empty() && batch.skipped.is_empty() {
                    return Err(SourceError::rate_limited(message));
                }
                warn!(ticker = %ticker, "{message}");
                batch.skip(ticker, message.clone());
                for rest in tickers.by_ref() {
                    batch.skip(rest, message.clone());
                }
                break;
            }

            match self.fetch_snapshot(&ticker, api_key).await {
                Ok(stock) => batch.snapshots.push(stock),
                Err(FetchError::Ticker(reason)) => {
                    warn!(ticker = %ticker, reason = %reason, source = "finnhub", "skipping ticker");
                    batch.skip(ticker, reason);
                }
                Err(FetchError::Source(error)) => return Err(error),
            }
        }

        Ok(batch)
    }
}

impl SnapshotSource for FinnhubAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Finnhub
    }

    fn snapshots<'a>(
        &'a self,
        req: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotBatch, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_batch(req))
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            let api_key = match self.api_key() {
                Ok(api_key) => api_key,
                Err(error) => {
                    return HealthStatus::new(
                        ProviderId::Finnhub,
                        HealthState::Disconnected,
                        error.message(),
                    )
                }
            };
            if self.budget.try_acquire().is_err() {
                return HealthStatus::new(
                    ProviderId::Finnhub,
                    HealthState::Degraded,
                    "call budget exhausted",
                );
            }

            let request = self
                .request("/quote", api_key)
                .with_query("symbol", HEALTH_PROBE_SYMBOL);
            match self.get_json::<QuotePayload>(request).await {
                Ok(quote) if sentinel(quote.c) > 0.0 => HealthStatus::new(
                    ProviderId::Finnhub,
                    HealthState::Connected,
                    "quote probe succeeded",
                ),
                Ok(_) => HealthStatus::new(
                    ProviderId::Finnhub,
                    HealthState::Degraded,
                    "quote probe returned no price",
                ),
                Err(FetchError::Source(error)) => HealthStatus::new(
                    ProviderId::Finnhub,
                    HealthState::Disconnected,
                    error.message(),
                ),
                Err(FetchError::Ticker(reason)) => {
                    HealthStatus::new(ProviderId::Finnhub, HealthState::Disconnected, reason)
                }
            }
        })
    }
}

/// Per-call failure: either only this ticker is lost, or the whole source is.
enum FetchError {
    Ticker(String),
    Source(SourceError),
}

/// Missing, null and non-finite numbers all read as the `0` sentinel.
fn sentinel(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    #[serde(default)]
    c: Option<f64>,
    #[serde(default)]
    dp: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    t: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ProfilePayload {
    #[serde(default, rename = "shareOutstanding")]
    share_outstanding: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CandlePayload {
    #[serde(default)]
    v: Option<Vec<f64>>,
}

impl CandlePayload {
    /// Last bucket as the current volume, mean of all buckets as the baseline.
    fn volume_profile(&self) -> (u64, u64) {
        let buckets = match self.v.as_deref() {
            Some(buckets) if !buckets.is_empty() => buckets,
            _ => return (0, 0),
        };

        let volume = buckets.last().copied().map(as_volume).unwrap_or(0);
        let mean = buckets.iter().copied().map(|v| sentinel(Some(v))).sum::<f64>()
            / buckets.len() as f64;
        (volume, as_volume(mean))
    }
}

fn as_volume(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_profile_uses_last_bucket_and_mean() {
        let candles: CandlePayload =
            serde_json::from_str(r#"{"s":"ok","v":[100.0, 200.0, 600.0]}"#).expect("payload");
        assert_eq!(candles.volume_profile(), (600, 300));

        let no_data: CandlePayload = serde_json::from_str(r#"{"s":"no_data"}"#).expect("payload");
        assert_eq!(no_data.volume_profile(), (0, 0));
    }

    #[test]
    fn null_quote_fields_read_as_zero() {
        let quote: QuotePayload =
            serde_json::from_str(r#"{"c":null,"dp":12.5,"h":3.1,"t":1710423000}"#).expect("quote");
        assert_eq!(sentinel(quote.c), 0.0);
        assert_eq!(sentinel(quote.dp), 12.5);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let adapter = FinnhubAdapter::new(
            Arc::new(crate::http_client::ReqwestHttpClient::new()),
            Some(String::from("  ")),
        );
        let error = adapter.api_key().expect_err("blank key");
        assert_eq!(error.code(), "source.unauthorized");
    }
}
