use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::data_source::{
    HealthState, HealthStatus, SnapshotBatch, SnapshotRequest, SnapshotSource, SourceError,
};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{ProviderId, Stock, Symbol, UtcDateTime};

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:5000";

/// Interactive Brokers adapter, talking to a local gateway bridge that exposes
/// `/api/ib/quote/{ticker}`, `/api/ib/top-gainers` and `/api/ib/health`.
///
/// The bridge only reports price and volume, so average volume, relative
/// volume, float and seven-day change come back as `0` sentinels.
#[derive(Clone)]
pub struct IbkrGatewayAdapter {
    http_client: Arc<dyn HttpClient>,
    gateway_url: String,
}

impl IbkrGatewayAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            gateway_url: String::from(DEFAULT_GATEWAY_URL),
        }
    }

    pub fn with_gateway_url(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = gateway_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    fn endpoint(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}/api/ib{path}", self.gateway_url)).with_timeout_ms(5_000)
    }

    async fn fetch_quote(&self, ticker: &Symbol) -> Result<Stock, String> {
        let request = self.endpoint(&format!("/quote/{}", urlencoding::encode(ticker.as_str())));
        debug!(url = %request.url, "ibkr gateway request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| format!("gateway transport error: {}", error.message()))?;
        if !response.is_success() {
            return Err(format!("gateway returned status {}", response.status));
        }

        let quote: GatewayQuote = serde_json::from_str(&response.body)
            .map_err(|error| format!("malformed gateway payload: {error}"))?;
        quote.into_stock(Some(ticker))
    }

    async fn fetch_top_gainers(&self) -> Result<SnapshotBatch, SourceError> {
        let response = self
            .http_client
            .execute(self.endpoint("/top-gainers"))
            .await
            .map_err(|error| {
                SourceError::unavailable(format!(
                    "ibkr gateway unreachable: {}",
                    error.message()
                ))
            })?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "ibkr top-gainers returned status {}",
                response.status
            )));
        }

        let gainers: Vec<GatewayQuote> = serde_json::from_str(&response.body).map_err(|error| {
            SourceError::internal(format!("failed to parse ibkr top-gainers: {error}"))
        })?;

        let mut batch = SnapshotBatch::default();
        for quote in gainers {
            let symbol = quote.symbol.clone();
            match Symbol::parse(&symbol) {
                Ok(ticker) => match quote.into_stock(None) {
                    Ok(stock) => batch.snapshots.push(stock),
                    Err(reason) => {
                        warn!(ticker = %ticker, reason = %reason, source = "ibkr", "skipping ticker");
                        batch.skip(ticker, reason);
                    }
                },
                Err(error) => {
                    warn!(symbol = %symbol, error = %error, source = "ibkr", "dropping gainer with invalid symbol");
                }
            }
        }
        Ok(batch)
    }

    async fn fetch_batch(&self, req: SnapshotRequest) -> Result<SnapshotBatch, SourceError> {
        if req.is_discovery() {
            return self.fetch_top_gainers().await;
        }

        let mut batch = SnapshotBatch::default();
        for ticker in req.tickers {
            match self.fetch_quote(&ticker).await {
                Ok(stock) => batch.snapshots.push(stock),
                Err(reason) => {
                    warn!(ticker = %ticker, reason = %reason, source = "ibkr", "skipping ticker");
                    batch.skip(ticker, reason);
                }
            }
        }
        Ok(batch)
    }
}

impl SnapshotSource for IbkrGatewayAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Ibkr
    }

    fn snapshots<'a>(
        &'a self,
        req: SnapshotRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SnapshotBatch, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_batch(req))
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            match self.http_client.execute(self.endpoint("/health")).await {
                Ok(response) if response.is_success() => HealthStatus::new(
                    ProviderId::Ibkr,
                    HealthState::Connected,
                    "connected to ib gateway",
                ),
                Ok(response) => HealthStatus::new(
                    ProviderId::Ibkr,
                    HealthState::Degraded,
                    format!("ib gateway not responding (status {})", response.status),
                ),
                Err(error) => HealthStatus::new(
                    ProviderId::Ibkr,
                    HealthState::Disconnected,
                    format!("connection error: {}", error.message()),
                ),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayQuote {
    symbol: String,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    change_percent: Option<f64>,
    /// Unix milliseconds.
    #[serde(default)]
    timestamp: Option<i64>,
}

impl GatewayQuote {
    /// `requested` wins over the payload symbol so the snapshot matches what was asked for.
    fn into_stock(self, requested: Option<&Symbol>) -> Result<Stock, String> {
        let ticker = match requested {
            Some(ticker) => ticker.clone(),
            None => Symbol::parse(&self.symbol).map_err(|error| error.to_string())?,
        };

        let price = finite_or_zero(self.price);
        if price <= 0.0 {
            return Err(String::from("no quote for ticker"));
        }

        let volume = finite_or_zero(self.volume);
        let volume = if volume > 0.0 { volume.round() as u64 } else { 0 };
        let timestamp = self
            .timestamp
            .filter(|millis| *millis > 0)
            .and_then(|millis| UtcDateTime::from_unix_millis(millis).ok())
            .unwrap_or_else(UtcDateTime::now);
        let last_hod = Some(finite_or_zero(self.high)).filter(|high| *high > 0.0);

        Stock::new(
            ticker,
            price,
            finite_or_zero(self.change_percent),
            None,
            volume,
            0,
            0.0,
            0.0,
            0.0,
            last_hod,
            timestamp,
        )
        .map_err(|error| format!("invalid snapshot: {error}"))
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_quote_maps_with_sentinels() {
        let quote: GatewayQuote = serde_json::from_str(
            r#"{"symbol":"VERO","price":6.72,"bid":6.7,"ask":6.74,"volume":308900000,
                "high":7.2,"changePercent":369.93,"timestamp":1710423000000}"#,
        )
        .expect("quote");

        let stock = quote.into_stock(None).expect("stock");
        assert_eq!(stock.ticker.as_str(), "VERO");
        assert_eq!(stock.volume, 308_900_000);
        assert_eq!(stock.avg_volume, 0);
        assert_eq!(stock.relative_volume, 0.0);
        assert_eq!(stock.float, 0.0);
        assert_eq!(stock.last_hod, Some(7.2));
        assert_eq!(
            stock.timestamp,
            UtcDateTime::from_unix_millis(1_710_423_000_000).expect("ts")
        );
    }

    #[test]
    fn zero_price_is_rejected() {
        let quote: GatewayQuote =
            serde_json::from_str(r#"{"symbol":"VERO","price":0}"#).expect("quote");
        assert_eq!(quote.into_stock(None), Err(String::from("no quote for ticker")));
    }

    #[test]
    fn trims_trailing_slash_from_gateway_url() {
        let adapter = IbkrGatewayAdapter::new(Arc::new(crate::http_client::ReqwestHttpClient::new()))
            .with_gateway_url("http://127.0.0.1:5000/");
        assert_eq!(adapter.gateway_url(), "http://127.0.0.1:5000");
    }
}
