//! Yahoo Finance chart API market data provider

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use chrono::DateTime;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::bar::Bar;
use crate::models::market::MarketQuery;
use crate::services::market_data::{MarketDataError, MarketDataProvider};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
/// Error code Yahoo returns for unknown or delisted symbols.
const NOT_FOUND_CODE: &str = "Not Found";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

pub struct YahooMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
}

impl YahooMarketDataProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 2,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// `{base}/{symbol}` with the symbol encoded as a single path segment.
    fn chart_url(&self, symbol: &str) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            MarketDataError::Request(format!("invalid base URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Request(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(symbol);
        Ok(url)
    }

    fn chart_request(&self, url: &Url, query: &MarketQuery) -> reqwest::RequestBuilder {
        self.client.get(url.clone()).query(&[
            ("range", query.period.as_str()),
            ("interval", query.interval.as_str()),
        ])
    }

    async fn fetch_once(&self, url: &Url, query: &MarketQuery) -> Result<String, MarketDataError> {
        let response = self.chart_request(url, query).send().await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(MarketDataError::Request(format!("HTTP {}", status)));
        }
        Ok(response.text().await?)
    }

    async fn fetch_body(&self, url: &Url, query: &MarketQuery) -> Result<String, MarketDataError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_times(self.max_retries);

        (|| async { self.fetch_once(url, query).await })
            .retry(backoff)
            .when(|e| matches!(e, MarketDataError::Request(_)))
            .notify(|e, delay| {
                warn!(error = %e, delay_ms = delay.as_millis() as u64, "Retrying Yahoo chart request");
            })
            .await
    }
}

/// Convert a chart API payload into bars.
///
/// Rows with any missing OHLC value are skipped. An unknown symbol yields an
/// empty series.
pub fn parse_chart_response(json: &str) -> Result<Vec<Bar>, MarketDataError> {
    let response: ChartResponse =
        serde_json::from_str(json).map_err(|e| MarketDataError::Parse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(Vec::new());
        }
        return Err(MarketDataError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(quote) = data.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let bars = data
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let open = quote.open.get(i).copied().flatten()?;
            let high = quote.high.get(i).copied().flatten()?;
            let low = quote.low.get(i).copied().flatten()?;
            let close = quote.close.get(i).copied().flatten()?;
            let timestamp = DateTime::from_timestamp(ts, 0)?;
            Some(Bar::new(open, high, low, close, timestamp))
        })
        .collect();

    Ok(bars)
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooMarketDataProvider {
    async fn get_bars(&self, query: &MarketQuery) -> Result<Vec<Bar>, MarketDataError> {
        let url = self.chart_url(&query.symbol)?;
        debug!(symbol = %query.symbol, period = %query.period, interval = %query.interval, "Fetching Yahoo chart");

        let body = self.fetch_body(&url, query).await?;
        let bars = parse_chart_response(&body)?;

        debug!(symbol = %query.symbol, count = bars.len(), "Fetched {} bars", bars.len());
        Ok(bars)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
