//! Market data provider interface and an in-memory implementation.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::bar::Bar;
use crate::models::market::MarketQuery;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Market data request failed: {0}")]
    Request(String),

    #[error("Failed to parse market data response: {0}")]
    Parse(String),

    #[error("Market data API error [{code}]: {description}")]
    Api { code: String, description: String },
}

impl From<reqwest::Error> for MarketDataError {
    fn from(error: reqwest::Error) -> Self {
        MarketDataError::Request(error.to_string())
    }
}

/// Source of historical bars.
///
/// An unknown symbol or an unsupported period/interval combination is not an
/// error at this layer: providers return an empty series and the level engine
/// decides what that means.
#[async_trait::async_trait]
pub trait MarketDataProvider {
    async fn get_bars(&self, query: &MarketQuery) -> Result<Vec<Bar>, MarketDataError>;

    fn name(&self) -> &'static str;
}

/// Fixed bar series keyed by symbol. Period and interval are ignored.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketDataProvider {
    bars: HashMap<String, Vec<Bar>>,
}

impl InMemoryMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.into(), bars);
        self
    }

    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.bars.insert(symbol.into(), bars);
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for InMemoryMarketDataProvider {
    async fn get_bars(&self, query: &MarketQuery) -> Result<Vec<Bar>, MarketDataError> {
        Ok(self.bars.get(&query.symbol).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
