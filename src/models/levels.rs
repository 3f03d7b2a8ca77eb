use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K: usize = 5;

/// Which bars contribute to the bounce counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Every bar's low counts toward support and every high toward resistance.
    #[default]
    Raw,
    /// Only bearish lows count toward support, only bullish highs toward resistance.
    Directional,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Raw => "raw",
            FilterMode::Directional => "directional",
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelSide {
    Support,
    Resistance,
}

impl std::fmt::Display for LevelSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelSide::Support => f.write_str("support"),
            LevelSide::Resistance => f.write_str("resistance"),
        }
    }
}

/// Closed price interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Everything the engine needs besides the bars themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub support_range: PriceRange,
    pub resistance_range: PriceRange,
    pub tick_size: f64,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub filter_mode: FilterMode,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl DetectionParams {
    pub fn new(support_range: PriceRange, resistance_range: PriceRange, tick_size: f64) -> Self {
        Self {
            support_range,
            resistance_range,
            tick_size,
            threshold: 0.0,
            filter_mode: FilterMode::Raw,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedLevel {
    pub price: f64,
    pub count: usize,
}

/// All levels that share one bounce count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountGroup {
    pub count: usize,
    pub prices: Vec<f64>,
}

/// Ranked bounce counts for one side of the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub side: LevelSide,
    /// Every grid level, sorted by count descending, price ascending within a count.
    pub levels: Vec<RankedLevel>,
    pub top: Vec<CountGroup>,
}

impl RankingResult {
    /// Grid-ordered series, as a bar chart would plot it.
    pub fn by_price(&self) -> Vec<RankedLevel> {
        let mut series = self.levels.clone();
        series.sort_by(|a, b| a.price.total_cmp(&b.price));
        series
    }

    /// The highest count and every level that reaches it.
    pub fn max_group(&self) -> Option<CountGroup> {
        let max = self.levels.first()?.count;
        let prices = self
            .levels
            .iter()
            .take_while(|level| level.count == max)
            .map(|level| level.price)
            .collect();
        Some(CountGroup { count: max, prices })
    }

    pub fn total_bounces(&self) -> usize {
        self.levels.iter().map(|level| level.count).sum()
    }

    pub fn count_at(&self, price: f64) -> Option<usize> {
        self.levels
            .iter()
            .find(|level| level.price == price)
            .map(|level| level.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    pub support: RankingResult,
    pub resistance: RankingResult,
    pub bar_count: usize,
    pub filter_mode: FilterMode,
    pub tick_size: f64,
}
