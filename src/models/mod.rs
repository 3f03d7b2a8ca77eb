//! Shared data models spanning the engine and service layers.

pub mod bar;
pub mod levels;
pub mod market;

pub use bar::Bar;
pub use levels::{
    CountGroup, DetectionParams, FilterMode, LevelReport, LevelSide, PriceRange, RankedLevel,
    RankingResult, DEFAULT_TOP_K,
};
pub use market::MarketQuery;
