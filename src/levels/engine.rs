//! Level detection engine: validate, quantize, count and rank.

use tracing::debug;

use crate::levels::counter::{count_levels, quantize_bars, TouchCounts};
use crate::levels::error::LevelError;
use crate::levels::grid::TickGrid;
use crate::levels::ranking::rank_levels;
use crate::levels::validation::validate_request;
use crate::models::bar::Bar;
use crate::models::levels::{DetectionParams, LevelReport, LevelSide};

/// Stateless support/resistance detector.
///
/// Holds no data between calls, so one instance can serve concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelEngine;

impl LevelEngine {
    pub fn new() -> Self {
        Self
    }

    /// Count bounces on both grids and rank them.
    pub fn detect(&self, bars: &[Bar], params: &DetectionParams) -> Result<LevelReport, LevelError> {
        validate_request(bars, params)?;

        let quantized = quantize_bars(bars, params.tick_size);
        let touches = TouchCounts::accumulate(&quantized, params.filter_mode, params.threshold);

        let support_grid = TickGrid::new(params.support_range, params.tick_size);
        let resistance_grid = TickGrid::new(params.resistance_range, params.tick_size);

        debug!(
            bars = bars.len(),
            support_levels = support_grid.len(),
            resistance_levels = resistance_grid.len(),
            filter_mode = %params.filter_mode,
            "Counting level bounces"
        );

        let support = rank_levels(
            LevelSide::Support,
            count_levels(&support_grid, &touches.support),
            params.top_k,
        );
        let resistance = rank_levels(
            LevelSide::Resistance,
            count_levels(&resistance_grid, &touches.resistance),
            params.top_k,
        );

        Ok(LevelReport {
            support,
            resistance,
            bar_count: bars.len(),
            filter_mode: params.filter_mode,
            tick_size: params.tick_size,
        })
    }
}

/// Convenience wrapper around [`LevelEngine::detect`].
pub fn detect_levels(bars: &[Bar], params: &DetectionParams) -> Result<LevelReport, LevelError> {
    LevelEngine::new().detect(bars, params)
}
