//! Per-level bounce counting

use std::collections::HashMap;

use crate::levels::grid::{tick_index, TickGrid};
use crate::models::bar::Bar;
use crate::models::levels::{FilterMode, RankedLevel};

/// A bar snapped onto the tick lattice.
///
/// `high` and `low` are tick indices so level matching is exact integer
/// equality. Direction is read from `bar`, see [`Bar::with_quantized_close`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedBar {
    pub bar: Bar,
    pub high: i64,
    pub low: i64,
}

impl QuantizedBar {
    pub fn from_bar(bar: &Bar, tick_size: f64) -> Self {
        Self {
            bar: bar.with_quantized_close(tick_size),
            high: tick_index(bar.high, tick_size),
            low: tick_index(bar.low, tick_size),
        }
    }

    pub fn is_bullish(&self, threshold: f64) -> bool {
        self.bar.is_bullish(threshold)
    }

    pub fn is_bearish(&self, threshold: f64) -> bool {
        self.bar.is_bearish(threshold)
    }

    /// Tick index this bar contributes toward support, if any.
    pub fn support_touch(&self, mode: FilterMode, threshold: f64) -> Option<i64> {
        match mode {
            FilterMode::Raw => Some(self.low),
            FilterMode::Directional => self.is_bearish(threshold).then_some(self.low),
        }
    }

    /// Tick index this bar contributes toward resistance, if any.
    pub fn resistance_touch(&self, mode: FilterMode, threshold: f64) -> Option<i64> {
        match mode {
            FilterMode::Raw => Some(self.high),
            FilterMode::Directional => self.is_bullish(threshold).then_some(self.high),
        }
    }
}

pub fn quantize_bars(bars: &[Bar], tick_size: f64) -> Vec<QuantizedBar> {
    bars.iter()
        .map(|bar| QuantizedBar::from_bar(bar, tick_size))
        .collect()
}

/// Touch histograms keyed by tick index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchCounts {
    pub support: HashMap<i64, usize>,
    pub resistance: HashMap<i64, usize>,
}

impl TouchCounts {
    /// Single pass over the bars. Bars excluded by `mode` are masked out rather
    /// than mapped to a sentinel price, so no level can match them.
    pub fn accumulate(bars: &[QuantizedBar], mode: FilterMode, threshold: f64) -> Self {
        let mut counts = Self::default();
        for bar in bars {
            if let Some(low) = bar.support_touch(mode, threshold) {
                *counts.support.entry(low).or_insert(0) += 1;
            }
            if let Some(high) = bar.resistance_touch(mode, threshold) {
                *counts.resistance.entry(high).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Look up every grid level in `touches`, keeping grid order.
pub fn count_levels(grid: &TickGrid, touches: &HashMap<i64, usize>) -> Vec<RankedLevel> {
    grid.levels()
        .iter()
        .map(|&price| {
            let count = grid
                .lattice_index(price)
                .and_then(|index| touches.get(&index).copied())
                .unwrap_or(0);
            RankedLevel { price, count }
        })
        .collect()
}
