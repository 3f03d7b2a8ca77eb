//! OHLC bar model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::levels::grid::quantize;

/// One OHLC observation for a fixed interval.
///
/// Bar order matters only for presentation; level counting treats the series
/// as an unordered bag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub timestamp: DateTime<Utc>,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            open,
            high,
            low,
            close,
            timestamp,
        }
    }

    /// `close - threshold > open`
    pub fn is_bullish(&self, threshold: f64) -> bool {
        self.close - threshold > self.open
    }

    /// `close + threshold < open`
    pub fn is_bearish(&self, threshold: f64) -> bool {
        self.close + threshold < self.open
    }

    /// This bar with `close` snapped to the tick grid, `open` left raw.
    ///
    /// Directional filtering classifies bars in this form, so a close that
    /// rounds back onto the open is neutral.
    pub fn with_quantized_close(&self, tick_size: f64) -> Self {
        Self {
            close: quantize(self.close, tick_size),
            ..*self
        }
    }

    /// Whether every price field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}
