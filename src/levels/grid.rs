//! Price grid generation and tick quantization

use crate::models::levels::PriceRange;

/// Relative slack, in ticks, absorbed before rounding step counts and lattice checks.
const TICK_EPSILON: f64 = 1e-9;

/// Largest grid a single side may span.
pub const MAX_GRID_LEVELS: usize = 1_000_000;

/// Index of the nearest tick, rounding half away from zero.
pub fn tick_index(price: f64, tick_size: f64) -> i64 {
    (price / tick_size).round() as i64
}

/// Snap a price to the nearest multiple of `tick_size`.
pub fn quantize(price: f64, tick_size: f64) -> f64 {
    (price / tick_size).round() * tick_size
}

/// Number of whole or partial steps needed to reach `range.max` from `range.min`.
fn step_count(range: &PriceRange, tick_size: f64) -> f64 {
    let steps = (range.max - range.min) / tick_size;
    let nearest = steps.round();
    let steps = if (steps - nearest).abs() <= TICK_EPSILON * nearest.max(1.0) {
        nearest
    } else {
        steps.ceil()
    };
    steps.max(0.0)
}

/// Levels a grid over `range` would hold, saturating at `usize::MAX`.
pub fn level_count(range: &PriceRange, tick_size: f64) -> usize {
    (step_count(range, tick_size) as usize).saturating_add(1)
}

/// Candidate levels `min, min + tick, ...` covering the closed range `[min, max]`.
///
/// The last level is the first grid point at or above `max`, so a range that
/// does not divide evenly gets one extra level past `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickGrid {
    range: PriceRange,
    tick_size: f64,
    levels: Vec<f64>,
}

impl TickGrid {
    /// Build the grid. Callers validate `range` and `tick_size` first and
    /// keep [`level_count`] within [`MAX_GRID_LEVELS`].
    pub fn new(range: PriceRange, tick_size: f64) -> Self {
        let steps = level_count(&range, tick_size) - 1;
        let levels = (0..=steps)
            .map(|i| range.min + i as f64 * tick_size)
            .collect();
        Self {
            range,
            tick_size,
            levels,
        }
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn range(&self) -> PriceRange {
        self.range
    }

    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Tick index of `level` when it sits on the tick lattice.
    ///
    /// A grid anchored off the lattice (e.g. `min = 101` with `tick = 5`) never
    /// matches a quantized price, so such levels return `None`.
    pub fn lattice_index(&self, level: f64) -> Option<i64> {
        let ticks = level / self.tick_size;
        let nearest = ticks.round();
        if (ticks - nearest).abs() <= TICK_EPSILON * nearest.abs().max(1.0) {
            Some(nearest as i64)
        } else {
            None
        }
    }
}
