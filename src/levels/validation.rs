use crate::levels::error::LevelError;
use crate::levels::grid::{level_count, MAX_GRID_LEVELS};
use crate::models::bar::Bar;
use crate::models::levels::{DetectionParams, LevelSide, PriceRange};

fn finite(field: &str, value: f64) -> Result<f64, LevelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LevelError::malformed(field, value))
    }
}

pub fn validate_range(side: LevelSide, range: &PriceRange) -> Result<(), LevelError> {
    let min = finite(&format!("{}_min", side), range.min)?;
    let max = finite(&format!("{}_max", side), range.max)?;
    if min >= max {
        return Err(LevelError::InvalidRange { side, min, max });
    }
    Ok(())
}

pub fn validate_tick_size(tick_size: f64) -> Result<(), LevelError> {
    if finite("tick_size", tick_size)? <= 0.0 {
        return Err(LevelError::InvalidTickSize(tick_size));
    }
    Ok(())
}

/// Reject grids too large to materialize. Assumes range and tick size already passed.
pub fn validate_grid_size(side: LevelSide, range: &PriceRange, tick_size: f64) -> Result<(), LevelError> {
    let levels = level_count(range, tick_size);
    if levels > MAX_GRID_LEVELS {
        return Err(LevelError::GridTooLarge {
            side,
            levels,
            max: MAX_GRID_LEVELS,
        });
    }
    Ok(())
}

pub fn validate_threshold(threshold: f64) -> Result<(), LevelError> {
    if finite("threshold", threshold)? < 0.0 {
        return Err(LevelError::InvalidThreshold(threshold));
    }
    Ok(())
}

pub fn validate_params(params: &DetectionParams) -> Result<(), LevelError> {
    validate_range(LevelSide::Support, &params.support_range)?;
    validate_range(LevelSide::Resistance, &params.resistance_range)?;
    validate_tick_size(params.tick_size)?;
    validate_grid_size(LevelSide::Support, &params.support_range, params.tick_size)?;
    validate_grid_size(LevelSide::Resistance, &params.resistance_range, params.tick_size)?;
    validate_threshold(params.threshold)?;
    if params.top_k == 0 {
        return Err(LevelError::InvalidTopK(params.top_k));
    }
    Ok(())
}

pub fn validate_bars(bars: &[Bar]) -> Result<(), LevelError> {
    match bars.iter().position(|bar| !bar.is_finite()) {
        Some(index) => Err(LevelError::malformed(
            format!("bars[{}]", index),
            "non-finite price",
        )),
        None => Ok(()),
    }
}

/// Full input check in reporting order: data availability, ranges, tick size,
/// grid size, threshold, top_k, then the bar values themselves.
pub fn validate_request(bars: &[Bar], params: &DetectionParams) -> Result<(), LevelError> {
    if bars.is_empty() {
        return Err(LevelError::EmptyData);
    }
    validate_params(params)?;
    validate_bars(bars)
}
