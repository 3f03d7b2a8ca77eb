//! Parsing of raw string form fields into a level request

use std::collections::HashMap;

use serde::Serialize;

use crate::levels::error::LevelError;
use crate::models::levels::{DetectionParams, FilterMode, PriceRange};
use crate::models::market::MarketQuery;

/// A fully parsed request: what to fetch and how to count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRequest {
    pub query: MarketQuery,
    pub params: DetectionParams,
}

pub fn parse_f64(field: &str, value: &str) -> Result<f64, LevelError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| LevelError::malformed(field, value))
}

pub fn parse_usize(field: &str, value: &str) -> Result<usize, LevelError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| LevelError::malformed(field, value))
}

pub fn parse_filter_mode(value: &str) -> Result<FilterMode, LevelError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "raw" | "" => Ok(FilterMode::Raw),
        "directional" => Ok(FilterMode::Directional),
        _ => Err(LevelError::malformed("filter_mode", value)),
    }
}

fn required<'a>(data: &'a HashMap<String, String>, field: &str) -> Result<&'a str, LevelError> {
    data.get(field)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| LevelError::malformed(field, "missing"))
}

fn optional<'a>(data: &'a HashMap<String, String>, field: &str) -> Option<&'a str> {
    data.get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required_f64(data: &HashMap<String, String>, field: &str) -> Result<f64, LevelError> {
    parse_f64(field, required(data, field)?)
}

/// Build a [`LevelRequest`] from form fields.
///
/// Only syntax is checked here; range, tick size and threshold rules are
/// enforced by the engine.
pub fn parse_level_request(
    data: &HashMap<String, String>,
    default_top_k: usize,
) -> Result<LevelRequest, LevelError> {
    let symbol = required(data, "ticker")?.trim().to_string();
    let mut query = MarketQuery::new(symbol);
    if let Some(period) = optional(data, "period") {
        query = query.with_period(period);
    }
    if let Some(interval) = optional(data, "interval") {
        query = query.with_interval(interval);
    }

    let support_range = PriceRange::new(
        required_f64(data, "support_min")?,
        required_f64(data, "support_max")?,
    );
    let resistance_range = PriceRange::new(
        required_f64(data, "resistance_min")?,
        required_f64(data, "resistance_max")?,
    );
    let tick_size = required_f64(data, "tick_size")?;

    let threshold = optional(data, "threshold")
        .map(|value| parse_f64("threshold", value))
        .transpose()?
        .unwrap_or(0.0);
    let filter_mode = optional(data, "filter_mode")
        .map(parse_filter_mode)
        .transpose()?
        .unwrap_or_default();
    let top_k = optional(data, "top_k")
        .map(|value| parse_usize("top_k", value))
        .transpose()?
        .unwrap_or(default_top_k);

    let params = DetectionParams::new(support_range, resistance_range, tick_size)
        .with_threshold(threshold)
        .with_filter_mode(filter_mode)
        .with_top_k(top_k);

    Ok(LevelRequest { query, params })
}
