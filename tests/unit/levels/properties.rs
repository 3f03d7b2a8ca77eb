//! Invariants of the level engine checked over generated bar series

use chrono::{Duration, TimeZone, Utc};
use levelscan::levels::{detect_levels, quantize, TickGrid};
use levelscan::models::{Bar, DetectionParams, FilterMode, PriceRange};

/// Deterministic random walk so failures are reproducible.
fn random_walk(seed: u64, count: usize, start: f64) -> Vec<Bar> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) as f64) / ((1u64 << 31) as f64)
    };

    let origin = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut price = start;
    (0..count)
        .map(|i| {
            let open = price;
            let close = open + (next() - 0.5) * 40.0;
            let high = open.max(close) + next() * 15.0;
            let low = open.min(close) - next() * 15.0;
            price = close;
            Bar::new(open, high, low, close, origin + Duration::days(i as i64))
        })
        .collect()
}

fn params() -> DetectionParams {
    DetectionParams::new(
        PriceRange::new(900.0, 1000.0),
        PriceRange::new(1000.0, 1100.0),
        10.0,
    )
}

#[test]
fn test_raw_support_sum_matches_bars_in_range() {
    for seed in 1..20 {
        let bars = random_walk(seed, 120, 1000.0);
        let p = params();
        let report = detect_levels(&bars, &p).unwrap();

        let grid = TickGrid::new(p.support_range, p.tick_size);
        let lo = grid.levels()[0];
        let hi = *grid.levels().last().unwrap();
        let expected = bars
            .iter()
            .map(|b| quantize(b.low, p.tick_size))
            .filter(|low| *low >= lo && *low <= hi)
            .count();

        assert_eq!(report.support.total_bounces(), expected, "seed {}", seed);
    }
}

#[test]
fn test_counts_bounded_by_bar_count() {
    let bars = random_walk(7, 60, 1000.0);
    let report = detect_levels(&bars, &params()).unwrap();
    for level in report.support.levels.iter().chain(report.resistance.levels.iter()) {
        assert!(level.count <= bars.len());
    }
}

#[test]
fn test_directional_never_exceeds_raw() {
    for seed in 1..20 {
        let bars = random_walk(seed, 150, 1000.0);
        for threshold in [0.0, 5.0, 20.0] {
            let raw = detect_levels(&bars, &params().with_threshold(threshold)).unwrap();
            let directional = detect_levels(
                &bars,
                &params()
                    .with_threshold(threshold)
                    .with_filter_mode(FilterMode::Directional),
            )
            .unwrap();

            for (r, d) in raw
                .support
                .by_price()
                .iter()
                .zip(directional.support.by_price().iter())
                .chain(
                    raw.resistance
                        .by_price()
                        .iter()
                        .zip(directional.resistance.by_price().iter()),
                )
            {
                assert_eq!(r.price, d.price);
                assert!(d.count <= r.count, "seed {} price {}", seed, r.price);
            }
        }
    }
}

#[test]
fn test_detection_is_deterministic() {
    let bars = random_walk(42, 200, 1000.0);
    let p = params().with_filter_mode(FilterMode::Directional).with_threshold(2.0);
    let first = detect_levels(&bars, &p).unwrap();
    let second = detect_levels(&bars, &p).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_bar_order_does_not_change_counts() {
    let bars = random_walk(3, 80, 1000.0);
    let mut reversed = bars.clone();
    reversed.reverse();
    let forward = detect_levels(&bars, &params()).unwrap();
    let backward = detect_levels(&reversed, &params()).unwrap();
    assert_eq!(forward.support, backward.support);
    assert_eq!(forward.resistance, backward.resistance);
}

#[test]
fn test_levels_sorted_descending_with_stable_ties() {
    let bars = random_walk(11, 200, 1000.0);
    let report = detect_levels(&bars, &params()).unwrap();
    for pair in report.support.levels.windows(2) {
        assert!(pair[0].count >= pair[1].count);
        if pair[0].count == pair[1].count {
            assert!(pair[0].price < pair[1].price);
        }
    }
}

#[test]
fn test_top_groups_are_distinct_and_descending() {
    let bars = random_walk(5, 250, 1000.0);
    let report = detect_levels(&bars, &params()).unwrap();
    let top = &report.support.top;
    for pair in top.windows(2) {
        assert!(pair[0].count > pair[1].count);
    }
    for group in top {
        assert!(group.count > 0);
        for price in &group.prices {
            assert_eq!(report.support.count_at(*price), Some(group.count));
        }
    }
}

#[test]
fn test_directional_counts_follow_bar_classification() {
    // the engine's filter must agree with Bar's own classification on the grid
    for seed in 1..20 {
        let bars = random_walk(seed, 150, 1000.0);
        for threshold in [0.0, 5.0] {
            let p = params()
                .with_threshold(threshold)
                .with_filter_mode(FilterMode::Directional);
            let report = detect_levels(&bars, &p).unwrap();

            let support = TickGrid::new(p.support_range, p.tick_size);
            let resistance = TickGrid::new(p.resistance_range, p.tick_size);
            let on_grid = |grid: &TickGrid, price: f64| {
                grid.levels().iter().any(|level| *level == price)
            };

            let bearish_lows = bars
                .iter()
                .filter(|b| b.with_quantized_close(p.tick_size).is_bearish(threshold))
                .filter(|b| on_grid(&support, quantize(b.low, p.tick_size)))
                .count();
            let bullish_highs = bars
                .iter()
                .filter(|b| b.with_quantized_close(p.tick_size).is_bullish(threshold))
                .filter(|b| on_grid(&resistance, quantize(b.high, p.tick_size)))
                .count();

            assert_eq!(report.support.total_bounces(), bearish_lows, "seed {}", seed);
            assert_eq!(report.resistance.total_bounces(), bullish_highs, "seed {}", seed);
        }
    }
}
