//! Ranking of counted levels and top-K grouping

use crate::models::levels::{CountGroup, LevelSide, RankedLevel, RankingResult};

/// Sort levels by count (descending) and derive the top count groups.
///
/// `levels` must arrive in grid order; the sort is stable, so levels with equal
/// counts stay in ascending price order.
pub fn rank_levels(side: LevelSide, mut levels: Vec<RankedLevel>, top_k: usize) -> RankingResult {
    levels.sort_by(|a, b| b.count.cmp(&a.count));
    let top = top_groups(&levels, top_k);
    RankingResult { side, levels, top }
}

/// Group the best `top_k` non-zero levels by count.
///
/// Groups are never cut in half: once the `top_k`-th level is taken, every
/// other level tying its count is included too.
pub fn top_groups(sorted: &[RankedLevel], top_k: usize) -> Vec<CountGroup> {
    let touched: Vec<&RankedLevel> = sorted.iter().filter(|level| level.count > 0).collect();
    let Some(cutoff) = touched.get(top_k.min(touched.len()).saturating_sub(1)) else {
        return Vec::new();
    };
    let cutoff = cutoff.count;

    let mut groups: Vec<CountGroup> = Vec::new();
    for level in touched.into_iter().take_while(|level| level.count >= cutoff) {
        match groups.last_mut() {
            Some(group) if group.count == level.count => group.prices.push(level.price),
            _ => groups.push(CountGroup {
                count: level.count,
                prices: vec![level.price],
            }),
        }
    }
    groups
}
