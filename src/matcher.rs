// src/matcher.rs

use crate::history::HistoryIndex;
use crate::model::*;

/// Photos further than this from every commit are left out, in seconds
pub const MAX_GAP_SECS: i64 = 2 * 60 * 60;

/// Closest element of `sorted` to `query`; ties go to the smaller timestamp.
/// Queries outside the range clamp to the boundary element.
pub fn nearest(sorted: &[i64], query: i64) -> Option<i64> {
    let pos = sorted.partition_point(|&ts| ts < query);
    if pos == 0 {
        return sorted.first().copied();
    }
    if pos == sorted.len() {
        return sorted.last().copied();
    }
    let before = sorted[pos - 1];
    let after = sorted[pos];
    if after - query < query - before {
        Some(after)
    } else {
        Some(before)
    }
}

pub fn classify(query: i64, chosen: i64) -> Side {
    if query < chosen {
        Side::Before
    } else {
        Side::After
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The index holds no timestamps at all
    NoHistory,
    /// The nearest commit is further away than the cutoff
    TooFar { nearest: i64, gap: i64 },
    Matched { timestamp: i64, side: Side, anchor: Anchor },
}

pub fn match_capture(index: &HistoryIndex, capture_epoch: i64, max_gap: i64) -> MatchOutcome {
    let Some(timestamp) = nearest(index.timestamps(), capture_epoch) else {
        return MatchOutcome::NoHistory;
    };
    let gap = (capture_epoch - timestamp).abs();
    if gap > max_gap {
        return MatchOutcome::TooFar { nearest: timestamp, gap };
    }
    let side = classify(capture_epoch, timestamp);
    match index.get(timestamp) {
        Some(pair) => MatchOutcome::Matched { timestamp, side, anchor: pair.for_side(side) },
        None => MatchOutcome::NoHistory,
    }
}
