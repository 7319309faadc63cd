// src/history.rs

use crate::model::*;
use std::collections::HashMap;

/// The two anchors recorded for one commit timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPair {
    /// Last line of the first block seen with this timestamp; written once
    pub first_line: Anchor,
    /// Last line of the most recent block seen with this timestamp
    pub last_line: Anchor,
}

impl AnchorPair {
    pub fn for_side(&self, side: Side) -> Anchor {
        match side {
            Side::Before => self.first_line,
            Side::After => self.last_line,
        }
    }
}

/// Maps each commit second to the lines it touched, plus the sorted search space
#[derive(Debug, Default)]
pub struct HistoryIndex {
    anchors: HashMap<i64, AnchorPair>,
    timestamps: Vec<i64>,
}

impl HistoryIndex {
    /// Documents are visited in slice order, blocks in file order.
    /// Blocks without lines have no line to anchor to and are ignored.
    pub fn build(documents: &[Document]) -> Self {
        let mut anchors: HashMap<i64, AnchorPair> = HashMap::new();

        for (document, doc) in documents.iter().enumerate() {
            for (commit, block) in doc.blocks.iter().enumerate() {
                let Some(line) = block.lines.len().checked_sub(1) else {
                    continue;
                };
                let anchor = Anchor { document, commit, line };
                anchors
                    .entry(block.timestamp)
                    .and_modify(|pair| pair.last_line = anchor)
                    .or_insert(AnchorPair { first_line: anchor, last_line: anchor });
            }
        }

        let mut timestamps: Vec<i64> = anchors.keys().copied().collect();
        timestamps.sort_unstable();

        Self { anchors, timestamps }
    }

    /// Distinct commit timestamps, ascending
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn get(&self, timestamp: i64) -> Option<&AnchorPair> {
        self.anchors.get(&timestamp)
    }
}
