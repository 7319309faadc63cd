// src/plan.rs

use crate::model::*;
use std::collections::BTreeMap;

/// One reference waiting to be spliced next to an anchor line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub side: Side,
    /// Cache key of the asset the fragment was rendered from
    pub asset: String,
}

/// Accumulated insertions, keyed by exact line position
#[derive(Debug, Default)]
pub struct InsertionPlan {
    entries: BTreeMap<Anchor, Vec<Fragment>>,
}

impl InsertionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends; earlier fragments for the same anchor are kept in order
    pub fn push(&mut self, anchor: Anchor, fragment: Fragment) {
        self.entries.entry(anchor).or_default().push(fragment);
    }

    pub fn get(&self, anchor: &Anchor) -> Option<&[Fragment]> {
        self.entries.get(anchor).map(Vec::as_slice)
    }

    /// Assets whose fragments land in `document`, in plan order
    pub fn assets_for(&self, document: DocumentIndex) -> Vec<&str> {
        let start = Anchor { document, commit: 0, line: 0 };
        self.entries
            .range(start..)
            .take_while(|(anchor, _)| anchor.document == document)
            .flat_map(|(_, fragments)| fragments.iter().map(|f| f.asset.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Markdown for a thumbnail that links to the full-size photo
pub fn render_reference(filename: &str, link_prefix: &str, label: &str) -> String {
    format!("[![{label}]({link_prefix}{filename}.thumb.jpg)]({link_prefix}{filename})")
}
