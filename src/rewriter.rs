// src/rewriter.rs

use crate::model::*;
use crate::plan::InsertionPlan;
use std::fs;
use std::path::Path;

/// Replays a document's blame blocks and splices in planned fragments.
/// Returns `None` when no line of the document has an entry in the plan.
///
/// Lines are emitted with their own terminators. Inserted lines use the
/// terminator of the anchor line, `\n` if it has none.
pub fn rewrite(document: DocumentIndex, blocks: &[CommitBlock], plan: &InsertionPlan) -> Option<String> {
    let mut text = String::new();
    let mut changed = false;

    for (commit, block) in blocks.iter().enumerate() {
        for (line_no, line) in block.lines.iter().enumerate() {
            let anchor = Anchor { document, commit, line: line_no };
            let Some(fragments) = plan.get(&anchor) else {
                text.push_str(line);
                continue;
            };
            changed = true;

            let eol = if line.ends_with("\r\n") { "\r\n" } else { "\n" };
            let mut push_line = |content: &str| {
                text.push_str(content);
                text.push_str(eol);
            };

            push_line("");
            for fragment in fragments.iter().filter(|f| f.side == Side::Before) {
                push_line(fragment.text.as_str());
            }
            push_line("");
            push_line(line.strip_suffix(eol).unwrap_or(line.as_str()));
            push_line("");
            for fragment in fragments.iter().filter(|f| f.side == Side::After) {
                push_line(fragment.text.as_str());
            }
            push_line("");
        }
    }

    changed.then_some(text)
}

/// Whether `text` is byte for byte the lines described by `blocks`; a
/// document with uncommitted edits fails this and must not be rebuilt
pub fn matches_blocks(text: &str, blocks: &[CommitBlock]) -> bool {
    let mut rest = text;
    for line in blocks.iter().flat_map(|b| &b.lines) {
        match rest.strip_prefix(line.as_str()) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    rest.is_empty()
}

/// Replaces `path` with `text` through a sibling temporary file
pub fn write_document(path: &Path, text: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, text)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}
