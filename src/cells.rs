//! Helpers for callers that reduce their own records to cell strings.

/// A per-source block of cell text, such as one program's schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledBlock {
    pub label: String,
    pub text: String,
}

impl LabeledBlock {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Joins entries into one multi-line cell value, skipping blank entries.
pub fn join_entries<I, S>(entries: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let kept: Vec<String> = entries
        .into_iter()
        .filter(|entry| !entry.as_ref().trim().is_empty())
        .map(|entry| entry.as_ref().to_string())
        .collect();
    kept.join("\n")
}

fn normalize_block(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Collapses blocks that read the same into a single shared block.
///
/// Blocks are compared after trimming trailing whitespace from every line and
/// dropping trailing blank lines. When every block is equal the shared text is
/// returned once; otherwise each block is kept in order, prefixed by its label.
pub fn merge_identical_blocks(blocks: &[LabeledBlock]) -> String {
    let normalized: Vec<String> = blocks.iter().map(|b| normalize_block(&b.text)).collect();
    let Some(first) = normalized.first() else {
        return String::new();
    };
    if normalized.iter().all(|text| text == first) {
        return first.clone();
    }
    blocks
        .iter()
        .zip(&normalized)
        .map(|(block, text)| {
            if text.is_empty() {
                format!("{}:", block.label)
            } else {
                format!("{}:\n{}", block.label, text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
