//! Ignore directives (§4.9, §6's "Ignore-comment grammar").
//!
//! Suppression is decided against raw per-line source text, not the AST:
//! `// rld-ignore` on the diagnostic's own line, `// rld-ignore-next-line` on
//! the line before it, and the corresponding block-comment forms. Matching
//! is case-sensitive and anchored at the comment start after optional
//! whitespace, so `// foo rld-ignore` does not suppress.

use crate::core::syntax::FileRecord;

const INLINE_MARKER: &str = "rld-ignore";
const NEXT_LINE_MARKER: &str = "rld-ignore-next-line";

/// Does `line`'s own text, or the line preceding it, carry an ignore
/// directive that suppresses a diagnostic reported at `line`?
pub fn is_ignored(file: &FileRecord, line: usize) -> bool {
    if file
        .line_text(line)
        .is_some_and(|text| line_has_marker(text, INLINE_MARKER))
    {
        return true;
    }
    line.checked_sub(1)
        .filter(|&prev| prev >= 1)
        .and_then(|prev| file.line_text(prev))
        .is_some_and(|text| line_has_marker(text, NEXT_LINE_MARKER))
}

fn line_has_marker(line: &str, marker: &str) -> bool {
    comment_body(line, "//").is_some_and(|rest| anchored_match(rest, marker))
        || comment_body(line, "/*").is_some_and(|rest| anchored_match(rest, marker))
}

fn comment_body(line: &str, opener: &str) -> Option<&str> {
    line.find(opener).map(|idx| &line[idx + opener.len()..])
}

/// `rest` is the text immediately after `//`/`/*`. The marker must appear
/// first, modulo leading whitespace, and be followed only by whitespace,
/// end-of-line, or a block-comment closer.
fn anchored_match(rest: &str, marker: &str) -> bool {
    let trimmed = rest.trim_start();
    let Some(after) = trimmed.strip_prefix(marker) else {
        return false;
    };
    after.is_empty() || after.starts_with(char::is_whitespace) || after.starts_with("*/")
}
