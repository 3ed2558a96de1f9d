//! Diff generation utilities.
//!
//! Unified diff output for dry-run previews using the `similar` crate.

use similar::udiff::UnifiedHunkHeader;
use similar::{ChangeTag, TextDiff};

/// Generate a unified diff between two strings.
///
/// Each hunk carries a standard `@@ -a,b +c,d @@` header (an empty range
/// names the line before it, a one-line range drops the count) and `context`
/// lines of unchanged text around the change. Identical inputs yield an
/// empty string.
#[must_use]
pub fn generate_unified_diff(original: &str, modified: &str, context: usize) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let mut output = String::new();

    for group in diff.grouped_ops(context) {
        if group.is_empty() {
            continue;
        }
        output.push_str(&format!("{}\n", UnifiedHunkHeader::new(&group)));

        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }

    output
}
