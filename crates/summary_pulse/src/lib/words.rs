use std::sync::LazyLock;

use regex::Regex;

static MARKUP_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Counts whitespace-delimited words after stripping `<...>` markup tags.
///
/// Used for both the source text and the generated summary.
pub fn count_words(text: &str) -> usize {
    MARKUP_TAG_RE.replace_all(text, "").split_whitespace().count()
}
