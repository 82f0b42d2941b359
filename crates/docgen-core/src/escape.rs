//! Rewriting of numeric escape sequences in documentation text

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn unicode_escape() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\\u([0-9]+)").expect("escape pattern is valid"))
}

/// Rewrite every bare `\uNNNN` into the braced `\u{NNNN}` form
///
/// Only decimal digits are matched. Already braced sequences and all other
/// text are left untouched. Absence stays absence.
pub fn escape(doc: Option<&str>) -> Option<Cow<'_, str>> {
    doc.map(escape_text)
}

/// [`escape`] for text that is known to be present
pub fn escape_text(text: &str) -> Cow<'_, str> {
    unicode_escape().replace_all(text, r"\u{$1}")
}
