//! Plain title extraction from rendered heading markup.

use std::sync::LazyLock;

use regex::Regex;

use crate::TreeError;

/// Matches a single `<hN ...>...</hN>` element, tolerating case and newlines.
///
/// Opening and closing levels are captured separately and compared after the
/// match.
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*h([1-6])\b[^>]*>(.*?)<\s*/\s*h([1-6])\s*>").unwrap()
});

/// Return the inner HTML of the heading element in `html`.
///
/// Inline markup inside the heading (`<code>`, `<em>`, links) is preserved.
pub(crate) fn extract_title(html: &str) -> Result<&str, TreeError> {
    let malformed = || TreeError::MalformedHeading(html.trim().to_owned());

    let caps = HEADING_RE.captures(html).ok_or_else(malformed)?;
    if caps.get(1).map(|m| m.as_str()) != caps.get(3).map(|m| m.as_str()) {
        return Err(malformed());
    }
    Ok(caps.get(2).map_or("", |m| m.as_str()))
}
