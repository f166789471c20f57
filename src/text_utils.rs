// src/text_utils.rs
// Utility functions for status text formatting

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::time::Duration;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Format a duration as `H:MM:SS`, dropping sub-second precision.
///
/// Hours are not wrapped into days.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Substitute `{name}` placeholders using `lookup`.
///
/// `lookup` returns `None` for names it does not know (left verbatim) and
/// `Some(None)` for known fields without a value (rendered empty).
pub fn render_template<'a, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<Option<&'a str>>,
{
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match lookup(&caps[1]) {
            Some(value) => value.unwrap_or_default().to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
