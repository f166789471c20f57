//! Removal of edition/remaster/etc. noise from track titles and album names.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Words stripped from titles when the user does not configure their own.
pub const DEFAULT_SANITIZE_WORDS: &[&str] = &[
    "bonus", "demo", "edit", "explicit", "extended", "feat", "mono", "remaster", "stereo", "version",
];

const WORDS_MARKER: &str = "META_WORDS";

// "(Remastered 2017)", "[Bonus Track]"
const INSIDE_BRACKETS: &str = r"([\(\[][^)\]]*?(META_WORDS)[^)\]]*?[\)\]])";
// "- Remastered 2012", "/ Radio Edit", "; Remastered"; cuts to the end of the text, newlines included
const AFTER_DELIMITER: &str = r"(?s)([\-,;/])([^\-,;/])*(META_WORDS).*";

#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("sanitize word list is empty")]
    EmptyWordList,
    #[error("sanitize word at position {0} is empty")]
    EmptyWord(usize),
    #[error("invalid sanitize pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled sanitize patterns for a fixed word list.
///
/// Built once at startup; both passes match case-insensitively.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    inside_brackets: Regex,
    after_delimiter: Regex,
}

impl Sanitizer {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Result<Self, SanitizeError> {
        if words.is_empty() {
            return Err(SanitizeError::EmptyWordList);
        }
        let mut escaped = Vec::with_capacity(words.len());
        for (idx, word) in words.iter().enumerate() {
            let word = word.as_ref().trim();
            if word.is_empty() {
                return Err(SanitizeError::EmptyWord(idx));
            }
            escaped.push(regex::escape(word));
        }
        let alternation = escaped.join("|");

        Ok(Self {
            inside_brackets: compile(INSIDE_BRACKETS, &alternation)?,
            after_delimiter: compile(AFTER_DELIMITER, &alternation)?,
        })
    }

    /// Strip bracketed and trailing segments that mention a sanitize word.
    pub fn sanitize(&self, text: &str) -> String {
        let text = self.inside_brackets.replace_all(text, "");
        let text = self.after_delimiter.replace_all(&text, "");
        text.trim().to_string()
    }
}

fn compile(template: &str, alternation: &str) -> Result<Regex, SanitizeError> {
    let expression = template.replace(WORDS_MARKER, alternation);
    Ok(RegexBuilder::new(&expression).case_insensitive(true).build()?)
}
