//! Normalization of raw lyrics.

use once_cell::sync::Lazy;
use regex::Regex;

static ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z\x{0900}-\x{097F}\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Filter that receives a string and returns a processed string.
pub trait StringFilter<S>
where
    S: AsRef<str>,
{
    /// Filter a specified string.
    ///
    /// # Arguments:
    ///
    /// * `string` - Input string.
    ///
    /// # Returns
    ///
    /// A processed string.
    fn filter(&self, string: S) -> String;
}

/// Cleans raw lyrics.
///
/// The text is lowercased, bracketed annotations such as `[Chorus]` are removed, every
/// character other than whitespace, ASCII letters and Devanagari is dropped, and whitespace
/// runs are collapsed into a single space.
///
/// # Arguments
///
/// * `raw` - Raw lyrics.
///
/// # Returns
///
/// Cleaned lyrics. An empty string is returned as is.
///
/// # Examples
///
/// ```
/// assert_eq!("hello world", verso::clean("[Verse 1]\nHello,   World! 22"));
/// ```
pub fn clean(raw: &str) -> String {
    let text = raw.to_lowercase();
    let text = ANNOTATION_RE.replace_all(&text, "");
    let text = DISALLOWED_RE.replace_all(&text, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// [`StringFilter`] version of [`clean()`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LyricsCleaner;

impl LyricsCleaner {
    /// Creates a new LyricsCleaner.
    pub const fn new() -> Self {
        Self
    }
}

impl<S> StringFilter<S> for LyricsCleaner
where
    S: AsRef<str>,
{
    fn filter(&self, string: S) -> String {
        clean(string.as_ref())
    }
}
