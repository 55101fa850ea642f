use rust_stemmers::{Algorithm, Stemmer};

use crate::language::{LanguageCode, LanguageOracle};

/// Texts shorter than this number of characters are not stemmed.
pub const MIN_STEM_CHARS: usize = 5;

/// Number of leading characters used for language detection.
pub const DETECTION_WINDOW: usize = 300;

/// Returns the Snowball algorithm for a language, if supported.
pub fn snowball_algorithm(lang: &LanguageCode) -> Option<Algorithm> {
    match lang.as_str() {
        "en" => Some(Algorithm::English),
        "fr" => Some(Algorithm::French),
        "es" => Some(Algorithm::Spanish),
        "de" => Some(Algorithm::German),
        "it" => Some(Algorithm::Italian),
        "pt" => Some(Algorithm::Portuguese),
        "nl" => Some(Algorithm::Dutch),
        "ru" => Some(Algorithm::Russian),
        _ => None,
    }
}

/// Language-aware stemmer.
///
/// The language of each text is detected by an oracle, and the text is stemmed word by word with
/// the Snowball algorithm of that language. Texts that are too short, whose language cannot be
/// detected, or whose language has no stemmer are passed through unchanged.
pub struct MultilingualStemmer<O> {
    oracle: O,
}

impl<O> MultilingualStemmer<O>
where
    O: LanguageOracle,
{
    /// Creates a new stemmer.
    ///
    /// # Arguments
    ///
    /// * `oracle` - A language oracle.
    pub const fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Stems a cleaned text.
    ///
    /// # Arguments
    ///
    /// * `text` - A text processed by [`clean()`](crate::clean).
    ///
    /// # Returns
    ///
    /// The stemmed text, or `text` itself if it was not stemmed.
    pub fn stem(&self, text: &str) -> String {
        if text.chars().count() < MIN_STEM_CHARS {
            return text.to_string();
        }
        let sample: String = text.chars().take(DETECTION_WINDOW).collect();
        let lang = match self.oracle.detect(&sample) {
            Ok(lang) => lang,
            Err(e) => {
                tracing::debug!("stemming skipped: {e}");
                return text.to_string();
            }
        };
        let Some(algorithm) = snowball_algorithm(&lang) else {
            return text.to_string();
        };
        let stemmer = Stemmer::create(algorithm);
        text.split_whitespace()
            .map(|word| stemmer.stem(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
