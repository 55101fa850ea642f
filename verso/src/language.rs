//! Language detection.

use core::fmt;

use lingua::{LanguageDetector, LanguageDetectorBuilder};

use crate::errors::{Result, VersoError};

/// ISO 639-1 language code, e.g. `en`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Creates a language code. The code is stored in lowercase.
    pub fn new<S>(code: S) -> Self
    where
        S: AsRef<str>,
    {
        Self(code.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a human-readable name for display.
    ///
    /// Well-known languages are spelled out and all others fall back to the upper-cased code.
    pub fn display_name(&self) -> String {
        match self.0.as_str() {
            "en" => "English".to_string(),
            "es" => "Spanish".to_string(),
            "fr" => "French".to_string(),
            "hi" => "Hindi".to_string(),
            code => code.to_uppercase(),
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Oracle that guesses the language of a text.
pub trait LanguageOracle {
    /// Detects the language of a text.
    ///
    /// # Errors
    ///
    /// [`VersoError::DetectionFailed`] will be returned if the language cannot be determined.
    fn detect(&self, text: &str) -> Result<LanguageCode>;
}

impl<O> LanguageOracle for &O
where
    O: LanguageOracle + ?Sized,
{
    fn detect(&self, text: &str) -> Result<LanguageCode> {
        (**self).detect(text)
    }
}

/// Language oracle backed by the `lingua` statistical detector.
///
/// The detector chooses from every language lingua knows, so texts in languages without a stemmer
/// are recognized as such. Detection is deterministic, so results are reproducible without seeding.
pub struct LinguaOracle {
    detector: LanguageDetector,
}

impl LinguaOracle {
    /// Creates a new oracle.
    pub fn new() -> Self {
        Self {
            detector: LanguageDetectorBuilder::from_all_languages().build(),
        }
    }
}

impl Default for LinguaOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageOracle for LinguaOracle {
    fn detect(&self, text: &str) -> Result<LanguageCode> {
        self.detector
            .detect_language_of(text)
            .map(|language| LanguageCode::new(language.iso_code_639_1().to_string()))
            .ok_or(VersoError::DetectionFailed)
    }
}
