use std::path::Path;
use std::sync::Arc;

use crate::artifacts::Artifacts;
use crate::cleaner::clean;
use crate::errors::{Result, VersoError};
use crate::language::{LanguageCode, LanguageOracle};
use crate::stemmer::MultilingualStemmer;

/// Independent results of language detection and genre prediction on the same lyrics.
#[derive(Debug)]
pub struct Analysis {
    pub language: Result<LanguageCode>,
    pub genre: Result<String>,
}

/// Predictor of genres and languages of lyrics.
///
/// The artifacts are loaded once and shared. If they are unavailable, the predictor still detects
/// languages, and genre requests fail with [`VersoError::ModelsUnavailable`].
pub struct Predictor<O> {
    artifacts: Option<Arc<Artifacts>>,
    stemmer: MultilingualStemmer<O>,
}

impl<O> Predictor<O>
where
    O: LanguageOracle,
{
    /// Creates a new predictor.
    ///
    /// # Arguments
    ///
    /// * `artifacts` - Trained artifacts.
    /// * `oracle` - A language oracle used for detection and stemming.
    pub const fn new(artifacts: Arc<Artifacts>, oracle: O) -> Self {
        Self {
            artifacts: Some(artifacts),
            stemmer: MultilingualStemmer::new(oracle),
        }
    }

    /// Creates a predictor that can only detect languages.
    pub const fn unavailable(oracle: O) -> Self {
        Self {
            artifacts: None,
            stemmer: MultilingualStemmer::new(oracle),
        }
    }

    /// Loads artifacts from a directory.
    ///
    /// A failure is logged and results in a predictor that can only detect languages.
    pub fn from_dir<P>(dir: P, oracle: O) -> Self
    where
        P: AsRef<Path>,
    {
        match Artifacts::load(dir) {
            Ok(artifacts) => Self::new(Arc::new(artifacts), oracle),
            Err(e) => {
                tracing::warn!("genre prediction is disabled: {e}");
                Self::unavailable(oracle)
            }
        }
    }

    /// Returns `true` if genres can be predicted.
    pub fn has_models(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn artifacts(&self) -> Option<&Arc<Artifacts>> {
        self.artifacts.as_ref()
    }

    /// Predicts the genre of raw lyrics.
    ///
    /// # Errors
    ///
    /// [`VersoError::EmptyInput`] will be returned if `raw` is blank, and
    /// [`VersoError::ModelsUnavailable`] if the artifacts are not loaded.
    pub fn predict_genre(&self, raw: &str) -> Result<String> {
        if raw.trim().is_empty() {
            return Err(VersoError::EmptyInput);
        }
        let artifacts = self
            .artifacts
            .as_ref()
            .ok_or(VersoError::ModelsUnavailable)?;
        let stemmed = self.stemmer.stem(&clean(raw));
        let x = artifacts.vectorizer.transform(&stemmed);
        let class = artifacts.model.predict(&x);
        Ok(artifacts.labels.decode(class)?.to_string())
    }

    /// Detects the language of raw lyrics.
    ///
    /// The raw text is given to the oracle as is.
    ///
    /// # Errors
    ///
    /// [`VersoError::EmptyInput`] will be returned if `raw` is blank, and
    /// [`VersoError::DetectionFailed`] if the language cannot be determined.
    pub fn detect_language(&self, raw: &str) -> Result<LanguageCode> {
        if raw.trim().is_empty() {
            return Err(VersoError::EmptyInput);
        }
        self.stemmer.oracle().detect(raw)
    }

    /// Detects the language and predicts the genre of raw lyrics.
    ///
    /// # Errors
    ///
    /// [`VersoError::EmptyInput`] will be returned if `raw` is blank. Other failures are reported
    /// per task in [`Analysis`].
    pub fn analyze(&self, raw: &str) -> Result<Analysis> {
        if raw.trim().is_empty() {
            return Err(VersoError::EmptyInput);
        }
        Ok(Analysis {
            language: self.detect_language(raw),
            genre: self.predict_genre(raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::cell::Cell;

    use crate::label::LabelEncoder;
    use crate::model::LinearModel;
    use crate::vectorizer::{TfidfConfig, TfidfVectorizer};

    struct StubOracle {
        lang: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl StubOracle {
        fn new(lang: Option<&'static str>) -> Self {
            Self {
                lang,
                calls: Cell::new(0),
            }
        }
    }

    impl LanguageOracle for StubOracle {
        fn detect(&self, _: &str) -> Result<LanguageCode> {
            self.calls.set(self.calls.get() + 1);
            self.lang
                .map(LanguageCode::new)
                .ok_or(VersoError::DetectionFailed)
        }
    }

    // Features: fire (0), stars (1). Pop fires on "stars", Rock on "fire".
    fn artifacts() -> Arc<Artifacts> {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            ..TfidfConfig::default()
        };
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&["stars", "fire"], config).unwrap();
        let model = LinearModel::new(
            vec![vec![-1.0, 1.0], vec![1.0, -1.0]],
            vec![0.0, 0.0],
            2,
        )
        .unwrap();
        let labels = LabelEncoder::fit(["Pop", "Rock"]);
        Arc::new(Artifacts::new(model, vectorizer, labels).unwrap())
    }

    #[test]
    fn test_predict_genre() {
        let predictor = Predictor::new(artifacts(), StubOracle::new(None));
        assert_eq!("Rock", predictor.predict_genre("[Chorus] FIRE!").unwrap());
        assert_eq!("Pop", predictor.predict_genre("Stars").unwrap());
    }

    #[test]
    fn test_predict_genre_deterministic() {
        let predictor = Predictor::new(artifacts(), StubOracle::new(Some("en")));
        let first = predictor.predict_genre("set the night on fire").unwrap();
        for _ in 0..10 {
            assert_eq!(first, predictor.predict_genre("set the night on fire").unwrap());
        }
    }

    #[test]
    fn test_predict_genre_empty_input() {
        let predictor = Predictor::new(artifacts(), StubOracle::new(Some("en")));
        for raw in ["", "   ", "\n\t"] {
            assert!(matches!(
                predictor.predict_genre(raw),
                Err(VersoError::EmptyInput)
            ));
        }
        // Rejected before stemming.
        assert_eq!(0, predictor.stemmer.oracle().calls.get());
    }

    #[test]
    fn test_predict_genre_unavailable() {
        let predictor = Predictor::unavailable(StubOracle::new(Some("en")));
        assert!(!predictor.has_models());
        assert!(matches!(
            predictor.predict_genre("fire"),
            Err(VersoError::ModelsUnavailable)
        ));
        assert!(matches!(
            predictor.predict_genre(" "),
            Err(VersoError::EmptyInput)
        ));
        assert_eq!("en", predictor.detect_language("fire").unwrap().as_str());
    }

    #[test]
    fn test_detect_language() {
        let predictor = Predictor::unavailable(StubOracle::new(Some("es")));
        assert_eq!("es", predictor.detect_language("fuego").unwrap().as_str());
        assert!(matches!(
            predictor.detect_language("  "),
            Err(VersoError::EmptyInput)
        ));
    }

    #[test]
    fn test_analyze_detection_failure() {
        let predictor = Predictor::new(artifacts(), StubOracle::new(None));
        let analysis = predictor.analyze("fire fire fire").unwrap();
        assert!(matches!(analysis.language, Err(VersoError::DetectionFailed)));
        assert_eq!("Rock", analysis.genre.unwrap());
    }

    #[test]
    fn test_analyze_models_unavailable() {
        let predictor = Predictor::unavailable(StubOracle::new(Some("fr")));
        let analysis = predictor.analyze("le feu").unwrap();
        assert_eq!("fr", analysis.language.unwrap().as_str());
        assert!(matches!(analysis.genre, Err(VersoError::ModelsUnavailable)));
    }

    #[test]
    fn test_analyze_empty_input() {
        let predictor = Predictor::new(artifacts(), StubOracle::new(Some("en")));
        assert!(matches!(predictor.analyze(""), Err(VersoError::EmptyInput)));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        artifacts().save(dir.path()).unwrap();
        let predictor = Predictor::from_dir(dir.path(), StubOracle::new(None));
        assert!(predictor.has_models());
        assert_eq!("Pop", predictor.predict_genre("stars").unwrap());
    }

    #[test]
    fn test_from_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Predictor::from_dir(dir.path(), StubOracle::new(Some("hi")));
        assert!(!predictor.has_models());
        assert_eq!("hi", predictor.detect_language("dil").unwrap().as_str());
    }
}
