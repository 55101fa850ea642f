#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Verso
//!
//! Verso classifies song lyrics by genre and detects their language.
//!
//! Lyrics are cleaned, stemmed in their detected language, vectorized into TF-IDF weighted word
//! n-grams, and classified by a one-vs-rest linear SVM.
//!
//! ## Examples
//!
//! ```no_run
//! use std::io::{prelude::*, stdin};
//!
//! use verso::{LinguaOracle, Predictor};
//!
//! let predictor = Predictor::from_dir("model", LinguaOracle::new());
//!
//! let mut lyrics = String::new();
//! stdin().read_to_string(&mut lyrics).unwrap();
//! let analysis = predictor.analyze(&lyrics).unwrap();
//! println!("{:?} {:?}", analysis.language, analysis.genre);
//! ```
//!
//! Training requires **crate feature** `train`. For more details, see [`TrainingPipeline`].

pub mod errors;

mod artifacts;
mod cleaner;
mod evaluation;
mod label;
mod language;
mod model;
mod predictor;
mod stemmer;
mod vectorizer;

#[cfg(feature = "train")]
mod corpus;
#[cfg(feature = "train")]
mod pipeline;
#[cfg(feature = "train")]
mod split;
#[cfg(feature = "train")]
mod trainer;

pub use artifacts::{Artifacts, LABELS_FILE, MODEL_FILE, VECTORIZER_FILE};
pub use cleaner::{clean, LyricsCleaner, StringFilter};
pub use errors::{Result, VersoError};
pub use evaluation::{ClassReport, Evaluation};
pub use label::LabelEncoder;
pub use language::{LanguageCode, LanguageOracle, LinguaOracle};
pub use model::LinearModel;
pub use predictor::{Analysis, Predictor};
pub use stemmer::{snowball_algorithm, MultilingualStemmer, DETECTION_WINDOW, MIN_STEM_CHARS};
pub use vectorizer::{tokenize, word_ngrams, FeatureVector, TfidfConfig, TfidfVectorizer};

#[cfg(feature = "train")]
pub use corpus::{Corpus, CorpusColumns};
#[cfg(feature = "train")]
pub use pipeline::{Stage, TrainingConfig, TrainingOutcome, TrainingPipeline};
#[cfg(feature = "train")]
pub use split::{SplitConfig, StratifiedSplit};
#[cfg(feature = "train")]
pub use trainer::{ClassWeight, ClassifierTrainer, TrainerConfig};
