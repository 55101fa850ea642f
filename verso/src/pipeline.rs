use core::fmt;
use std::path::Path;

use crate::artifacts::Artifacts;
use crate::cleaner::clean;
use crate::corpus::Corpus;
use crate::errors::{Result, VersoError};
use crate::evaluation::Evaluation;
use crate::label::LabelEncoder;
use crate::language::LanguageOracle;
use crate::split::{SplitConfig, StratifiedSplit};
use crate::stemmer::MultilingualStemmer;
use crate::trainer::{ClassifierTrainer, TrainerConfig};
use crate::vectorizer::{TfidfConfig, TfidfVectorizer};

/// Stages of a training run, in the order they are reached.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Stage {
    Loaded,
    Cleaned,
    Stemmed,
    Vectorized,
    Split,
    Fit,
    Evaluated,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loaded => "LOADED",
            Self::Cleaned => "CLEANED",
            Self::Stemmed => "STEMMED",
            Self::Vectorized => "VECTORIZED",
            Self::Split => "SPLIT",
            Self::Fit => "FIT",
            Self::Evaluated => "EVALUATED",
            Self::Persisted => "PERSISTED",
        })
    }
}

/// Configuration of [`TrainingPipeline`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingConfig {
    pub tfidf: TfidfConfig,
    pub trainer: TrainerConfig,
    pub split: SplitConfig,
}

/// Result of a training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub artifacts: Artifacts,

    /// Scores on the held-out examples. `None` if nothing was held out.
    pub evaluation: Option<Evaluation>,
}

/// Batch training from a labeled corpus to an artifact set.
pub struct TrainingPipeline<O> {
    stemmer: MultilingualStemmer<O>,
    config: TrainingConfig,
}

impl<O> TrainingPipeline<O>
where
    O: LanguageOracle,
{
    /// Creates a new pipeline.
    ///
    /// # Arguments
    ///
    /// * `oracle` - A language oracle used for stemming.
    /// * `config` - Training configuration.
    pub const fn new(oracle: O, config: TrainingConfig) -> Self {
        Self {
            stemmer: MultilingualStemmer::new(oracle),
            config,
        }
    }

    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains a model without persisting it.
    ///
    /// The vectorizer is fit on the whole corpus, and the classifier on the training side of a
    /// stratified split. The test side is used once for evaluation.
    ///
    /// # Errors
    ///
    /// The first error of any stage aborts the run.
    pub fn fit(&self, corpus: &Corpus) -> Result<TrainingOutcome> {
        if corpus.is_empty() {
            return Err(VersoError::invalid_argument("corpus", "no rows"));
        }
        log_stage(Stage::Loaded, format_args!("{} rows", corpus.len()));

        let cleaned: Vec<String> = corpus.texts().iter().map(|text| clean(text)).collect();
        log_stage(Stage::Cleaned, format_args!("{} documents", cleaned.len()));

        let stemmed: Vec<String> = cleaned.iter().map(|text| self.stemmer.stem(text)).collect();
        log_stage(Stage::Stemmed, format_args!("{} documents", stemmed.len()));

        let (vectorizer, xs) = TfidfVectorizer::fit_transform(&stemmed, self.config.tfidf.clone())?;
        let labels = LabelEncoder::fit(corpus.labels());
        let ys = corpus
            .labels()
            .iter()
            .map(|label| labels.encode(label))
            .collect::<Result<Vec<_>>>()?;
        log_stage(
            Stage::Vectorized,
            format_args!(
                "{} features, {} classes",
                vectorizer.n_features(),
                labels.n_classes()
            ),
        );

        let split = StratifiedSplit::new(&ys, labels.n_classes(), &self.config.split)?;
        log_stage(
            Stage::Split,
            format_args!("{} train, {} test", split.train().len(), split.test().len()),
        );

        let mut trainer = ClassifierTrainer::new(vectorizer.n_features(), labels.n_classes());
        for &i in split.train() {
            trainer.push_example(&xs[i], ys[i])?;
        }
        let model = trainer.train(&self.config.trainer)?;
        log_stage(Stage::Fit, format_args!("{} classes", model.n_classes()));

        let evaluation = if split.test().is_empty() {
            tracing::info!("no held-out examples; evaluation skipped");
            None
        } else {
            let test_xs: Vec<_> = split.test().iter().map(|&i| xs[i].clone()).collect();
            let test_ys: Vec<_> = split.test().iter().map(|&i| ys[i]).collect();
            let evaluation = Evaluation::new(&model, &test_xs, &test_ys, &labels)?;
            log_stage(
                Stage::Evaluated,
                format_args!("accuracy {:.4}", evaluation.accuracy),
            );
            Some(evaluation)
        };

        Ok(TrainingOutcome {
            artifacts: Artifacts::new(model, vectorizer, labels)?,
            evaluation,
        })
    }

    /// Trains a model and saves the artifacts into `model_dir`.
    ///
    /// Nothing is written unless every stage succeeded.
    ///
    /// # Errors
    ///
    /// The first error of any stage aborts the run.
    pub fn run<P>(&self, corpus: &Corpus, model_dir: P) -> Result<TrainingOutcome>
    where
        P: AsRef<Path>,
    {
        let outcome = self.fit(corpus)?;
        outcome.artifacts.save(&model_dir)?;
        log_stage(
            Stage::Persisted,
            format_args!("{}", model_dir.as_ref().display()),
        );
        Ok(outcome)
    }
}

fn log_stage(stage: Stage, detail: fmt::Arguments<'_>) {
    tracing::info!("{stage}: {detail}");
}
