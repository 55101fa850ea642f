use core::fmt;

use crate::errors::{Result, VersoError};
use crate::label::LabelEncoder;
use crate::model::LinearModel;
use crate::vectorizer::FeatureVector;

/// Scores of one class.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassReport {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,

    /// The number of examples of this class.
    pub support: usize,
}

/// Result of scoring a model on labeled examples.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub accuracy: f64,
    pub n_samples: usize,
    pub classes: Vec<ClassReport>,
}

impl Evaluation {
    /// Scores a model.
    ///
    /// Ratios with a zero denominator are reported as 0.
    ///
    /// # Arguments
    ///
    /// * `model` - A trained model.
    /// * `xs` - Feature vectors.
    /// * `ys` - The true class index of each feature vector.
    /// * `labels` - The label encoder used to name the classes.
    ///
    /// # Errors
    ///
    /// [`VersoError::InvalidArgument`] will be returned if `xs` and `ys` differ in length, and
    /// [`VersoError::IndexOutOfRange`] if a class index is not known to `labels`.
    pub fn new(
        model: &LinearModel,
        xs: &[FeatureVector],
        ys: &[usize],
        labels: &LabelEncoder,
    ) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(VersoError::invalid_argument(
                "ys",
                format!("{} labels for {} examples", ys.len(), xs.len()),
            ));
        }
        let n_classes = labels.n_classes();
        let mut true_positives = vec![0usize; n_classes];
        let mut predicted = vec![0usize; n_classes];
        let mut support = vec![0usize; n_classes];
        for (x, &y) in xs.iter().zip(ys) {
            let pred = model.predict(x);
            for cls in [y, pred] {
                if cls >= n_classes {
                    return Err(VersoError::IndexOutOfRange {
                        index: cls,
                        n_classes,
                    });
                }
            }
            support[y] += 1;
            predicted[pred] += 1;
            if pred == y {
                true_positives[y] += 1;
            }
        }

        let mut classes = Vec::with_capacity(n_classes);
        for (cls, label) in labels.classes().iter().enumerate() {
            let precision = ratio(true_positives[cls], predicted[cls]);
            let recall = ratio(true_positives[cls], support[cls]);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            classes.push(ClassReport {
                label: label.clone(),
                precision,
                recall,
                f1,
                support: support[cls],
            });
        }
        Ok(Self {
            accuracy: ratio(true_positives.iter().sum(), ys.len()),
            n_samples: ys.len(),
            classes,
        })
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(5);
        writeln!(
            f,
            "{:width$}  precision  recall  f1-score  support",
            "genre"
        )?;
        for c in &self.classes {
            writeln!(
                f,
                "{:width$}  {:9.4}  {:6.4}  {:8.4}  {:7}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        write!(
            f,
            "accuracy: {:.4} ({} samples)",
            self.accuracy, self.n_samples
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::vectorizer::{TfidfConfig, TfidfVectorizer};

    // Features: aa (0), bb (1), cc (2). Class i fires on feature i.
    fn setup() -> (LinearModel, TfidfVectorizer, LabelEncoder) {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            ..TfidfConfig::default()
        };
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&["aa", "bb", "cc"], config).unwrap();
        let model = LinearModel::new(
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            vec![0.0; 3],
            3,
        )
        .unwrap();
        let labels = LabelEncoder::fit(["Country", "Pop", "Rock"]);
        (model, vectorizer, labels)
    }

    #[test]
    fn test_evaluation() {
        let (model, vectorizer, labels) = setup();
        let xs: Vec<_> = ["aa", "aa", "bb", "aa", "cc"]
            .iter()
            .map(|doc| vectorizer.transform(doc))
            .collect();
        let ys = [0, 0, 1, 1, 1];
        let evaluation = Evaluation::new(&model, &xs, &ys, &labels).unwrap();

        assert_eq!(5, evaluation.n_samples);
        assert_eq!(0.6, evaluation.accuracy);

        let country = &evaluation.classes[0];
        assert_eq!("Country", country.label);
        assert_eq!(2.0 / 3.0, country.precision);
        assert_eq!(1.0, country.recall);
        assert_eq!(2, country.support);

        let pop = &evaluation.classes[1];
        assert_eq!(1.0, pop.precision);
        assert_eq!(1.0 / 3.0, pop.recall);
        assert_eq!(3, pop.support);

        // Never correct, never supported.
        let rock = &evaluation.classes[2];
        assert_eq!(0.0, rock.precision);
        assert_eq!(0.0, rock.recall);
        assert_eq!(0.0, rock.f1);
        assert_eq!(0, rock.support);
    }

    #[test]
    fn test_evaluation_empty() {
        let (model, _, labels) = setup();
        let evaluation = Evaluation::new(&model, &[], &[], &labels).unwrap();
        assert_eq!(0.0, evaluation.accuracy);
        assert_eq!(3, evaluation.classes.len());
    }

    #[test]
    fn test_evaluation_length_mismatch() {
        let (model, vectorizer, labels) = setup();
        let xs = vec![vectorizer.transform("aa")];
        assert!(Evaluation::new(&model, &xs, &[0, 1], &labels).is_err());
    }

    #[test]
    fn test_evaluation_unknown_class() {
        let (model, vectorizer, labels) = setup();
        let xs = vec![vectorizer.transform("aa")];
        assert!(matches!(
            Evaluation::new(&model, &xs, &[5], &labels),
            Err(VersoError::IndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_display() {
        let (model, vectorizer, labels) = setup();
        let xs = vec![vectorizer.transform("aa")];
        let evaluation = Evaluation::new(&model, &xs, &[0], &labels).unwrap();
        let text = evaluation.to_string();
        assert!(text.starts_with("genre    precision"));
        assert!(text.ends_with("accuracy: 1.0000 (1 samples)"));
    }
}
