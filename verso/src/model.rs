use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, VersoError};
use crate::vectorizer::FeatureVector;

/// Linear one-vs-rest classifier.
///
/// Each class owns a weight vector over the feature space and a bias; the class with the highest
/// decision score wins.
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct LinearModel {
    // weights[class][feature]
    pub(crate) weights: Vec<Vec<f64>>,
    pub(crate) bias: Vec<f64>,
    pub(crate) n_features: usize,
}

impl LinearModel {
    /// Creates a model from per-class weights and biases.
    ///
    /// # Errors
    ///
    /// [`VersoError::InvalidModel`] will be returned if there is no class or if the sizes of the
    /// weights are inconsistent.
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>, n_features: usize) -> Result<Self> {
        let model = Self {
            weights,
            bias,
            n_features,
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(VersoError::invalid_model("the model has no class"));
        }
        if self.weights.len() != self.bias.len() {
            return Err(VersoError::invalid_model(
                "the numbers of weight vectors and biases differ",
            ));
        }
        if self.weights.iter().any(|w| w.len() != self.n_features) {
            return Err(VersoError::invalid_model(
                "the weight vector length differs from the number of features",
            ));
        }
        Ok(())
    }

    /// Computes decision scores of all classes.
    pub fn decision_function(&self, x: &FeatureVector) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| x.dot(w) + b)
            .collect()
    }

    /// Predicts the class index of a feature vector.
    ///
    /// Ties are resolved in favor of the smaller class index.
    pub fn predict(&self, x: &FeatureVector) -> usize {
        let scores = self.decision_function(x);
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = i;
            }
        }
        best
    }

    /// Gets the number of classes.
    pub fn n_classes(&self) -> usize {
        self.weights.len()
    }

    /// Gets the number of features.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Returns the weight vector of a class.
    pub fn class_weights(&self, class: usize) -> Option<&[f64]> {
        self.weights.get(class).map(Vec::as_slice)
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error or contains broken data, it will be returned.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::vectorizer::{TfidfConfig, TfidfVectorizer};

    fn feature_vector(docs: &[&str], doc: &str) -> FeatureVector {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            ..TfidfConfig::default()
        };
        let (vectorizer, _) = TfidfVectorizer::fit_transform(docs, config).unwrap();
        vectorizer.transform(doc)
    }

    #[test]
    fn test_new_invalid() {
        assert!(LinearModel::new(vec![], vec![], 2).is_err());
        assert!(LinearModel::new(vec![vec![0.0; 2]], vec![0.0, 1.0], 2).is_err());
        assert!(LinearModel::new(vec![vec![0.0; 3]], vec![0.0], 2).is_err());
    }

    #[test]
    fn test_predict() {
        // Features: aa (0), bb (1)
        let docs = ["aa", "bb"];
        let model = LinearModel::new(
            vec![vec![1.0, -1.0], vec![-1.0, 1.0], vec![0.0, 0.0]],
            vec![0.0, 0.0, 0.1],
            2,
        )
        .unwrap();
        assert_eq!(0, model.predict(&feature_vector(&docs, "aa")));
        assert_eq!(1, model.predict(&feature_vector(&docs, "bb")));
        assert_eq!(2, model.predict(&feature_vector(&docs, "cc")));
    }

    #[test]
    fn test_predict_tie() {
        let model = LinearModel::new(vec![vec![0.0], vec![0.0]], vec![0.5, 0.5], 1).unwrap();
        assert_eq!(0, model.predict(&FeatureVector::default()));
    }

    #[test]
    fn test_decision_function() {
        let model = LinearModel::new(vec![vec![2.0], vec![-2.0]], vec![0.5, -0.5], 1).unwrap();
        assert_eq!(
            vec![2.5, -2.5],
            model.decision_function(&feature_vector(&["aa"], "aa"))
        );
    }

    #[test]
    fn test_write_read() {
        let model = LinearModel::new(vec![vec![0.25, -1.5]], vec![0.125], 2).unwrap();
        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        assert_eq!(model, LinearModel::read(&mut buf.as_slice()).unwrap());
    }

    #[test]
    fn test_read_broken() {
        let buf = [1u8, 2, 3];
        assert!(LinearModel::read(&mut buf.as_slice()).is_err());
    }
}
