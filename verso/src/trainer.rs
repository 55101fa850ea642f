use liblinear::LibLinearModel;

use crate::errors::{Result, VersoError};
use crate::model::LinearModel;
use crate::vectorizer::FeatureVector;

/// Class weighting scheme.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassWeight {
    /// Every class has weight 1.
    Uniform,

    /// Weights inversely proportional to class frequencies:
    /// `n_samples / (n_classes * count(class))`.
    Balanced,
}

/// Configuration of [`ClassifierTrainer`].
///
/// The number of solver iterations is bounded by LIBLINEAR's own cap, which cannot be configured.
/// Reaching it is not an error; the last solution is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainerConfig {
    /// The parameter C. Smaller values mean stronger regularization.
    pub cost: f64,

    /// The tolerance of the termination criterion.
    pub epsilon: f64,

    pub class_weight: ClassWeight,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            cost: 0.1,
            epsilon: 1e-4,
            class_weight: ClassWeight::Balanced,
        }
    }
}

/// Trainer of [`LinearModel`].
///
/// Training solves an L2-regularized L2-loss support vector classification problem in the dual
/// for each class against the rest, with an intercept learned through a constant bias feature.
///
/// # Examples
///
/// ```
/// use verso::{ClassifierTrainer, TfidfConfig, TfidfVectorizer, TrainerConfig};
///
/// let docs = ["rock the night away", "dance all night long"];
/// let config = TfidfConfig { min_df: 1, max_df: 1.0, ..TfidfConfig::default() };
/// let (vectorizer, xs) = TfidfVectorizer::fit_transform(&docs, config).unwrap();
///
/// let mut trainer = ClassifierTrainer::new(vectorizer.n_features(), 2);
/// for (x, y) in xs.iter().zip([0, 1]) {
///     trainer.push_example(x, y).unwrap();
/// }
/// let model = trainer.train(&TrainerConfig::default()).unwrap();
/// assert_eq!(1, model.predict(&vectorizer.transform("dance dance")));
/// ```
pub struct ClassifierTrainer {
    n_features: usize,
    n_classes: usize,
    xs: Vec<Vec<(u32, f64)>>,
    ys: Vec<f64>,
    class_counts: Vec<usize>,
}

impl ClassifierTrainer {
    /// Creates a new trainer.
    ///
    /// # Arguments
    ///
    /// * `n_features` - The dimension of feature vectors.
    /// * `n_classes` - The number of classes.
    pub fn new(n_features: usize, n_classes: usize) -> Self {
        Self {
            n_features,
            n_classes,
            xs: vec![],
            ys: vec![],
            class_counts: vec![0; n_classes],
        }
    }

    /// Adds an example to the dataset.
    ///
    /// # Errors
    ///
    /// [`VersoError::IndexOutOfRange`] will be returned if `y` is not a class index.
    pub fn push_example(&mut self, x: &FeatureVector, y: usize) -> Result<()> {
        let count = self
            .class_counts
            .get_mut(y)
            .ok_or(VersoError::IndexOutOfRange {
                index: y,
                n_classes: self.n_classes,
            })?;
        *count += 1;
        // LIBLINEAR feature indices start from 1.
        self.xs.push(
            x.entries()
                .iter()
                .filter(|&&(idx, _)| (idx as usize) < self.n_features)
                .map(|&(idx, w)| (idx + 1, w))
                .collect(),
        );
        self.ys.push(y as f64);
        Ok(())
    }

    /// Gets the number of examples.
    pub fn n_examples(&self) -> usize {
        self.ys.len()
    }

    fn class_weights(&self, scheme: ClassWeight) -> Vec<(i32, f64)> {
        let n_present = self.class_counts.iter().filter(|&&c| c != 0).count();
        let n_samples = self.ys.len() as f64;
        self.class_counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count != 0)
            .map(|(cls, &count)| {
                let weight = match scheme {
                    ClassWeight::Uniform => 1.0,
                    ClassWeight::Balanced => n_samples / (n_present as f64 * count as f64),
                };
                (cls as i32, weight)
            })
            .collect()
    }

    /// Trains a model.
    ///
    /// # Errors
    ///
    /// [`VersoError::InvalidArgument`] will be returned if fewer than two classes have examples,
    /// and [`VersoError::InvalidModel`] if the solver fails.
    pub fn train(self, config: &TrainerConfig) -> Result<LinearModel> {
        let n_present = self.class_counts.iter().filter(|&&c| c != 0).count();
        if n_present < 2 {
            return Err(VersoError::invalid_argument(
                "labels",
                format!("at least 2 classes are required, but {n_present} given"),
            ));
        }
        let weights = self.class_weights(config.class_weight);
        tracing::debug!("class weights: {weights:?}");

        let mut builder = liblinear::Builder::new();
        let training_input = liblinear::util::TrainingInput::from_sparse_features(self.ys, self.xs)
            .map_err(|e| VersoError::invalid_model(format!("liblinear error: {e:?}")))?;
        builder.problem().input_data(training_input).bias(1.0);
        builder
            .parameters()
            .solver_type(liblinear::SolverType::L2R_L2LOSS_SVC_DUAL)
            .stopping_criterion(config.epsilon)
            .constraints_violation_cost(config.cost)
            .cost_penalty_labels(weights.iter().map(|&(cls, _)| cls).collect())
            .cost_penalty_weights(weights.iter().map(|&(_, w)| w).collect());
        liblinear::toggle_liblinear_stdout_output(false);
        let model = builder.build_model();
        liblinear::toggle_liblinear_stdout_output(true);
        let model = model.map_err(|e| VersoError::invalid_model(e.to_string()))?;

        // Classes without examples never win.
        let mut class_weights = vec![vec![0.0; self.n_features]; self.n_classes];
        let mut bias = vec![f64::NEG_INFINITY; self.n_classes];
        let n_model_features = usize::try_from(model.num_features())
            .unwrap_or(usize::MAX)
            .min(self.n_features);
        for (i, &cls) in model.labels().iter().enumerate() {
            let label_idx = i32::try_from(i)
                .map_err(|_| VersoError::invalid_model("too many classes"))?;
            let cls = usize::try_from(cls)
                .map_err(|_| VersoError::invalid_model(format!("invalid class {cls}")))?;
            bias[cls] = model.label_bias(label_idx);
            for (fid, w) in class_weights[cls].iter_mut().enumerate().take(n_model_features) {
                let fid = i32::try_from(fid + 1)
                    .map_err(|_| VersoError::invalid_model("too many features"))?;
                *w = model.feature_coefficient(fid, label_idx);
            }
        }
        LinearModel::new(class_weights, bias, self.n_features)
    }
}
