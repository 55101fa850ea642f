use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::errors::{Result, VersoError};

/// Configuration of [`StratifiedSplit`].
#[derive(Clone, Debug, PartialEq)]
pub struct SplitConfig {
    /// The proportion of examples held out for evaluation, in `[0, 1)`.
    pub test_size: f64,

    /// The seed of the shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

/// Train/test partition of example indices that preserves class proportions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StratifiedSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl StratifiedSplit {
    /// Splits examples by their class indices.
    ///
    /// The number of test examples is `ceil(test_size * n)`. Each class receives its proportional
    /// share, the leftover slots going to the classes with the largest remainders, and every class
    /// keeps at least one training example.
    ///
    /// # Arguments
    ///
    /// * `ys` - The class index of each example.
    /// * `n_classes` - The number of classes.
    /// * `config` - Split configuration.
    ///
    /// # Errors
    ///
    /// [`VersoError::InvalidArgument`] will be returned if `test_size` is out of range, if a class
    /// has fewer than two examples, or if either side would be smaller than the number of classes.
    pub fn new(ys: &[usize], n_classes: usize, config: &SplitConfig) -> Result<Self> {
        if !(0.0..1.0).contains(&config.test_size) {
            return Err(VersoError::invalid_argument(
                "test_size",
                format!("must be in [0, 1), but {} given", config.test_size),
            ));
        }
        let mut members = vec![vec![]; n_classes];
        for (i, &y) in ys.iter().enumerate() {
            members
                .get_mut(y)
                .ok_or(VersoError::IndexOutOfRange {
                    index: y,
                    n_classes,
                })?
                .push(i);
        }
        let n = ys.len();
        let n_test = (config.test_size * n as f64).ceil() as usize;
        if n_test == 0 {
            return Ok(Self {
                train: (0..n).collect(),
                test: vec![],
            });
        }
        if let Some(cls) = members.iter().position(|m| m.len() < 2) {
            return Err(VersoError::invalid_argument(
                "labels",
                format!("class {cls} has fewer than 2 examples"),
            ));
        }
        if n_test < n_classes || n - n_test < n_classes {
            return Err(VersoError::invalid_argument(
                "test_size",
                format!(
                    "{n_test} test and {} train examples cannot cover {n_classes} classes",
                    n - n_test
                ),
            ));
        }

        let allocation = allocate(&members, n_test);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut train = Vec::with_capacity(n - n_test);
        let mut test = Vec::with_capacity(n_test);
        for (mut m, n_cls_test) in members.into_iter().zip(allocation) {
            m.shuffle(&mut rng);
            test.extend_from_slice(&m[..n_cls_test]);
            train.extend_from_slice(&m[n_cls_test..]);
        }
        train.sort_unstable();
        test.sort_unstable();
        Ok(Self { train, test })
    }

    /// Indices of the training examples in ascending order.
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Indices of the test examples in ascending order.
    pub fn test(&self) -> &[usize] {
        &self.test
    }
}

// Largest remainder apportionment of n_test slots, capped at count - 1 per class.
fn allocate(members: &[Vec<usize>], n_test: usize) -> Vec<usize> {
    let n: usize = members.iter().map(Vec::len).sum();
    let mut allocation = Vec::with_capacity(members.len());
    let mut remainders = Vec::with_capacity(members.len());
    for (cls, m) in members.iter().enumerate() {
        let ideal = n_test as f64 * m.len() as f64 / n as f64;
        let base = ideal.floor();
        allocation.push((base as usize).min(m.len() - 1));
        remainders.push((cls, ideal - base));
    }
    remainders.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut rest = n_test - allocation.iter().sum::<usize>();
    while rest != 0 {
        let mut progressed = false;
        for &(cls, _) in &remainders {
            if rest == 0 {
                break;
            }
            if allocation[cls] + 1 < members[cls].len() {
                allocation[cls] += 1;
                rest -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    allocation
}
