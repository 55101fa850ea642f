use std::collections::BTreeMap;
use std::io::{Read, Write};

use bincode::{Decode, Encode};
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, VersoError};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Configuration of [`TfidfVectorizer`].
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct TfidfConfig {
    /// Minimum and maximum lengths of word n-grams.
    pub ngram_range: (usize, usize),

    /// Upper bound of the vocabulary size. `None` means unlimited.
    pub max_features: Option<usize>,

    /// N-grams that appear in fewer documents than this value are ignored.
    pub min_df: usize,

    /// N-grams that appear in a larger fraction of documents than this value are ignored.
    pub max_df: f64,

    /// Replaces a term frequency `tf` with `1 + ln(tf)`.
    pub sublinear_tf: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            max_features: Some(30000),
            min_df: 3,
            max_df: 0.9,
            sublinear_tf: true,
        }
    }
}

impl TfidfConfig {
    fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VersoError::invalid_argument(
                "ngram_range",
                format!("invalid range ({min_n}, {max_n})"),
            ));
        }
        if self.min_df == 0 {
            return Err(VersoError::invalid_argument("min_df", "must be at least 1"));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(VersoError::invalid_argument("max_df", "must be in (0, 1]"));
        }
        if self.max_features == Some(0) {
            return Err(VersoError::invalid_argument(
                "max_features",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Sparse feature vector holding `(feature index, weight)` pairs sorted by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureVector(Vec<(u32, f64)>);

impl FeatureVector {
    pub fn entries(&self) -> &[(u32, f64)] {
        &self.0
    }

    /// Returns `true` if all weights are zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.0
            .iter()
            .filter_map(|&(idx, w)| dense.get(idx as usize).map(|d| d * w))
            .sum()
    }

    pub fn into_entries(self) -> Vec<(u32, f64)> {
        self.0
    }
}

/// Splits a text into tokens of two or more word characters.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Generates word n-grams whose lengths are in `[min_n, max_n]`.
pub fn word_ngrams(tokens: &[&str], (min_n, max_n): (usize, usize)) -> Vec<String> {
    let mut ngrams = vec![];
    for n in min_n..=max_n.min(tokens.len()) {
        for window in tokens.windows(n) {
            ngrams.push(window.join(" "));
        }
    }
    ngrams
}

/// TF-IDF vectorizer over word n-grams.
///
/// # Examples
///
/// ```
/// use verso::{TfidfConfig, TfidfVectorizer};
///
/// let config = TfidfConfig {
///     min_df: 1,
///     max_df: 1.0,
///     ..TfidfConfig::default()
/// };
/// let docs = ["we will rock you", "we are the champions"];
/// let (vectorizer, xs) = TfidfVectorizer::fit_transform(&docs, config).unwrap();
/// assert_eq!(2, xs.len());
/// assert!(vectorizer.transform("we will").entries().len() > 0);
/// ```
#[derive(Clone, Debug, Decode, Encode, PartialEq)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    // Sorted to keep feature indices independent of corpus order.
    vocabulary: BTreeMap<String, u32>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fits the vocabulary and IDF weights, and transforms the given corpus.
    ///
    /// # Arguments
    ///
    /// * `docs` - Stemmed documents.
    /// * `config` - Vectorizer configuration.
    ///
    /// # Returns
    ///
    /// A fitted vectorizer and one feature vector per document.
    ///
    /// # Errors
    ///
    /// [`VersoError::InvalidArgument`] will be returned if the corpus is empty, if the document
    /// frequency thresholds contradict each other, or if no n-gram survives pruning.
    pub fn fit_transform<S>(docs: &[S], config: TfidfConfig) -> Result<(Self, Vec<FeatureVector>)>
    where
        S: AsRef<str>,
    {
        config.validate()?;
        if docs.is_empty() {
            return Err(VersoError::invalid_argument("docs", "the corpus is empty"));
        }

        let doc_counts: Vec<HashMap<String, u32>> = docs
            .iter()
            .map(|doc| count_ngrams(doc.as_ref(), config.ngram_range))
            .collect();

        let mut dfs: HashMap<&str, usize> = HashMap::new();
        let mut tfs: HashMap<&str, u64> = HashMap::new();
        for counts in &doc_counts {
            for (ngram, &count) in counts {
                *dfs.entry(ngram.as_str()).or_insert(0) += 1;
                *tfs.entry(ngram.as_str()).or_insert(0) += u64::from(count);
            }
        }
        if dfs.is_empty() {
            return Err(VersoError::invalid_argument(
                "docs",
                "empty vocabulary; the documents contain no tokens",
            ));
        }

        let n_docs = docs.len();
        let max_doc_count = config.max_df * n_docs as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(VersoError::invalid_argument(
                "max_df",
                format!(
                    "max_df corresponds to {max_doc_count} documents, fewer than min_df ({})",
                    config.min_df
                ),
            ));
        }

        let mut kept: Vec<(&str, u64)> = dfs
            .iter()
            .filter(|&(_, &df)| df >= config.min_df && df as f64 <= max_doc_count)
            .map(|(&ngram, _)| (ngram, tfs[ngram]))
            .collect();
        if kept.is_empty() {
            return Err(VersoError::invalid_argument(
                "min_df",
                "no n-grams remain after pruning; try a lower min_df or a higher max_df",
            ));
        }
        if let Some(max_features) = config.max_features {
            if kept.len() > max_features {
                kept.sort_unstable_by(|(n1, c1), (n2, c2)| c2.cmp(c1).then_with(|| n1.cmp(n2)));
                kept.truncate(max_features);
            }
        }

        let mut vocabulary: BTreeMap<String, u32> =
            kept.iter().map(|&(ngram, _)| (ngram.to_string(), 0)).collect();
        let mut idf = Vec::with_capacity(vocabulary.len());
        for (i, (ngram, idx)) in vocabulary.iter_mut().enumerate() {
            *idx = u32::try_from(i).map_err(|_| {
                VersoError::invalid_argument("max_features", "too many features")
            })?;
            let df = dfs[ngram.as_str()] as f64;
            idf.push(((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0);
        }
        tracing::debug!(
            "vocabulary: {} n-grams kept out of {}",
            vocabulary.len(),
            dfs.len()
        );

        let vectorizer = Self {
            config,
            vocabulary,
            idf,
        };
        let xs = doc_counts
            .iter()
            .map(|counts| vectorizer.weigh(counts))
            .collect();
        Ok((vectorizer, xs))
    }

    /// Transforms a stemmed document into a feature vector using the fitted vocabulary.
    ///
    /// N-grams unknown to the vocabulary are ignored, so an empty or entirely unknown document
    /// results in a zero vector.
    pub fn transform(&self, doc: &str) -> FeatureVector {
        self.weigh(&count_ngrams(doc, self.config.ngram_range))
    }

    fn weigh(&self, counts: &HashMap<String, u32>) -> FeatureVector {
        let mut entries: Vec<(u32, f64)> = counts
            .iter()
            .filter_map(|(ngram, &count)| {
                let idx = *self.vocabulary.get(ngram.as_str())?;
                let tf = if self.config.sublinear_tf {
                    1.0 + f64::from(count).ln()
                } else {
                    f64::from(count)
                };
                Some((idx, tf * self.idf[idx as usize]))
            })
            .collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }
        FeatureVector(entries)
    }

    /// Gets the number of features.
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    /// Returns the feature index of an n-gram.
    pub fn feature_index(&self, ngram: &str) -> Option<u32> {
        self.vocabulary.get(ngram).copied()
    }

    /// Iterates over `(n-gram, feature index, idf)` in feature index order.
    pub fn iter_features(&self) -> impl Iterator<Item = (&str, u32, f64)> + '_ {
        self.vocabulary
            .iter()
            .map(|(ngram, &idx)| (ngram.as_str(), idx, self.idf[idx as usize]))
    }

    /// Exports the vectorizer.
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

    /// Creates a vectorizer from a reader.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error or contains broken data, it will be returned.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let vectorizer: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        if vectorizer.vocabulary.len() != vectorizer.idf.len() {
            return Err(VersoError::invalid_model(
                "vocabulary and idf sizes differ",
            ));
        }
        Ok(vectorizer)
    }
}

fn count_ngrams(doc: &str, ngram_range: (usize, usize)) -> HashMap<String, u32> {
    let tokens = tokenize(doc);
    let mut counts = HashMap::new();
    for ngram in word_ngrams(&tokens, ngram_range) {
        *counts.entry(ngram).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose_config() -> TfidfConfig {
        TfidfConfig {
            min_df: 1,
            max_df: 1.0,
            ..TfidfConfig::default()
        }
    }

    fn assert_unit_norm(x: &FeatureVector) {
        let norm: f64 = x.entries().iter().map(|(_, w)| w * w).sum();
        assert!((norm - 1.0).abs() < 1e-9, "norm: {norm}");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            vec!["we", "will", "rock", "you"],
            tokenize("we will rock you a")
        );
        assert!(tokenize("").is_empty());
        assert!(tokenize("a b c").is_empty());
    }

    #[test]
    fn test_word_ngrams() {
        let expected = vec!["love me", "me do"];
        assert_eq!(expected, word_ngrams(&["love", "me", "do"], (2, 2)));

        let expected = vec!["love", "me", "do", "love me", "me do"];
        assert_eq!(expected, word_ngrams(&["love", "me", "do"], (1, 2)));

        assert!(word_ngrams(&["solo"], (2, 2)).is_empty());
    }

    #[test]
    fn test_fit_transform_vocabulary() {
        let docs = ["la la land", "la vie en rose"];
        let (vectorizer, xs) = TfidfVectorizer::fit_transform(&docs, loose_config()).unwrap();

        let ngrams: Vec<&str> = vectorizer.iter_features().map(|(n, _, _)| n).collect();
        let expected = vec![
            "en", "en rose", "la", "la la", "la land", "la vie", "land", "rose", "vie", "vie en",
        ];
        assert_eq!(expected, ngrams);
        for (i, (_, idx, _)) in vectorizer.iter_features().enumerate() {
            assert_eq!(i as u32, idx);
        }
        assert_eq!(10, vectorizer.n_features());
        assert_eq!(2, xs.len());
        xs.iter().for_each(assert_unit_norm);
    }

    #[test]
    fn test_fit_transform_weights() {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            ..loose_config()
        };
        let docs = ["aa aa bb", "bb cc"];
        let (vectorizer, xs) = TfidfVectorizer::fit_transform(&docs, config).unwrap();

        let idf_aa = (3.0f64 / 2.0).ln() + 1.0;
        let idf_bb = 1.0;
        let w_aa = (1.0 + 2f64.ln()) * idf_aa;
        let w_bb = idf_bb;
        let norm = (w_aa * w_aa + w_bb * w_bb).sqrt();

        let aa = vectorizer.feature_index("aa").unwrap();
        let bb = vectorizer.feature_index("bb").unwrap();
        let entries = xs[0].entries();
        assert_eq!(2, entries.len());
        assert_eq!(aa, entries[0].0);
        assert_eq!(bb, entries[1].0);
        assert!((entries[0].1 - w_aa / norm).abs() < 1e-12);
        assert!((entries[1].1 - w_bb / norm).abs() < 1e-12);
    }

    #[test]
    fn test_fit_transform_raw_tf() {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            sublinear_tf: false,
            ..loose_config()
        };
        let docs = ["aa aa aa bb", "aa bb"];
        let (_, xs) = TfidfVectorizer::fit_transform(&docs, config).unwrap();
        let entries = xs[0].entries();
        assert!((entries[0].1 / entries[1].1 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_transform_min_df() {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            min_df: 2,
            max_df: 1.0,
            ..TfidfConfig::default()
        };
        let docs = ["common rare", "common", "common other"];
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&docs, config).unwrap();
        assert_eq!(1, vectorizer.n_features());
        assert_eq!(Some(0), vectorizer.feature_index("common"));
    }

    #[test]
    fn test_fit_transform_max_df() {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 0.5,
            ..TfidfConfig::default()
        };
        let docs = ["oh yeah", "oh baby", "oh no", "yeah yeah"];
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&docs, config).unwrap();
        assert_eq!(None, vectorizer.feature_index("oh"));
        assert!(vectorizer.feature_index("yeah").is_some());
    }

    #[test]
    fn test_fit_transform_max_features() {
        let config = TfidfConfig {
            ngram_range: (1, 1),
            max_features: Some(2),
            ..loose_config()
        };
        let docs = ["zz zz zz yy yy xx", "ww ww xx"];
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&docs, config).unwrap();
        let ngrams: Vec<&str> = vectorizer.iter_features().map(|(n, _, _)| n).collect();
        assert_eq!(vec!["ww", "zz"], ngrams);
    }

    #[test]
    fn test_fit_transform_order_independent() {
        let docs = ["rock and roll", "roll with it", "rock the boat"];
        let reversed = ["rock the boat", "roll with it", "rock and roll"];
        let (v1, xs1) = TfidfVectorizer::fit_transform(&docs, loose_config()).unwrap();
        let (v2, xs2) = TfidfVectorizer::fit_transform(&reversed, loose_config()).unwrap();
        assert_eq!(
            v1.iter_features().collect::<Vec<_>>(),
            v2.iter_features().collect::<Vec<_>>()
        );
        assert_eq!(xs1[0], xs2[2]);
    }

    #[test]
    fn test_fit_transform_empty_corpus() {
        let docs: [&str; 0] = [];
        assert!(TfidfVectorizer::fit_transform(&docs, loose_config()).is_err());
    }

    #[test]
    fn test_fit_transform_contradicting_thresholds() {
        let docs = ["one song", "another song"];
        let result = TfidfVectorizer::fit_transform(&docs, TfidfConfig::default());
        assert!(matches!(
            result,
            Err(VersoError::InvalidArgument { arg: "max_df", .. })
        ));
    }

    #[test]
    fn test_fit_transform_nothing_survives() {
        let config = TfidfConfig {
            min_df: 3,
            max_df: 1.0,
            ..TfidfConfig::default()
        };
        let docs = ["alpha", "beta", "gamma"];
        let result = TfidfVectorizer::fit_transform(&docs, config);
        assert!(matches!(
            result,
            Err(VersoError::InvalidArgument { arg: "min_df", .. })
        ));
    }

    #[test]
    fn test_fit_transform_invalid_config() {
        let config = TfidfConfig {
            ngram_range: (2, 1),
            ..loose_config()
        };
        assert!(TfidfVectorizer::fit_transform(&["aa bb"], config).is_err());
    }

    #[test]
    fn test_transform_unknown_ngrams() {
        let docs = ["hold the line", "love is a battlefield"];
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&docs, loose_config()).unwrap();
        assert!(vectorizer.transform("completely different words").is_zero());
        assert!(vectorizer.transform("").is_zero());
    }

    #[test]
    fn test_transform_deterministic() {
        let docs = ["hold the line", "love is a battlefield"];
        let (vectorizer, xs) = TfidfVectorizer::fit_transform(&docs, loose_config()).unwrap();
        assert_eq!(xs[0], vectorizer.transform("hold the line"));
        assert_eq!(
            vectorizer.transform("line the hold"),
            vectorizer.transform("line the hold")
        );
        assert_unit_norm(&vectorizer.transform("hold unknown line"));
    }

    #[test]
    fn test_feature_vector_dot() {
        let x = FeatureVector(vec![(0, 0.5), (2, 2.0), (9, 1.0)]);
        assert_eq!(0.5 * 2.0 + 2.0 * 3.0, x.dot(&[2.0, 7.0, 3.0]));
    }

    #[test]
    fn test_write_read() {
        let docs = ["hold the line", "love is a battlefield"];
        let (vectorizer, _) = TfidfVectorizer::fit_transform(&docs, loose_config()).unwrap();
        let mut buf = vec![];
        vectorizer.write(&mut buf).unwrap();
        let restored = TfidfVectorizer::read(&mut buf.as_slice()).unwrap();
        assert_eq!(vectorizer.config(), restored.config());
        assert_eq!(
            vectorizer.transform("love the line"),
            restored.transform("love the line")
        );
    }
}
