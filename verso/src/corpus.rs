use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::errors::{Result, VersoError};

/// Column names of a corpus file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusColumns {
    pub text: String,
    pub label: String,
}

impl Default for CorpusColumns {
    fn default() -> Self {
        Self {
            text: "Lyrics".to_string(),
            label: "Genre".to_string(),
        }
    }
}

/// Labeled lyrics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    texts: Vec<String>,
    labels: Vec<String>,
}

impl Corpus {
    /// Creates a corpus from parallel lists of texts and labels.
    ///
    /// # Errors
    ///
    /// [`VersoError::InvalidArgument`] will be returned if the lengths differ.
    pub fn new(texts: Vec<String>, labels: Vec<String>) -> Result<Self> {
        if texts.len() != labels.len() {
            return Err(VersoError::invalid_argument(
                "labels",
                format!("{} labels for {} texts", labels.len(), texts.len()),
            ));
        }
        Ok(Self { texts, labels })
    }

    /// Reads a CSV corpus with a header row.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    /// * `columns` - Names of the text and label columns.
    ///
    /// # Errors
    ///
    /// [`VersoError::Load`] will be returned if the data is not valid CSV, if a column is
    /// missing, or if a text or label cell is empty.
    pub fn from_reader<R>(rdr: R, columns: &CorpusColumns) -> Result<Self>
    where
        R: Read,
    {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(rdr);
        let headers = rdr
            .headers()
            .map_err(|e| VersoError::load(format!("failed to read the header: {e}")))?;
        let column_index = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| VersoError::load(format!("column {name:?} not found")))
        };
        let text_idx = column_index(&columns.text)?;
        let label_idx = column_index(&columns.label)?;

        let mut texts = vec![];
        let mut labels = vec![];
        for (i, record) in rdr.records().enumerate() {
            // The header is on line 1.
            let row = i + 2;
            let record = record.map_err(|e| VersoError::load(format!("row {row}: {e}")))?;
            let cell = |idx: usize, name: &str| match record.get(idx) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(VersoError::load(format!("row {row}: {name:?} is empty"))),
            };
            texts.push(cell(text_idx, &columns.text)?);
            labels.push(cell(label_idx, &columns.label)?);
        }
        tracing::debug!("read {} rows", texts.len());
        Ok(Self { texts, labels })
    }

    /// Reads a CSV corpus from a file.
    ///
    /// # Errors
    ///
    /// See [`Self::from_reader()`]. A file that cannot be opened is also reported as
    /// [`VersoError::Load`].
    pub fn read_csv<P>(path: P, columns: &CorpusColumns) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| VersoError::load(format!("{}: {e}", path.display())))?;
        Self::from_reader(file, columns)
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Gets the number of rows.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
