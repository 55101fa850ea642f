use std::collections::BTreeSet;
use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, VersoError};

/// Bidirectional mapping between genre labels and class indices.
///
/// Classes are numbered in lexicographic order of their labels.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fits an encoder on the observed labels.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Returns the class index of a label.
    ///
    /// # Errors
    ///
    /// [`VersoError::UnknownLabel`] will be returned if the label was not seen by [`Self::fit()`].
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .map_err(|_| VersoError::UnknownLabel(label.to_string()))
    }

    /// Returns the label of a class index.
    ///
    /// # Errors
    ///
    /// [`VersoError::IndexOutOfRange`] will be returned if `index` is not a class index.
    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(VersoError::IndexOutOfRange {
                index,
                n_classes: self.classes.len(),
            })
    }

    /// Gets the number of classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Exports the encoder.
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

    /// Creates an encoder from a reader.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error or contains broken data, it will be returned.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let encoder: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        if encoder.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(VersoError::invalid_model("labels are not sorted"));
        }
        Ok(encoder)
    }
}
