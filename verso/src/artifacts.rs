use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::{Result, VersoError};
use crate::label::LabelEncoder;
use crate::model::LinearModel;
use crate::vectorizer::TfidfVectorizer;

pub const MODEL_FILE: &str = "genre_model.bin.zst";
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.bin.zst";
pub const LABELS_FILE: &str = "label_encoder.bin.zst";

const ZSTD_LEVEL: i32 = 19;

/// The trained model, the fitted vectorizer, and the label encoder, which are only meaningful
/// together.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifacts {
    pub model: LinearModel,
    pub vectorizer: TfidfVectorizer,
    pub labels: LabelEncoder,
}

impl Artifacts {
    /// Bundles the three artifacts.
    ///
    /// # Errors
    ///
    /// [`VersoError::InvalidModel`] will be returned if the model disagrees with the vectorizer on
    /// the number of features or with the label encoder on the number of classes.
    pub fn new(
        model: LinearModel,
        vectorizer: TfidfVectorizer,
        labels: LabelEncoder,
    ) -> Result<Self> {
        let artifacts = Self {
            model,
            vectorizer,
            labels,
        };
        artifacts.check_dimensions()?;
        Ok(artifacts)
    }

    fn check_dimensions(&self) -> Result<()> {
        if self.model.n_features() != self.vectorizer.n_features() {
            return Err(VersoError::invalid_model(format!(
                "the model has {} features, but the vectorizer has {}",
                self.model.n_features(),
                self.vectorizer.n_features()
            )));
        }
        if self.model.n_classes() != self.labels.n_classes() {
            return Err(VersoError::invalid_model(format!(
                "the model has {} classes, but the label encoder has {}",
                self.model.n_classes(),
                self.labels.n_classes()
            )));
        }
        Ok(())
    }

    /// Writes the artifacts into a directory, creating it if necessary.
    ///
    /// Files are first written under temporary names and put in place only after all of them
    /// were written. If putting one in place fails, the files already replaced are restored, so
    /// the directory never mixes old and new artifacts.
    ///
    /// # Errors
    ///
    /// I/O and encoding errors are returned as is.
    pub fn save<P>(&self, dir: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let names = [MODEL_FILE, VECTORIZER_FILE, LABELS_FILE];
        let targets = names.map(|name| dir.join(name));
        let temps = names.map(|name| dir.join(format!(".{name}.tmp")));
        let backups = names.map(|name| dir.join(format!(".{name}.bak")));

        let result = self
            .write_temps(&temps)
            .and_then(|()| replace_files(&temps, &targets, &backups));
        for temp in &temps {
            let _ = fs::remove_file(temp);
        }
        result?;
        for backup in &backups {
            let _ = fs::remove_file(backup);
        }
        tracing::info!("artifacts saved to {}", dir.display());
        Ok(())
    }

    fn write_temps(&self, temps: &[PathBuf; 3]) -> Result<()> {
        write_compressed(&temps[0], |wtr| self.model.write(wtr))?;
        write_compressed(&temps[1], |wtr| self.vectorizer.write(wtr))?;
        write_compressed(&temps[2], |wtr| self.labels.write(wtr))?;
        Ok(())
    }

    /// Reads the artifacts from a directory.
    ///
    /// # Errors
    ///
    /// [`VersoError::Load`] will be returned if a file is missing or broken, and
    /// [`VersoError::InvalidModel`] if the artifacts disagree on their dimensions.
    pub fn load<P>(dir: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        let model = read_compressed(&dir.join(MODEL_FILE), |rdr| LinearModel::read(rdr))?;
        let vectorizer = read_compressed(&dir.join(VECTORIZER_FILE), |rdr| {
            TfidfVectorizer::read(rdr)
        })?;
        let labels = read_compressed(&dir.join(LABELS_FILE), |rdr| LabelEncoder::read(rdr))?;
        let artifacts = Self::new(model, vectorizer, labels)?;
        tracing::info!(
            "artifacts loaded from {}: {} features, {} classes",
            dir.display(),
            artifacts.vectorizer.n_features(),
            artifacts.labels.n_classes()
        );
        Ok(artifacts)
    }
}

// Moves existing targets aside, then moves temps into place. Every step is undone on failure.
fn replace_files(
    temps: &[PathBuf; 3],
    targets: &[PathBuf; 3],
    backups: &[PathBuf; 3],
) -> Result<()> {
    let mut backed_up = vec![];
    let mut installed = 0;
    let mut step = || -> Result<()> {
        for (i, (target, backup)) in targets.iter().zip(backups).enumerate() {
            if target.is_file() {
                fs::rename(target, backup)?;
                backed_up.push(i);
            }
        }
        for (temp, target) in temps.iter().zip(targets) {
            fs::rename(temp, target)?;
            installed += 1;
        }
        Ok(())
    };
    let result = step();
    if let Err(e) = &result {
        tracing::warn!("failed to replace artifacts, restoring previous files: {e}");
        for target in &targets[..installed] {
            let _ = fs::remove_file(target);
        }
        for &i in &backed_up {
            if let Err(e) = fs::rename(&backups[i], &targets[i]) {
                tracing::error!("failed to restore {}: {e}", targets[i].display());
            }
        }
    }
    result
}

fn write_compressed<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut zstd::Encoder<'static, BufWriter<File>>) -> Result<()>,
{
    let mut encoder = zstd::Encoder::new(BufWriter::new(File::create(path)?), ZSTD_LEVEL)?;
    write(&mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}

fn read_compressed<T, F>(path: &Path, read: F) -> Result<T>
where
    F: FnOnce(&mut zstd::Decoder<'static, BufReader<File>>) -> Result<T>,
{
    let read_file = || -> Result<T> {
        let mut decoder = zstd::Decoder::new(File::open(path)?)?;
        read(&mut decoder)
    };
    read_file().map_err(|e| VersoError::load(format!("{}: {e}", path.display())))
}
