use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use verso::Artifacts;

#[derive(Parser, Debug)]
#[command(about = "A program to dump trained artifacts of Verso.")]
struct Args {
    /// The directory containing the trained artifacts
    #[arg(long)]
    model_dir: PathBuf,

    /// Output the vocabulary with IDF weights.
    #[arg(long)]
    dump_vocab: Option<PathBuf>,

    /// Output the highest weighted n-grams of each genre.
    #[arg(long)]
    dump_weights: Option<PathBuf>,

    /// The number of n-grams per genre written by --dump-weights
    #[arg(long, default_value = "20")]
    top_k: usize,
}

#[derive(Serialize)]
struct VocabRecord<'a> {
    ngram: &'a str,
    index: u32,
    idf: f64,
}

#[derive(Serialize)]
struct WeightRecord<'a> {
    genre: &'a str,
    rank: usize,
    ngram: &'a str,
    weight: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    tracing::info!("Loading artifacts...");
    let artifacts = Artifacts::load(&args.model_dir)?;
    println!(
        "{} features, {} genres: {}",
        artifacts.vectorizer.n_features(),
        artifacts.labels.n_classes(),
        artifacts.labels.classes().join(", ")
    );

    if let Some(path) = args.dump_vocab {
        tracing::info!("Saving vocabulary...");
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for (ngram, index, idf) in artifacts.vectorizer.iter_features() {
            wtr.serialize(VocabRecord { ngram, index, idf })?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_weights {
        tracing::info!("Saving weights...");
        let mut ngrams = vec![""; artifacts.vectorizer.n_features()];
        for (ngram, index, _) in artifacts.vectorizer.iter_features() {
            ngrams[index as usize] = ngram;
        }
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for (class, genre) in artifacts.labels.classes().iter().enumerate() {
            let Some(weights) = artifacts.model.class_weights(class) else {
                continue;
            };
            let mut ranked: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            for (rank, (fid, weight)) in ranked.into_iter().take(args.top_k).enumerate() {
                wtr.serialize(WeightRecord {
                    genre,
                    rank: rank + 1,
                    ngram: ngrams[fid],
                    weight,
                })?;
            }
        }
        wtr.flush()?;
    }

    Ok(())
}
