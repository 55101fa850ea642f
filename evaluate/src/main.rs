use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use verso::{
    clean, Artifacts, Corpus, CorpusColumns, Evaluation, LinguaOracle, MultilingualStemmer,
};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate trained artifacts of Verso on a labeled corpus.")]
struct Args {
    /// The directory containing the trained artifacts
    #[arg(long)]
    model_dir: PathBuf,

    /// A CSV corpus with a header row
    #[arg(long)]
    corpus: PathBuf,

    /// The column containing lyrics
    #[arg(long, default_value = "Lyrics")]
    text_column: String,

    /// The column containing genres
    #[arg(long, default_value = "Genre")]
    label_column: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    tracing::info!("Loading artifacts...");
    let artifacts = Artifacts::load(&args.model_dir)?;

    tracing::info!("Loading corpus...");
    let columns = CorpusColumns {
        text: args.text_column,
        label: args.label_column,
    };
    let corpus = Corpus::read_csv(&args.corpus, &columns)?;

    let stemmer = MultilingualStemmer::new(LinguaOracle::new());
    let mut xs = vec![];
    let mut ys = vec![];
    let mut n_skipped = 0;
    for (text, label) in corpus.texts().iter().zip(corpus.labels()) {
        // Genres unknown to the model cannot be scored.
        let Ok(y) = artifacts.labels.encode(label) else {
            n_skipped += 1;
            continue;
        };
        xs.push(artifacts.vectorizer.transform(&stemmer.stem(&clean(text))));
        ys.push(y);
    }
    if n_skipped != 0 {
        tracing::warn!("{n_skipped} rows with unknown genres were skipped");
    }

    let evaluation = Evaluation::new(&artifacts.model, &xs, &ys, &artifacts.labels)?;
    println!("{evaluation}");

    Ok(())
}
