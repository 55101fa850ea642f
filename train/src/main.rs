use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use verso::{
    ClassWeight, Corpus, CorpusColumns, LinguaOracle, SplitConfig, TfidfConfig, TrainerConfig,
    TrainingConfig, TrainingPipeline,
};

#[derive(Parser, Debug)]
#[command(about = "A program to train genre classifiers of Verso.")]
struct Args {
    /// A CSV corpus with a header row
    #[arg(long)]
    corpus: PathBuf,

    /// The directory to write the trained artifacts to
    #[arg(long)]
    model_dir: PathBuf,

    /// The column containing lyrics
    #[arg(long, default_value = "Lyrics")]
    text_column: String,

    /// The column containing genres
    #[arg(long, default_value = "Genre")]
    label_column: String,

    /// The cost hyperparameter for classifier training
    #[arg(long, default_value = "0.1")]
    cost: f64,

    /// The epsilon stopping criterion for classifier training
    #[arg(long, default_value = "0.0001")]
    eps: f64,

    /// Do not weight classes inversely proportional to their frequencies.
    #[arg(long)]
    no_class_weight: bool,

    /// The proportion of the corpus held out for evaluation (0 disables evaluation)
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// The seed of the train/test split
    #[arg(long, default_value = "42")]
    seed: u64,

    /// The maximum length of word n-grams
    #[arg(long, default_value = "2")]
    max_ngram: usize,

    /// The maximum number of features (0 means unlimited)
    #[arg(long, default_value = "30000")]
    max_features: usize,

    /// N-grams appearing in fewer documents are ignored
    #[arg(long, default_value = "3")]
    min_df: usize,

    /// N-grams appearing in a larger fraction of documents are ignored
    #[arg(long, default_value = "0.9")]
    max_df: f64,

    /// Use raw term frequencies instead of 1 + ln(tf).
    #[arg(long)]
    no_sublinear_tf: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let columns = CorpusColumns {
        text: args.text_column,
        label: args.label_column,
    };
    tracing::info!("Loading corpus...");
    let corpus = Corpus::read_csv(&args.corpus, &columns)?;

    let config = TrainingConfig {
        tfidf: TfidfConfig {
            ngram_range: (1, args.max_ngram),
            max_features: (args.max_features != 0).then_some(args.max_features),
            min_df: args.min_df,
            max_df: args.max_df,
            sublinear_tf: !args.no_sublinear_tf,
        },
        trainer: TrainerConfig {
            cost: args.cost,
            epsilon: args.eps,
            class_weight: if args.no_class_weight {
                ClassWeight::Uniform
            } else {
                ClassWeight::Balanced
            },
        },
        split: SplitConfig {
            test_size: args.test_size,
            seed: args.seed,
        },
    };

    tracing::info!("Start training...");
    let pipeline = TrainingPipeline::new(LinguaOracle::new(), config);
    let outcome = pipeline.run(&corpus, &args.model_dir)?;

    match outcome.evaluation {
        Some(evaluation) => println!("{evaluation}"),
        None => println!("Evaluation skipped: no held-out examples"),
    }

    Ok(())
}
