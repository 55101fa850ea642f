use std::io::{prelude::*, stdin};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use verso::{Analysis, LanguageOracle, LinguaOracle, Predictor, VersoError};

#[derive(Parser, Debug)]
#[command(about = "A program to detect languages and predict genres of lyrics.")]
struct Args {
    /// The directory containing the trained artifacts
    #[arg(long, default_value = "model")]
    model_dir: PathBuf,

    /// Treat each line of the input as a separate song.
    #[arg(long)]
    line_by_line: bool,
}

fn report<O>(predictor: &Predictor<O>, lyrics: &str)
where
    O: LanguageOracle,
{
    let Analysis { language, genre } = match predictor.analyze(lyrics) {
        Ok(analysis) => analysis,
        Err(VersoError::EmptyInput) => {
            println!("Please enter some lyrics.");
            return;
        }
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    match language {
        Ok(code) => println!("Language: {}", code.display_name()),
        Err(VersoError::DetectionFailed) => println!("Language: scan failed"),
        Err(e) => println!("Language: error: {e}"),
    }
    match genre {
        Ok(genre) => println!("Genre: {genre}"),
        Err(VersoError::ModelsUnavailable) => println!("Genre: models are not loaded"),
        Err(e) => println!("Genre: error: {e}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    tracing::info!("Loading artifacts...");
    let predictor = Predictor::from_dir(&args.model_dir, LinguaOracle::new());

    if args.line_by_line {
        for line in stdin().lock().lines() {
            report(&predictor, &line?);
        }
    } else {
        let mut lyrics = String::new();
        stdin().read_to_string(&mut lyrics)?;
        report(&predictor, &lyrics);
    }

    Ok(())
}
