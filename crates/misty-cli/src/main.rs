//! Misty CLI - Command-line interface
//!
//! Usage:
//!   misty predict --predictions tagger.json --text "..."
//!   misty clean --text "..."
//!
//! Text is read from stdin when `--text` is omitted.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use misty_core::config::{AppConfig, LoggingConfig};
use misty_extractor::{EventExtractor, RegexCleaner, ReplayTagger, TextCleaner};

#[derive(Parser)]
#[command(name = "misty")]
#[command(about = "Extract event records from announcement text")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an event record from text and recorded tagger output
    Predict {
        /// JSON array of token predictions for the cleaned text
        #[arg(long)]
        predictions: PathBuf,

        /// Raw announcement text
        #[arg(long)]
        text: Option<String>,

        /// Extra lexicon (TSV: form, lemma, POS)
        #[arg(long)]
        lexicon: Option<PathBuf>,
    },
    /// Print the cleaned text the tagger would see
    Clean {
        /// Raw announcement text
        #[arg(long)]
        text: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    init_tracing(&config.logging);

    match cli.command {
        Commands::Predict {
            predictions,
            text,
            lexicon,
        } => {
            let raw = read_text(text)?;
            let tagger = ReplayTagger::from_file(&predictions)
                .with_context(|| format!("loading predictions from {}", predictions.display()))?;

            let mut extractor_config = config.extractor;
            if lexicon.is_some() {
                extractor_config.lexicon_path = lexicon;
            }

            let extractor = EventExtractor::from_config(Box::new(tagger), extractor_config)?;
            let extraction = extractor.predict(&raw)?;
            if !extraction.is_complete() {
                tracing::warn!("Incomplete record, missing: {:?}", extraction.missing);
            }

            println!("{}", serde_json::to_string_pretty(&extraction)?);
        }
        Commands::Clean { text } => {
            let raw = read_text(text)?;
            println!("{}", RegexCleaner::new().clean(&raw));
        }
    }

    Ok(())
}

fn read_text(text: Option<String>) -> anyhow::Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading text from stdin")?;
            Ok(buf)
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("misty={0},misty_extractor={0}", logging.level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
