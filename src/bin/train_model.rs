//! Train the scam classifier artifact from a JSON-lines dataset.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scam_honeypot::config::DEFAULT_MODEL_PATH;
use scam_honeypot::detection::train::{TrainingParams, read_dataset, train};

#[derive(Debug, Parser)]
#[command(
    name = "train-model",
    about = "Train the TF-IDF + logistic regression scam classifier"
)]
struct Args {
    /// JSON-lines dataset of {"text": ..., "label": ...} records.
    #[arg(long, default_value = "data/scam_dataset.jsonl")]
    data: PathBuf,

    /// Where to write the model artifact.
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    out: PathBuf,

    /// Gradient descent iterations.
    #[arg(long, default_value_t = 2000)]
    iterations: usize,

    /// Inverse regularisation strength.
    #[arg(long, default_value_t = 1.0)]
    c: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let file = File::open(&args.data)
        .with_context(|| format!("failed to open dataset {}", args.data.display()))?;
    let samples = read_dataset(BufReader::new(file))?;

    let params = TrainingParams {
        c: args.c,
        iterations: args.iterations,
        ..TrainingParams::default()
    };
    let trained = train(&samples, &params)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&trained.artifact)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    tracing::info!(
        samples = samples.len(),
        features = trained.artifact.vocabulary.len(),
        accuracy = trained.training_accuracy,
        out = %args.out.display(),
        "Model trained and saved"
    );
    Ok(())
}
