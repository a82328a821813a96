//! Offline training for the TF-IDF + logistic regression classifier.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;

use serde::Deserialize;
use tracing::{debug, info};

use super::ScamClassifier;
use super::model::{
    ARTIFACT_VERSION, ModelArtifact, TfidfLogisticModel, analyze, l2_normalize, sigmoid,
};
use crate::error::TrainError;

/// One labelled training message.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub text: String,
    pub is_scam: bool,
}

impl Sample {
    pub fn new(text: impl Into<String>, is_scam: bool) -> Self {
        Self {
            text: text.into(),
            is_scam,
        }
    }
}

#[derive(Deserialize)]
struct RawSample {
    text: String,
    label: serde_json::Value,
}

fn invalid_sample(line: usize, reason: impl ToString) -> TrainError {
    TrainError::InvalidSample {
        line,
        reason: reason.to_string(),
    }
}

fn parse_label(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => n.as_f64().map(|v| v >= 1.0),
        serde_json::Value::String(s) => {
            let s = s.trim().to_lowercase();
            let is_scam = matches!(s.as_str(), "1" | "scam" | "spam" | "fraud" | "true");
            Some(is_scam)
        }
        _ => None,
    }
}

/// Read a JSON-lines dataset of `{"text": ..., "label": ...}` objects.
pub fn read_dataset<R: BufRead>(reader: R) -> Result<Vec<Sample>, TrainError> {
    let mut samples = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = serde_json::from_str::<RawSample>(&line);
        let raw = parsed.map_err(|e| invalid_sample(line_no, e))?;
        let Some(is_scam) = parse_label(&raw.label) else {
            let reason = format!("unsupported label {}", raw.label);
            return Err(invalid_sample(line_no, reason));
        };
        samples.push(Sample::new(raw.text, is_scam));
    }
    Ok(samples)
}

/// Optimiser settings.
#[derive(Debug, Clone)]
pub struct TrainingParams {
    /// Inverse regularisation strength.
    pub c: f64,
    pub learning_rate: f64,
    pub iterations: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            learning_rate: 1.0,
            iterations: 2000,
        }
    }
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub artifact: ModelArtifact,
    /// Fraction of training samples classified correctly at p > 0.5.
    pub training_accuracy: f64,
}

/// Fit the vectorizer and the logistic regression on `samples`.
pub fn train(samples: &[Sample], params: &TrainingParams) -> Result<TrainedModel, TrainError> {
    if samples.len() < 2 {
        let reason = format!("need at least 2 samples, got {}", samples.len());
        return Err(TrainError::Dataset(reason));
    }
    let positives = samples.iter().filter(|s| s.is_scam).count();
    if positives == 0 || positives == samples.len() {
        return Err(TrainError::Dataset("dataset has a single class".into()));
    }

    let docs: Vec<Vec<String>> = samples.iter().map(|s| analyze(&s.text)).collect();

    let terms: BTreeSet<&str> = docs.iter().flatten().map(String::as_str).collect();
    if terms.is_empty() {
        return Err(TrainError::Dataset("no usable terms".into()));
    }
    let vocabulary: BTreeMap<String, usize> = terms
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), i))
        .collect();
    let n_features = vocabulary.len();

    let mut df = vec![0usize; n_features];
    for doc in &docs {
        let unique: BTreeSet<usize> = doc
            .iter()
            .filter_map(|t| vocabulary.get(t).copied())
            .collect();
        for idx in unique {
            df[idx] += 1;
        }
    }
    let n_docs = docs.len() as f64;
    let idf: Vec<f64> = df
        .iter()
        .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
        .collect();

    let features: Vec<Vec<(usize, f64)>> = docs
        .iter()
        .map(|doc| {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for term in doc {
                if let Some(&idx) = vocabulary.get(term) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
            let mut row: Vec<(usize, f64)> = counts
                .into_iter()
                .map(|(idx, tf)| (idx, tf * idf[idx]))
                .collect();
            l2_normalize(&mut row);
            row
        })
        .collect();

    info!(
        samples = samples.len(),
        positives,
        features = n_features,
        "Training scam classifier"
    );

    let (coefficients, intercept) = fit_logistic(&features, samples, n_features, params);

    let artifact = ModelArtifact {
        version: ARTIFACT_VERSION,
        vocabulary,
        idf,
        coefficients,
        intercept,
    };

    let model = TfidfLogisticModel::from_artifact(artifact.clone())
        .map_err(|e| TrainError::Dataset(e.to_string()))?;
    let correct = samples
        .iter()
        .filter(|s| (model.scam_probability(&s.text) > 0.5) == s.is_scam)
        .count();

    Ok(TrainedModel {
        artifact,
        training_accuracy: correct as f64 / samples.len() as f64,
    })
}

/// Full-batch gradient descent on the L2-regularised log loss.
fn fit_logistic(
    features: &[Vec<(usize, f64)>],
    samples: &[Sample],
    n_features: usize,
    params: &TrainingParams,
) -> (Vec<f64>, f64) {
    let n = features.len() as f64;
    let mut w = vec![0.0; n_features];
    let mut b = 0.0;

    for iter in 0..params.iterations {
        let mut grad_w: Vec<f64> = w.iter().map(|wi| wi / (params.c * n)).collect();
        let mut grad_b = 0.0;

        for (row, sample) in features.iter().zip(samples) {
            let z = row.iter().map(|(idx, x)| w[*idx] * x).sum::<f64>() + b;
            let err = sigmoid(z) - if sample.is_scam { 1.0 } else { 0.0 };
            for (idx, x) in row {
                grad_w[*idx] += err * x / n;
            }
            grad_b += err / n;
        }

        for (wi, gi) in w.iter_mut().zip(&grad_w) {
            *wi -= params.learning_rate * gi;
        }
        b -= params.learning_rate * grad_b;

        if iter % 500 == 0 {
            debug!(iter, intercept = b, "Gradient descent progress");
        }
    }

    (w, b)
}
