//! TF-IDF + logistic regression classifier loaded from a JSON artifact.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ScamClassifier;
use super::stopwords::is_stop_word;
use crate::error::ModelError;

/// Artifact format version written by the trainer.
pub const ARTIFACT_VERSION: u32 = 1;

/// Tokens are runs of at least two word characters.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Turn text into the unigram + bigram terms the vectorizer counts.
///
/// Stop words are dropped before bigrams are formed, so `"verify the account"`
/// yields `verify`, `account` and `verify account`.
pub fn analyze(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    terms.extend(tokens.windows(2).map(|pair| pair.join(" ")));
    terms
}

/// Serialized classifier parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    /// Term → feature index.
    pub vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per feature index.
    pub idf: Vec<f64>,
    /// Logistic regression weight per feature index.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl ModelArtifact {
    fn validate(&self) -> Result<(), ModelError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.version,
                expected: ARTIFACT_VERSION,
            });
        }
        let n = self.vocabulary.len();
        if n == 0 {
            return Err(ModelError::Invalid("vocabulary is empty".into()));
        }
        if self.idf.len() != n || self.coefficients.len() != n {
            return Err(ModelError::Invalid(format!(
                "vocabulary has {} terms but idf has {} and coefficients {}",
                n,
                self.idf.len(),
                self.coefficients.len()
            )));
        }
        if let Some((term, idx)) = self.vocabulary.iter().find(|(_, idx)| **idx >= n) {
            let reason = format!("term '{term}' has out-of-range index {idx}");
            return Err(ModelError::Invalid(reason));
        }
        let all_finite = self
            .idf
            .iter()
            .chain(self.coefficients.iter())
            .chain(std::iter::once(&self.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::Invalid("non-finite parameter".into()));
        }
        Ok(())
    }
}

/// A TF-IDF vectorizer feeding a binary logistic regression.
#[derive(Debug, Clone)]
pub struct TfidfLogisticModel {
    artifact: ModelArtifact,
}

impl TfidfLogisticModel {
    /// Build a model from in-memory parameters, validating them first.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Load and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        let model = Self::from_artifact(artifact)?;
        info!(
            path = %path.display(),
            features = model.artifact.vocabulary.len(),
            "Loaded scam classifier"
        );
        Ok(model)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Sparse L2-normalised TF-IDF vector for `text`, as (index, weight) pairs.
    pub fn vectorize(&self, text: &str) -> Vec<(usize, f64)> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in analyze(text) {
            if let Some(&idx) = self.artifact.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let mut weights: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.artifact.idf[idx]))
            .collect();
        l2_normalize(&mut weights);
        weights
    }
}

impl ScamClassifier for TfidfLogisticModel {
    fn scam_probability(&self, text: &str) -> f64 {
        let dot: f64 = self
            .vectorize(text)
            .iter()
            .map(|(idx, w)| self.artifact.coefficients[*idx] * w)
            .sum();
        sigmoid(dot + self.artifact.intercept)
    }
}

pub(crate) fn l2_normalize(weights: &mut [(usize, f64)]) {
    let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in weights.iter_mut() {
            *w /= norm;
        }
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
