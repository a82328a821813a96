//! Scam detection: keyword rules first, trained classifier second.
//!
//! Short scam openers ("send otp", "click link") carry too little text for the
//! statistical model, so a fixed high-risk keyword list short-circuits the
//! classifier entirely. Everything else is scored by the model and compared
//! against a probability threshold.

pub mod model;
pub mod stopwords;
pub mod train;

use std::sync::Arc;

use tracing::debug;

pub use model::{ModelArtifact, TfidfLogisticModel};

use crate::config::DEFAULT_SCAM_THRESHOLD;

/// Terms that flag a message without consulting the model.
pub const HIGH_RISK_KEYWORDS: &[&str] = &["otp", "upi", "verify", "click", "link"];

/// A trained text classifier for the positive ("scam") class.
pub trait ScamClassifier: Send + Sync {
    /// Probability in `[0, 1]` that `text` is a scam message.
    fn scam_probability(&self, text: &str) -> f64;
}

/// Why the detector reached its verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A high-risk keyword matched; the model was not consulted.
    Keyword(&'static str),
    /// The model scored the message.
    Model { probability: f64, is_scam: bool },
}

impl Verdict {
    pub fn is_scam(&self) -> bool {
        match self {
            Self::Keyword(_) => true,
            Self::Model { is_scam, .. } => *is_scam,
        }
    }
}

/// Hybrid rule + classifier detector.
#[derive(Clone)]
pub struct Detector {
    classifier: Arc<dyn ScamClassifier>,
    threshold: f64,
}

impl Detector {
    /// Create a detector with the default 0.7 threshold.
    pub fn new(classifier: Arc<dyn ScamClassifier>) -> Self {
        Self::with_threshold(classifier, DEFAULT_SCAM_THRESHOLD)
    }

    pub fn with_threshold(classifier: Arc<dyn ScamClassifier>, threshold: f64) -> Self {
        Self {
            classifier,
            threshold,
        }
    }

    /// Classify a single message, reporting which signal decided.
    pub fn verdict(&self, text: &str) -> Verdict {
        let lower = text.to_lowercase();
        let keyword = HIGH_RISK_KEYWORDS.iter().find(|k| lower.contains(*k));
        if let Some(&keyword) = keyword {
            return Verdict::Keyword(keyword);
        }

        let probability = self.classifier.scam_probability(text);
        Verdict::Model {
            probability,
            is_scam: probability > self.threshold,
        }
    }

    /// Whether a single message looks like a scam.
    pub fn detect(&self, text: &str) -> bool {
        let verdict = self.verdict(text);
        debug!(verdict = ?verdict, "Scam detection verdict");
        verdict.is_scam()
    }
}
