//! Templated replies per stage.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::stage::Stage;

const CONFUSED_TEMPLATES: &[&str] = &[
    "I am not understanding this properly. You said '{last_msg}', what does that mean?",
    "Why is this happening now? You mentioned '{last_msg}'.",
];

const PROBING_TEMPLATES: &[&str] = &[
    "Why do you need {keyword} for this issue?",
    "How will sharing {keyword} solve the problem?",
    "Can you explain again why this is required?",
];

const DELAYING_TEMPLATES: &[&str] = &[
    "I am outside right now, can I do this later?",
    "My phone battery is low, please wait.",
    "I need some time to check this.",
];

const EXIT_TEMPLATES: &[&str] = &[
    "I will visit the bank branch and confirm this.",
    "I will talk to customer care and get back to you.",
    "I have shared this with my family, I will respond later.",
    "Network is poor right now, I will check later.",
];

/// Label for what the counterpart is asking about, used by probing replies.
pub fn keyword_label(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if lower.contains("upi") {
        "UPI"
    } else if lower.contains("otp") {
        "OTP"
    } else if lower.contains("link") || lower.contains("http") {
        "this link"
    } else {
        "this information"
    }
}

fn templates(stage: Stage) -> &'static [&'static str] {
    match stage {
        Stage::Confused => CONFUSED_TEMPLATES,
        Stage::Probing => PROBING_TEMPLATES,
        Stage::Delaying => DELAYING_TEMPLATES,
        Stage::Exit => EXIT_TEMPLATES,
    }
}

fn render(template: &str, stage: Stage, last_message: &str) -> String {
    match stage {
        Stage::Confused => template.replace("{last_msg}", last_message),
        Stage::Probing => template.replace("{keyword}", keyword_label(last_message)),
        Stage::Delaying | Stage::Exit => template.to_string(),
    }
}

/// Picks a reply template uniformly at random from the stage's pool.
pub struct ResponseGenerator {
    rng: Mutex<StdRng>,
}

impl ResponseGenerator {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Generator with a fixed seed, for reproducible replies.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }

    /// Every reply `reply` could produce for this stage and message.
    pub fn candidates(&self, stage: Stage, last_message: &str) -> Vec<String> {
        templates(stage)
            .iter()
            .map(|t| render(t, stage, last_message))
            .collect()
    }

    pub fn reply(&self, stage: Stage, last_message: &str) -> String {
        let pool = templates(stage);
        let template = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            pool.choose(&mut *rng).copied().unwrap_or(pool[0])
        };
        render(template, stage, last_message)
    }
}

impl Default for ResponseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
