//! Intelligence extraction over a conversation transcript.
//!
//! Patterns are deliberately broad heuristics. The payment-handle pattern is a
//! generic `local@domain` matcher and will also pick up ordinary email
//! addresses. A pattern that finds nothing yields an empty set; extraction
//! itself never fails.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Risk vocabulary reported as `suspiciousKeywords`.
pub const RISK_KEYWORDS: &[&str] = &[
    "blocked", "verify", "urgent", "upi", "otp", "click", "link", "suspend", "account",
];

static UPI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[\w.-]+@[\w.-]+\b").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+91\d{10}|\b\d{10}\b").unwrap());
static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Everything mined from a transcript. Each field is de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedIntelligence {
    pub upi_ids: BTreeSet<String>,
    pub phone_numbers: BTreeSet<String>,
    pub phishing_links: BTreeSet<String>,
    pub suspicious_keywords: BTreeSet<String>,
}

impl ExtractedIntelligence {
    pub fn is_empty(&self) -> bool {
        self.upi_ids.is_empty()
            && self.phone_numbers.is_empty()
            && self.phishing_links.is_empty()
            && self.suspicious_keywords.is_empty()
    }
}

/// Extract intelligence from every message seen so far.
pub fn extract<S: AsRef<str>>(messages: &[S]) -> ExtractedIntelligence {
    let parts: Vec<&str> = messages.iter().map(|m| m.as_ref()).collect();
    let transcript = parts.join(" ");

    let lower = transcript.to_lowercase();
    let words: BTreeSet<&str> = WORD_RE.find_iter(&lower).map(|m| m.as_str()).collect();

    ExtractedIntelligence {
        upi_ids: collect_matches(&UPI_RE, &transcript),
        phone_numbers: collect_matches(&PHONE_RE, &transcript),
        phishing_links: collect_matches(&URL_RE, &transcript),
        suspicious_keywords: RISK_KEYWORDS
            .iter()
            .filter(|k| words.contains(**k))
            .map(|k| k.to_string())
            .collect(),
    }
}

fn collect_matches(re: &Regex, text: &str) -> BTreeSet<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_across_the_whole_transcript() {
        let messages = [
            "hello",
            "send otp",
            "my upi is a@b",
            "click this http://scam.example link",
        ];
        let intel = extract(&messages);

        assert_eq!(intel.upi_ids, set(&["a@b"]));
        assert_eq!(intel.phishing_links, set(&["http://scam.example"]));
        assert!(intel.suspicious_keywords.contains("otp"));
        assert!(intel.suspicious_keywords.contains("link"));
        assert!(intel.suspicious_keywords.contains("upi"));
        assert!(intel.suspicious_keywords.contains("click"));
        assert!(intel.phone_numbers.is_empty());
    }

    #[test]
    fn phone_numbers_with_and_without_prefix() {
        let intel = extract(&["call +919876543210 or 9123456789, not 12345"]);
        assert_eq!(intel.phone_numbers, set(&["+919876543210", "9123456789"]));
    }

    #[test]
    fn longer_digit_runs_are_not_phone_numbers() {
        let intel = extract(&["ref 123456789012"]);
        assert!(intel.phone_numbers.is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let intel = extract(&[
            "pay to scam.pay@okbank now",
            "again scam.pay@okbank at https://x.example/pay",
            "https://x.example/pay",
        ]);
        assert_eq!(intel.upi_ids, set(&["scam.pay@okbank"]));
        assert_eq!(intel.phishing_links, set(&["https://x.example/pay"]));
    }

    #[test]
    fn email_addresses_match_the_payment_pattern() {
        let intel = extract(&["write to support@bank-help.com"]);
        assert_eq!(intel.upi_ids, set(&["support@bank-help.com"]));
    }

    #[test]
    fn keywords_are_case_insensitive_whole_words() {
        let intel = extract(&["URGENT: your Account is BLOCKED", "accounting class"]);
        assert_eq!(
            intel.suspicious_keywords,
            set(&["account", "blocked", "urgent"])
        );
    }

    #[test]
    fn clean_text_yields_empty_sets() {
        let intel = extract(&["see you at lunch tomorrow"]);
        assert!(intel.is_empty());
        let none: [&str; 0] = [];
        assert!(extract(&none).is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let messages = vec![
            "verify your account at https://a.example".to_string(),
            "send to x@y or +911234567890".to_string(),
        ];
        assert_eq!(extract(&messages), extract(&messages));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let intel = extract(&["pay a@b"]);
        let json = serde_json::to_value(&intel).unwrap();
        assert_eq!(json["upiIds"], serde_json::json!(["a@b"]));
        assert!(json["phoneNumbers"].as_array().unwrap().is_empty());
        assert!(json.get("phishingLinks").is_some());
        assert!(json.get("suspiciousKeywords").is_some());
    }
}
