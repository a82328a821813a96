//! Final intelligence report and its delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::ReportError;
use crate::intelligence::ExtractedIntelligence;

/// Notes attached to every final report.
pub const AGENT_NOTES: &str = "Scammer used urgency, payment redirection, and phishing tactics";

/// One-time summary of an engaged scam conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub session_id: String,
    /// Always `true`; reports are only produced for detected scams.
    pub scam_detected: bool,
    pub total_messages_exchanged: usize,
    pub extracted_intelligence: ExtractedIntelligence,
    pub agent_notes: String,
}

impl FinalReport {
    pub fn new(
        session_id: impl Into<String>,
        total_messages_exchanged: usize,
        extracted_intelligence: ExtractedIntelligence,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            scam_detected: true,
            total_messages_exchanged,
            extracted_intelligence,
            agent_notes: AGENT_NOTES.to_string(),
        }
    }
}

/// Destination for final reports.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Deliver a report. Called at most once per session.
    async fn deliver(&self, report: &FinalReport) -> Result<(), ReportError>;
}

/// POSTs reports as JSON to a callback URL.
pub struct HttpReportSink {
    client: reqwest::Client,
    url: String,
}

impl HttpReportSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::RequestFailed {
                sink: "http".into(),
                reason: format!("failed to build client: {e}"),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ReportSink for HttpReportSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn deliver(&self, report: &FinalReport) -> Result<(), ReportError> {
        let resp = self
            .client
            .post(&self.url)
            .json(report)
            .send()
            .await
            .map_err(|e| ReportError::RequestFailed {
                sink: self.name().into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ReportError::Rejected {
                sink: self.name().into(),
                status: status.as_u16(),
            });
        }

        debug!(session_id = %report.session_id, status = status.as_u16(), "Report accepted");
        Ok(())
    }
}
