//! Engagement engine: runs one conversational turn per inbound message.
//!
//! Turn order, all under the session's lock:
//! 1. append the message
//! 2. detect on the new message and latch the verdict
//! 3. recompute the stage
//! 4. final-report gate (scam, exit, not yet completed, at least 4 messages)
//! 5. otherwise reply from the stage templates, or a neutral acknowledgement
//!
//! Report delivery runs on its own task with a timeout. The reply never waits
//! for it and never observes its outcome.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::responder::ResponseGenerator;
use super::session::{Session, SessionStore};
use super::stage::{Stage, select_stage};
use crate::detection::Detector;
use crate::error::ReportError;
use crate::intelligence;
use crate::report::{FinalReport, ReportSink};

/// Reply sent on the turn that produces the final report.
pub const CLOSING_REPLY: &str = "I will visit the bank branch and confirm this.";

/// Reply while no scam has been detected.
pub const NEUTRAL_REPLY: &str = "Thank you for the information.";

/// Minimum transcript length before a report is considered.
pub const MIN_REPORT_MESSAGES: usize = 4;

/// Default bound on a single report delivery.
pub const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// One inbound message as the core sees it.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub session_id: String,
    pub text: String,
}

impl InboundEvent {
    pub fn new(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
        }
    }
}

/// What a turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub stage: Stage,
    pub scam_detected: bool,
    pub message_count: usize,
    /// Set only on the turn that fired the final report.
    pub report: Option<FinalReport>,
}

/// Ties detection, staging, extraction, replies and reporting together.
pub struct EngagementEngine {
    sessions: SessionStore,
    detector: Detector,
    responder: ResponseGenerator,
    sink: Arc<dyn ReportSink>,
    report_timeout: Duration,
}

impl EngagementEngine {
    pub fn new(
        detector: Detector,
        responder: ResponseGenerator,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            detector,
            responder,
            sink,
            report_timeout: DEFAULT_REPORT_TIMEOUT,
        }
    }

    pub fn with_report_timeout(mut self, timeout: Duration) -> Self {
        self.report_timeout = timeout;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn responder(&self) -> &ResponseGenerator {
        &self.responder
    }

    /// Process one inbound message.
    pub async fn handle(&self, event: InboundEvent) -> TurnOutcome {
        let session = self.sessions.get_or_create(&event.session_id).await;
        let mut session = session.lock().await;

        let outcome = self.run_turn(&mut session, &event.text);

        info!(
            session_id = %session.id,
            messages = outcome.message_count,
            stage = %outcome.stage,
            scam_detected = outcome.scam_detected,
            reported = outcome.report.is_some(),
            "Turn processed"
        );

        if let Some(report) = outcome.report.clone() {
            self.dispatch_report(report);
        }

        outcome
    }

    fn run_turn(&self, session: &mut Session, text: &str) -> TurnOutcome {
        let message_count = session.push_message(text);

        session.scam_detected.set_if(self.detector.detect(text));
        session.stage = select_stage(text, message_count, session.stage);

        let scam_detected = session.scam_detected.is_set();
        let stage = session.stage;

        let report_due = scam_detected
            && stage == Stage::Exit
            && !session.completed.is_set()
            && message_count >= MIN_REPORT_MESSAGES;

        if report_due && session.completed.set() {
            let intel = intelligence::extract(session.messages());
            if intel.is_empty() {
                debug!(session_id = %session.id, "Final report carries no extracted intelligence");
            }
            let report = FinalReport::new(session.id.clone(), message_count, intel);
            return TurnOutcome {
                reply: CLOSING_REPLY.to_string(),
                stage,
                scam_detected,
                message_count,
                report: Some(report),
            };
        }

        let reply = if scam_detected {
            self.responder.reply(stage, text)
        } else {
            NEUTRAL_REPLY.to_string()
        };

        TurnOutcome {
            reply,
            stage,
            scam_detected,
            message_count,
            report: None,
        }
    }

    /// Fire-and-forget delivery; failures are logged and dropped.
    fn dispatch_report(&self, report: FinalReport) {
        let sink = Arc::clone(&self.sink);
        let timeout = self.report_timeout;

        tokio::spawn(async move {
            let session_id = report.session_id.clone();
            let result = match tokio::time::timeout(timeout, sink.deliver(&report)).await {
                Ok(result) => result,
                Err(_) => Err(ReportError::Timeout(timeout)),
            };
            match result {
                Ok(()) => {
                    info!(session_id = %session_id, sink = sink.name(), "Final report delivered");
                }
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        sink = sink.name(),
                        error = %e,
                        "Final report delivery failed"
                    );
                }
            }
        });
    }
}
