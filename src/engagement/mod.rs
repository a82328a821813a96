//! Conversation engagement: sessions, stages, replies and the orchestrating engine.

pub mod engine;
pub mod responder;
pub mod session;
pub mod stage;

pub use engine::{EngagementEngine, InboundEvent, TurnOutcome};
pub use responder::ResponseGenerator;
pub use session::{Latch, Session, SessionStore};
pub use stage::{Stage, select_stage};
