pub mod envelope;
pub mod handler;

pub use envelope::{AuditLogEntry, EventEnvelope, PushMessage};
pub use handler::Processor;
