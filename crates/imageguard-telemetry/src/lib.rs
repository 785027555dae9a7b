//! ImageGuard Telemetry
//!
//! Telemetry, metrics, and audit trail functionality for ImageGuard.
//!
//! Provides:
//! - Hash-chained audit trails so moderation decisions are tamper-evident
//! - Performance and decision-rate metrics

pub mod audit;
pub mod metrics;

pub use audit::{AuditEvent, AuditSeverity, AuditTrail};
pub use metrics::MetricsCollector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audit::{AuditEvent, AuditTrail};
    pub use crate::metrics::MetricsCollector;
}
