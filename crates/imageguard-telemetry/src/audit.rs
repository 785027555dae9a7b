//! Cryptographic decision audit trail

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::SystemTime;

/// Audit trail with hash-chained events for tamper detection.
///
/// Every moderation decision appends one event; the chain makes after-the-fact
/// edits to the decision history detectable.
pub struct AuditTrail {
    events: Vec<AuditEvent>,
    chain_hash: Option<String>,
}

impl AuditTrail {
    /// Create a new audit trail
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            chain_hash: None,
        }
    }

    /// Add an event to the audit trail
    pub fn add_event(&mut self, event: AuditEvent) {
        let mut event = event;
        event.previous_hash = self.chain_hash.clone();

        let hash = self.compute_hash(&event);
        event.hash = Some(hash.clone());

        self.chain_hash = Some(hash);
        self.events.push(event);
    }

    /// Verify the integrity of the audit trail
    pub fn verify(&self) -> bool {
        let mut prev_hash: Option<String> = None;

        for event in &self.events {
            if event.previous_hash != prev_hash {
                return false;
            }

            let computed_hash = self.compute_hash(event);
            if event.hash.as_ref() != Some(&computed_hash) {
                return false;
            }

            prev_hash = event.hash.clone();
        }

        true
    }

    /// Get all events
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Events recorded for one request
    pub fn events_for_request(&self, request_id: &str) -> Vec<&AuditEvent> {
        self.events
            .iter()
            .filter(|e| e.request_id.as_deref() == Some(request_id))
            .collect()
    }

    /// Compute hash for an event
    fn compute_hash(&self, event: &AuditEvent) -> String {
        let mut hasher = Sha256::new();

        hasher.update(event.event_type.as_bytes());
        if let Some(ref request_id) = event.request_id {
            hasher.update(request_id.as_bytes());
        }
        if let Some(ref context) = event.context_type {
            hasher.update(context.as_bytes());
        }
        if let Some(ref data) = event.data {
            hasher.update(data.as_bytes());
        }
        hasher.update(format!("{:?}", event.timestamp).as_bytes());
        if let Some(ref prev) = event.previous_hash {
            hasher.update(prev.as_bytes());
        }

        format!("{:x}", hasher.finalize())
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

/// A single audit event in the trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event type/category (e.g. "moderation_decision", "config_updated")
    pub event_type: String,

    /// Request this event belongs to
    pub request_id: Option<String>,

    /// Content context the decision applied
    pub context_type: Option<String>,

    /// Event payload (JSON serialized decision/assessment)
    pub data: Option<String>,

    /// Timestamp
    pub timestamp: SystemTime,

    /// Hash of this event
    pub hash: Option<String>,

    /// Hash of previous event (for chaining)
    pub previous_hash: Option<String>,

    /// Severity level
    pub severity: AuditSeverity,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            request_id: None,
            context_type: None,
            data: None,
            timestamp: SystemTime::now(),
            hash: None,
            previous_hash: None,
            severity: AuditSeverity::Info,
        }
    }

    /// Convenience constructor for a moderation decision event
    pub fn decision(request_id: impl Into<String>, context_type: impl Into<String>) -> Self {
        Self::new("moderation_decision")
            .with_request_id(request_id)
            .with_context(context_type)
    }

    /// Set the request id
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set the context type
    pub fn with_context(mut self, context_type: impl Into<String>) -> Self {
        self.context_type = Some(context_type.into());
        self
    }

    /// Set event data
    pub fn with_data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_string(&data).ok();
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    Info,
    Warning,
    High,
    Critical,
}
