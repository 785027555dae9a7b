//! The moderation pipeline

use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use imageguard_analyzers::description::DescriptionSignal;
use imageguard_analyzers::face::FaceSignal;
use imageguard_analyzers::nudity::DetectionSignal;
use imageguard_analyzers::pose::PoseSignal;
use imageguard_analyzers::stage::{AnalyzerSet, StageReport, StageRunner};
use imageguard_analyzers::CrossSignalValidator;
use imageguard_core::{Error, ModerationRequest, Result, StageStatus};
use imageguard_policy::{
    ContextPolicyEvaluator, DecisionStatus, ModerationDecision, RiskAssessment, RiskCombiner,
    SignalSet,
};
use imageguard_telemetry::audit::{AuditEvent, AuditSeverity, AuditTrail};
use imageguard_telemetry::MetricsCollector;

use crate::state::{Defaults, SnapshotStore};

/// Full per-stage signal trace, retained for audit and persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalTrace {
    pub nudity: StageReport<DetectionSignal>,
    pub pose: StageReport<PoseSignal>,
    pub face: StageReport<FaceSignal>,
    pub description: StageReport<DescriptionSignal>,
}

impl SignalTrace {
    /// Number of stages that fell back after an analyzer failure
    pub fn failed_stages(&self) -> usize {
        [
            self.nudity.status,
            self.pose.status,
            self.face.status,
            self.description.status,
        ]
        .iter()
        .filter(|s| **s == StageStatus::Failed)
        .count()
    }
}

/// The complete result of one pipeline evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationOutcome {
    /// Unique id assigned to this evaluation
    pub request_id: String,

    /// Submitting model id, carried through from the request
    pub model_id: u32,

    pub decision: ModerationDecision,

    pub assessment: RiskAssessment,

    pub signals: SignalTrace,
}

/// Orchestrates analyzer stages, validation, risk fusion, and policy
/// evaluation for each request
pub struct ModerationPipeline {
    runner: StageRunner,
    validator: CrossSignalValidator,
    combiner: RiskCombiner,
    store: SnapshotStore,
    audit: Mutex<AuditTrail>,
    metrics: MetricsCollector,
}

impl ModerationPipeline {
    /// Create a pipeline with built-in defaults
    pub fn new(analyzers: AnalyzerSet) -> Self {
        Self::with_defaults(analyzers, Defaults::default())
            .expect("built-in defaults are valid")
    }

    /// Create a pipeline with administrative defaults
    pub fn with_defaults(analyzers: AnalyzerSet, defaults: Defaults) -> Result<Self> {
        Ok(Self {
            runner: StageRunner::new(analyzers),
            validator: CrossSignalValidator::new(),
            combiner: RiskCombiner::new(),
            store: SnapshotStore::new(defaults)?,
            audit: Mutex::new(AuditTrail::new()),
            metrics: MetricsCollector::new(),
        })
    }

    /// Override the per-stage analyzer timeout
    pub fn with_stage_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.runner = self.runner.with_timeout(timeout);
        self
    }

    /// Administrative path: atomically replace the default configuration.
    /// In-flight requests complete on the snapshot they started with.
    pub fn update_defaults(&self, defaults: Defaults) -> Result<()> {
        self.store.replace(defaults)?;
        self.audit
            .lock()
            .add_event(AuditEvent::new("config_updated"));
        Ok(())
    }

    /// Metrics for this pipeline instance
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Verify the audit trail integrity
    pub fn verify_audit_trail(&self) -> bool {
        self.audit.lock().verify()
    }

    /// Evaluate one moderation request.
    ///
    /// Only catastrophic input errors return `Err`; analyzer-level failures
    /// are absorbed into fail-closed fallbacks visible in the signal trace.
    /// Callers must not interpret `Err` as "content is safe".
    pub async fn evaluate(&self, request: ModerationRequest) -> Result<ModerationOutcome> {
        if request.image.is_empty() {
            return Err(Error::invalid_input("image reference is empty"));
        }

        let start = Instant::now();
        let request_id = Uuid::new_v4().to_string();
        self.metrics.record_request();
        metrics::counter!("imageguard_requests_total").increment(1);

        let snapshot = self.store.snapshot();
        let config = request
            .config
            .unwrap_or_else(|| snapshot.component_config.clone());

        debug!(request_id = %request_id, context = %request.context_type, "pipeline start");

        // Nudity must complete before cross-validation depends on it.
        let nudity = self.runner.run_nudity(&request.image, &config).await;

        // The remaining stages are mutually independent.
        let (pose, face, description) = tokio::join!(
            self.runner.run_pose(&request.image, &config),
            self.runner.run_face(&request.image, &config),
            self.runner
                .run_description(&request.image, &config, Some(&snapshot.scanner)),
        );

        let pose = StageReport {
            signal: self.validator.validate(pose.signal, &nudity.signal),
            status: pose.status,
            latency_us: pose.latency_us,
        };

        let trace = SignalTrace {
            nudity,
            pose,
            face,
            description,
        };

        for _ in 0..trace.failed_stages() {
            self.metrics.record_analyzer_failure();
            metrics::counter!("imageguard_analyzer_failures_total").increment(1);
        }

        let signals = SignalSet {
            nudity: enabled_signal(&trace.nudity),
            pose: enabled_signal(&trace.pose),
            face: enabled_signal(&trace.face),
            description: enabled_signal(&trace.description),
        };

        let assessment = self.combiner.combine(&signals);

        let evaluator = ContextPolicyEvaluator::new(&snapshot.policies);
        let decision = evaluator.decide(
            &assessment,
            signals.face,
            signals.description,
            &request.context_type,
        );

        let latency_us = start.elapsed().as_micros() as u64;
        self.record_decision(&request_id, &decision, &assessment, latency_us);

        info!(
            request_id = %request_id,
            status = ?decision.status,
            risk = assessment.final_risk_score,
            latency_us,
            "pipeline complete"
        );

        Ok(ModerationOutcome {
            request_id,
            model_id: request.model_id,
            decision,
            assessment,
            signals: trace,
        })
    }

    fn record_decision(
        &self,
        request_id: &str,
        decision: &ModerationDecision,
        assessment: &RiskAssessment,
        latency_us: u64,
    ) {
        let (status_label, severity) = match decision.status {
            DecisionStatus::Approved => {
                self.metrics.record_approved();
                ("approved", AuditSeverity::Info)
            }
            DecisionStatus::FlaggedForReview => {
                self.metrics.record_flagged();
                ("flagged_for_review", AuditSeverity::Warning)
            }
            DecisionStatus::Rejected => {
                self.metrics.record_rejected();
                ("rejected", AuditSeverity::High)
            }
        };
        self.metrics.record_latency(latency_us);

        metrics::counter!("imageguard_decisions_total", "status" => status_label).increment(1);
        metrics::histogram!("imageguard_pipeline_latency_us").record(latency_us as f64);

        self.audit.lock().add_event(
            AuditEvent::decision(request_id, decision.context_type.clone())
                .with_data(serde_json::json!({
                    "status": status_label,
                    "action": decision.action,
                    "risk_score": assessment.final_risk_score,
                    "risk_level": assessment.risk_level,
                    "reasoning": assessment.reasoning,
                }))
                .with_severity(severity),
        );
    }
}

/// A disabled stage is excluded from risk computation entirely; its
/// placeholder signal must never reach the combiner.
fn enabled_signal<T>(report: &StageReport<T>) -> Option<&T> {
    match report.status {
        StageStatus::Disabled => None,
        _ => Some(&report.signal),
    }
}
