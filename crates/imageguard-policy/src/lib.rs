//! ImageGuard Policy
//!
//! Risk fusion and context-sensitive moderation decisions.
//!
//! This crate combines validated analyzer signals into a single risk
//! assessment and applies per-context policy thresholds:
//! - Risk fusion: additive base risk with a multiplicative age amplifier
//! - Two named risk-level bucket tables selected by age-evidence presence
//! - Hard overrides for suspected-minor content ahead of threshold logic
//! - Context threshold tables as data (YAML-loadable, independently testable)

pub mod context;
pub mod decision;
pub mod risk;

pub use context::{ContextPolicySet, ContextThresholds, DEFAULT_CONTEXT};
pub use decision::{ContextPolicyEvaluator, DecisionStatus, ModerationDecision};
pub use risk::{
    RiskAssessment, RiskBreakdown, RiskCombiner, RiskLevel, RiskLevelTable, RiskTableKind,
    SignalSet,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::context::{ContextPolicySet, ContextThresholds};
    pub use crate::decision::{ContextPolicyEvaluator, DecisionStatus, ModerationDecision};
    pub use crate::risk::{RiskAssessment, RiskCombiner, RiskLevel, SignalSet};
}
