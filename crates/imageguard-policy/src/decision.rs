//! Moderation decision evaluation
//!
//! Applies context-specific policy to a risk assessment. Hard overrides for
//! suspected-minor content are checked before any threshold comparison and
//! short-circuit the decision outright.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use imageguard_analyzers::description::DescriptionSignal;
use imageguard_analyzers::face::{FaceSignal, MIN_AGE_THRESHOLD};

use crate::context::{ContextPolicySet, ContextThresholds};
use crate::risk::RiskAssessment;

/// Final moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Approved,
    FlaggedForReview,
    Rejected,
}

/// The immutable moderation decision for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationDecision {
    pub status: DecisionStatus,

    /// Machine-readable action code
    pub action: String,

    pub human_review_required: bool,

    /// Decision confidence in [0, 100]
    pub confidence: f32,

    /// The context key that resolved (after unknown-key fallback)
    pub context_type: String,

    /// The threshold pair that was applied
    pub applied_thresholds: ContextThresholds,

    /// Populated for hard-override rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Evaluates risk assessments against a context policy set
#[derive(Debug, Clone)]
pub struct ContextPolicyEvaluator<'a> {
    policies: &'a ContextPolicySet,
}

impl<'a> ContextPolicyEvaluator<'a> {
    pub fn new(policies: &'a ContextPolicySet) -> Self {
        Self { policies }
    }

    /// Produce the final decision.
    ///
    /// Override order (first match is decisive):
    /// 1. underage face detected
    /// 2. child keywords in the generated description
    /// Then the context threshold bands. Every rejection requires human
    /// review: a reject is auditable, never silently discarded.
    pub fn decide(
        &self,
        assessment: &RiskAssessment,
        face: Option<&FaceSignal>,
        description: Option<&DescriptionSignal>,
        context: &str,
    ) -> ModerationDecision {
        let (resolved, thresholds) = self.policies.resolve(context);

        if let Some(face) = face {
            if face.underage_detected {
                warn!(
                    context = resolved,
                    min_age = face.min_age,
                    "underage face detected, rejecting"
                );
                return ModerationDecision {
                    status: DecisionStatus::Rejected,
                    action: "reject_underage_content".to_string(),
                    human_review_required: true,
                    confidence: 99.0,
                    context_type: resolved.to_string(),
                    applied_thresholds: thresholds,
                    rejection_reason: Some(format!(
                        "detected face appears under {} years old (estimated minimum age {})",
                        MIN_AGE_THRESHOLD,
                        face.min_age.unwrap_or(0)
                    )),
                };
            }
        }

        if let Some(description) = description {
            if description.contains_child_keywords {
                warn!(
                    context = resolved,
                    keywords = ?description.matched_keywords,
                    "child keywords in description, rejecting"
                );
                return ModerationDecision {
                    status: DecisionStatus::Rejected,
                    action: "reject_child_content_keywords".to_string(),
                    human_review_required: true,
                    confidence: 95.0,
                    context_type: resolved.to_string(),
                    applied_thresholds: thresholds,
                    rejection_reason: Some(
                        "child-related keywords present in generated description".to_string(),
                    ),
                };
            }
        }

        let risk = assessment.final_risk_score;

        let decision = if risk <= thresholds.auto_approve {
            ModerationDecision {
                status: DecisionStatus::Approved,
                action: "approve_automatically".to_string(),
                human_review_required: false,
                confidence: 100.0 - risk,
                context_type: resolved.to_string(),
                applied_thresholds: thresholds,
                rejection_reason: None,
            }
        } else if risk >= thresholds.auto_reject {
            ModerationDecision {
                status: DecisionStatus::Rejected,
                action: "reject_automatically".to_string(),
                human_review_required: true,
                confidence: risk,
                context_type: resolved.to_string(),
                applied_thresholds: thresholds,
                rejection_reason: None,
            }
        } else {
            // the true risk is ambiguous in this band by definition
            ModerationDecision {
                status: DecisionStatus::FlaggedForReview,
                action: "require_human_review".to_string(),
                human_review_required: true,
                confidence: 50.0,
                context_type: resolved.to_string(),
                applied_thresholds: thresholds,
                rejection_reason: None,
            }
        };

        info!(
            context = resolved,
            risk,
            status = ?decision.status,
            "moderation decision"
        );

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{RiskBreakdown, RiskTableKind};
    use imageguard_analyzers::description::RawCaption;
    use imageguard_analyzers::face::{Gender, RawFace};
    use imageguard_analyzers::KeywordScanner;
    use imageguard_core::BoundingBox;

    fn assessment(score: f32) -> RiskAssessment {
        RiskAssessment {
            final_risk_score: score,
            risk_level: crate::risk::RiskLevelTable::NUDITY_ONLY.level(score),
            table: RiskTableKind::NudityOnly,
            reasoning: vec!["test".to_string()],
            breakdown: RiskBreakdown {
                nudity_contribution: score,
                pose_contribution: 0.0,
                description_risk: 0.0,
                age_multiplier: 1.0,
            },
        }
    }

    fn underage_face() -> FaceSignal {
        FaceSignal::from_faces(&[RawFace {
            age: 14,
            gender: Gender::Unknown,
            confidence: 0.95,
            bbox: BoundingBox::new(0, 0, 10, 10),
        }])
    }

    fn child_description() -> DescriptionSignal {
        let scanner = KeywordScanner::default_child_keywords();
        DescriptionSignal::from_caption(
            &RawCaption {
                description: "a child on a swing".to_string(),
                tags: vec![],
            },
            Some(&scanner),
        )
    }

    #[test]
    fn test_public_gallery_low_risk_approves() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);

        let decision = evaluator.decide(&assessment(15.0), None, None, "public_gallery");

        assert_eq!(decision.status, DecisionStatus::Approved);
        assert_eq!(decision.confidence, 85.0);
        assert!(!decision.human_review_required);
    }

    #[test]
    fn test_public_gallery_mid_risk_flags() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);

        let decision = evaluator.decide(&assessment(50.0), None, None, "public_gallery");

        assert_eq!(decision.status, DecisionStatus::FlaggedForReview);
        assert_eq!(decision.confidence, 50.0);
        assert!(decision.human_review_required);
    }

    #[test]
    fn test_high_risk_rejects_with_review() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);

        let decision = evaluator.decide(&assessment(92.0), None, None, "public_gallery");

        assert_eq!(decision.status, DecisionStatus::Rejected);
        assert_eq!(decision.confidence, 92.0);
        // rejection is always human-auditable
        assert!(decision.human_review_required);
    }

    #[test]
    fn test_underage_override_dominates_zero_risk() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);
        let face = underage_face();

        let decision = evaluator.decide(&assessment(0.0), Some(&face), None, "private_gallery");

        assert_eq!(decision.status, DecisionStatus::Rejected);
        assert!(decision.human_review_required);
        assert_eq!(decision.confidence, 99.0);
        assert_eq!(decision.action, "reject_underage_content");
        let reason = decision.rejection_reason.unwrap();
        assert!(reason.contains("16"));
        assert!(reason.contains("14"));
    }

    #[test]
    fn test_child_keyword_override() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);
        let description = child_description();

        let decision = evaluator.decide(&assessment(0.0), None, Some(&description), "public_gallery");

        assert_eq!(decision.status, DecisionStatus::Rejected);
        assert!(decision.human_review_required);
        assert_eq!(decision.confidence, 95.0);
        assert_eq!(decision.action, "reject_child_content_keywords");
    }

    #[test]
    fn test_underage_checked_before_child_keywords() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);
        let face = underage_face();
        let description = child_description();

        let decision = evaluator.decide(
            &assessment(0.0),
            Some(&face),
            Some(&description),
            "public_gallery",
        );

        assert_eq!(decision.action, "reject_underage_content");
        assert_eq!(decision.confidence, 99.0);
    }

    #[test]
    fn test_unknown_context_uses_default_thresholds() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);

        let decision = evaluator.decide(&assessment(25.0), None, None, "not_a_context");

        assert_eq!(decision.context_type, "public_gallery");
        // 25 sits between 20 and 80
        assert_eq!(decision.status, DecisionStatus::FlaggedForReview);
    }

    #[test]
    fn test_private_gallery_is_more_permissive() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);

        let public = evaluator.decide(&assessment(50.0), None, None, "public_gallery");
        let private = evaluator.decide(&assessment(50.0), None, None, "private_gallery");

        assert_eq!(public.status, DecisionStatus::FlaggedForReview);
        assert_eq!(private.status, DecisionStatus::Approved);
    }

    #[test]
    fn test_decision_boundaries_inclusive() {
        let policies = ContextPolicySet::builtin();
        let evaluator = ContextPolicyEvaluator::new(&policies);

        // exactly at auto_approve approves
        let at_approve = evaluator.decide(&assessment(20.0), None, None, "public_gallery");
        assert_eq!(at_approve.status, DecisionStatus::Approved);

        // exactly at auto_reject rejects
        let at_reject = evaluator.decide(&assessment(80.0), None, None, "public_gallery");
        assert_eq!(at_reject.status, DecisionStatus::Rejected);
    }
}
