//! Cross-signal validation
//!
//! Detects implausible signal combinations before risk fusion and corrects
//! them as an auditable data step. Pure, deterministic, and total: no I/O,
//! no failure path.

use tracing::warn;

use crate::nudity::DetectionSignal;
use crate::pose::{PoseCategory, PoseSignal};

/// Upper bound on plausible joint angles in degrees. Values outside
/// [0, 180] or NaN indicate divide-by-zero artifacts in the estimator's
/// ratio math, not a real pose.
pub const MAX_PLAUSIBLE_ANGLE: f32 = 180.0;

/// Validates pose signals against nudity evidence
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossSignalValidator;

impl CrossSignalValidator {
    pub fn new() -> Self {
        Self
    }

    /// Apply the validation rules in order; the first matching rule wins.
    ///
    /// 1. A reported body pose on an image whose only detection is a face
    ///    class is a hallucination: the derived category is overridden to
    ///    [`PoseCategory::FaceOnlyNoPose`] with score 0, while the raw
    ///    metrics stay on the signal and the pre-override score is recorded
    ///    in the reasoning trail.
    /// 2. Implausible geometry (NaN or out-of-range angles) downgrades the
    ///    category to [`PoseCategory::Uncertain`] with a warning code. The
    ///    score is kept: uncertainty routes to human review, it is not
    ///    silently dismissed.
    pub fn validate(&self, pose: PoseSignal, nudity: &DetectionSignal) -> PoseSignal {
        if !pose.detected {
            return pose;
        }

        if nudity.is_face_only() {
            return self.override_face_only(pose);
        }

        if let Some(metrics) = pose.metrics {
            let implausible = [metrics.torso_angle, metrics.hip_bend_angle]
                .iter()
                .any(|angle| !angle.is_finite() || *angle < 0.0 || *angle > MAX_PLAUSIBLE_ANGLE)
                || !metrics.leg_spread.is_finite()
                || metrics.leg_spread < 0.0;

            if implausible {
                return self.downgrade_uncertain(pose);
            }
        }

        pose
    }

    fn override_face_only(&self, pose: PoseSignal) -> PoseSignal {
        warn!(
            original_category = ?pose.category,
            original_score = pose.suggestive_score,
            "pose reported on face-only image, overriding"
        );

        let mut reasoning = vec![
            "face_only_image_no_body_visible".to_string(),
            format!(
                "overridden_suggestive_score_{:.2}",
                pose.suggestive_score
            ),
        ];
        reasoning.extend(pose.reasoning);

        PoseSignal {
            category: PoseCategory::FaceOnlyNoPose,
            suggestive_score: 0.0,
            confidence: pose.confidence,
            reasoning,
            // evidence is kept, only the derived category is discarded
            metrics: pose.metrics,
            detected: false,
        }
    }

    fn downgrade_uncertain(&self, mut pose: PoseSignal) -> PoseSignal {
        warn!(
            score = pose.suggestive_score,
            metrics = ?pose.metrics,
            "implausible pose geometry, downgrading to uncertain"
        );

        pose.category = PoseCategory::Uncertain;
        pose.reasoning.push("extreme_metrics_detected".to_string());
        pose
    }
}
