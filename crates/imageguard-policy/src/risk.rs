//! Risk fusion
//!
//! Aggregates validated signals into a single 0-100 risk score, a bucketed
//! risk level, and an ordered reasoning trail. The fusion model is
//! two-term: an additive base risk from the primary detectors, then a
//! multiplicative age amplifier applied after summation so that
//! protected-class severity always dominates. Pose contributes additively,
//! weighted by estimator confidence: suggestive posture is evidence of
//! context, not of protected-class severity.

use serde::{Deserialize, Serialize};

use imageguard_analyzers::description::{DescriptionSignal, DescriptionSource};
use imageguard_analyzers::face::FaceSignal;
use imageguard_analyzers::nudity::DetectionSignal;
use imageguard_analyzers::pose::{PoseCategory, PoseSignal};

/// Age amplifier for a face under the hard rejection threshold
pub const UNDERAGE_RISK_MULTIPLIER: f32 = 3.0;

/// Age amplifier for a face under the suspicion threshold
pub const SUSPICIOUS_AGE_RISK_MULTIPLIER: f32 = 1.5;

/// Base-risk increment per risky description tag
pub const RISKY_TAG_RISK: f32 = 0.1;

/// Flat base-risk term when child keywords are present. The presence of the
/// content must never be zero-costed by other low scores.
pub const CHILD_KEYWORD_RISK: f32 = 0.5;

/// Maximum weight of the pose term (scaled by estimator confidence)
pub const POSE_WEIGHT: f32 = 0.3;

/// Description tags that contribute base risk
pub const RISKY_TAGS: &[&str] = &["nude", "naked", "underwear", "bikini", "bedroom", "bathroom"];

/// Ordered risk level buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

/// Which bucket table produced the risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTableKind {
    /// Strict table, used when an age-bearing signal was present
    AgeWeighted,
    /// Looser table for nudity-only contexts without age evidence
    NudityOnly,
}

/// A named risk-level bucket table with fixed breakpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevelTable {
    pub kind: RiskTableKind,
    pub critical: f32,
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

impl RiskLevelTable {
    /// Strict breakpoints applied when age evidence exists
    pub const AGE_WEIGHTED: Self = Self {
        kind: RiskTableKind::AgeWeighted,
        critical: 90.0,
        high: 70.0,
        medium: 40.0,
        low: 20.0,
    };

    /// Looser breakpoints for images with no isolable age evidence, to
    /// avoid over-penalizing nudity-only contexts
    pub const NUDITY_ONLY: Self = Self {
        kind: RiskTableKind::NudityOnly,
        critical: 80.0,
        high: 60.0,
        medium: 40.0,
        low: 20.0,
    };

    /// Select the table for a request
    pub fn select(age_evidence: bool) -> &'static Self {
        if age_evidence {
            &Self::AGE_WEIGHTED
        } else {
            &Self::NUDITY_ONLY
        }
    }

    /// Bucket a final risk score
    pub fn level(&self, score: f32) -> RiskLevel {
        if score >= self.critical {
            RiskLevel::Critical
        } else if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else if score >= self.low {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }
}

/// Per-factor contribution breakdown for audit traceability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    /// Nudity base risk in percent
    pub nudity_contribution: f32,

    /// Confidence-weighted pose term in percent
    pub pose_contribution: f32,

    /// Description base risk (tags + child keyword term) in percent
    pub description_risk: f32,

    /// Applied age amplifier
    pub age_multiplier: f32,
}

/// The fused risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Final score, clamped to [0, 100]
    pub final_risk_score: f32,

    pub risk_level: RiskLevel,

    /// Which bucket table was applied
    pub table: RiskTableKind,

    /// One code per contributing factor, in evaluation order
    pub reasoning: Vec<String>,

    pub breakdown: RiskBreakdown,
}

/// Validated signals entering risk fusion.
///
/// `None` means the category was disabled: it is excluded from computation,
/// not treated as low risk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalSet<'a> {
    pub nudity: Option<&'a DetectionSignal>,
    pub pose: Option<&'a PoseSignal>,
    pub face: Option<&'a FaceSignal>,
    pub description: Option<&'a DescriptionSignal>,
}

/// Combines signals into a [`RiskAssessment`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskCombiner;

impl RiskCombiner {
    pub fn new() -> Self {
        Self
    }

    /// Fuse the signal set. Pure and deterministic: identical inputs yield
    /// identical assessments.
    pub fn combine(&self, signals: &SignalSet<'_>) -> RiskAssessment {
        let nudity_risk = signals
            .nudity
            .map(|n| n.nudity_score / 100.0)
            .unwrap_or(0.0);

        let pose_term = signals
            .pose
            .map(|p| p.suggestive_score * (POSE_WEIGHT * p.confidence))
            .unwrap_or(0.0);

        let risky_tag_count = signals
            .description
            .map(|d| {
                RISKY_TAGS
                    .iter()
                    .filter(|tag| d.tags.iter().any(|t| t == *tag))
                    .count()
            })
            .unwrap_or(0);

        let child_keywords = signals
            .description
            .map(|d| d.contains_child_keywords)
            .unwrap_or(false);

        let description_risk = risky_tag_count as f32 * RISKY_TAG_RISK
            + if child_keywords { CHILD_KEYWORD_RISK } else { 0.0 };

        let age_multiplier = match signals.face {
            Some(face) if face.underage_detected => UNDERAGE_RISK_MULTIPLIER,
            Some(face) if face.suspicious_age => SUSPICIOUS_AGE_RISK_MULTIPLIER,
            _ => 1.0,
        };

        let base_risk = nudity_risk + pose_term + description_risk;
        let final_risk_score = (base_risk * age_multiplier * 100.0).clamp(0.0, 100.0);

        let age_evidence = signals.face.is_some_and(|f| f.faces_detected);
        let table = RiskLevelTable::select(age_evidence);

        let reasoning = self.build_reasoning(
            signals,
            pose_term,
            risky_tag_count,
            child_keywords,
        );

        RiskAssessment {
            final_risk_score,
            risk_level: table.level(final_risk_score),
            table: table.kind,
            reasoning,
            breakdown: RiskBreakdown {
                nudity_contribution: nudity_risk * 100.0,
                pose_contribution: pose_term * 100.0,
                description_risk: description_risk * 100.0,
                age_multiplier,
            },
        }
    }

    /// One code per contributing factor, in evaluation order. Stage error
    /// codes are appended even though errored secondary stages contribute
    /// zero risk, so partial failures stay explainable.
    fn build_reasoning(
        &self,
        signals: &SignalSet<'_>,
        pose_term: f32,
        risky_tag_count: usize,
        child_keywords: bool,
    ) -> Vec<String> {
        let mut reasoning = Vec::new();

        if let Some(nudity) = signals.nudity {
            // any non-zero contribution gets a code, not just scores past
            // the nudity trigger
            if nudity.nudity_score > 0.0 {
                reasoning.push(format!("nudity_detected_{:.1}%", nudity.nudity_score));
            }
        }

        if let Some(pose) = signals.pose {
            if pose_term > 0.0 {
                reasoning.push(format!("suggestive_pose_{}", category_code(pose.category)));
            }
        }

        if let Some(face) = signals.face {
            if face.underage_detected {
                reasoning.push(format!(
                    "underage_face_detected_min_age_{}",
                    face.min_age.unwrap_or(0)
                ));
            } else if face.suspicious_age {
                reasoning.push(format!(
                    "suspicious_age_detected_min_age_{}",
                    face.min_age.unwrap_or(0)
                ));
            }
        }

        if risky_tag_count > 0 {
            reasoning.push(format!("risky_content_tags_{}", risky_tag_count));
        }

        if child_keywords {
            reasoning.push("child_keywords_detected".to_string());
        }

        if signals
            .pose
            .is_some_and(|p| p.category == PoseCategory::AnalysisError)
        {
            reasoning.push("pose_analysis_error".to_string());
        }

        if signals
            .description
            .is_some_and(|d| d.source == DescriptionSource::AnalysisError)
        {
            reasoning.push("description_analysis_error".to_string());
        }

        if reasoning.is_empty() {
            reasoning.push("clean_content".to_string());
        }

        reasoning
    }
}

fn category_code(category: PoseCategory) -> &'static str {
    match category {
        PoseCategory::Neutral => "neutral",
        PoseCategory::MildlySuggestive => "mildly_suggestive",
        PoseCategory::ModeratelySuggestive => "moderately_suggestive",
        PoseCategory::HighlySuggestive => "highly_suggestive",
        PoseCategory::BentOver => "bent_over",
        PoseCategory::FaceOnlyNoPose => "face_only_no_pose",
        PoseCategory::Undetected => "undetected",
        PoseCategory::Uncertain => "uncertain",
        PoseCategory::AnalysisError => "analysis_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageguard_analyzers::description::RawCaption;
    use imageguard_analyzers::face::{Gender, RawFace};
    use imageguard_analyzers::nudity::RawDetection;
    use imageguard_analyzers::pose::{BodyOrientation, PoseMetrics, RawPose};
    use imageguard_analyzers::KeywordScanner;
    use imageguard_core::{BoundingBox, ComponentConfig};
    use proptest::prelude::*;

    fn nudity(score: f32) -> DetectionSignal {
        DetectionSignal::from_detections(
            &[RawDetection {
                class: "BREAST_EXPOSED".to_string(),
                score,
                bbox: None,
            }],
            &ComponentConfig::default(),
        )
    }

    fn face(age: u32) -> FaceSignal {
        FaceSignal::from_faces(&[RawFace {
            age,
            gender: Gender::Unknown,
            confidence: 0.9,
            bbox: BoundingBox::new(0, 0, 10, 10),
        }])
    }

    fn description(text: &str, tags: &[&str]) -> DescriptionSignal {
        let scanner = KeywordScanner::default_child_keywords();
        DescriptionSignal::from_caption(
            &RawCaption {
                description: text.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
            Some(&scanner),
        )
    }

    fn suggestive_pose(confidence: f32) -> PoseSignal {
        PoseSignal::from_raw(&RawPose {
            detected: true,
            metrics: Some(PoseMetrics {
                torso_angle: 50.0,
                hip_bend_angle: 40.0,
                leg_spread: 0.5,
                arms_raised: false,
                hands_near_body: false,
                orientation: BodyOrientation::FacingCamera,
            }),
            confidence,
            landmark_count: 33,
        })
    }

    #[test]
    fn test_clean_signals_yield_minimal_risk() {
        let combiner = RiskCombiner::new();
        let nudity = DetectionSignal::empty();
        let signals = SignalSet {
            nudity: Some(&nudity),
            ..Default::default()
        };

        let assessment = combiner.combine(&signals);

        assert_eq!(assessment.final_risk_score, 0.0);
        assert_eq!(assessment.risk_level, RiskLevel::Minimal);
        assert_eq!(assessment.reasoning, vec!["clean_content".to_string()]);
    }

    #[test]
    fn test_underage_multiplier_dominates() {
        let combiner = RiskCombiner::new();
        let n = nudity(0.3);
        let f = face(14);
        let signals = SignalSet {
            nudity: Some(&n),
            face: Some(&f),
            ..Default::default()
        };

        let assessment = combiner.combine(&signals);

        // 0.3 * 3.0 * 100 = 90
        assert!((assessment.final_risk_score - 90.0).abs() < 1e-3);
        assert_eq!(assessment.breakdown.age_multiplier, 3.0);
        assert_eq!(assessment.risk_level, RiskLevel::Critical);
        assert!(assessment
            .reasoning
            .contains(&"underage_face_detected_min_age_14".to_string()));
    }

    #[test]
    fn test_suspicious_age_multiplier() {
        let combiner = RiskCombiner::new();
        let n = nudity(0.4);
        let f = face(17);
        let signals = SignalSet {
            nudity: Some(&n),
            face: Some(&f),
            ..Default::default()
        };

        let assessment = combiner.combine(&signals);

        // 0.4 * 1.5 * 100 = 60
        assert!((assessment.final_risk_score - 60.0).abs() < 1e-3);
        assert_eq!(assessment.breakdown.age_multiplier, 1.5);
    }

    #[test]
    fn test_score_capped_at_100() {
        let combiner = RiskCombiner::new();
        let n = nudity(0.95);
        let f = face(12);
        let signals = SignalSet {
            nudity: Some(&n),
            face: Some(&f),
            ..Default::default()
        };

        let assessment = combiner.combine(&signals);

        assert_eq!(assessment.final_risk_score, 100.0);
    }

    #[test]
    fn test_disabled_category_contributes_zero() {
        let combiner = RiskCombiner::new();
        let n = nudity(0.5);
        let d = description("a woman in a bedroom", &["bedroom", "underwear"]);

        let with_description = combiner.combine(&SignalSet {
            nudity: Some(&n),
            description: Some(&d),
            ..Default::default()
        });
        let without_description = combiner.combine(&SignalSet {
            nudity: Some(&n),
            ..Default::default()
        });

        assert!(with_description.final_risk_score > without_description.final_risk_score);
        assert_eq!(without_description.breakdown.description_risk, 0.0);
    }

    #[test]
    fn test_risky_tags_accumulate() {
        let combiner = RiskCombiner::new();
        let d = description("a person", &["bikini", "bedroom", "bathroom"]);
        let signals = SignalSet {
            description: Some(&d),
            ..Default::default()
        };

        let assessment = combiner.combine(&signals);

        // 3 tags * 0.1 * 100 = 30
        assert!((assessment.breakdown.description_risk - 30.0).abs() < 1e-3);
        assert!(assessment
            .reasoning
            .contains(&"risky_content_tags_3".to_string()));
    }

    #[test]
    fn test_child_keywords_never_zero_costed() {
        let combiner = RiskCombiner::new();
        let d = description("a child at a playground", &[]);
        let signals = SignalSet {
            description: Some(&d),
            ..Default::default()
        };

        let assessment = combiner.combine(&signals);

        // flat 0.5 term: 50 even with zero nudity
        assert!((assessment.final_risk_score - 50.0).abs() < 1e-3);
        assert!(assessment
            .reasoning
            .contains(&"child_keywords_detected".to_string()));
    }

    #[test]
    fn test_pose_term_is_additive_and_confidence_weighted() {
        let combiner = RiskCombiner::new();
        let full = suggestive_pose(1.0);
        let half = suggestive_pose(0.5);

        let at_full = combiner.combine(&SignalSet {
            pose: Some(&full),
            ..Default::default()
        });
        let at_half = combiner.combine(&SignalSet {
            pose: Some(&half),
            ..Default::default()
        });

        assert!(at_full.final_risk_score > at_half.final_risk_score);
        assert_eq!(at_full.breakdown.age_multiplier, 1.0);
        assert!(at_full
            .reasoning
            .iter()
            .any(|r| r.starts_with("suggestive_pose_")));
    }

    #[test]
    fn test_table_selection_by_age_evidence() {
        let combiner = RiskCombiner::new();
        let n = nudity(0.85);

        let without_age = combiner.combine(&SignalSet {
            nudity: Some(&n),
            ..Default::default()
        });
        assert_eq!(without_age.table, RiskTableKind::NudityOnly);
        // 85 >= 80 on the nudity-only table
        assert_eq!(without_age.risk_level, RiskLevel::Critical);

        let f = face(30);
        let with_age = combiner.combine(&SignalSet {
            nudity: Some(&n),
            face: Some(&f),
            ..Default::default()
        });
        assert_eq!(with_age.table, RiskTableKind::AgeWeighted);
        // 85 < 90 on the age-weighted table
        assert_eq!(with_age.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_analysis_error_codes_present() {
        let combiner = RiskCombiner::new();
        let p = PoseSignal::analysis_error();
        let d = DescriptionSignal::analysis_error();
        let signals = SignalSet {
            pose: Some(&p),
            description: Some(&d),
            ..Default::default()
        };

        let assessment = combiner.combine(&signals);

        assert_eq!(assessment.final_risk_score, 0.0);
        assert!(assessment
            .reasoning
            .contains(&"pose_analysis_error".to_string()));
        assert!(assessment
            .reasoning
            .contains(&"description_analysis_error".to_string()));
    }

    #[test]
    fn test_idempotence() {
        let combiner = RiskCombiner::new();
        let n = nudity(0.6);
        let f = face(17);
        let d = description("a woman in underwear", &["underwear"]);
        let signals = SignalSet {
            nudity: Some(&n),
            face: Some(&f),
            description: Some(&d),
            ..Default::default()
        };

        let first = combiner.combine(&signals);
        let second = combiner.combine(&signals);

        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_final_score_clamped(score in -1.0_f32..3.0, age in 5u32..80) {
            let combiner = RiskCombiner::new();
            let n = nudity(score);
            let f = face(age);
            let signals = SignalSet {
                nudity: Some(&n),
                face: Some(&f),
                ..Default::default()
            };

            let assessment = combiner.combine(&signals);
            prop_assert!(assessment.final_risk_score >= 0.0);
            prop_assert!(assessment.final_risk_score <= 100.0);
        }

        #[test]
        fn prop_monotone_in_nudity(lo in 0.0_f32..1.0, delta in 0.0_f32..1.0) {
            let combiner = RiskCombiner::new();
            let low = nudity(lo);
            let high = nudity((lo + delta).min(1.0));

            let low_score = combiner.combine(&SignalSet {
                nudity: Some(&low),
                ..Default::default()
            }).final_risk_score;
            let high_score = combiner.combine(&SignalSet {
                nudity: Some(&high),
                ..Default::default()
            }).final_risk_score;

            prop_assert!(high_score >= low_score);
        }

        #[test]
        fn prop_monotone_in_age_multiplier(score in 0.0_f32..1.0) {
            let combiner = RiskCombiner::new();
            let n = nudity(score);
            let adult = face(30);
            let suspicious = face(17);
            let underage = face(14);

            let base = combiner.combine(&SignalSet {
                nudity: Some(&n),
                face: Some(&adult),
                ..Default::default()
            }).final_risk_score;
            let amplified = combiner.combine(&SignalSet {
                nudity: Some(&n),
                face: Some(&suspicious),
                ..Default::default()
            }).final_risk_score;
            let maximal = combiner.combine(&SignalSet {
                nudity: Some(&n),
                face: Some(&underage),
                ..Default::default()
            }).final_risk_score;

            prop_assert!(amplified >= base);
            prop_assert!(maximal >= amplified);
        }
    }
}
