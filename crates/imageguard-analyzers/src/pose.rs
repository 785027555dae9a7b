//! Pose classification signal
//!
//! The external estimator reports skeletal landmarks reduced to geometric
//! metrics; this module derives the suggestiveness score and category from
//! those metrics with fixed additive weights.

use serde::{Deserialize, Serialize};

/// Category breakpoints applied to the suggestive score.
///
/// One monotone mapping: >= 0.7 highly, >= 0.4 moderately, >= 0.2 mildly
/// suggestive, else neutral.
pub const HIGHLY_SUGGESTIVE_BREAKPOINT: f32 = 0.7;
pub const MODERATELY_SUGGESTIVE_BREAKPOINT: f32 = 0.4;
pub const MILDLY_SUGGESTIVE_BREAKPOINT: f32 = 0.2;

/// Closed set of pose categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseCategory {
    Neutral,
    MildlySuggestive,
    ModeratelySuggestive,
    HighlySuggestive,
    /// Moderately-or-higher band where the hip-bend factor dominates
    BentOver,
    /// Validator override: only a face was detected, no body to pose
    FaceOnlyNoPose,
    /// Estimator found no pose landmarks
    Undetected,
    /// Validator downgrade: geometry metrics are physically implausible
    Uncertain,
    /// Estimator failed or timed out
    AnalysisError,
}

impl PoseCategory {
    /// Deterministic bucketing of a suggestive score
    pub fn from_score(score: f32) -> Self {
        if score >= HIGHLY_SUGGESTIVE_BREAKPOINT {
            Self::HighlySuggestive
        } else if score >= MODERATELY_SUGGESTIVE_BREAKPOINT {
            Self::ModeratelySuggestive
        } else if score >= MILDLY_SUGGESTIVE_BREAKPOINT {
            Self::MildlySuggestive
        } else {
            Self::Neutral
        }
    }
}

/// Gross body orientation relative to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyOrientation {
    FacingCamera,
    SideView,
    FacingAway,
    Unknown,
}

/// Geometric metrics derived from pose landmarks by the external estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseMetrics {
    /// Torso lean angle in degrees
    pub torso_angle: f32,

    /// Hip bend angle in degrees
    pub hip_bend_angle: f32,

    /// Normalized horizontal ankle separation
    pub leg_spread: f32,

    /// Whether either shoulder sits above the nose
    pub arms_raised: bool,

    /// Whether a hand is positioned near the body center
    pub hands_near_body: bool,

    /// Body orientation
    pub orientation: BodyOrientation,
}

/// Raw estimator output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPose {
    /// Whether pose landmarks were found at all
    pub detected: bool,

    /// Derived metrics (absent when no landmarks were found)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PoseMetrics>,

    /// Landmark visibility confidence in 0..1
    pub confidence: f32,

    /// Number of landmarks the estimator resolved
    pub landmark_count: usize,
}

/// Normalized pose signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSignal {
    pub category: PoseCategory,

    /// Suggestiveness in [0, 1]
    pub suggestive_score: f32,

    /// Estimator confidence in [0, 1]
    pub confidence: f32,

    /// Contributing geometric factors, in evaluation order
    pub reasoning: Vec<String>,

    /// Raw metrics, retained for audit even when the category is overridden
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PoseMetrics>,

    /// Whether landmarks were detected
    pub detected: bool,
}

impl PoseSignal {
    /// Derive the signal from raw estimator output.
    ///
    /// Fixed additive factor weights, capped at 1.0. Each firing factor
    /// appends a named reasoning code.
    pub fn from_raw(raw: &RawPose) -> Self {
        if !raw.detected {
            return Self::undetected();
        }

        let Some(metrics) = raw.metrics else {
            return Self::undetected();
        };

        let mut score = 0.0_f32;
        let mut reasoning = Vec::new();
        let mut hip_bend_fired = false;

        if metrics.torso_angle > 45.0 {
            score += 0.3;
            reasoning.push("significant_torso_lean".to_string());
        }

        if metrics.hip_bend_angle < 60.0 {
            score += 0.4;
            reasoning.push("pronounced_hip_bend".to_string());
            hip_bend_fired = true;
        }

        if metrics.leg_spread > 0.3 {
            score += 0.2;
            reasoning.push("wide_leg_stance".to_string());
        }

        if metrics.arms_raised {
            score += 0.1;
            reasoning.push("arms_raised".to_string());
        }

        if metrics.hands_near_body {
            score += 0.15;
            reasoning.push("hands_near_body".to_string());
        }

        if metrics.orientation == BodyOrientation::FacingAway {
            score += 0.2;
            reasoning.push("facing_away".to_string());
        }

        let score = score.min(1.0);

        // BentOver names the moderately-or-higher band when the hip-bend
        // factor fired; the underlying score ordering is unchanged.
        let mut category = PoseCategory::from_score(score);
        if hip_bend_fired
            && matches!(
                category,
                PoseCategory::ModeratelySuggestive | PoseCategory::HighlySuggestive
            )
        {
            category = PoseCategory::BentOver;
        }

        if reasoning.is_empty() {
            reasoning.push("neutral_pose".to_string());
        }

        Self {
            category,
            suggestive_score: score,
            confidence: raw.confidence.clamp(0.0, 1.0),
            reasoning,
            metrics: Some(metrics),
            detected: true,
        }
    }

    /// Signal for an image with no pose landmarks
    pub fn undetected() -> Self {
        Self {
            category: PoseCategory::Undetected,
            suggestive_score: 0.0,
            confidence: 0.0,
            reasoning: vec!["no_pose_landmarks_found".to_string()],
            metrics: None,
            detected: false,
        }
    }

    /// Zero-contribution fallback for an estimator failure or timeout.
    ///
    /// Pose is a secondary signal; failure degrades to neutral with an
    /// explicit error code rather than synthesizing risk.
    pub fn analysis_error() -> Self {
        Self {
            category: PoseCategory::AnalysisError,
            suggestive_score: 0.0,
            confidence: 0.0,
            reasoning: vec!["analysis_error".to_string()],
            metrics: None,
            detected: false,
        }
    }
}
