//! Nudity detection signal

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use imageguard_core::{BoundingBox, ComponentConfig, PartClass};

/// Score above which an image is considered to contain nudity (percent)
pub const NUDITY_TRIGGER: f32 = 30.0;

/// Synthetic part label used for the fail-closed analyzer-failure fallback
pub const ANALYSIS_ERROR_PART: &str = "ANALYSIS_ERROR";

/// Confidence assigned to the fail-closed fallback (percent)
pub const ANALYSIS_ERROR_SCORE: f32 = 95.0;

/// One raw detection as reported by the external detector.
///
/// Scores arrive in the detector's native 0..1 range and are converted to
/// percentage units during signal construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    /// Detector class label (e.g. "BREAST_EXPOSED", "FACE_FEMALE")
    pub class: String,

    /// Confidence in 0..1
    pub score: f32,

    /// Bounding box, if the detector localized the part
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

/// A detected body part with normalized confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPart {
    /// Confidence in percentage units, clamped to [0, 100]
    pub confidence: f32,

    /// Location, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

/// Normalized nudity detection signal.
///
/// Invariants: confidences are clamped to [0, 100]; an empty part map yields
/// `nudity_score == 0.0` and `has_nudity == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSignal {
    /// Part label -> highest-confidence detection for that label
    pub parts: BTreeMap<String, DetectedPart>,

    /// Maximum confidence across all parts (percent)
    pub nudity_score: f32,

    /// Whether the score exceeds the fixed trigger
    pub has_nudity: bool,
}

impl DetectionSignal {
    /// Signal for an image with no detections
    pub fn empty() -> Self {
        Self {
            parts: BTreeMap::new(),
            nudity_score: 0.0,
            has_nudity: false,
        }
    }

    /// Build a signal from raw detections, applying the component toggle
    /// matrix.
    ///
    /// Duplicate labels keep the highest-confidence detection. Parts whose
    /// class maps to a disabled toggle are dropped before scoring, so a
    /// disabled sub-signal contributes nothing downstream.
    pub fn from_detections(detections: &[RawDetection], config: &ComponentConfig) -> Self {
        let mut parts: BTreeMap<String, DetectedPart> = BTreeMap::new();

        for detection in detections {
            let label = detection.class.to_ascii_uppercase();
            if !config.part_enabled(&label) {
                continue;
            }

            let confidence = (detection.score * 100.0).clamp(0.0, 100.0);
            let entry = parts.entry(label).or_insert(DetectedPart {
                confidence,
                bbox: detection.bbox,
            });
            if confidence > entry.confidence {
                entry.confidence = confidence;
                entry.bbox = detection.bbox;
            }
        }

        let nudity_score = parts
            .values()
            .map(|p| p.confidence)
            .fold(0.0_f32, f32::max);

        Self {
            has_nudity: nudity_score > NUDITY_TRIGGER,
            nudity_score,
            parts,
        }
    }

    /// Fail-closed fallback for a detector failure or timeout.
    ///
    /// A missed detection is unsafe; a spurious one only triggers human
    /// review, so failures synthesize a maximal-risk signal.
    pub fn analysis_error() -> Self {
        let mut parts = BTreeMap::new();
        parts.insert(
            ANALYSIS_ERROR_PART.to_string(),
            DetectedPart {
                confidence: ANALYSIS_ERROR_SCORE,
                bbox: None,
            },
        );

        Self {
            parts,
            nudity_score: ANALYSIS_ERROR_SCORE,
            has_nudity: true,
        }
    }

    /// Number of distinct detected part labels
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Whether the only detection is a face class (no body evidence)
    pub fn is_face_only(&self) -> bool {
        self.parts.len() == 1
            && self
                .parts
                .keys()
                .all(|label| PartClass::is_face(label))
    }
}
