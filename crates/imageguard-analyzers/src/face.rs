//! Face detection and age estimation signal

use serde::{Deserialize, Serialize};

use imageguard_core::BoundingBox;

/// Minimum age below which content is rejected outright (years)
pub const MIN_AGE_THRESHOLD: u32 = 16;

/// Minimum age below which the age multiplier escalates risk (years)
pub const SUSPICIOUS_AGE_THRESHOLD: u32 = 18;

/// Estimated gender of a detected face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

/// Raw per-face record as reported by the external analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFace {
    /// Estimated age in years
    pub age: u32,

    pub gender: Gender,

    /// Detection confidence in 0..1
    pub confidence: f32,

    pub bbox: BoundingBox,
}

/// A normalized per-face record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    /// 1-based position in detection order
    pub face_id: usize,

    pub age: u32,

    pub gender: Gender,

    /// Detection confidence clamped to [0, 1]
    pub confidence: f32,

    pub bbox: BoundingBox,
}

/// Counts of faces per age band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeDistribution {
    pub under_16: usize,
    pub under_18: usize,
    pub adult: usize,
}

/// Normalized face signal.
///
/// Invariant: an empty face list yields `faces_detected == false` and both
/// age flags false; there is never a null age comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSignal {
    pub faces_detected: bool,

    pub faces: Vec<FaceRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,

    /// Youngest face below the hard rejection threshold
    pub underage_detected: bool,

    /// Youngest face below the risk-escalation threshold
    pub suspicious_age: bool,

    pub age_distribution: AgeDistribution,
}

impl FaceSignal {
    /// Signal for an image with no detected faces, and the conservative
    /// fallback for an analyzer failure
    pub fn empty() -> Self {
        Self {
            faces_detected: false,
            faces: Vec::new(),
            min_age: None,
            max_age: None,
            underage_detected: false,
            suspicious_age: false,
            age_distribution: AgeDistribution::default(),
        }
    }

    /// Build a signal from raw analyzer output
    pub fn from_faces(raw: &[RawFace]) -> Self {
        if raw.is_empty() {
            return Self::empty();
        }

        let faces: Vec<FaceRecord> = raw
            .iter()
            .enumerate()
            .map(|(i, face)| FaceRecord {
                face_id: i + 1,
                age: face.age,
                gender: face.gender,
                confidence: face.confidence.clamp(0.0, 1.0),
                bbox: face.bbox,
            })
            .collect();

        let min_age = faces.iter().map(|f| f.age).min();
        let max_age = faces.iter().map(|f| f.age).max();

        let mut distribution = AgeDistribution::default();
        for face in &faces {
            if face.age < MIN_AGE_THRESHOLD {
                distribution.under_16 += 1;
            }
            if face.age < SUSPICIOUS_AGE_THRESHOLD {
                distribution.under_18 += 1;
            } else {
                distribution.adult += 1;
            }
        }

        Self {
            faces_detected: true,
            underage_detected: min_age.is_some_and(|age| age < MIN_AGE_THRESHOLD),
            suspicious_age: min_age.is_some_and(|age| age < SUSPICIOUS_AGE_THRESHOLD),
            min_age,
            max_age,
            faces,
            age_distribution: distribution,
        }
    }
}
