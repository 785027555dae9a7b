//! Component configuration
//!
//! The toggle matrix selecting which analyzer categories and sub-signals run
//! for a request. Missing keys deserialize to enabled: detection that was not
//! explicitly switched off must run.

use serde::{Deserialize, Serialize};

use crate::types::SignalCategory;

/// Per-request analyzer component toggles.
///
/// Disabling a component excludes the corresponding signal from risk
/// computation entirely; it does not merely hide the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Body-part detector class toggles
    #[serde(default = "default_true")]
    pub breast_detection: bool,

    #[serde(default = "default_true")]
    pub genitalia_detection: bool,

    #[serde(default = "default_true")]
    pub buttocks_detection: bool,

    #[serde(default = "default_true")]
    pub anus_detection: bool,

    #[serde(default = "default_true")]
    pub face_detection: bool,

    /// Pose/posture classification
    #[serde(default = "default_true")]
    pub pose_analysis: bool,

    /// Face age estimation
    #[serde(default = "default_true")]
    pub age_estimation: bool,

    /// Child-content keyword scanning over descriptions
    #[serde(default = "default_true")]
    pub child_content_detection: bool,

    /// Caption/description generation
    #[serde(default = "default_true")]
    pub image_description: bool,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            breast_detection: true,
            genitalia_detection: true,
            buttocks_detection: true,
            anus_detection: true,
            face_detection: true,
            pose_analysis: true,
            age_estimation: true,
            child_content_detection: true,
            image_description: true,
        }
    }
}

impl ComponentConfig {
    /// Parse from a flat boolean map (the external interface contract).
    ///
    /// Unknown keys are ignored; absent keys stay enabled. A malformed value
    /// for a key falls back to enabled rather than failing the request.
    pub fn from_flags<'a>(flags: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let mut config = Self::default();
        for (key, value) in flags {
            match key {
                "breast_detection" => config.breast_detection = value,
                "genitalia_detection" => config.genitalia_detection = value,
                "buttocks_detection" => config.buttocks_detection = value,
                "anus_detection" => config.anus_detection = value,
                "face_detection" => config.face_detection = value,
                "pose_analysis" => config.pose_analysis = value,
                "age_estimation" => config.age_estimation = value,
                "child_content_detection" => config.child_content_detection = value,
                "image_description" => config.image_description = value,
                _ => {}
            }
        }
        config
    }

    /// Whether any analyzer runs for the given category
    pub fn category_enabled(&self, category: SignalCategory) -> bool {
        match category {
            SignalCategory::Nudity => {
                self.breast_detection
                    || self.genitalia_detection
                    || self.buttocks_detection
                    || self.anus_detection
                    || self.face_detection
            }
            SignalCategory::Pose => self.pose_analysis,
            SignalCategory::Face => self.age_estimation,
            SignalCategory::Description => self.image_description,
        }
    }

    /// Whether a detector part class passes the toggle matrix.
    ///
    /// Unknown classes pass through: only classes explicitly mapped to a
    /// disabled toggle are filtered.
    pub fn part_enabled(&self, class: &str) -> bool {
        match PartClass::from_label(class) {
            Some(PartClass::Breast) => self.breast_detection,
            Some(PartClass::Genitalia) => self.genitalia_detection,
            Some(PartClass::Buttocks) => self.buttocks_detection,
            Some(PartClass::Anus) => self.anus_detection,
            Some(PartClass::Face) => self.face_detection,
            None => true,
        }
    }
}

/// Detector part classes that map onto configuration toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartClass {
    Breast,
    Genitalia,
    Buttocks,
    Anus,
    Face,
}

impl PartClass {
    /// Map a detector class label to its toggle, if one exists
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.to_ascii_uppercase();
        match upper.as_str() {
            "BREAST_EXPOSED" => Some(Self::Breast),
            "GENITALIA" => Some(Self::Genitalia),
            "BUTTOCKS_EXPOSED" => Some(Self::Buttocks),
            "ANUS_EXPOSED" => Some(Self::Anus),
            "FACE_COVERED" | "FACE_FEMALE" | "FACE_MALE" => Some(Self::Face),
            _ => None,
        }
    }

    /// Whether this class is a face-only detection (no body evidence)
    pub fn is_face(label: &str) -> bool {
        matches!(Self::from_label(label), Some(Self::Face))
    }
}

fn default_true() -> bool {
    true
}
