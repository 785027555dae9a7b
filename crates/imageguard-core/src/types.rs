//! Core types for ImageGuard

use serde::{Deserialize, Serialize};

use crate::config::ComponentConfig;

/// Reference to an image held by an external store.
///
/// The pipeline never decodes image bytes itself; analyzers receive this
/// reference and resolve it against their own storage collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    /// Opaque locator understood by the analyzer backends (path, URL, object key)
    pub uri: String,
}

impl ImageRef {
    /// Create a new image reference
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Whether the reference carries a usable locator
    pub fn is_empty(&self) -> bool {
        self.uri.trim().is_empty()
    }
}

/// A bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A single moderation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRequest {
    /// The image to evaluate
    pub image: ImageRef,

    /// Content-use context key (e.g. "public_gallery", "private_gallery")
    pub context_type: String,

    /// Identifier of the model/account that submitted the content
    #[serde(default)]
    pub model_id: u32,

    /// Per-request configuration override; `None` uses the process default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ComponentConfig>,
}

impl ModerationRequest {
    /// Create a request with the default configuration
    pub fn new(image: ImageRef, context_type: impl Into<String>) -> Self {
        Self {
            image,
            context_type: context_type.into(),
            model_id: 0,
            config: None,
        }
    }

    /// Attach a configuration override
    pub fn with_config(mut self, config: ComponentConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the submitting model id
    pub fn with_model_id(mut self, model_id: u32) -> Self {
        self.model_id = model_id;
        self
    }
}

/// Closed enumeration of analyzer signal categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    /// Nudity/body-part detection
    Nudity,
    /// Pose/posture classification
    Pose,
    /// Face detection and age estimation
    Face,
    /// Caption/description generation
    Description,
}

impl SignalCategory {
    /// Stable name used in logs and metrics labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nudity => "nudity",
            Self::Pose => "pose",
            Self::Face => "face",
            Self::Description => "description",
        }
    }
}

/// Outcome of one analyzer stage invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Analyzer ran and returned a usable signal
    Completed,
    /// Category was disabled by configuration; no analyzer was invoked
    Disabled,
    /// Analyzer failed or timed out; the fail-closed fallback was used
    Failed,
}
