//! Analyzer output contracts
//!
//! Each external perception service is consumed through one of these traits.
//! Implementations wrap whatever inference client the deployment uses; the
//! pipeline is designed against the signal contract, never against a specific
//! detector.

use async_trait::async_trait;
use imageguard_core::{ImageRef, Result};

use crate::description::RawCaption;
use crate::face::RawFace;
use crate::nudity::RawDetection;
use crate::pose::RawPose;

/// Nudity/body-part detector contract
#[async_trait]
pub trait NudityDetector: Send + Sync {
    /// Detect body-part classes in the image
    async fn detect(&self, image: &ImageRef) -> Result<Vec<RawDetection>>;

    /// Get the detector name (for logs and traces)
    fn name(&self) -> &str;
}

/// Pose/landmark estimator contract
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    /// Estimate body pose and derived geometric metrics
    async fn estimate(&self, image: &ImageRef) -> Result<RawPose>;

    /// Get the estimator name
    fn name(&self) -> &str;
}

/// Face detection and age estimation contract
#[async_trait]
pub trait FaceAnalyzer: Send + Sync {
    /// Detect faces and estimate per-face age and gender
    async fn analyze(&self, image: &ImageRef) -> Result<Vec<RawFace>>;

    /// Get the analyzer name
    fn name(&self) -> &str;
}

/// Caption/description generator contract
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    /// Generate a free-text description and derived tags
    async fn describe(&self, image: &ImageRef) -> Result<RawCaption>;

    /// Get the generator name
    fn name(&self) -> &str;
}
