//! Stage runner
//!
//! Invokes each enabled external analyzer under a per-stage timeout and
//! normalizes output into a typed signal. Every invocation is isolated: an
//! analyzer failure or timeout maps to the category-specific fail-closed
//! fallback and never aborts the pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use imageguard_core::{ComponentConfig, Error, ImageRef, SignalCategory, StageStatus};

use crate::analyzer::{CaptionGenerator, FaceAnalyzer, NudityDetector, PoseEstimator};
use crate::description::{DescriptionSignal, KeywordScanner};
use crate::face::FaceSignal;
use crate::nudity::DetectionSignal;
use crate::pose::PoseSignal;

/// Default per-analyzer timeout
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one analyzer stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport<T> {
    /// The normalized signal (a fallback value when the stage failed)
    pub signal: T,

    pub status: StageStatus,

    /// Stage wall-clock latency in microseconds
    pub latency_us: u64,
}

impl<T> StageReport<T> {
    fn disabled(signal: T) -> Self {
        Self {
            signal,
            status: StageStatus::Disabled,
            latency_us: 0,
        }
    }

    /// Whether the stage produced a usable (non-fallback) signal
    pub fn completed(&self) -> bool {
        self.status == StageStatus::Completed
    }
}

/// The external analyzers a runner dispatches to
#[derive(Clone)]
pub struct AnalyzerSet {
    pub nudity: Arc<dyn NudityDetector>,
    pub pose: Arc<dyn PoseEstimator>,
    pub face: Arc<dyn FaceAnalyzer>,
    pub caption: Arc<dyn CaptionGenerator>,
}

/// Runs analyzer stages with isolation, timeouts, and fail-closed fallbacks
#[derive(Clone)]
pub struct StageRunner {
    analyzers: AnalyzerSet,
    timeout: Duration,
}

impl StageRunner {
    /// Create a runner with the default stage timeout
    pub fn new(analyzers: AnalyzerSet) -> Self {
        Self {
            analyzers,
            timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    /// Override the per-stage timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the nudity detection stage.
    ///
    /// Failure synthesizes a maximal-risk signal: a missed detection is
    /// unsafe, a spurious one only costs a human review.
    pub async fn run_nudity(
        &self,
        image: &ImageRef,
        config: &ComponentConfig,
    ) -> StageReport<DetectionSignal> {
        if !config.category_enabled(SignalCategory::Nudity) {
            return self.report_disabled(SignalCategory::Nudity, DetectionSignal::empty());
        }

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.analyzers.nudity.detect(image)).await;
        let latency_us = start.elapsed().as_micros() as u64;

        match flatten_timeout(outcome) {
            Ok(detections) => {
                let signal = DetectionSignal::from_detections(&detections, config);
                self.report_completed(SignalCategory::Nudity, latency_us, signal)
            }
            Err(e) => self.report_failed(
                SignalCategory::Nudity,
                latency_us,
                &e,
                DetectionSignal::analysis_error(),
            ),
        }
    }

    /// Run the pose estimation stage; failure degrades to a neutral signal
    pub async fn run_pose(
        &self,
        image: &ImageRef,
        config: &ComponentConfig,
    ) -> StageReport<PoseSignal> {
        if !config.category_enabled(SignalCategory::Pose) {
            return self.report_disabled(SignalCategory::Pose, PoseSignal::undetected());
        }

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.analyzers.pose.estimate(image)).await;
        let latency_us = start.elapsed().as_micros() as u64;

        match flatten_timeout(outcome) {
            Ok(raw) => self.report_completed(
                SignalCategory::Pose,
                latency_us,
                PoseSignal::from_raw(&raw),
            ),
            Err(e) => self.report_failed(
                SignalCategory::Pose,
                latency_us,
                &e,
                PoseSignal::analysis_error(),
            ),
        }
    }

    /// Run the face analysis stage; failure degrades to no-faces-detected,
    /// leaving child-keyword scanning as the secondary check
    pub async fn run_face(
        &self,
        image: &ImageRef,
        config: &ComponentConfig,
    ) -> StageReport<FaceSignal> {
        if !config.category_enabled(SignalCategory::Face) {
            return self.report_disabled(SignalCategory::Face, FaceSignal::empty());
        }

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.analyzers.face.analyze(image)).await;
        let latency_us = start.elapsed().as_micros() as u64;

        match flatten_timeout(outcome) {
            Ok(faces) => self.report_completed(
                SignalCategory::Face,
                latency_us,
                FaceSignal::from_faces(&faces),
            ),
            Err(e) => {
                self.report_failed(SignalCategory::Face, latency_us, &e, FaceSignal::empty())
            }
        }
    }

    /// Run the description generation stage; failure degrades to an empty
    /// zero-contribution signal
    pub async fn run_description(
        &self,
        image: &ImageRef,
        config: &ComponentConfig,
        scanner: Option<&KeywordScanner>,
    ) -> StageReport<DescriptionSignal> {
        if !config.category_enabled(SignalCategory::Description) {
            return self.report_disabled(SignalCategory::Description, DescriptionSignal::disabled());
        }

        let scanner = config.child_content_detection.then_some(scanner).flatten();

        let start = Instant::now();
        let outcome =
            tokio::time::timeout(self.timeout, self.analyzers.caption.describe(image)).await;
        let latency_us = start.elapsed().as_micros() as u64;

        match flatten_timeout(outcome) {
            Ok(raw) => self.report_completed(
                SignalCategory::Description,
                latency_us,
                DescriptionSignal::from_caption(&raw, scanner),
            ),
            Err(e) => self.report_failed(
                SignalCategory::Description,
                latency_us,
                &e,
                DescriptionSignal::analysis_error(),
            ),
        }
    }

    fn report_disabled<T>(&self, category: SignalCategory, signal: T) -> StageReport<T> {
        debug!(category = category.as_str(), status = "disabled", "analyzer stage skipped");
        StageReport::disabled(signal)
    }

    fn report_completed<T>(
        &self,
        category: SignalCategory,
        latency_us: u64,
        signal: T,
    ) -> StageReport<T> {
        debug!(
            category = category.as_str(),
            status = "completed",
            latency_us,
            "analyzer stage finished"
        );
        StageReport {
            signal,
            status: StageStatus::Completed,
            latency_us,
        }
    }

    fn report_failed<T>(
        &self,
        category: SignalCategory,
        latency_us: u64,
        error: &Error,
        fallback: T,
    ) -> StageReport<T> {
        warn!(
            category = category.as_str(),
            status = "failed",
            latency_us,
            error = %error,
            "analyzer stage failed, using fail-closed fallback"
        );
        StageReport {
            signal: fallback,
            status: StageStatus::Failed,
            latency_us,
        }
    }
}

/// Collapse a timeout wrapper into the analyzer's own error space
fn flatten_timeout<T>(
    outcome: std::result::Result<imageguard_core::Result<T>, tokio::time::error::Elapsed>,
) -> imageguard_core::Result<T> {
    match outcome {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout),
    }
}
