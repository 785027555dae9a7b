//! ImageGuard Analyzers
//!
//! Typed signals for the four analyzer categories (nudity, pose, face,
//! description), the output contracts the external perception services must
//! satisfy, and the stage runner that invokes them under the fail-closed
//! error policy.
//!
//! The perception models themselves live behind the [`analyzer`] traits;
//! this crate only normalizes their outputs into validated signals.

pub mod analyzer;
pub mod description;
pub mod face;
pub mod nudity;
pub mod pose;
pub mod stage;
pub mod validator;

pub use analyzer::{CaptionGenerator, FaceAnalyzer, NudityDetector, PoseEstimator};
pub use description::{DescriptionSignal, DescriptionSource, KeywordScanner, RawCaption};
pub use face::{FaceRecord, FaceSignal, Gender, RawFace};
pub use nudity::{DetectedPart, DetectionSignal, RawDetection};
pub use pose::{BodyOrientation, PoseCategory, PoseMetrics, PoseSignal, RawPose};
pub use stage::{AnalyzerSet, StageReport, StageRunner};
pub use validator::CrossSignalValidator;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::analyzer::{CaptionGenerator, FaceAnalyzer, NudityDetector, PoseEstimator};
    pub use crate::description::{DescriptionSignal, KeywordScanner};
    pub use crate::face::FaceSignal;
    pub use crate::nudity::DetectionSignal;
    pub use crate::pose::{PoseCategory, PoseSignal};
    pub use crate::stage::{AnalyzerSet, StageReport, StageRunner};
    pub use crate::validator::CrossSignalValidator;
}
