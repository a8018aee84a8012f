pub mod decoder;
pub mod keypoint;
pub mod runtime;
pub mod skeleton;

pub use decoder::{PoseDecoder, MIN_POSE_CONFIDENCE, NUM_DETECTIONS, VALUES_PER_DETECTION};
pub use keypoint::{Keypoint, KeypointIndex, Pose};
#[cfg(feature = "onnx")]
pub use runtime::OnnxRuntime;
pub use runtime::{InferenceRuntime, ModelHandle};
pub use skeleton::SKELETON_CONNECTIONS;
