//! 端末上での姿勢デコード、運動フォーム解析、間引きつきセッション通知

pub mod analyzer;
pub mod config;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod pose;
pub mod session;

pub use analyzer::{analyze_pose, FormFeedback, FormViolation};
pub use error::VisionError;
pub use session::{AppLifecycle, FrameProcessor, VisionService, VisionSnapshot};

/// ビルド版（`build.rs` が生成）
pub const VERSION: &str = env!("PEER_VISION_VERSION");
