//! トラッキングセッション（ライフサイクル、間引き通知、プロデューサーからの受け渡し）

mod controller;
mod frame;
mod service;

pub use controller::{AppLifecycle, DecodedFrame, SessionController, VisionSnapshot};
pub use frame::{FrameOutcome, FrameProcessor, FrameSampler};
pub use service::VisionService;
