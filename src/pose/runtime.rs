use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use anyhow::Result;
use ndarray::Array4;
use tracing::{info, warn};

use crate::error::VisionError;

/// テンソル入力/テンソル出力の姿勢モデル
///
/// 出力は呼び出し側のバッファに書き込む（フレーム間で確保を使い回す）。
pub trait InferenceRuntime: Send {
    /// リサイズ済み1フレーム（バックエンドにより `[1, H, W, 3]` か `[1, 3, H, W]`）
    /// を推論し、平坦化した出力を `output` に書く
    fn run_inference(&mut self, input: Array4<f32>, output: &mut Vec<f32>) -> Result<()>;
}

const STATE_UNLOADED: u8 = 0;
const STATE_LOADING: u8 = 1;
const STATE_READY: u8 = 2;

struct ModelSlot {
    state: AtomicU8,
    runtime: Mutex<Option<Box<dyn InferenceRuntime>>>,
}

/// ロード済みモデルのハンドル（初期化 → 準備完了 → 解放）
///
/// クローンは同じスロットを共有する。
#[derive(Clone)]
pub struct ModelHandle {
    slot: Arc<ModelSlot>,
}

impl ModelHandle {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(ModelSlot {
                state: AtomicU8::new(STATE_UNLOADED),
                runtime: Mutex::new(None),
            }),
        }
    }

    /// 構築済みランタイムを包むハンドル
    pub fn with_runtime(runtime: Box<dyn InferenceRuntime>) -> Self {
        let handle = Self::new();
        *handle.lock() = Some(runtime);
        handle.slot.state.store(STATE_READY, Ordering::Release);
        handle
    }

    /// `loader` でランタイムをロード
    ///
    /// ロード済みなら何もしない。失敗時は未ロードに戻るので再試行できる。
    pub fn initialize<F>(&self, loader: F) -> Result<(), VisionError>
    where
        F: FnOnce() -> Result<Box<dyn InferenceRuntime>>,
    {
        if self
            .slot
            .state
            .compare_exchange(STATE_UNLOADED, STATE_LOADING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        let start = Instant::now();
        match loader() {
            Ok(runtime) => {
                *self.lock() = Some(runtime);
                self.slot.state.store(STATE_READY, Ordering::Release);
                info!(elapsed_ms = start.elapsed().as_millis() as u64, "pose model initialized");
                Ok(())
            }
            Err(e) => {
                self.slot.state.store(STATE_UNLOADED, Ordering::Release);
                warn!(error = %e, "pose model failed to initialize");
                Err(VisionError::RuntimeInit(e))
            }
        }
    }

    /// 状態フラグのみを見る（推論中のロックを待たない）
    pub fn is_ready(&self) -> bool {
        self.slot.state.load(Ordering::Acquire) == STATE_READY
    }

    pub fn is_loading(&self) -> bool {
        self.slot.state.load(Ordering::Acquire) == STATE_LOADING
    }

    /// ランタイムを破棄。処理中のフレームは旧ランタイムで完了する
    pub fn release(&self) {
        let mut guard = self.lock();
        self.slot.state.store(STATE_UNLOADED, Ordering::Release);
        let released = guard.take().is_some();
        drop(guard);
        if released {
            info!("pose model released");
        }
    }

    /// 推論1回。未ロードなら `Err(ModelNotLoaded)`
    pub fn run(&self, input: Array4<f32>, output: &mut Vec<f32>) -> Result<(), VisionError> {
        let mut guard = self.lock();
        let runtime = guard.as_mut().ok_or(VisionError::ModelNotLoaded)?;
        runtime.run_inference(input, output).map_err(VisionError::Inference)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn InferenceRuntime>>> {
        self.slot
            .runtime
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxRuntime;

#[cfg(feature = "onnx")]
mod onnx {
    use std::path::Path;

    use anyhow::{Context, Result};
    use ndarray::Array4;
    use ort::session::builder::GraphOptimizationLevel;
    use ort::session::Session;
    use ort::value::Tensor;

    use super::InferenceRuntime;
    use crate::config::ModelConfig;

    /// ONNX Runtime 経由の YOLO 姿勢モデル
    pub struct OnnxRuntime {
        session: Session,
        input_name: String,
        output_name: String,
    }

    impl OnnxRuntime {
        pub fn new<P: AsRef<Path>>(model_path: P, input_name: &str, output_name: &str) -> Result<Self> {
            let session = Session::builder()?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .commit_from_file(model_path.as_ref())
                .context("Failed to load pose ONNX model")?;

            Ok(Self {
                session,
                input_name: input_name.to_string(),
                output_name: output_name.to_string(),
            })
        }

        pub fn from_config(config: &ModelConfig) -> Result<Self> {
            Self::new(&config.path, &config.input_name, &config.output_name)
        }
    }

    impl InferenceRuntime for OnnxRuntime {
        fn run_inference(&mut self, input: Array4<f32>, output: &mut Vec<f32>) -> Result<()> {
            let input_tensor = Tensor::from_array(input)?;
            let outputs = self
                .session
                .run(ort::inputs![self.input_name.as_str() => input_tensor])
                .context("Pose inference failed")?;

            // [1, 56, 8400]、フィールド優先
            let view: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
                .try_extract_array()
                .context("Failed to extract pose output tensor")?;

            output.clear();
            output.extend(view.iter().copied());
            Ok(())
        }
    }
}
