use thiserror::Error;

/// アプリ層に返すエラー
///
/// フレーム単位の異常はここに出さず、「姿勢なし」かチェックの省略になる。
#[derive(Debug, Error)]
pub enum VisionError {
    /// 推論ランタイムを起動できなかった
    #[error("failed to initialize inference runtime: {0:#}")]
    RuntimeInit(#[source] anyhow::Error),

    /// 1フレームの推論に失敗
    #[error("inference failed: {0:#}")]
    Inference(#[source] anyhow::Error),

    /// モデル未ロード
    #[error("inference runtime is not loaded")]
    ModelNotLoaded,

    /// セッションワーカーが終了済み
    #[error("vision session worker has stopped")]
    ServiceStopped,
}
