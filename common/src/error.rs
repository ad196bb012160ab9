//! エラー型定義

use thiserror::Error;

/// サービスが `detail` を返さなかった場合の表示メッセージ
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Analysis failed. Please try again with a different image.";

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// アップロード前のファイル検証エラー（ネットワークには到達しない）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unsupported file type: {name}. Supported: JPG, PNG, GIF, BMP, TIFF")]
    UnsupportedType { name: String },

    #[error("File is too large: {size_mb} MB. Max size: {max_mb} MB")]
    TooLarge { size_mb: String, max_mb: u64 },
}

/// アップロード・解析の失敗
///
/// 種類はログ用に区別するが、画面には `user_message()` の文字列だけを出す。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service error (HTTP {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Service { status: u16, detail: Option<String> },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl UploadError {
    /// 非2xxレスポンスのボディからエラーを組み立てる
    ///
    /// `detail` が文字列のときだけ採用する（FastAPIの検証エラーは配列で届く）。
    pub fn from_service_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .filter(|d| !d.trim().is_empty());

        UploadError::Service { status, detail }
    }

    /// 画面に表示するメッセージ
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Validation(e) => e.to_string(),
            UploadError::Service {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
