use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceLensError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("HTTPクライアントエラー: {0}")]
    Http(String),

    #[error("解析に失敗しました: {0}")]
    AnalysisFailed(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] tracelens_common::Error),
}

pub type Result<T> = std::result::Result<T, TraceLensError>;
