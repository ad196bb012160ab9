//! TraceLens Common Library
//!
//! CLIとWeb(WASM)で共有される型とロジック:
//! - 解析レポートの型と安全なアクセサ
//! - アップロード前のファイル検証
//! - 解析ライフサイクル（状態機械）とアップロード制御
//! - タブ別レポート表示モデルとJSONエクスポート

pub mod types;
pub mod format;
pub mod error;
pub mod validation;
pub mod lifecycle;
pub mod upload;
pub mod view;
pub mod export;

pub use types::{
    AiDetection, AnalysisReport, BasicMetadata, DuplicateMatch, ImageMetadata, ImageSize,
    OcrResult, ReverseSearchMatch, Signal, Verdict,
};
pub use error::{Error, Result, UploadError, ValidationError, GENERIC_FAILURE_MESSAGE};
pub use validation::{validate_file, FileMeta, ACCEPTED_TYPES, MAX_FILE_SIZE};
pub use lifecycle::{AnalysisSession, LifecyclePhase, RequestId, SessionStore};
pub use upload::{
    analyze_url, interpret_response, parse_report, AnalysisTransport, SubmitOutcome,
    UploadController, ANALYZE_PATH, FILE_FIELD,
};
pub use view::{render_tab, ReportTab, Section, SectionBody, TabView, NO_DATA};
pub use export::{export_file_name, export_report, parse_exported, ReportExport};
