//! アップロード制御
//!
//! 1ファイルを検証し、トランスポート経由で解析エンドポイントへ送信する。
//! 成否にかかわらず必ずライフサイクルの遷移に落とし込み、呼び出し側へ例外的な失敗は返さない。

use crate::error::{UploadError, ValidationError};
use crate::lifecycle::SessionStore;
use crate::types::AnalysisReport;
use crate::validation::{validate_file, FileMeta};

/// 解析エンドポイントのパス
pub const ANALYZE_PATH: &str = "/api/v1/analyze";

/// マルチパートのフィールド名
pub const FILE_FIELD: &str = "file";

/// ベースURLから解析エンドポイントのURLを組み立てる
pub fn analyze_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH)
}

/// 2xxのボディをレポートとして解釈する
pub fn parse_report(body: &str) -> Result<AnalysisReport, UploadError> {
    serde_json::from_str(body).map_err(|e| UploadError::MalformedResponse(e.to_string()))
}

/// ステータスとボディからアップロード結果を決める
pub fn interpret_response(status: u16, body: &str) -> Result<AnalysisReport, UploadError> {
    if (200..300).contains(&status) {
        parse_report(body)
    } else {
        Err(UploadError::from_service_response(status, body))
    }
}

/// 解析サービスへのトランスポート
///
/// `on_progress(loaded, total)` は送信バイト数の通知。完了イベントより前にだけ呼ぶこと。
#[allow(async_fn_in_trait)]
pub trait AnalysisTransport {
    /// 送信するファイル本体（CLIはバイト列、ブラウザは `File`）
    type Payload;

    async fn upload(
        &self,
        file: &FileMeta,
        mime_type: &str,
        payload: Self::Payload,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> Result<AnalysisReport, UploadError>;
}

/// `submit` の結果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 解析成功（レポートはセッションに格納済み）
    Succeeded,
    /// 送信後に失敗
    Failed(UploadError),
    /// 送信前の検証で拒否（ネットワーク呼び出しなし）
    Rejected(ValidationError),
    /// 送信中のため無視
    Ignored,
    /// 完了したが、その間にリセットされていた
    Superseded,
}

pub struct UploadController<T> {
    transport: T,
}

impl<T: AnalysisTransport> UploadController<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 1ファイルを解析に出す
    pub async fn submit<S: SessionStore>(
        &self,
        store: &S,
        file: FileMeta,
        payload: T::Payload,
    ) -> SubmitOutcome {
        if store.read(|s| s.is_submitting()).unwrap_or(true) {
            tracing::debug!(file = %file.name, "submit ignored while another analysis is in flight");
            return SubmitOutcome::Ignored;
        }

        let mime_type = match validate_file(&file) {
            Ok(mime) => mime,
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "file rejected before upload");
                let message = UploadError::from(err.clone()).user_message();
                return match store.modify(|s| s.reject(file, message)) {
                    Some(true) => SubmitOutcome::Rejected(err),
                    _ => SubmitOutcome::Ignored,
                };
            }
        };

        let Some(Some(id)) = store.modify(|s| s.begin_submission(file.clone())) else {
            return SubmitOutcome::Ignored;
        };

        tracing::info!(
            request = id.value(),
            file = %file.name,
            size = file.size,
            mime = %mime_type,
            "uploading image for analysis"
        );

        let mut on_progress = |loaded: u64, total: u64| {
            store.modify(|s| s.record_progress(id, loaded, total));
        };

        let result = self
            .transport
            .upload(&file, &mime_type, payload, &mut on_progress)
            .await;

        match result {
            Ok(report) => {
                tracing::info!(request = id.value(), verdict = report.ai_detection.verdict.as_str(), "analysis succeeded");
                match store.modify(|s| s.succeed(id, report)) {
                    Some(true) => SubmitOutcome::Succeeded,
                    _ => SubmitOutcome::Superseded,
                }
            }
            Err(err) => {
                tracing::warn!(request = id.value(), error = %err, "analysis failed");
                match store.modify(|s| s.fail(id, err.user_message())) {
                    Some(true) => SubmitOutcome::Failed(err),
                    _ => SubmitOutcome::Superseded,
                }
            }
        }
    }
}
