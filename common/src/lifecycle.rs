//! 解析ライフサイクル（状態機械）
//!
//! ```text
//! idle ──submit──▶ submitting ──ok──▶ succeeded
//!   ▲                  │                  │
//!   │                  └──err──▶ failed   │
//!   └──────────── reset ◀─────────────────┘
//! ```
//!
//! 「現在の解析」スロットは `AnalysisSession` ひとつだけで、
//! 状態を変更できるのはここで定義した遷移メソッドのみ。
//! 表示側は読み取り専用のアクセサを使う。

use crate::format::progress_percent;
use crate::types::AnalysisReport;
use crate::validation::FileMeta;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::Arc;

/// ライフサイクルの状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Idle => "idle",
            LifecyclePhase::Submitting => "submitting",
            LifecyclePhase::Succeeded => "succeeded",
            LifecyclePhase::Failed => "failed",
        }
    }
}

/// 送信ごとに払い出すリクエスト番号
///
/// リセット後に届いた古いリクエストのイベントを無視するために使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 解析セッション（単一の「現在の解析」）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSession {
    phase: LifecyclePhase,
    report: Option<Arc<AnalysisReport>>,
    error: Option<String>,
    progress: u8,
    selected_file: Option<FileMeta>,
    last_request: u64,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == LifecyclePhase::Submitting
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_deref()
    }

    /// 表示側で保持するための共有参照
    pub fn shared_report(&self) -> Option<Arc<AnalysisReport>> {
        self.report.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 進捗率 (0-100)
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn selected_file(&self) -> Option<&FileMeta> {
        self.selected_file.as_ref()
    }

    fn is_current(&self, id: RequestId) -> bool {
        self.is_submitting() && id.0 == self.last_request
    }

    /// `idle|succeeded|failed → submitting`
    ///
    /// 送信中なら何もせず `None`（シングルフライト）。
    pub fn begin_submission(&mut self, file: FileMeta) -> Option<RequestId> {
        if self.is_submitting() {
            tracing::debug!(file = %file.name, "submission ignored: analysis already in flight");
            return None;
        }

        self.last_request += 1;
        self.phase = LifecyclePhase::Submitting;
        self.report = None;
        self.error = None;
        self.progress = 0;
        self.selected_file = Some(file);

        Some(RequestId(self.last_request))
    }

    /// 検証エラー: ネットワークを経由せず直接 `failed` へ
    ///
    /// 送信中は何もしない。遷移した場合は `true`。
    pub fn reject(&mut self, file: FileMeta, message: impl Into<String>) -> bool {
        if self.is_submitting() {
            return false;
        }

        self.phase = LifecyclePhase::Failed;
        self.report = None;
        self.error = Some(message.into());
        self.progress = 0;
        self.selected_file = Some(file);
        true
    }

    /// 転送済みバイト数を記録
    ///
    /// 完了（成功・失敗）前は99%で頭打ちにし、値は減少させない。
    pub fn record_progress(&mut self, id: RequestId, loaded: u64, total: u64) -> bool {
        if !self.is_current(id) {
            return false;
        }

        match progress_percent(loaded, total) {
            Some(percent) => {
                let percent = percent.min(99);
                if percent > self.progress {
                    self.progress = percent;
                }
                true
            }
            None => false,
        }
    }

    /// `submitting → succeeded`
    pub fn succeed(&mut self, id: RequestId, report: AnalysisReport) -> bool {
        if !self.is_current(id) {
            tracing::debug!(request = id.0, "stale completion ignored");
            return false;
        }

        self.phase = LifecyclePhase::Succeeded;
        self.report = Some(Arc::new(report));
        self.error = None;
        self.progress = 100;
        true
    }

    /// `submitting → failed`
    ///
    /// リクエスト自体は完了しているので進捗は100にする。
    pub fn fail(&mut self, id: RequestId, message: impl Into<String>) -> bool {
        if !self.is_current(id) {
            tracing::debug!(request = id.0, "stale failure ignored");
            return false;
        }

        self.phase = LifecyclePhase::Failed;
        self.report = None;
        self.error = Some(message.into());
        self.progress = 100;
        true
    }

    /// どの状態からでも `idle` へ
    pub fn reset(&mut self) {
        self.phase = LifecyclePhase::Idle;
        self.report = None;
        self.error = None;
        self.progress = 0;
        self.selected_file = None;
    }
}

/// セッションの保持先
///
/// CLIとテストは `RefCell`、ブラウザはLeptosのシグナルで実装する。
/// 保持先が既に破棄されている場合は `None`。
pub trait SessionStore {
    fn modify<R>(&self, f: impl FnOnce(&mut AnalysisSession) -> R) -> Option<R>;

    fn read<R>(&self, f: impl FnOnce(&AnalysisSession) -> R) -> Option<R>;
}

impl SessionStore for RefCell<AnalysisSession> {
    fn modify<R>(&self, f: impl FnOnce(&mut AnalysisSession) -> R) -> Option<R> {
        Some(f(&mut *self.borrow_mut()))
    }

    fn read<R>(&self, f: impl FnOnce(&AnalysisSession) -> R) -> Option<R> {
        Some(f(&*self.borrow()))
    }
}
