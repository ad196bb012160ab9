//! サブコマンドの本体

use crate::error::{Result, TraceLensError};
use crate::render::{render_report, upload_progress_bar};
use crate::transport::ReqwestTransport;
use indicatif::ProgressBar;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracelens_common::{
    export_report, parse_exported, AnalysisReport, AnalysisSession, FileMeta, ReportTab,
    SessionStore, SubmitOutcome, UploadController, MAX_FILE_SIZE,
};

/// 端末のセッション（更新のたびに進捗バーへ反映）
struct TerminalSession {
    session: RefCell<AnalysisSession>,
    bar: ProgressBar,
}

impl SessionStore for TerminalSession {
    fn modify<R>(&self, f: impl FnOnce(&mut AnalysisSession) -> R) -> Option<R> {
        let mut session = self.session.borrow_mut();
        let out = f(&mut *session);
        self.bar.set_position(session.progress() as u64);
        Some(out)
    }

    fn read<R>(&self, f: impl FnOnce(&AnalysisSession) -> R) -> Option<R> {
        Some(f(&*self.session.borrow()))
    }
}

/// 画像ファイルを解析サービスへ送り、成功したレポートを返す
pub async fn analyze_file(path: &Path, base_url: &str, timeout: Duration) -> Result<AnalysisReport> {
    if !path.is_file() {
        return Err(TraceLensError::FileNotFound(path.display().to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let size = std::fs::metadata(path)?.len();
    let meta = FileMeta::new(name.clone(), size, None);

    // 上限超えは送信前に拒否されるので読み込まない
    let payload = if size <= MAX_FILE_SIZE {
        std::fs::read(path)?
    } else {
        Vec::new()
    };

    let transport = ReqwestTransport::new(base_url, timeout)?;
    tracing::info!(endpoint = transport.endpoint(), file = %name, "starting analysis");
    let controller = UploadController::new(transport);

    let store = TerminalSession {
        session: RefCell::new(AnalysisSession::new()),
        bar: upload_progress_bar(&name),
    };

    let outcome = controller.submit(&store, meta, payload).await;
    store.bar.finish_and_clear();

    let session = store.session.into_inner();
    match outcome {
        SubmitOutcome::Succeeded => session
            .report()
            .cloned()
            .ok_or_else(|| TraceLensError::AnalysisFailed("report missing".into())),
        SubmitOutcome::Failed(err) => {
            tracing::debug!(error = %err, "upload failed");
            Err(TraceLensError::AnalysisFailed(err.user_message()))
        }
        SubmitOutcome::Rejected(err) => Err(TraceLensError::AnalysisFailed(err.to_string())),
        SubmitOutcome::Ignored | SubmitOutcome::Superseded => Err(TraceLensError::AnalysisFailed(
            session.error().unwrap_or("analysis was cancelled").to_string(),
        )),
    }
}

/// レポートJSONをディレクトリに保存し、保存先パスを返す
pub fn export_to_dir(report: &AnalysisReport, dir: &Path) -> Result<PathBuf> {
    let export = export_report(report, chrono::Utc::now().timestamp_millis())?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(&export.file_name);
    std::fs::write(&path, export.contents)?;
    Ok(path)
}

/// 保存済みレポートを読み込む
pub fn load_report(path: &Path) -> Result<AnalysisReport> {
    if !path.is_file() {
        return Err(TraceLensError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_exported(&content)?)
}

/// 保存済みレポートをタブ表示用テキストにする
pub fn show_report(path: &Path, tabs: &[ReportTab]) -> Result<String> {
    let report = load_report(path)?;
    Ok(render_report(&report, tabs))
}
