//! レポートのJSONエクスポート
//!
//! 整形済みJSON。フィールドは構造体の宣言順、マップのキーはソート順で常に同じ並びになる。

use crate::error::{Error, Result};
use crate::types::AnalysisReport;

const FILE_PREFIX: &str = "tracelens-report-";

/// ダウンロード用の成果物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportExport {
    pub file_name: String,
    pub contents: String,
}

impl ReportExport {
    pub const MIME_TYPE: &'static str = "application/json";
}

/// `tracelens-report-<epoch-millis>.json`
pub fn export_file_name(epoch_millis: i64) -> String {
    format!("{}{}.json", FILE_PREFIX, epoch_millis)
}

/// レポートを整形済みJSONに変換する（レポートは変更しない）
pub fn export_report(report: &AnalysisReport, epoch_millis: i64) -> Result<ReportExport> {
    let contents = serde_json::to_string_pretty(report)
        .map_err(|e| Error::Export(format!("failed to serialize report: {}", e)))?;

    Ok(ReportExport {
        file_name: export_file_name(epoch_millis),
        contents,
    })
}

/// エクスポートしたJSONを読み戻す
pub fn parse_exported(contents: &str) -> Result<AnalysisReport> {
    Ok(serde_json::from_str(contents)?)
}
