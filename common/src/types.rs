//! 解析レポートの型定義
//!
//! 外部解析サービスが返す `AnalysisReport` をそのまま受け取る。
//! 必須フィールドは `filename` と `ai_detection`（`verdict`, `score`）のみ。
//! それ以外は欠落・`null` のどちらでも既定値（空マップ、空配列、`None`）に落とす。
//! 表示側は個別に存在チェックをせず、ここのアクセサ経由で値を取得する。

use crate::format::{format_kilobytes, format_unit_percent};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `null` を既定値として扱うデシリアライザ
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 解析レポート（受信後は不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub filename: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ImageMetadata,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ocr: OcrResult,

    pub ai_detection: AiDetection,

    #[serde(default, deserialize_with = "null_as_default")]
    pub perceptual_hash: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub reverse_search: Vec<ReverseSearchMatch>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub duplicates: Vec<DuplicateMatch>,
}

/// 画像メタデータ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub basic: BasicMetadata,

    #[serde(default, deserialize_with = "null_as_default")]
    pub exif: BTreeMap<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub gps: BTreeMap<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub iptc: BTreeMap<String, Value>,

    /// サービス側でメタデータ抽出に失敗した場合の理由
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 基本情報（形式・寸法・ファイルサイズ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicMetadata {
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub size: Option<ImageSize>,

    #[serde(default)]
    pub file_size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    #[serde(default)]
    pub width: Option<u64>,
    #[serde(default)]
    pub height: Option<u64>,
}

/// OCR結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    #[serde(default)]
    pub text: Option<String>,

    /// 信頼度 (0.0-1.0)
    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// AI生成判定の分類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ai,
    Human,
    #[default]
    Uncertain,
}

/// 未知の文字列は `uncertain` として受け入れる（キー欠落や `null` はエラー）
impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Verdict::parse(&raw))
    }
}

impl Verdict {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "ai" => Verdict::Ai,
            "human" => Verdict::Human,
            _ => Verdict::Uncertain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ai => "ai",
            Verdict::Human => "human",
            Verdict::Uncertain => "uncertain",
        }
    }

    /// 表示用ラベル（大文字）
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

/// AI生成判定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDetection {
    pub verdict: Verdict,

    /// AI生成確率 (0=人間, 1=AI)
    pub score: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,

    /// シグナル名 → `{score, description}`。
    /// サービスは失敗時に文字列値を入れることがあるので生のJSONで保持する。
    #[serde(default, deserialize_with = "null_as_default")]
    pub signals: BTreeMap<String, Value>,
}

/// 個々の判定シグナル（表示用に正規化したもの）
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub name: String,
    pub score: Option<f64>,
    pub description: Option<String>,
}

impl Signal {
    fn from_entry(name: &str, value: &Value) -> Self {
        let (score, description) = match value {
            Value::Object(fields) => (
                fields.get("score").and_then(Value::as_f64),
                fields
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            ),
            Value::String(text) => (None, Some(text.clone())),
            Value::Number(n) => (n.as_f64(), None),
            _ => (None, None),
        };

        Self {
            name: name.to_string(),
            score,
            description,
        }
    }

    /// `noise_analysis` → `NOISE ANALYSIS`
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ").to_uppercase()
    }
}

/// 逆画像検索のヒット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseSearchMatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,

    /// 類似度 (0.0-1.0)
    #[serde(default)]
    pub similarity: Option<f64>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// pHashによる類似画像
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hash: String,

    #[serde(default)]
    pub distance: Option<f64>,

    /// 類似度 (0-100)
    #[serde(default)]
    pub similarity_percentage: Option<f64>,
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl AnalysisReport {
    pub fn filename_label(&self) -> Option<&str> {
        non_empty(&self.filename)
    }

    pub fn format_label(&self) -> Option<&str> {
        self.metadata.basic.format.as_deref().and_then(non_empty)
    }

    /// `800 × 600`
    pub fn dimensions_label(&self) -> Option<String> {
        let size = self.metadata.basic.size?;
        Some(format!("{} × {}", size.width?, size.height?))
    }

    /// `2048.00 KB`
    pub fn file_size_label(&self) -> Option<String> {
        self.metadata.basic.file_size_bytes.map(format_kilobytes)
    }

    pub fn ai_score_label(&self) -> Option<String> {
        format_unit_percent(self.ai_detection.score)
    }

    pub fn verdict_label(&self) -> String {
        self.ai_detection.verdict.label()
    }

    pub fn explanation(&self) -> Option<&str> {
        non_empty(&self.ai_detection.explanation)
    }

    pub fn perceptual_hash(&self) -> Option<&str> {
        non_empty(&self.perceptual_hash)
    }

    pub fn ocr_text(&self) -> Option<&str> {
        self.ocr.text.as_deref().and_then(non_empty)
    }

    /// 信頼度0は「なし」として扱う
    pub fn ocr_confidence_label(&self) -> Option<String> {
        self.ocr
            .confidence
            .filter(|c| *c > 0.0)
            .and_then(format_unit_percent)
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.ai_detection
            .signals
            .iter()
            .map(|(name, value)| Signal::from_entry(name, value))
            .collect()
    }

    pub fn metadata_error(&self) -> Option<&str> {
        self.metadata.error.as_deref().and_then(non_empty)
    }
}

/// メタデータ値を表示文字列に変換（文字列はクォートなし）
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_json() -> Value {
        json!({
            "filename": "photo.png",
            "ai_detection": { "verdict": "human", "score": 0.12 }
        })
    }

    #[test]
    fn test_minimal_report_defaults() {
        let report: AnalysisReport = serde_json::from_value(minimal_json()).expect("パース失敗");

        assert_eq!(report.filename, "photo.png");
        assert!(report.metadata.exif.is_empty());
        assert!(report.metadata.gps.is_empty());
        assert!(report.reverse_search.is_empty());
        assert!(report.duplicates.is_empty());
        assert_eq!(report.dimensions_label(), None);
        assert_eq!(report.file_size_label(), None);
        assert_eq!(report.perceptual_hash(), None);
        assert_eq!(report.ocr_text(), None);
    }

    #[test]
    fn test_null_collections_become_empty() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "filename": "a.jpg",
            "metadata": { "basic": null, "exif": null, "gps": null },
            "ocr": null,
            "ai_detection": { "verdict": "ai", "score": 0.9, "explanation": null, "signals": null },
            "perceptual_hash": null,
            "reverse_search": null,
            "duplicates": null
        }))
        .expect("パース失敗");

        assert!(report.metadata.exif.is_empty());
        assert!(report.signals().is_empty());
        assert_eq!(report.explanation(), None);
        assert!(report.reverse_search.is_empty());
    }

    #[test]
    fn test_missing_required_field_is_error() {
        let result = serde_json::from_value::<AnalysisReport>(json!({ "filename": "a.jpg" }));
        assert!(result.is_err());

        let result = serde_json::from_value::<AnalysisReport>(json!({
            "ai_detection": { "verdict": "ai", "score": 0.9 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_verdict_is_required() {
        let missing = serde_json::from_value::<AnalysisReport>(json!({
            "filename": "a.png",
            "ai_detection": { "score": 0.5 }
        }));
        assert!(missing.is_err());

        let null = serde_json::from_value::<AiDetection>(json!({ "verdict": null, "score": 0.5 }));
        assert!(null.is_err());
    }

    #[test]
    fn test_unknown_verdict_is_uncertain() {
        let detection: AiDetection =
            serde_json::from_value(json!({ "verdict": "maybe", "score": 0.5 })).unwrap();
        assert_eq!(detection.verdict, Verdict::Uncertain);
        assert_eq!(detection.verdict.label(), "UNCERTAIN");
    }

    #[test]
    fn test_basic_labels() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "filename": "photo.png",
            "metadata": {
                "basic": { "format": "PNG", "size": { "width": 800, "height": 600 }, "file_size_bytes": 2097152 }
            },
            "ai_detection": { "verdict": "human", "score": 0.12 }
        }))
        .unwrap();

        assert_eq!(report.format_label(), Some("PNG"));
        assert_eq!(report.dimensions_label().as_deref(), Some("800 × 600"));
        assert_eq!(report.file_size_label().as_deref(), Some("2048.00 KB"));
        assert_eq!(report.verdict_label(), "HUMAN");
        assert_eq!(report.ai_score_label().as_deref(), Some("12.0%"));
    }

    #[test]
    fn test_signals_tolerate_non_object_values() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "filename": "a.jpg",
            "ai_detection": {
                "verdict": "uncertain",
                "score": 0.5,
                "signals": {
                    "noise_analysis": { "score": 0.8, "description": "Low noise" },
                    "error": "detector crashed"
                }
            }
        }))
        .unwrap();

        let signals = report.signals();
        assert_eq!(signals.len(), 2);

        let error = signals.iter().find(|s| s.name == "error").unwrap();
        assert_eq!(error.score, None);
        assert_eq!(error.description.as_deref(), Some("detector crashed"));

        let noise = signals.iter().find(|s| s.name == "noise_analysis").unwrap();
        assert_eq!(noise.score, Some(0.8));
        assert_eq!(noise.display_name(), "NOISE ANALYSIS");
    }

    #[test]
    fn test_zero_ocr_confidence_hidden() {
        let mut report: AnalysisReport = serde_json::from_value(minimal_json()).unwrap();
        report.ocr.confidence = Some(0.0);
        assert_eq!(report.ocr_confidence_label(), None);

        report.ocr.confidence = Some(0.876);
        assert_eq!(report.ocr_confidence_label().as_deref(), Some("87.6%"));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("Canon")), "Canon");
        assert_eq!(display_value(&json!(72)), "72");
        assert_eq!(display_value(&json!(true)), "true");
    }
}
