//! タブ別レポート表示モデル
//!
//! 各タブは `render_tab(report, tab)` の純粋関数で、レポートを変更しない。
//! ブラウザ版はHTMLに、CLI版はテキストにこのモデルを描画する。

use crate::format::{format_number, format_percent, format_unit_percent};
use crate::types::{display_value, AnalysisReport, Verdict};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// 値が欠けているときの表示
pub const NO_DATA: &str = "No data";

/// レポートのタブ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReportTab {
    #[default]
    Overview,
    Metadata,
    Ocr,
    AiDetection,
    ReverseSearch,
}

impl ReportTab {
    pub const ALL: [ReportTab; 5] = [
        ReportTab::Overview,
        ReportTab::Metadata,
        ReportTab::Ocr,
        ReportTab::AiDetection,
        ReportTab::ReverseSearch,
    ];

    /// タブ見出し
    pub fn label(&self) -> &'static str {
        match self {
            ReportTab::Overview => "Overview",
            ReportTab::Metadata => "Metadata",
            ReportTab::Ocr => "OCR Text",
            ReportTab::AiDetection => "AI Detection",
            ReportTab::ReverseSearch => "Reverse Search",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ReportTab::Overview => "overview",
            ReportTab::Metadata => "metadata",
            ReportTab::Ocr => "ocr",
            ReportTab::AiDetection => "ai",
            ReportTab::ReverseSearch => "search",
        }
    }
}

impl FromStr for ReportTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overview" => Ok(ReportTab::Overview),
            "metadata" | "exif" => Ok(ReportTab::Metadata),
            "ocr" | "text" => Ok(ReportTab::Ocr),
            "ai" | "ai-detection" => Ok(ReportTab::AiDetection),
            "search" | "reverse-search" => Ok(ReportTab::ReverseSearch),
            _ => Err(format!(
                "Unknown tab: {}. Use overview, metadata, ocr, ai, or search",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 1タブ分の表示内容
#[derive(Debug, Clone, PartialEq)]
pub struct TabView {
    pub tab: ReportTab,
    pub sections: Vec<Section>,
}

/// 見出し付きのまとまり
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub body: Vec<SectionBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// ラベルと値の表
    Fields(Vec<Field>),
    /// 本文（OCRテキストなど）
    Text(String),
    /// 等幅表示（ハッシュ）
    Code(String),
    /// 補足バッジ
    Badge(String),
    Verdict(VerdictCard),
    Signals(Vec<SignalCard>),
    Matches(Vec<MatchCard>),
    Duplicates(Vec<DuplicateCard>),
    /// データなしの明示
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerdictCard {
    pub verdict: Verdict,
    pub label: String,
    pub score: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalCard {
    pub title: String,
    pub score: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCard {
    pub source: String,
    pub similarity: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCard {
    pub hash: String,
    pub similarity: String,
    pub distance: String,
}

fn field(label: &str, value: Option<impl Into<String>>) -> Field {
    Field {
        label: label.to_string(),
        value: value.map(Into::into).unwrap_or_else(|| NO_DATA.to_string()),
    }
}

fn section(title: &str, body: Vec<SectionBody>) -> Section {
    Section {
        title: title.to_string(),
        body,
    }
}

fn map_fields(map: &BTreeMap<String, Value>) -> Vec<Field> {
    map.iter()
        .map(|(key, value)| Field {
            label: key.clone(),
            value: display_value(value),
        })
        .collect()
}

/// レポートとタブから表示モデルを作る
pub fn render_tab(report: &AnalysisReport, tab: ReportTab) -> TabView {
    let sections = match tab {
        ReportTab::Overview => overview(report),
        ReportTab::Metadata => metadata(report),
        ReportTab::Ocr => ocr(report),
        ReportTab::AiDetection => ai_detection(report),
        ReportTab::ReverseSearch => reverse_search(report),
    };

    TabView { tab, sections }
}

fn verdict_card(report: &AnalysisReport) -> VerdictCard {
    VerdictCard {
        verdict: report.ai_detection.verdict,
        label: report.verdict_label(),
        score: report
            .ai_score_label()
            .unwrap_or_else(|| NO_DATA.to_string()),
        explanation: report.explanation().unwrap_or_default().to_string(),
    }
}

fn overview(report: &AnalysisReport) -> Vec<Section> {
    let file_info = vec![
        field("Filename", report.filename_label()),
        field("Format", report.format_label()),
        field("Dimensions", report.dimensions_label()),
        field("File Size", report.file_size_label()),
    ];

    let hash = match report.perceptual_hash() {
        Some(hash) => SectionBody::Code(hash.to_string()),
        None => SectionBody::Placeholder("No perceptual hash available".to_string()),
    };

    vec![
        section("File Information", vec![SectionBody::Fields(file_info)]),
        section(
            "AI Detection Quick View",
            vec![SectionBody::Verdict(verdict_card(report))],
        ),
        section("Perceptual Hash", vec![hash]),
    ]
}

fn metadata(report: &AnalysisReport) -> Vec<Section> {
    let meta = &report.metadata;
    let mut sections = Vec::new();

    let exif = if meta.exif.is_empty() {
        SectionBody::Placeholder("No EXIF data found".to_string())
    } else {
        SectionBody::Fields(map_fields(&meta.exif))
    };
    sections.push(section("EXIF Data", vec![exif]));

    if !meta.gps.is_empty() {
        sections.push(section("GPS Data", vec![SectionBody::Fields(map_fields(&meta.gps))]));
    }

    if !meta.iptc.is_empty() {
        sections.push(section("IPTC Data", vec![SectionBody::Fields(map_fields(&meta.iptc))]));
    }

    if let Some(error) = report.metadata_error() {
        sections.push(section("Extraction Error", vec![SectionBody::Text(error.to_string())]));
    }

    sections
}

fn ocr(report: &AnalysisReport) -> Vec<Section> {
    let mut body = Vec::new();

    if let Some(confidence) = report.ocr_confidence_label() {
        body.push(SectionBody::Badge(format!("Confidence: {}", confidence)));
    }

    match report.ocr_text() {
        Some(text) => body.push(SectionBody::Text(text.to_string())),
        None => body.push(SectionBody::Placeholder(
            "No text detected in image".to_string(),
        )),
    }

    vec![section("Extracted Text", body)]
}

fn ai_detection(report: &AnalysisReport) -> Vec<Section> {
    let signals = report
        .signals()
        .into_iter()
        .map(|signal| SignalCard {
            title: signal.display_name(),
            score: format!(
                "Score: {}",
                signal
                    .score
                    .and_then(format_unit_percent)
                    .unwrap_or_else(|| NO_DATA.to_string())
            ),
            description: signal.description.unwrap_or_default(),
        })
        .collect();

    vec![
        section(
            "AI Generation Detection",
            vec![SectionBody::Verdict(verdict_card(report))],
        ),
        section("Detection Signals", vec![SectionBody::Signals(signals)]),
    ]
}

fn reverse_search(report: &AnalysisReport) -> Vec<Section> {
    let mut sections = Vec::new();

    let matches = if report.reverse_search.is_empty() {
        SectionBody::Placeholder("No reverse search matches found".to_string())
    } else {
        SectionBody::Matches(
            report
                .reverse_search
                .iter()
                .map(|m| MatchCard {
                    source: if m.source.trim().is_empty() {
                        NO_DATA.to_string()
                    } else {
                        m.source.clone()
                    },
                    similarity: format!(
                        "{} match",
                        m.similarity
                            .and_then(format_unit_percent)
                            .unwrap_or_else(|| NO_DATA.to_string())
                    ),
                    url: m.url.clone().filter(|u| !u.trim().is_empty()),
                })
                .collect(),
        )
    };
    sections.push(section("Reverse Image Search Results", vec![matches]));

    if !report.duplicates.is_empty() {
        let duplicates = report
            .duplicates
            .iter()
            .map(|d| DuplicateCard {
                hash: d.hash.clone(),
                similarity: format!(
                    "{} similar",
                    d.similarity_percentage
                        .and_then(format_percent)
                        .unwrap_or_else(|| NO_DATA.to_string())
                ),
                distance: format!(
                    "Distance: {}",
                    d.distance
                        .filter(|v| v.is_finite())
                        .map(format_number)
                        .unwrap_or_else(|| NO_DATA.to_string())
                ),
            })
            .collect();
        sections.push(section(
            "Similar Images (pHash)",
            vec![SectionBody::Duplicates(duplicates)],
        ));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: Value) -> AnalysisReport {
        serde_json::from_value(value).expect("パース失敗")
    }

    fn minimal() -> AnalysisReport {
        report(json!({
            "filename": "photo.png",
            "ai_detection": { "verdict": "ai", "score": 0.91 }
        }))
    }

    fn fields_of(view: &TabView, title: &str) -> Vec<Field> {
        view.sections
            .iter()
            .find(|s| s.title == title)
            .and_then(|s| {
                s.body.iter().find_map(|b| match b {
                    SectionBody::Fields(f) => Some(f.clone()),
                    _ => None,
                })
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("ai".parse::<ReportTab>(), Ok(ReportTab::AiDetection));
        assert_eq!("Search".parse::<ReportTab>(), Ok(ReportTab::ReverseSearch));
        assert!("bogus".parse::<ReportTab>().is_err());
    }

    #[test]
    fn test_every_tab_renders_minimal_report() {
        let report = minimal();
        for tab in ReportTab::ALL {
            let view = render_tab(&report, tab);
            assert_eq!(view.tab, tab);
            assert!(!view.sections.is_empty(), "{} has no sections", tab);
        }
    }

    #[test]
    fn test_overview_missing_fields_show_no_data() {
        let view = render_tab(&minimal(), ReportTab::Overview);
        let fields = fields_of(&view, "File Information");

        assert_eq!(fields[0].value, "photo.png");
        assert!(fields[1..].iter().all(|f| f.value == NO_DATA));
        assert!(view.sections[2]
            .body
            .contains(&SectionBody::Placeholder("No perceptual hash available".into())));
    }

    #[test]
    fn test_metadata_placeholders() {
        let view = render_tab(&minimal(), ReportTab::Metadata);
        assert_eq!(view.sections.len(), 1);
        assert_eq!(
            view.sections[0].body,
            vec![SectionBody::Placeholder("No EXIF data found".into())]
        );
    }

    #[test]
    fn test_metadata_gps_only_when_present() {
        let report = report(json!({
            "filename": "photo.jpg",
            "metadata": {
                "exif": { "Make": "Canon", "ISOSpeedRatings": 200 },
                "gps": { "GPSLatitude": "(35.0, 41.0, 22.2)" }
            },
            "ai_detection": { "verdict": "human", "score": 0.1 }
        }));

        let view = render_tab(&report, ReportTab::Metadata);
        let exif = fields_of(&view, "EXIF Data");
        assert_eq!(exif.len(), 2);
        assert!(exif.iter().any(|f| f.label == "Make" && f.value == "Canon"));
        assert!(exif.iter().any(|f| f.label == "ISOSpeedRatings" && f.value == "200"));
        assert_eq!(fields_of(&view, "GPS Data").len(), 1);
    }

    #[test]
    fn test_ocr_tab() {
        let view = render_tab(&minimal(), ReportTab::Ocr);
        assert_eq!(
            view.sections[0].body,
            vec![SectionBody::Placeholder("No text detected in image".into())]
        );

        let report = report(json!({
            "filename": "sign.png",
            "ocr": { "text": "STOP", "confidence": 0.95, "language": "eng" },
            "ai_detection": { "verdict": "human", "score": 0.1 }
        }));
        let view = render_tab(&report, ReportTab::Ocr);
        assert_eq!(
            view.sections[0].body,
            vec![
                SectionBody::Badge("Confidence: 95.0%".into()),
                SectionBody::Text("STOP".into()),
            ]
        );
    }

    #[test]
    fn test_empty_signals_render_nothing() {
        let view = render_tab(&minimal(), ReportTab::AiDetection);
        assert_eq!(view.sections[1].body, vec![SectionBody::Signals(vec![])]);
    }

    #[test]
    fn test_signal_cards() {
        let report = report(json!({
            "filename": "a.png",
            "ai_detection": {
                "verdict": "ai",
                "score": 0.8,
                "explanation": "Likely AI",
                "signals": {
                    "color_distribution": { "score": 0.75, "description": "Overly uniform colors" }
                }
            }
        }));

        let view = render_tab(&report, ReportTab::AiDetection);
        match &view.sections[1].body[0] {
            SectionBody::Signals(cards) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].title, "COLOR DISTRIBUTION");
                assert_eq!(cards[0].score, "Score: 75.0%");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_reverse_search_and_duplicates() {
        let view = render_tab(&minimal(), ReportTab::ReverseSearch);
        assert_eq!(view.sections.len(), 1);
        assert_eq!(
            view.sections[0].body,
            vec![SectionBody::Placeholder("No reverse search matches found".into())]
        );

        let report = report(json!({
            "filename": "a.png",
            "ai_detection": { "verdict": "human", "score": 0.2 },
            "reverse_search": [
                { "source": "Local Database", "similarity": 1.3, "url": null },
                { "source": "Example", "similarity": 0.42, "url": "https://example.com/a.png" }
            ],
            "duplicates": [
                { "hash": "ffee0011", "distance": 4, "similarity_percentage": 93.75 }
            ]
        }));
        let view = render_tab(&report, ReportTab::ReverseSearch);

        match &view.sections[0].body[0] {
            SectionBody::Matches(matches) => {
                assert_eq!(matches[0].similarity, "100.0% match");
                assert_eq!(matches[0].url, None);
                assert_eq!(matches[1].similarity, "42.0% match");
                assert_eq!(matches[1].url.as_deref(), Some("https://example.com/a.png"));
            }
            other => panic!("unexpected body: {:?}", other),
        }
        match &view.sections[1].body[0] {
            SectionBody::Duplicates(dups) => {
                assert_eq!(dups[0].similarity, "93.8% similar");
                assert_eq!(dups[0].distance, "Distance: 4");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_render_does_not_mutate_report() {
        let report = minimal();
        let before = report.clone();
        for tab in ReportTab::ALL {
            let _ = render_tab(&report, tab);
        }
        assert_eq!(report, before);
    }
}
