//! 表示モデルの端末向けテキスト描画

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;
use tracelens_common::view::{DuplicateCard, Field, MatchCard, SignalCard, VerdictCard};
use tracelens_common::{render_tab, AnalysisReport, ReportTab, SectionBody, TabView};

const RULE: &str = "──────────────────────────────────────────";

/// 複数タブをまとめて描画
pub fn render_report(report: &AnalysisReport, tabs: &[ReportTab]) -> String {
    tabs.iter()
        .map(|tab| render_view(&render_tab(report, *tab)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_view(view: &TabView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "■ {}", view.tab.label());
    let _ = writeln!(out, "{}", RULE);

    for section in &view.sections {
        let _ = writeln!(out, "[{}]", section.title);
        for body in &section.body {
            write_body(&mut out, body);
        }
        out.push('\n');
    }
    out
}

fn write_body(out: &mut String, body: &SectionBody) {
    match body {
        SectionBody::Fields(fields) => write_fields(out, fields),
        SectionBody::Text(text) => {
            for line in text.lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }
        SectionBody::Code(code) => {
            let _ = writeln!(out, "  `{}`", code);
        }
        SectionBody::Badge(badge) => {
            let _ = writeln!(out, "  ({})", badge);
        }
        SectionBody::Verdict(card) => write_verdict(out, card),
        SectionBody::Signals(signals) => {
            for signal in signals {
                write_signal(out, signal);
            }
        }
        SectionBody::Matches(matches) => {
            for m in matches {
                write_match(out, m);
            }
        }
        SectionBody::Duplicates(duplicates) => {
            for d in duplicates {
                write_duplicate(out, d);
            }
        }
        SectionBody::Placeholder(message) => {
            let _ = writeln!(out, "  - {}", message);
        }
    }
}

fn write_fields(out: &mut String, fields: &[Field]) {
    let width = fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);

    for f in fields {
        let pad = width - f.label.chars().count();
        let _ = writeln!(out, "  {}{}  {}", f.label, " ".repeat(pad), f.value);
    }
}

fn write_verdict(out: &mut String, card: &VerdictCard) {
    let _ = writeln!(out, "  {}  score {}", card.label, card.score);
    if !card.explanation.is_empty() {
        let _ = writeln!(out, "  {}", card.explanation);
    }
}

fn write_signal(out: &mut String, signal: &SignalCard) {
    let _ = writeln!(out, "  * {} ({})", signal.title, signal.score);
    if !signal.description.is_empty() {
        let _ = writeln!(out, "    {}", signal.description);
    }
}

fn write_match(out: &mut String, m: &MatchCard) {
    let _ = writeln!(out, "  * {}  {}", m.source, m.similarity);
    if let Some(url) = &m.url {
        let _ = writeln!(out, "    {}", url);
    }
}

fn write_duplicate(out: &mut String, d: &DuplicateCard) {
    let _ = writeln!(out, "  * {}  {}  {}", d.hash, d.similarity, d.distance);
}

/// アップロード進捗バー（0-100%）
pub fn upload_progress_bar(file_name: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(format!("Analyzing {}", file_name));
    pb
}
