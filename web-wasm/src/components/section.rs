//! 表示モデル（Section）のHTML描画

use leptos::prelude::*;
use tracelens_common::view::{DuplicateCard, Field, MatchCard, SignalCard, VerdictCard};
use tracelens_common::{Section, SectionBody};

#[component]
pub fn SectionView(section: Section) -> impl IntoView {
    view! {
        <section class="report-section">
            <h3>{section.title}</h3>
            {section.body.into_iter().map(body_view).collect_view()}
        </section>
    }
}

fn body_view(body: SectionBody) -> AnyView {
    match body {
        SectionBody::Fields(fields) => fields_view(fields),
        SectionBody::Text(text) => view! { <pre class="ocr-text">{text}</pre> }.into_any(),
        SectionBody::Code(code) => view! { <code class="hash">{code}</code> }.into_any(),
        SectionBody::Badge(badge) => view! { <span class="badge">{badge}</span> }.into_any(),
        SectionBody::Verdict(card) => verdict_view(card),
        SectionBody::Signals(signals) => view! {
            <div class="signals">{signals.into_iter().map(signal_view).collect_view()}</div>
        }
        .into_any(),
        SectionBody::Matches(matches) => view! {
            <ul class="matches">{matches.into_iter().map(match_view).collect_view()}</ul>
        }
        .into_any(),
        SectionBody::Duplicates(duplicates) => view! {
            <ul class="duplicates">{duplicates.into_iter().map(duplicate_view).collect_view()}</ul>
        }
        .into_any(),
        SectionBody::Placeholder(message) => {
            view! { <p class="text-muted placeholder">{message}</p> }.into_any()
        }
    }
}

fn fields_view(fields: Vec<Field>) -> AnyView {
    view! {
        <table class="fields">
            <tbody>
                {fields
                    .into_iter()
                    .map(|f| view! { <tr><th>{f.label}</th><td>{f.value}</td></tr> })
                    .collect_view()}
            </tbody>
        </table>
    }
    .into_any()
}

fn verdict_view(card: VerdictCard) -> AnyView {
    let class = format!("verdict verdict-{}", card.verdict.as_str());
    view! {
        <div class=class>
            <span class="verdict-label">{card.label}</span>
            <span class="verdict-score">{card.score}</span>
            <p class="verdict-explanation">{card.explanation}</p>
        </div>
    }
    .into_any()
}

fn signal_view(signal: SignalCard) -> impl IntoView {
    view! {
        <div class="signal-card">
            <h4>{signal.title}</h4>
            <span class="signal-score">{signal.score}</span>
            <p>{signal.description}</p>
        </div>
    }
}

fn match_view(m: MatchCard) -> impl IntoView {
    view! {
        <li class="match">
            <span class="match-source">{m.source}</span>
            <span class="match-similarity">{m.similarity}</span>
            {m.url.map(|url| {
                let href = url.clone();
                view! {
                    <a href=href target="_blank" rel="noopener noreferrer">{url}</a>
                }
            })}
        </li>
    }
}

fn duplicate_view(d: DuplicateCard) -> impl IntoView {
    view! {
        <li class="duplicate">
            <code>{d.hash}</code>
            <span>{d.similarity}</span>
            <span>{d.distance}</span>
        </li>
    }
}
