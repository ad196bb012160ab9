//! レポート表示コンポーネント
//!
//! タブ切り替えはローカル状態だけを変え、再取得はしない。

use crate::components::section::SectionView;
use crate::export::download_report;
use leptos::prelude::*;
use std::sync::Arc;
use tracelens_common::{render_tab, AnalysisReport, ReportTab};

#[component]
pub fn ReportView<R>(report: Arc<AnalysisReport>, on_reset: R) -> impl IntoView
where
    R: Fn() + 'static + Clone + Send + Sync,
{
    let (active, set_active) = signal(ReportTab::Overview);

    let on_download = {
        let report = report.clone();
        move |_| match download_report(&report) {
            Ok(file_name) => gloo::console::log!(format!("report saved as {}", file_name)),
            Err(err) => gloo::console::error!("report download failed", err),
        }
    };

    let title = report.filename.clone();
    let tab_content = move || {
        render_tab(&report, active.get())
            .sections
            .into_iter()
            .map(|section| view! { <SectionView section=section /> })
            .collect_view()
    };

    view! {
        <div class="report">
            <div class="report-header">
                <h2>{title}</h2>
                <div class="report-actions">
                    <button class="btn btn-secondary" on:click=on_download>
                        "Download Report"
                    </button>
                    <button class="btn btn-primary" on:click=move |_| on_reset()>
                        "New Analysis"
                    </button>
                </div>
            </div>

            <nav class="tabs">
                {ReportTab::ALL
                    .into_iter()
                    .map(|tab| view! {
                        <button
                            class=move || if active.get() == tab { "tab active" } else { "tab" }
                            on:click=move |_| set_active.set(tab)
                        >
                            {tab.label()}
                        </button>
                    })
                    .collect_view()}
            </nav>

            <div class="tab-content">{tab_content}</div>
        </div>
    }
}
