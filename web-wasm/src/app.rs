//! メインアプリケーションコンポーネント

use crate::api::XhrTransport;
use crate::components::{
    error_banner::ErrorBanner, header::Header, progress_bar::ProgressBar,
    report_view::ReportView, upload_area::UploadArea,
};
use leptos::prelude::*;
use std::rc::Rc;
use tracelens_common::{
    AnalysisSession, FileMeta, SessionStore, SubmitOutcome, UploadController,
};
use web_sys::File;

/// シグナルに保持した解析セッション
///
/// コンポーネントが破棄された後の更新は `None` になり、何も起きない。
#[derive(Clone, Copy)]
pub struct SignalStore(pub RwSignal<AnalysisSession>);

impl SessionStore for SignalStore {
    fn modify<R>(&self, f: impl FnOnce(&mut AnalysisSession) -> R) -> Option<R> {
        self.0.try_update(f)
    }

    fn read<R>(&self, f: impl FnOnce(&AnalysisSession) -> R) -> Option<R> {
        self.0.try_with(f)
    }
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let session = RwSignal::new(AnalysisSession::new());
    let store = SignalStore(session);
    let controller = StoredValue::new_local(Rc::new(UploadController::new(
        XhrTransport::from_build_env(),
    )));

    let is_submitting = Signal::derive(move || session.with(|s| s.is_submitting()));
    let progress = Signal::derive(move || session.with(|s| s.progress()));
    let error = Signal::derive(move || session.with(|s| s.error().map(str::to_string)));
    let file_name = Signal::derive(move || {
        session.with(|s| s.selected_file().map(|f| f.name.clone()).unwrap_or_default())
    });
    let report = Memo::new(move |_| session.with(|s| s.shared_report()));

    // ファイル受け取りハンドラ
    let on_file = move |file: File| {
        let meta = FileMeta::new(file.name(), file.size() as u64, Some(file.type_()));
        let Some(controller) = controller.try_get_value() else {
            return;
        };

        wasm_bindgen_futures::spawn_local(async move {
            match controller.submit(&store, meta, file).await {
                SubmitOutcome::Succeeded => gloo::console::log!("analysis complete"),
                SubmitOutcome::Failed(err) => {
                    gloo::console::warn!(format!("analysis failed: {}", err))
                }
                SubmitOutcome::Rejected(err) => {
                    gloo::console::warn!(format!("file rejected: {}", err))
                }
                SubmitOutcome::Ignored => {
                    gloo::console::log!("an analysis is already in progress")
                }
                SubmitOutcome::Superseded => {
                    gloo::console::log!("analysis finished after reset; result discarded")
                }
            }
        });
    };

    let on_reset = move || session.update(|s| s.reset());

    view! {
        <div class="container">
            <Header />

            {move || match report.get() {
                Some(report) => view! {
                    <ReportView report=report on_reset=on_reset />
                }
                .into_any(),
                None => view! {
                    <UploadArea disabled=is_submitting on_file=on_file />

                    <Show when=move || is_submitting.get()>
                        <ProgressBar progress=progress file_name=file_name />
                    </Show>

                    <ErrorBanner message=error />
                }
                .into_any(),
            }}
        </div>
    }
}
