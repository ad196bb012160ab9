//! XMLHttpRequestによる解析APIへのアップロード
//!
//! `fetch` は送信側の進捗を取れないため XHR を使う。
//! upload.onprogress と onloadend はどちらも同じチャネルに流すので、
//! 進捗は必ず完了イベントより先に届く。

use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::StreamExt;
use tracelens_common::{
    analyze_url, interpret_response, AnalysisReport, AnalysisTransport, FileMeta, UploadError,
    FILE_FIELD,
};
use wasm_bindgen::prelude::*;
use web_sys::{File, FormData, ProgressEvent, XmlHttpRequest};

/// ビルド時に `TRACELENS_API_URL` が無い場合のベースURL
const DEFAULT_API_URL: &str = "http://localhost:8000";

/// ビルド時設定のAPIベースURL
pub fn api_base_url() -> &'static str {
    option_env!("TRACELENS_API_URL").unwrap_or(DEFAULT_API_URL)
}

#[derive(Debug)]
enum XhrEvent {
    Progress(u64, u64),
    Done { status: u16, body: String },
    NetworkError,
}

/// loadend 時点のステータスから完了イベントを作る
///
/// status 0（または取得失敗）はネットワークエラー（CORS拒否・接続失敗）。
fn loadend_event(status: Option<u16>, body: Option<String>) -> XhrEvent {
    match status {
        None | Some(0) => XhrEvent::NetworkError,
        Some(status) => XhrEvent::Done {
            status,
            body: body.unwrap_or_default(),
        },
    }
}

/// 完了イベントまで進捗を流し、結果を返す（完了後のイベントは読まない）
async fn await_completion(
    events: &mut UnboundedReceiver<XhrEvent>,
    on_progress: &mut dyn FnMut(u64, u64),
) -> Result<AnalysisReport, UploadError> {
    while let Some(event) = events.next().await {
        match event {
            XhrEvent::Progress(loaded, total) => on_progress(loaded, total),
            XhrEvent::Done { status, body } => return interpret_response(status, &body),
            XhrEvent::NetworkError => return Err(UploadError::Transport("network error".into())),
        }
    }
    Err(UploadError::Transport("request was dropped".into()))
}

fn js_error(err: JsValue) -> UploadError {
    UploadError::Transport(format!("{:?}", err))
}

pub struct XhrTransport {
    endpoint: String,
}

impl XhrTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: analyze_url(base_url),
        }
    }

    pub fn from_build_env() -> Self {
        Self::new(api_base_url())
    }
}

impl AnalysisTransport for XhrTransport {
    type Payload = File;

    async fn upload(
        &self,
        file: &FileMeta,
        _mime_type: &str,
        payload: File,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> Result<AnalysisReport, UploadError> {
        let form = FormData::new().map_err(js_error)?;
        form.append_with_blob_and_filename(FILE_FIELD, &payload, &file.name)
            .map_err(js_error)?;

        let xhr = XmlHttpRequest::new().map_err(js_error)?;
        xhr.open_with_async("POST", &self.endpoint, true)
            .map_err(js_error)?;
        let upload = xhr.upload().map_err(js_error)?;

        let (tx, mut rx) = mpsc::unbounded::<XhrEvent>();

        let progress_tx = tx.clone();
        let on_upload_progress = Closure::wrap(Box::new(move |ev: ProgressEvent| {
            if ev.length_computable() {
                let _ = progress_tx
                    .unbounded_send(XhrEvent::Progress(ev.loaded() as u64, ev.total() as u64));
            }
        }) as Box<dyn FnMut(_)>);
        upload.set_onprogress(Some(on_upload_progress.as_ref().unchecked_ref()));

        let xhr_done = xhr.clone();
        let on_loadend = Closure::wrap(Box::new(move |_: ProgressEvent| {
            let event = loadend_event(
                xhr_done.status().ok(),
                xhr_done.response_text().ok().flatten(),
            );
            let _ = tx.unbounded_send(event);
        }) as Box<dyn FnMut(_)>);
        xhr.set_onloadend(Some(on_loadend.as_ref().unchecked_ref()));

        xhr.send_with_opt_form_data(Some(&form))
            .map_err(js_error)?;

        let result = await_completion(&mut rx, on_progress).await;

        upload.set_onprogress(None);
        xhr.set_onloadend(None);
        drop(on_upload_progress);
        drop(on_loadend);

        result
    }
}


#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn wasm_unreachable_service_is_transport_error() {
        let parts = js_sys::Array::of1(&JsValue::from_str("not really a png"));
        let file = File::new_with_str_sequence(&parts, "photo.png").expect("File生成失敗");
        let meta = FileMeta::new("photo.png", file.size() as u64, Some("image/png".into()));

        let transport = XhrTransport::new("http://127.0.0.1:9");
        let result = transport
            .upload(&meta, "image/png", file, &mut |_: u64, _: u64| {})
            .await;

        assert!(matches!(result, Err(UploadError::Transport(_))));
    }
}
