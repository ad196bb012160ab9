//! レポートJSONのブラウザダウンロード

use gloo::timers::callback::Timeout;
use tracelens_common::{export_report, AnalysisReport, ReportExport};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Blob URLを破棄するまでの猶予
const REVOKE_DELAY_MS: u32 = 1_000;

/// Blob URL経由でダウンロードさせ、保存ファイル名を返す
pub fn download_report(report: &AnalysisReport) -> Result<String, JsValue> {
    let export = export_report(report, js_sys::Date::now() as i64)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    trigger_download(&export)?;
    Ok(export.file_name)
}

/// アンカーのクリックでダウンロードを開始し、使ったBlob URLを返す
fn trigger_download(export: &ReportExport) -> Result<String, JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(&export.contents));
    let options = BlobPropertyBag::new();
    options.set_type(ReportExport::MIME_TYPE);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document is not available"))?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&export.file_name);
    anchor.click();

    // クリック直後に破棄するとダウンロードが中断されるブラウザがある
    let revoke_url = url.clone();
    Timeout::new(REVOKE_DELAY_MS, move || {
        let _ = Url::revoke_object_url(&revoke_url);
    })
    .forget();

    Ok(url)
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn sample_report() -> AnalysisReport {
        tracelens_common::parse_exported(
            r#"{"filename":"photo.png","ai_detection":{"verdict":"human","score":0.12}}"#,
        )
        .expect("サンプルレポートが不正")
    }

    #[wasm_bindgen_test]
    fn wasm_download_report_names_file_by_timestamp() {
        let name = download_report(&sample_report()).expect("ダウンロード失敗");
        assert!(name.starts_with("tracelens-report-"));
        assert!(name.ends_with(".json"));
    }

    #[wasm_bindgen_test]
    async fn wasm_blob_url_still_readable_after_click() {
        let export = export_report(&sample_report(), 42).unwrap();
        let url = trigger_download(&export).expect("ダウンロード失敗");

        let window = web_sys::window().unwrap();
        let response: web_sys::Response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .expect("Blob URLが既に破棄されている")
            .dyn_into()
            .unwrap();
        let text = JsFuture::from(response.text().unwrap()).await.unwrap();

        assert_eq!(text.as_string().as_deref(), Some(export.contents.as_str()));
    }
}
