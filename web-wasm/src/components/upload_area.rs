//! アップロードエリアコンポーネント
//!
//! ドロップまたは選択された先頭の1ファイルだけを渡す。

use leptos::html::Input;
use leptos::prelude::*;
use tracelens_common::validation::accept_attribute;
use web_sys::{DragEvent, File, FileList};

fn first_file(files: FileList) -> Option<File> {
    if files.length() > 1 {
        gloo::console::warn!(format!(
            "{} files dropped; only the first one is analyzed",
            files.length()
        ));
    }
    files.get(0)
}

#[component]
pub fn UploadArea<F>(disabled: Signal<bool>, on_file: F) -> impl IntoView
where
    F: Fn(File) + 'static + Clone + Send + Sync,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let input_ref = NodeRef::<Input>::new();

    let on_drop = {
        let on_file = on_file.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);

            if disabled.get_untracked() {
                return;
            }

            if let Some(file) = ev
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(first_file)
            {
                on_file(file);
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if !disabled.get_untracked() {
            set_is_dragover.set(true);
        }
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if disabled.get_untracked() {
            return;
        }
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_change = {
        let on_file = on_file.clone();
        move |ev: web_sys::Event| {
            let input = event_target::<web_sys::HtmlInputElement>(&ev);
            let file = input.files().and_then(first_file);
            // 同じファイルを選び直しても change が発火するように戻す
            input.set_value("");
            if let Some(file) = file {
                on_file(file);
            }
        }
    };

    view! {
        <div
            class=move || {
                let mut classes = vec!["upload-area"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                if disabled.get() {
                    classes.push("disabled");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:click=on_click
        >
            <div class="upload-icon">"🔍"</div>
            <p>"Drop an image here, or click to select"</p>
            <p class="text-muted">"Supported: JPG, PNG, GIF, BMP, TIFF (max 10 MB)"</p>
        </div>
        <input
            type="file"
            accept=accept_attribute()
            style="display: none"
            node_ref=input_ref
            on:change=on_change
        />
    }
}
