use leptos::prelude::*;

/// 失敗メッセージ（種類は区別せず文字列だけ表示）
#[component]
pub fn ErrorBanner(message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div class="error-banner" role="alert">
                <strong>"Error: "</strong>
                {move || message.get().unwrap_or_default()}
            </div>
        </Show>
    }
}
