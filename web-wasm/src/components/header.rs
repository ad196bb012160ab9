//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"TraceLens"</h1>
            <p class="subtitle">"OSINT Image Analysis"</p>
        </header>
    }
}
