#![allow(dead_code)]

use leptos::prelude::*;
use tw_merge::tw_merge;

/// Thin completion bar for the one-question-at-a-time flow. `value` is
/// a percentage and gets clamped into 0..=100 before rendering.
#[allow(dead_code)]
#[component]
pub fn ProgressBar(
    #[prop(into, optional)] class: String,
    #[prop(into)] value: Signal<f64>,
) -> impl IntoView {
    let merged_class = tw_merge!("bg-muted relative h-2 w-full overflow-hidden rounded-full", class);
    let clamped = move || value.get().clamp(0.0, 100.0);
    let width = move || format!("{}%", clamped());

    view! {
        <div
            data-name="ProgressBar"
            class=merged_class
            role="progressbar"
            aria-valuemin="0"
            aria-valuemax="100"
            aria-valuenow=move || format!("{:.0}", clamped())
        >
            <div
                class="bg-primary h-full rounded-full transition-all duration-300"
                style:width=width
            ></div>
        </div>
    }
}
