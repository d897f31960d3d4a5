#![allow(dead_code)]

use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Native `<select>` with the same hand-wired binding as `Input`.
/// `options` are `(value, label)` pairs; an empty `placeholder` skips
/// the disabled lead-in option.
#[allow(dead_code)]
#[component]
pub fn Select(
    #[prop(into, optional)] class: String,

    #[prop(into, optional)] id: String,
    #[prop(into, optional)] placeholder: String,
    #[prop(optional)] disabled: bool,
    #[prop(optional)] required: bool,

    options: Vec<(String, String)>,

    #[prop(into)] bind_value: RwSignal<String>,

    #[prop(optional)] node_ref: NodeRef<html::Select>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs outline-none disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm",
        "focus-visible:border-ring focus-visible:ring-ring/50",
        "focus-visible:ring-2",
        class
    );

    let on_change = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(select) = target.dyn_ref::<web_sys::HtmlSelectElement>() {
                bind_value.set(select.value());
            }
        }
    };

    let lead_in = (!placeholder.is_empty()).then(|| {
        view! {
            <option value="" disabled=true selected=move || bind_value.get().is_empty()>
                {placeholder.clone()}
            </option>
        }
    });

    view! {
        <select
            data-name="Select"
            class=merged_class
            id=id
            disabled=disabled
            required=required
            prop:value=move || bind_value.get()
            on:change=on_change
            node_ref=node_ref
        >
            {lead_in}
            {options
                .into_iter()
                .map(|(value, label)| {
                    let v = value.clone();
                    view! {
                        <option value=value selected=move || bind_value.get() == v>
                            {label}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
    .into_any()
}
