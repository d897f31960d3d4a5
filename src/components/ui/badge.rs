use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    // Status chips (published/draft and similar). Color comes from the
    // call site so one component covers every state.
    clx! {Badge, span, "inline-flex items-center rounded-full border border-transparent px-2.5 py-0.5 text-xs font-medium whitespace-nowrap"}
}

#[allow(unused_imports)]
pub use components::*;
