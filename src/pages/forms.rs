use crate::components::ui::{
    Alert, AlertDescription, Badge, Button, ButtonSize, ButtonVariant, Card, CardContent, Input,
    Spinner,
};
use crate::models::Form;
use crate::pages::short_date;
use crate::state::{AppContext, FormStore};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::use_navigate;

#[derive(Clone, Copy, PartialEq, Eq)]
enum StatusFilter {
    All,
    Published,
    Draft,
}

impl StatusFilter {
    fn keeps(self, form: &Form) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Published => form.is_published,
            StatusFilter::Draft => !form.is_published,
        }
    }
}

#[component]
pub fn FormsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let forms_store = expect_context::<FormStore>();
    let navigate = StoredValue::new(use_navigate());

    let forms = app_state.0.forms;
    let forms_loading = app_state.0.forms_loading;
    let forms_error = app_state.0.forms_error;

    let query: RwSignal<String> = RwSignal::new(String::new());
    let filter: RwSignal<StatusFilter> = RwSignal::new(StatusFilter::All);

    // Id of the form whose publish call is in flight.
    let publish_busy: RwSignal<Option<String>> = RwSignal::new(None);

    // Delete confirm dialog state.
    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let delete_id: RwSignal<Option<String>> = RwSignal::new(None);
    let delete_title: RwSignal<String> = RwSignal::new(String::new());
    let delete_loading: RwSignal<bool> = RwSignal::new(false);
    let delete_error: RwSignal<Option<String>> = RwSignal::new(None);

    let loaded: RwSignal<bool> = RwSignal::new(false);
    {
        let store = forms_store.clone();
        Effect::new(move |_| {
            if loaded.get_untracked() {
                return;
            }
            loaded.set(true);
            let store = store.clone();
            spawn_local(async move {
                let _ = store.fetch_forms().await;
            });
        });
    }

    // Esc dismisses the delete dialog unless the call is in flight.
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && delete_open.get_untracked() && !delete_loading.get_untracked() {
            delete_open.set(false);
            delete_error.set(None);
        }
    });

    let filtered = move || {
        let needle = query.get().trim().to_lowercase();
        let status = filter.get();
        forms
            .get()
            .into_iter()
            .filter(|f| status.keeps(f))
            .filter(|f| needle.is_empty() || f.title.to_lowercase().contains(&needle))
            .collect::<Vec<_>>()
    };

    let filter_button = move |value: StatusFilter, label: &'static str| {
        let variant = if filter.get() == value {
            ButtonVariant::Secondary
        } else {
            ButtonVariant::Ghost
        };
        view! {
            <Button variant=variant size=ButtonSize::Sm on:click=move |_| filter.set(value)>
                {label}
            </Button>
        }
    };

    let submit_delete = {
        let store = forms_store.clone();
        move || {
            let Some(id) = delete_id.get_untracked() else {
                return;
            };
            let store = store.clone();
            delete_loading.set(true);
            delete_error.set(None);
            spawn_local(async move {
                match store.delete_form(&id).await {
                    Ok(()) => {
                        delete_loading.set(false);
                        delete_open.set(false);
                    }
                    Err(e) => {
                        delete_loading.set(false);
                        delete_error.set(Some(e.user_message("Failed to delete form")));
                    }
                }
            });
        }
    };

    let publish = {
        let store = forms_store.clone();
        Callback::new(move |id: String| {
            let store = store.clone();
            publish_busy.set(Some(id.clone()));
            spawn_local(async move {
                let _ = store.publish_form(&id).await;
                publish_busy.set(None);
            });
        })
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">"My Forms"</h1>
                    <p class="text-xs text-muted-foreground">"Everything you have built, drafts included."</p>
                </div>
                <Button
                    size=ButtonSize::Sm
                    on:click=move |_| {
                        navigate.with_value(|nav| nav("/forms/builder/new", Default::default()));
                    }
                >
                    "New form"
                </Button>
            </div>

            <div class="flex flex-col gap-2 sm:flex-row sm:items-center sm:justify-between">
                <div class="w-full sm:max-w-xs">
                    <Input
                        r#type="search"
                        placeholder="Search forms…"
                        bind_value=query
                        class="h-8 text-sm"
                    />
                </div>
                <div class="flex items-center gap-1">
                    {move || {
                        view! {
                            {filter_button(StatusFilter::All, "All")}
                            {filter_button(StatusFilter::Published, "Published")}
                            {filter_button(StatusFilter::Draft, "Drafts")}
                        }
                    }}
                </div>
            </div>

            <Show when=move || forms_error.get().is_some() fallback=|| ().into_view()>
                {move || {
                    forms_error.get().map(|e| {
                        view! {
                            <Alert class="border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        }
                    })
                }}
            </Show>

            <Show
                when=move || !filtered().is_empty()
                fallback=move || {
                    view! {
                        <Card>
                            <CardContent>
                                <div class="flex flex-col items-center gap-2 py-8 text-center">
                                    <Show
                                        when=move || forms_loading.get()
                                        fallback=move || {
                                            view! {
                                                <div class="text-sm text-muted-foreground">
                                                    {move || {
                                                        if forms.get().is_empty() {
                                                            "No forms yet."
                                                        } else {
                                                            "Nothing matches your search."
                                                        }
                                                    }}
                                                </div>
                                            }
                                        }
                                    >
                                        <Spinner class="text-muted-foreground" />
                                    </Show>
                                </div>
                            </CardContent>
                        </Card>
                    }
                }
            >
                <div class="grid gap-3 sm:grid-cols-2">
                    {move || {
                        filtered()
                            .into_iter()
                            .map(|form| {
                                let id = form.id.clone();
                                let title = form.title.clone();
                                let description = form.description.clone();
                                let is_published = form.is_published;
                                let question_count = form.fields.len().max(form.questions.len());
                                let created = form
                                    .created_at
                                    .as_deref()
                                    .map(short_date)
                                    .unwrap_or_default();

                                let id_for_nav = id.clone();
                                let id_for_view = id.clone();
                                let id_for_analytics = id.clone();
                                let id_for_publish = id.clone();
                                let id_for_delete = id.clone();
                                let title_for_delete = title.clone();

                                let publish = publish.clone();
                                let this_busy = move || publish_busy.get().as_deref() == Some(id.as_str());

                                view! {
                                    <Card
                                        class="group relative cursor-pointer transition-colors hover:ring-1 hover:ring-border"
                                        on:click=move |_| {
                                            navigate
                                                .with_value(|nav| {
                                                    nav(
                                                        &format!("/forms/builder/{id_for_nav}"),
                                                        Default::default(),
                                                    )
                                                });
                                        }
                                    >
                                        <CardContent class="space-y-2 px-4">
                                            <div class="flex items-start justify-between gap-2">
                                                <div class="min-w-0">
                                                    <div class="truncate text-sm font-medium">{title}</div>
                                                    <div class="line-clamp-2 min-h-[1rem] text-xs text-muted-foreground">
                                                        {description}
                                                    </div>
                                                </div>
                                                {if is_published {
                                                    view! {
                                                        <Badge class="bg-success/15 text-success">"Published"</Badge>
                                                    }
                                                        .into_any()
                                                } else {
                                                    view! {
                                                        <Badge class="bg-muted text-muted-foreground">"Draft"</Badge>
                                                    }
                                                        .into_any()
                                                }}
                                            </div>

                                            <div class="flex items-center justify-between pt-1">
                                                <div class="text-xs text-muted-foreground">
                                                    {format!("{question_count} questions")}
                                                    {(!created.is_empty()).then(|| format!(" · {created}"))}
                                                </div>

                                                <div class="flex items-center gap-2">
                                                    <Show when=move || !is_published fallback=|| ().into_view()>
                                                        <Button
                                                            variant=ButtonVariant::Outline
                                                            size=ButtonSize::Sm
                                                            class="h-7 text-xs"
                                                            attr:disabled=this_busy.clone()
                                                            on:click={
                                                                let publish = publish.clone();
                                                                let id = id_for_publish.clone();
                                                                move |ev: web_sys::MouseEvent| {
                                                                    ev.stop_propagation();
                                                                    publish.run(id.clone());
                                                                }
                                                            }
                                                        >
                                                            <span class="inline-flex items-center gap-1">
                                                                <Show when=this_busy.clone() fallback=|| ().into_view()>
                                                                    <Spinner class="size-3" />
                                                                </Show>
                                                                "Publish"
                                                            </span>
                                                        </Button>
                                                    </Show>

                                                    <a
                                                        href=format!("/forms/{id_for_view}/view")
                                                        class="text-xs text-muted-foreground hover:text-foreground"
                                                        on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                                                    >
                                                        "View"
                                                    </a>
                                                    <a
                                                        href=format!("/forms/{id_for_analytics}/analytics")
                                                        class="text-xs text-muted-foreground hover:text-foreground"
                                                        on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                                                    >
                                                        "Analytics"
                                                    </a>

                                                    <Button
                                                        variant=ButtonVariant::Ghost
                                                        size=ButtonSize::Icon
                                                        class="h-7 w-7 text-destructive"
                                                        attr:title="Delete"
                                                        on:click=move |ev: web_sys::MouseEvent| {
                                                            ev.stop_propagation();
                                                            delete_id.set(Some(id_for_delete.clone()));
                                                            delete_title.set(title_for_delete.clone());
                                                            delete_error.set(None);
                                                            delete_open.set(true);
                                                        }
                                                    >
                                                        <svg
                                                            xmlns="http://www.w3.org/2000/svg"
                                                            width="16"
                                                            height="16"
                                                            viewBox="0 0 24 24"
                                                            fill="none"
                                                            stroke="currentColor"
                                                            stroke-width="2"
                                                            stroke-linecap="round"
                                                            stroke-linejoin="round"
                                                            aria-hidden="true"
                                                        >
                                                            <path d="M3 6h18" />
                                                            <path d="M8 6V4h8v2" />
                                                            <path d="M19 6l-1 14H6L5 6" />
                                                            <path d="M10 11v6" />
                                                            <path d="M14 11v6" />
                                                        </svg>
                                                    </Button>
                                                </div>
                                            </div>
                                        </CardContent>
                                    </Card>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>

            <Show when=move || delete_open.get() fallback=|| ().into_view()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                        <div class="mb-3 space-y-1">
                            <div class="text-sm font-medium">"Delete form"</div>
                            <div class="text-xs text-muted-foreground">
                                {move || {
                                    format!(
                                        "This permanently deletes \"{}\" and all of its responses.",
                                        delete_title.get(),
                                    )
                                }}
                            </div>
                        </div>

                        <div class="space-y-2">
                            <Show when=move || delete_error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    delete_error.get().map(|e| {
                                        view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                            </Alert>
                                        }
                                    })
                                }}
                            </Show>

                            <div class="flex items-center justify-end gap-2 pt-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    attr:disabled=move || delete_loading.get()
                                    on:click=move |_| delete_open.set(false)
                                >
                                    "Cancel"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Destructive
                                    size=ButtonSize::Sm
                                    attr:disabled=move || delete_loading.get()
                                    on:click={
                                        let submit_delete = submit_delete.clone();
                                        move |_| submit_delete()
                                    }
                                >
                                    <span class="inline-flex items-center gap-2">
                                        <Show when=move || delete_loading.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || if delete_loading.get() { "Deleting..." } else { "Delete" }}
                                    </span>
                                </Button>
                            </div>
                        </div>
                    </div>
                </div>
            </Show>
        </div>
    }
}
