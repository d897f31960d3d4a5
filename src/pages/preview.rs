use crate::components::ui::{Badge, Card, CardContent, Spinner};
use crate::models::{FieldType, Form, Question};
use crate::pages::{copy_to_clipboard, fill_url, html_input_type, FormRouteParams};
use crate::state::FormStore;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;

#[component]
pub fn FormViewPage() -> impl IntoView {
    let forms_store = expect_context::<FormStore>();
    let params = use_params::<FormRouteParams>();

    let route_id = move || params.get().ok().and_then(|p| p.form_id).unwrap_or_default();

    let form: RwSignal<Option<Form>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let copied: RwSignal<bool> = RwSignal::new(false);

    let loaded_for: RwSignal<Option<String>> = RwSignal::new(None);
    {
        let store = forms_store.clone();
        Effect::new(move |_| {
            let id = route_id();
            if id.is_empty() || loaded_for.get_untracked().as_deref() == Some(id.as_str()) {
                return;
            }
            loaded_for.set(Some(id.clone()));

            let store = store.clone();
            loading.set(true);
            spawn_local(async move {
                form.set(store.fetch_form_by_id(&id).await.ok());
                loading.set(false);
            });
        });
    }

    let share_url = move || {
        form.get()
            .filter(|f| f.is_published)
            .map(|f| fill_url(&f.id))
            .unwrap_or_default()
    };
    let on_copy = move |_| {
        copy_to_clipboard(&share_url());
        copied.set(true);
    };

    view! {
        <div class="mx-auto max-w-2xl space-y-4">
            <div class="flex items-center justify-between">
                <a href="/forms" class="text-xs text-muted-foreground hover:text-foreground">
                    "← My Forms"
                </a>
                <a
                    href=move || format!("/forms/builder/{}", route_id())
                    class="text-xs text-muted-foreground hover:text-foreground"
                >
                    "Open builder"
                </a>
            </div>

            <Show
                when=move || !loading.get()
                fallback=|| {
                    view! {
                        <div class="flex items-center justify-center py-16">
                            <Spinner class="text-muted-foreground" />
                        </div>
                    }
                }
            >
                {move || match form.get() {
                    None => {
                        view! {
                            <Card>
                                <CardContent class="py-10 text-center text-sm text-muted-foreground">
                                    "Form not found."
                                </CardContent>
                            </Card>
                        }
                            .into_any()
                    }
                    Some(f) => {
                        let questions = f.questions.clone();
                        view! {
                            <div class="space-y-4">
                                <div class="space-y-1">
                                    <div class="flex items-center gap-2">
                                        <h1 class="text-xl font-semibold">{f.title.clone()}</h1>
                                        {if f.is_published {
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
                                    {(!f.description.is_empty()).then(|| view! {
                                        <p class="text-sm text-muted-foreground">{f.description.clone()}</p>
                                    })}
                                </div>

                                {f.is_published.then(|| {
                                    let url = fill_url(&f.id);
                                    let url_for_open = url.clone();
                                    view! {
                                        <div class="flex items-center gap-2 rounded-lg border border-border bg-background p-3">
                                            <input
                                                class="h-8 w-full rounded-md border border-input bg-muted/40 px-2 text-xs text-muted-foreground outline-none"
                                                readonly=true
                                                prop:value=url
                                            />
                                            <button
                                                class="inline-flex h-8 shrink-0 items-center rounded-md border border-border bg-background px-3 text-xs font-medium transition-colors hover:bg-accent hover:text-accent-foreground"
                                                on:click=on_copy
                                            >
                                                {move || if copied.get() { "Copied" } else { "Copy link" }}
                                            </button>
                                            <a
                                                href=url_for_open
                                                target="_blank"
                                                class="inline-flex h-8 shrink-0 items-center rounded-md border border-border bg-background px-3 text-xs font-medium transition-colors hover:bg-accent hover:text-accent-foreground"
                                            >
                                                "Open"
                                            </a>
                                        </div>
                                    }
                                })}

                                {if questions.is_empty() {
                                    view! {
                                        <div class="rounded-lg border border-dashed border-border px-4 py-12 text-center text-sm text-muted-foreground">
                                            "This form has no questions yet."
                                        </div>
                                    }
                                        .into_any()
                                } else {
                                    questions
                                        .into_iter()
                                        .enumerate()
                                        .map(|(index, q)| view! { <QuestionPreview question=q index=index /> })
                                        .collect_view()
                                        .into_any()
                                }}
                            </div>
                        }
                            .into_any()
                    }
                }}
            </Show>
        </div>
    }
}

/// One question as respondents will see it, all inputs disabled.
#[component]
fn QuestionPreview(question: Question, index: usize) -> impl IntoView {
    let widget = match &question.field_type {
        FieldType::Paragraph => view! {
            <textarea
                class="w-full rounded-md border border-input bg-muted/30 px-3 py-2 text-sm"
                rows=3
                disabled=true
                placeholder="Long answer"
            ></textarea>
        }
        .into_any(),
        FieldType::MultipleChoice => question
            .options
            .iter()
            .map(|o| {
                view! {
                    <label class="flex items-center gap-2 text-sm text-muted-foreground">
                        <input type="radio" disabled=true class="size-4" />
                        {o.label.clone()}
                    </label>
                }
            })
            .collect_view()
            .into_any(),
        FieldType::Checkboxes => question
            .options
            .iter()
            .map(|o| {
                view! {
                    <label class="flex items-center gap-2 text-sm text-muted-foreground">
                        <input type="checkbox" disabled=true class="size-4" />
                        {o.label.clone()}
                    </label>
                }
            })
            .collect_view()
            .into_any(),
        FieldType::Dropdown => view! {
            <select class="h-9 w-full rounded-md border border-input bg-muted/30 px-2 text-sm" disabled=true>
                {question
                    .options
                    .iter()
                    .map(|o| view! { <option>{o.label.clone()}</option> })
                    .collect_view()}
            </select>
        }
        .into_any(),
        FieldType::Rating => (1..=5u8)
            .map(|n| {
                view! {
                    <span class="inline-flex size-9 items-center justify-center rounded-md border border-border text-sm text-muted-foreground">
                        {n.to_string()}
                    </span>
                }
            })
            .collect_view()
            .into_any(),
        FieldType::File => view! {
            <div class="rounded-md border border-dashed border-border px-3 py-6 text-center text-xs text-muted-foreground">
                "File upload"
            </div>
        }
        .into_any(),
        other => view! {
            <input
                class="h-9 w-full rounded-md border border-input bg-muted/30 px-3 text-sm"
                type=html_input_type(other)
                disabled=true
                placeholder="Answer"
            />
        }
        .into_any(),
    };

    let gap = if question.field_type == FieldType::Rating {
        "flex items-center gap-2"
    } else {
        "space-y-1.5"
    };

    view! {
        <Card>
            <CardContent class="space-y-2 px-4">
                <div class="text-sm font-medium">
                    <span class="text-muted-foreground">{format!("{}. ", index + 1)}</span>
                    {question.title.clone()}
                    {question.is_required.then(|| view! { <span class="text-destructive">" *"</span> })}
                </div>
                {(!question.description.is_empty()).then(|| view! {
                    <p class="text-xs text-muted-foreground">{question.description.clone()}</p>
                })}
                <div class=gap>{widget}</div>
            </CardContent>
        </Card>
    }
}
