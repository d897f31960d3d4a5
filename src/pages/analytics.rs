use crate::components::ui::{Badge, Card, CardContent, Spinner};
use crate::models::{Form, FormAnalytics, StoredResponse};
use crate::pages::{copy_to_clipboard, field_type_label, fill_url, short_date, FormRouteParams};
use crate::state::FormStore;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use std::collections::HashMap;

/// Flattens a stored answer value for display. Arrays come from
/// checkbox questions, numbers from ratings.
fn answer_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(answer_text)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Null => "–".to_string(),
        other => other.to_string(),
    }
}

#[component]
pub fn FormAnalyticsPage() -> impl IntoView {
    let forms_store = expect_context::<FormStore>();
    let params = use_params::<FormRouteParams>();

    let route_id = move || params.get().ok().and_then(|p| p.form_id).unwrap_or_default();

    let form: RwSignal<Option<Form>> = RwSignal::new(None);
    let analytics: RwSignal<FormAnalytics> = RwSignal::new(FormAnalytics::default());
    let responses: RwSignal<Vec<StoredResponse>> = RwSignal::new(vec![]);
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
                if let Ok(a) = store.fetch_form_analytics(&id).await {
                    analytics.set(a);
                }
                if let Ok(rs) = store.fetch_form_responses(&id).await {
                    responses.set(rs);
                }
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
        <div class="space-y-4">
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
                {move || {
                    let Some(f) = form.get() else {
                        return view! {
                            <Card>
                                <CardContent class="py-10 text-center text-sm text-muted-foreground">
                                    "Form not found."
                                </CardContent>
                            </Card>
                        }
                            .into_any();
                    };

                    let a = analytics.get();
                    let titles: HashMap<String, String> = f
                        .questions
                        .iter()
                        .map(|q| (q.id.clone(), q.title.clone()))
                        .collect();
                    let stats = a.questions.clone();
                    let response_rows = responses.get();

                    view! {
                        <div class="space-y-4">
                            <div class="flex items-center gap-2">
                                <h1 class="text-xl font-semibold">{f.title.clone()}</h1>
                                {if f.is_published {
                                    view! { <Badge class="bg-success/15 text-success">"Published"</Badge> }
                                        .into_any()
                                } else {
                                    view! { <Badge class="bg-muted text-muted-foreground">"Draft"</Badge> }
                                        .into_any()
                                }}
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

                            <div class="grid gap-3 sm:grid-cols-3">
                                <Card>
                                    <CardContent class="px-4">
                                        <div class="text-xs text-muted-foreground">"Visits"</div>
                                        <div class="pt-1 text-2xl font-semibold">{a.visits.to_string()}</div>
                                    </CardContent>
                                </Card>
                                <Card>
                                    <CardContent class="px-4">
                                        <div class="text-xs text-muted-foreground">"Responses"</div>
                                        <div class="pt-1 text-2xl font-semibold">{a.responses.to_string()}</div>
                                    </CardContent>
                                </Card>
                                <Card>
                                    <CardContent class="px-4">
                                        <div class="text-xs text-muted-foreground">"Completion rate"</div>
                                        <div class="pt-1 text-2xl font-semibold">
                                            {format!("{:.0}%", a.completion_rate)}
                                        </div>
                                    </CardContent>
                                </Card>
                            </div>

                            <Card>
                                <CardContent class="space-y-1 px-4">
                                    <div class="pb-1 text-sm font-medium">"Question performance"</div>
                                    {if stats.is_empty() {
                                        view! {
                                            <div class="py-6 text-center text-xs text-muted-foreground">
                                                "No question data yet."
                                            </div>
                                        }
                                            .into_any()
                                    } else {
                                        stats
                                            .into_iter()
                                            .map(|s| {
                                                view! {
                                                    <div class="flex items-center justify-between gap-3 border-b border-border py-2 text-sm last:border-b-0">
                                                        <div class="flex min-w-0 items-center gap-2">
                                                            <span class="truncate">{s.title.clone()}</span>
                                                            <Badge class="shrink-0 bg-muted text-muted-foreground">
                                                                {field_type_label(&s.field_type)}
                                                            </Badge>
                                                        </div>
                                                        <div class="flex shrink-0 items-center gap-4 text-xs text-muted-foreground">
                                                            <span>{format!("{} answers", s.answers)}</span>
                                                            <span>{format!("{:.0}% drop-off", s.dropoff_rate)}</span>
                                                        </div>
                                                    </div>
                                                }
                                            })
                                            .collect_view()
                                            .into_any()
                                    }}
                                </CardContent>
                            </Card>

                            <Card>
                                <CardContent class="space-y-2 px-4">
                                    <div class="pb-1 text-sm font-medium">"Recent responses"</div>
                                    {if response_rows.is_empty() {
                                        view! {
                                            <div class="py-6 text-center text-xs text-muted-foreground">
                                                "No responses yet."
                                            </div>
                                        }
                                            .into_any()
                                    } else {
                                        response_rows
                                            .into_iter()
                                            .map(|r| {
                                                let when = r
                                                    .created_at
                                                    .as_deref()
                                                    .map(short_date)
                                                    .unwrap_or_default();
                                                let titles = titles.clone();
                                                view! {
                                                    <div class="rounded-md border border-border p-3">
                                                        <div class="flex items-center justify-between pb-1">
                                                            <span class="text-xs font-medium">"Response"</span>
                                                            <span class="text-xs text-muted-foreground">{when}</span>
                                                        </div>
                                                        <div class="space-y-0.5">
                                                            {r.answers
                                                                .iter()
                                                                .map(|ans| {
                                                                    let title = titles
                                                                        .get(&ans.question_id)
                                                                        .cloned()
                                                                        .unwrap_or_else(|| ans.question_id.clone());
                                                                    view! {
                                                                        <div class="text-xs">
                                                                            <span class="text-muted-foreground">
                                                                                {format!("{}: ", title)}
                                                                            </span>
                                                                            {answer_text(&ans.value)}
                                                                        </div>
                                                                    }
                                                                })
                                                                .collect_view()}
                                                        </div>
                                                    </div>
                                                }
                                            })
                                            .collect_view()
                                            .into_any()
                                    }}
                                </CardContent>
                            </Card>
                        </div>
                    }
                        .into_any()
                }}
            </Show>
        </div>
    }
}
