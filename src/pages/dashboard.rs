use crate::components::ui::{
    Alert, AlertDescription, Badge, Button, ButtonSize, Card, CardContent, CardDescription,
    CardHeader, CardTitle, Spinner,
};
use crate::pages::short_date;
use crate::state::{AppContext, FormStore};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let forms_store = expect_context::<FormStore>();
    let navigate = StoredValue::new(use_navigate());

    let forms = app_state.0.forms;
    let forms_loading = app_state.0.forms_loading;
    let forms_error = app_state.0.forms_error;

    // Aggregates from the per-form analytics fan-out. Best effort: a
    // form whose analytics call fails simply contributes nothing.
    let total_responses: RwSignal<u64> = RwSignal::new(0);
    let completion_rate: RwSignal<Option<f64>> = RwSignal::new(None);

    let loaded: RwSignal<bool> = RwSignal::new(false);
    Effect::new(move |_| {
        if loaded.get_untracked() {
            return;
        }
        loaded.set(true);

        let store = forms_store.clone();
        let client = app_state.0.api_client;
        spawn_local(async move {
            if store.fetch_forms().await.is_err() {
                return;
            }

            let snapshot = forms.get_untracked();
            let c = client.get_untracked();
            let mut responses = 0u64;
            let mut rates: Vec<f64> = Vec::new();
            for form in &snapshot {
                if let Ok(a) = c.get_form_analytics(&form.id).await {
                    responses += a.responses;
                    rates.push(a.completion_rate);
                }
            }
            total_responses.set(responses);
            if !rates.is_empty() {
                completion_rate.set(Some(rates.iter().sum::<f64>() / rates.len() as f64));
            }
        });
    });

    let total_forms = move || forms.get().len();
    let published_forms = move || forms.get().iter().filter(|f| f.is_published).count();

    let recent_forms = move || {
        let mut list = forms.get();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list.truncate(5);
        list
    };

    let completion_text = move || match completion_rate.get() {
        Some(rate) => format!("{:.0}%", rate),
        None => "–".to_string(),
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">"Dashboard"</h1>
                    <p class="text-xs text-muted-foreground">"What your forms have been up to."</p>
                </div>
                <Button
                    size=ButtonSize::Sm
                    on:click=move |_| {
                        navigate.with_value(|nav| nav("/forms/builder/new", Default::default()));
                    }
                >
                    "Create form"
                </Button>
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

            <div class="grid gap-3 sm:grid-cols-3">
                <Card>
                    <CardHeader class="p-4">
                        <CardDescription class="text-xs">"Total forms"</CardDescription>
                        <CardTitle class="text-2xl">{move || total_forms().to_string()}</CardTitle>
                    </CardHeader>
                    <CardContent class="px-4 pb-4 pt-0">
                        <div class="text-xs text-muted-foreground">
                            {move || format!("{} published", published_forms())}
                        </div>
                    </CardContent>
                </Card>

                <Card>
                    <CardHeader class="p-4">
                        <CardDescription class="text-xs">"Total responses"</CardDescription>
                        <CardTitle class="text-2xl">{move || total_responses.get().to_string()}</CardTitle>
                    </CardHeader>
                    <CardContent class="px-4 pb-4 pt-0">
                        <div class="text-xs text-muted-foreground">"Across all forms"</div>
                    </CardContent>
                </Card>

                <Card>
                    <CardHeader class="p-4">
                        <CardDescription class="text-xs">"Completion rate"</CardDescription>
                        <CardTitle class="text-2xl">{completion_text}</CardTitle>
                    </CardHeader>
                    <CardContent class="px-4 pb-4 pt-0">
                        <div class="text-xs text-muted-foreground">"Average over forms with data"</div>
                    </CardContent>
                </Card>
            </div>

            <Card>
                <CardHeader class="px-4 pt-0 pb-0">
                    <CardTitle class="text-sm">"Recent forms"</CardTitle>
                </CardHeader>
                <CardContent class="px-4 pb-0">
                    <Show
                        when=move || !forms.get().is_empty()
                        fallback=move || {
                            view! {
                                <div class="flex flex-col items-center gap-2 py-8 text-center">
                                    <Show
                                        when=move || forms_loading.get()
                                        fallback=|| {
                                            view! {
                                                <div class="text-sm text-muted-foreground">
                                                    "No forms yet. Create your first one."
                                                </div>
                                            }
                                        }
                                    >
                                        <Spinner class="text-muted-foreground" />
                                    </Show>
                                </div>
                            }
                        }
                    >
                        <div class="divide-y divide-border">
                            {move || {
                                recent_forms()
                                    .into_iter()
                                    .map(|form| {
                                        let id = form.id.clone();
                                        let id_for_view = id.clone();
                                        let id_for_builder = id.clone();
                                        let id_for_analytics = id.clone();
                                        let created = form
                                            .created_at
                                            .as_deref()
                                            .map(short_date)
                                            .unwrap_or_default();

                                        view! {
                                            <div class="flex items-center justify-between gap-3 py-3">
                                                <div class="min-w-0">
                                                    <a
                                                        href=format!("/forms/builder/{id_for_builder}")
                                                        class="block truncate text-sm font-medium hover:underline"
                                                    >
                                                        {form.title.clone()}
                                                    </a>
                                                    <div class="text-xs text-muted-foreground">{created}</div>
                                                </div>

                                                <div class="flex shrink-0 items-center gap-3">
                                                    {if form.is_published {
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
                                                    <a
                                                        href=format!("/forms/{id_for_view}/view")
                                                        class="text-xs text-muted-foreground hover:text-foreground"
                                                    >
                                                        "View"
                                                    </a>
                                                    <a
                                                        href=format!("/forms/{id_for_analytics}/analytics")
                                                        class="text-xs text-muted-foreground hover:text-foreground"
                                                    >
                                                        "Analytics"
                                                    </a>
                                                </div>
                                            </div>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </div>
                    </Show>
                </CardContent>
            </Card>
        </div>
    }
}
