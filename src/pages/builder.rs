use crate::api::QuestionPayload;
use crate::components::ui::{
    Alert, AlertDescription, Badge, Button, ButtonSize, ButtonVariant, Card, CardContent, Input,
    Label, Spinner, Textarea,
};
use crate::models::{FieldOption, FieldType, FormField, QuestionOrder};
use crate::pages::{checkbox_checked, field_type_label, FormRouteParams};
use crate::state::{AppContext, FormStore};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params};

#[component]
pub fn FormBuilderPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let forms_store = expect_context::<FormStore>();
    let navigate = StoredValue::new(use_navigate());
    let params = use_params::<FormRouteParams>();

    let route_id = move || params.get().ok().and_then(|p| p.form_id).unwrap_or_default();
    let route_id_untracked =
        move || params.get_untracked().ok().and_then(|p| p.form_id).unwrap_or_default();
    let is_new = move || {
        let id = route_id();
        id.is_empty() || id == "new"
    };

    let forms_error = app_state.0.forms_error;

    // The working copy: all edits land here first, the draft cache and
    // the backend follow.
    let title: RwSignal<String> = RwSignal::new("Untitled Form".to_string());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let is_published: RwSignal<bool> = RwSignal::new(false);
    let fields: RwSignal<Vec<FormField>> = RwSignal::new(vec![]);
    let selected_id: RwSignal<Option<String>> = RwSignal::new(None);

    let loading: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let publishing: RwSignal<bool> = RwSignal::new(false);
    let success: RwSignal<Option<String>> = RwSignal::new(None);

    let loaded_for: RwSignal<Option<String>> = RwSignal::new(None);
    {
        let store = forms_store.clone();
        Effect::new(move |_| {
            let id = route_id();
            if loaded_for.get_untracked().as_deref() == Some(id.as_str()) {
                return;
            }
            loaded_for.set(Some(id.clone()));
            selected_id.set(None);
            success.set(None);

            if id.is_empty() || id == "new" {
                title.set("Untitled Form".to_string());
                description.set(String::new());
                is_published.set(false);
                fields.set(vec![]);
                return;
            }

            let store = store.clone();
            loading.set(true);
            spawn_local(async move {
                if let Ok(form) = store.fetch_form_by_id(&id).await {
                    title.set(form.title.clone());
                    description.set(form.description.clone());
                    is_published.set(form.is_published);
                    fields.set(form.fields.clone());
                }
                loading.set(false);
            });
        });
    }

    // Palette click. New fields exist locally right away; for a saved
    // form the question is also created server-side and the local id is
    // swapped for the server one.
    let add_field = {
        let store = forms_store.clone();
        move |field_type: FieldType| {
            let field = fields.with_untracked(|fs| FormField::new(field_type, fs.len() as i64));
            let local_id = field.id.clone();
            fields.update(|fs| fs.push(field.clone()));
            selected_id.set(Some(local_id.clone()));
            success.set(None);

            let form_id = route_id_untracked();
            if form_id.is_empty() || form_id == "new" {
                return;
            }
            let store = store.clone();
            spawn_local(async move {
                let payload = QuestionPayload::from_question(&field.to_runtime_shape());
                if let Ok(q) = store.add_question(&form_id, &payload).await {
                    if !q.id.trim().is_empty() && q.id != local_id {
                        fields.update(|fs| {
                            if let Some(f) = fs.iter_mut().find(|f| f.id == local_id) {
                                f.id = q.id.clone();
                            }
                        });
                        if selected_id.get_untracked().as_deref() == Some(local_id.as_str()) {
                            selected_id.set(Some(q.id));
                        }
                    }
                }
            });
        }
    };

    let remove_field = {
        let store = forms_store.clone();
        Callback::new(move |id: String| {
            fields.update(|fs| {
                fs.retain(|f| f.id != id);
                for (i, f) in fs.iter_mut().enumerate() {
                    f.order = i as i64;
                }
            });
            if selected_id.get_untracked().as_deref() == Some(id.as_str()) {
                selected_id.set(None);
            }

            let form_id = route_id_untracked();
            if form_id.is_empty() || form_id == "new" {
                return;
            }
            let store = store.clone();
            spawn_local(async move {
                let _ = store.delete_question(&form_id, &id).await;
            });
        })
    };

    let duplicate_field = Callback::new(move |id: String| {
        fields.update(|fs| {
            if let Some(original) = fs.iter().find(|f| f.id == id).cloned() {
                let mut copy = original;
                copy.id = format!("field-{}", crate::util::now_ms());
                copy.label = format!("{} (Copy)", copy.label);
                copy.order = fs.len() as i64;
                fs.push(copy);
            }
        });
    });

    let move_field = {
        let store = forms_store.clone();
        Callback::new(move |(id, delta): (String, i64)| {
            let mut moved = false;
            fields.update(|fs| {
                if let Some(pos) = fs.iter().position(|f| f.id == id) {
                    let target = pos as i64 + delta;
                    if target >= 0 && (target as usize) < fs.len() {
                        fs.swap(pos, target as usize);
                        for (i, f) in fs.iter_mut().enumerate() {
                            f.order = i as i64;
                        }
                        moved = true;
                    }
                }
            });
            if !moved {
                return;
            }

            let form_id = route_id_untracked();
            if form_id.is_empty() || form_id == "new" {
                return;
            }
            let order: Vec<QuestionOrder> = fields.with_untracked(|fs| {
                fs.iter()
                    .map(|f| QuestionOrder { id: f.id.clone(), order: f.order })
                    .collect()
            });
            let store = store.clone();
            spawn_local(async move {
                let _ = store.reorder_questions(&form_id, &order).await;
            });
        })
    };

    // Discrete per-field commits (required toggle, option add/remove)
    // sync the single question on saved forms. Free-text edits wait for
    // Save.
    let on_field_committed = {
        let store = forms_store.clone();
        Callback::new(move |field: FormField| {
            let form_id = route_id_untracked();
            if form_id.is_empty() || form_id == "new" {
                return;
            }
            let store = store.clone();
            spawn_local(async move {
                let payload = QuestionPayload::from_question(&field.to_runtime_shape());
                let _ = store.update_question(&form_id, &field.id, &payload).await;
            });
        })
    };

    let on_save = {
        let store = forms_store.clone();
        move |_| {
            let store = store.clone();
            let id = route_id_untracked();
            let t = title.get_untracked();
            let d = description.get_untracked();
            let published = is_published.get_untracked();
            let fs = fields.get_untracked();

            saving.set(true);
            success.set(None);
            spawn_local(async move {
                let created = id.is_empty() || id == "new";
                let result = if created {
                    store.create_form(&t, &d, published, &fs).await
                } else {
                    store.update_form(&id, &t, &d, published, &fs).await
                };
                saving.set(false);

                if let Ok(form) = result {
                    if created && !form.id.is_empty() {
                        success.set(Some("Form created".to_string()));
                        navigate.with_value(|nav| {
                            nav(&format!("/forms/builder/{}", form.id), Default::default())
                        });
                    } else {
                        success.set(Some("Form saved".to_string()));
                    }
                }
            });
        }
    };

    let on_publish = {
        let store = forms_store.clone();
        move |_| {
            let id = route_id_untracked();
            if id.is_empty() || id == "new" {
                return;
            }
            let store = store.clone();
            publishing.set(true);
            success.set(None);
            spawn_local(async move {
                if store.publish_form(&id).await.is_ok() {
                    is_published.set(true);
                    success.set(Some("Form published".to_string()));
                }
                publishing.set(false);
            });
        }
    };

    view! {
        <div class="space-y-4">
            <div class="flex flex-wrap items-center justify-between gap-3">
                <div class="flex min-w-0 items-center gap-3">
                    <a href="/forms" class="text-xs text-muted-foreground hover:text-foreground">
                        "← My Forms"
                    </a>
                    {move || {
                        if is_published.get() {
                            view! { <Badge class="bg-success/15 text-success">"Published"</Badge> }
                                .into_any()
                        } else {
                            view! { <Badge class="bg-muted text-muted-foreground">"Draft"</Badge> }
                                .into_any()
                        }
                    }}
                </div>

                <div class="flex items-center gap-2">
                    <Show when=move || !is_new() fallback=|| ().into_view()>
                        <a
                            href=move || format!("/forms/{}/view", route_id())
                            class="text-xs text-muted-foreground hover:text-foreground"
                        >
                            "Preview"
                        </a>
                    </Show>

                    <Button
                        size=ButtonSize::Sm
                        attr:disabled=move || saving.get()
                        on:click=on_save
                    >
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || saving.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if saving.get() { "Saving..." } else { "Save" }}
                        </span>
                    </Button>

                    <Show
                        when=move || !is_new() && !is_published.get()
                        fallback=|| ().into_view()
                    >
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || publishing.get()
                            on:click=on_publish.clone()
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || publishing.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if publishing.get() { "Publishing..." } else { "Publish" }}
                            </span>
                        </Button>
                    </Show>
                </div>
            </div>

            <Card>
                <CardContent class="space-y-3 px-4">
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="form-title" class="text-xs">"Title"</Label>
                        <Input id="form-title" bind_value=title class="h-8 text-sm font-medium" />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="form-description" class="text-xs">"Description (optional)"</Label>
                        <Input
                            id="form-description"
                            bind_value=description
                            placeholder="Shown to respondents before the first question"
                            class="h-8 text-sm"
                        />
                    </div>
                </CardContent>
            </Card>

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
            <Show when=move || success.get().is_some() fallback=|| ().into_view()>
                {move || {
                    success.get().map(|m| {
                        view! {
                            <Alert class="border-success/30">
                                <AlertDescription class="text-success text-xs">{m}</AlertDescription>
                            </Alert>
                        }
                    })
                }}
            </Show>

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
                <div class="grid gap-4 lg:grid-cols-[180px_1fr_280px]">
                    // Palette
                    <div class="space-y-1">
                        <div class="px-1 pb-1 text-xs font-medium text-muted-foreground">"Add a question"</div>
                        {FieldType::ALL
                            .iter()
                            .map(|ft| {
                                let ft = ft.clone();
                                let label = field_type_label(&ft);
                                let add_field = add_field.clone();
                                view! {
                                    <button
                                        class="w-full rounded-md border border-border bg-background px-3 py-1.5 text-left text-xs transition-colors hover:bg-accent hover:text-accent-foreground"
                                        on:click=move |_| add_field(ft.clone())
                                    >
                                        {label}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>

                    // Question list
                    <div class="space-y-2">
                        <Show
                            when=move || !fields.get().is_empty()
                            fallback=|| {
                                view! {
                                    <div class="rounded-lg border border-dashed border-border px-4 py-16 text-center text-sm text-muted-foreground">
                                        "No questions yet. Pick a type from the palette."
                                    </div>
                                }
                            }
                        >
                            {move || {
                                let list = fields.get();
                                let last = list.len().saturating_sub(1);
                                list.into_iter()
                                    .enumerate()
                                    .map(|(index, field)| {
                                        let id = field.id.clone();
                                        let id_for_select = id.clone();
                                        let id_for_up = id.clone();
                                        let id_for_down = id.clone();
                                        let id_for_dup = id.clone();
                                        let id_for_remove = id.clone();

                                        let move_field_up = move_field.clone();
                                        let move_field_down = move_field.clone();
                                        let duplicate_field = duplicate_field.clone();
                                        let remove_field = remove_field.clone();

                                        let selected = move || {
                                            selected_id.get().as_deref() == Some(id.as_str())
                                        };
                                        let row_class = move || {
                                            if selected() {
                                                "group rounded-lg border border-primary bg-background p-3 ring-1 ring-primary"
                                            } else {
                                                "group cursor-pointer rounded-lg border border-border bg-background p-3 transition-colors hover:bg-accent/40"
                                            }
                                        };

                                        view! {
                                            <div
                                                class=row_class
                                                on:click=move |_| selected_id.set(Some(id_for_select.clone()))
                                            >
                                                <div class="flex items-center justify-between gap-2">
                                                    <div class="flex min-w-0 items-center gap-2">
                                                        <span class="shrink-0 text-xs text-muted-foreground">
                                                            {format!("{}.", index + 1)}
                                                        </span>
                                                        <span class="truncate text-sm">
                                                            {field.label.clone()}
                                                            {field.required.then(|| view! {
                                                                <span class="text-destructive">" *"</span>
                                                            })}
                                                        </span>
                                                        <Badge class="shrink-0 bg-muted text-muted-foreground">
                                                            {field_type_label(&field.field_type)}
                                                        </Badge>
                                                    </div>

                                                    <div class="hidden shrink-0 items-center gap-1 group-hover:flex">
                                                        <Button
                                                            variant=ButtonVariant::Ghost
                                                            size=ButtonSize::Icon
                                                            class="h-7 w-7"
                                                            attr:title="Move up"
                                                            attr:disabled=index == 0
                                                            on:click=move |ev: web_sys::MouseEvent| {
                                                                ev.stop_propagation();
                                                                move_field_up.run((id_for_up.clone(), -1));
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
                                                                <path d="m18 15-6-6-6 6" />
                                                            </svg>
                                                        </Button>
                                                        <Button
                                                            variant=ButtonVariant::Ghost
                                                            size=ButtonSize::Icon
                                                            class="h-7 w-7"
                                                            attr:title="Move down"
                                                            attr:disabled=index == last
                                                            on:click=move |ev: web_sys::MouseEvent| {
                                                                ev.stop_propagation();
                                                                move_field_down.run((id_for_down.clone(), 1));
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
                                                                <path d="m6 9 6 6 6-6" />
                                                            </svg>
                                                        </Button>
                                                        <Button
                                                            variant=ButtonVariant::Ghost
                                                            size=ButtonSize::Icon
                                                            class="h-7 w-7"
                                                            attr:title="Duplicate"
                                                            on:click=move |ev: web_sys::MouseEvent| {
                                                                ev.stop_propagation();
                                                                duplicate_field.run(id_for_dup.clone());
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
                                                                <rect width="14" height="14" x="8" y="8" rx="2" />
                                                                <path d="M4 16c-1.1 0-2-.9-2-2V4c0-1.1.9-2 2-2h10c1.1 0 2 .9 2 2" />
                                                            </svg>
                                                        </Button>
                                                        <Button
                                                            variant=ButtonVariant::Ghost
                                                            size=ButtonSize::Icon
                                                            class="h-7 w-7 text-destructive"
                                                            attr:title="Delete"
                                                            on:click=move |ev: web_sys::MouseEvent| {
                                                                ev.stop_propagation();
                                                                remove_field.run(id_for_remove.clone());
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

                                                {(!field.help_text.is_empty()).then(|| view! {
                                                    <div class="pt-1 text-xs text-muted-foreground">
                                                        {field.help_text.clone()}
                                                    </div>
                                                })}
                                            </div>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </Show>
                    </div>

                    // Settings panel for the selected question
                    <div>
                        {move || {
                            let selection = selected_id
                                .get()
                                .and_then(|id| {
                                    fields.with_untracked(|fs| fs.iter().find(|f| f.id == id).cloned())
                                });
                            match selection {
                                Some(field) => {
                                    view! {
                                        <FieldSettings
                                            field=field
                                            fields=fields
                                            on_committed=on_field_committed
                                        />
                                    }
                                        .into_any()
                                }
                                None => {
                                    view! {
                                        <div class="rounded-lg border border-border px-4 py-8 text-center text-xs text-muted-foreground">
                                            "Select a question to edit it."
                                        </div>
                                    }
                                        .into_any()
                                }
                            }
                        }}
                    </div>
                </div>
            </Show>
        </div>
    }
}

/// Edit panel for one question. Holds its own edit buffers so typing
/// here never re-renders itself; the working list is patched on every
/// change instead.
#[component]
pub fn FieldSettings(
    field: FormField,
    fields: RwSignal<Vec<FormField>>,
    #[prop(into)] on_committed: Callback<FormField>,
) -> impl IntoView {
    let field_id = StoredValue::new(field.id.clone());
    let is_choice = field.field_type.is_choice();
    let type_label = field_type_label(&field.field_type);

    let label = RwSignal::new(field.label.clone());
    let help = RwSignal::new(field.help_text.clone());
    let required = RwSignal::new(field.required);

    // Bumped on option add/remove; option text edits deliberately do
    // not re-render the rows (the inputs hold their own DOM state).
    let options_gen: RwSignal<u32> = RwSignal::new(0);

    let current = move || {
        field_id.with_value(|id| fields.with_untracked(|fs| fs.iter().find(|f| &f.id == id).cloned()))
    };

    Effect::new(move |_| {
        let v = label.get();
        field_id.with_value(|id| {
            fields.update(|fs| {
                if let Some(f) = fs.iter_mut().find(|f| &f.id == id) {
                    f.label = v.clone();
                }
            });
        });
    });

    Effect::new(move |_| {
        let v = help.get();
        field_id.with_value(|id| {
            fields.update(|fs| {
                if let Some(f) = fs.iter_mut().find(|f| &f.id == id) {
                    f.help_text = v.clone();
                }
            });
        });
    });

    let on_required = move |ev: web_sys::Event| {
        let checked = checkbox_checked(&ev);
        required.set(checked);
        field_id.with_value(|id| {
            fields.update(|fs| {
                if let Some(f) = fs.iter_mut().find(|f| &f.id == id) {
                    f.required = checked;
                }
            });
        });
        if let Some(f) = current() {
            on_committed.run(f);
        }
    };

    let add_option = move |_| {
        field_id.with_value(|id| {
            fields.update(|fs| {
                if let Some(f) = fs.iter_mut().find(|f| &f.id == id) {
                    let text = format!("Option {}", f.options.len() + 1);
                    f.options.push(FieldOption::new(&text));
                }
            });
        });
        options_gen.update(|g| *g += 1);
        if let Some(f) = current() {
            on_committed.run(f);
        }
    };

    let remove_option = move |index: usize| {
        field_id.with_value(|id| {
            fields.update(|fs| {
                if let Some(f) = fs.iter_mut().find(|f| &f.id == id) {
                    if index < f.options.len() {
                        f.options.remove(index);
                    }
                }
            });
        });
        options_gen.update(|g| *g += 1);
        if let Some(f) = current() {
            on_committed.run(f);
        }
    };

    view! {
        <div class="space-y-3 rounded-lg border border-border bg-background p-4">
            <div class="flex items-center justify-between">
                <div class="text-xs font-medium text-muted-foreground">"Question settings"</div>
                <Badge class="bg-muted text-muted-foreground">{type_label}</Badge>
            </div>

            <div class="flex flex-col gap-1.5">
                <Label class="text-xs">"Label"</Label>
                <Input bind_value=label class="h-8 text-sm" />
            </div>

            <div class="flex flex-col gap-1.5">
                <Label class="text-xs">"Help text (optional)"</Label>
                <Input bind_value=help placeholder="Shown under the question" class="h-8 text-sm" />
            </div>

            <label class="flex cursor-pointer items-center gap-2 text-sm">
                <input
                    type="checkbox"
                    class="size-4 accent-primary"
                    prop:checked=move || required.get()
                    on:change=on_required
                />
                "Required"
            </label>

            <Show when=move || is_choice fallback=|| ().into_view()>
                <div class="space-y-2 border-t border-border pt-3">
                    <div class="text-xs font-medium text-muted-foreground">"Options"</div>

                    <div class="space-y-1.5">
                        {move || {
                            options_gen.get();
                            let snapshot: Vec<(usize, String)> = current()
                                .map(|f| {
                                    f.options
                                        .iter()
                                        .enumerate()
                                        .map(|(i, o)| (i, o.label.clone()))
                                        .collect()
                                })
                                .unwrap_or_default();

                            snapshot
                                .into_iter()
                                .map(|(index, text)| {
                                    let remove_option = remove_option.clone();
                                    view! {
                                        <div class="flex items-center gap-1.5">
                                            <input
                                                class="h-8 w-full rounded-md border border-input bg-transparent px-2 text-sm outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                                                prop:value=text
                                                on:input=move |ev: web_sys::Event| {
                                                    let v = event_target_value(&ev);
                                                    field_id.with_value(|id| {
                                                        fields.update(|fs| {
                                                            if let Some(f) = fs.iter_mut().find(|f| &f.id == id) {
                                                                if let Some(opt) = f.options.get_mut(index) {
                                                                    *opt = FieldOption::new(&v);
                                                                }
                                                            }
                                                        });
                                                    });
                                                }
                                            />
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Icon
                                                class="h-7 w-7 text-muted-foreground"
                                                attr:title="Remove option"
                                                on:click=move |_| remove_option(index)
                                            >
                                                <svg
                                                    xmlns="http://www.w3.org/2000/svg"
                                                    width="14"
                                                    height="14"
                                                    viewBox="0 0 24 24"
                                                    fill="none"
                                                    stroke="currentColor"
                                                    stroke-width="2"
                                                    stroke-linecap="round"
                                                    stroke-linejoin="round"
                                                    aria-hidden="true"
                                                >
                                                    <path d="M18 6 6 18" />
                                                    <path d="m6 6 12 12" />
                                                </svg>
                                            </Button>
                                        </div>
                                    }
                                })
                                .collect_view()
                        }}
                    </div>

                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        class="h-7 w-full text-xs"
                        on:click=add_option
                    >
                        "Add option"
                    </Button>
                </div>
            </Show>
        </div>
    }
}

#[component]
pub fn FormEditPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let forms_store = expect_context::<FormStore>();
    let params = use_params::<FormRouteParams>();

    let route_id = move || params.get().ok().and_then(|p| p.form_id).unwrap_or_default();
    let route_id_untracked =
        move || params.get_untracked().ok().and_then(|p| p.form_id).unwrap_or_default();

    let forms_error = app_state.0.forms_error;
    let current_form = app_state.0.current_form;

    let title: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let is_published: RwSignal<bool> = RwSignal::new(false);

    let loading: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let success: RwSignal<Option<String>> = RwSignal::new(None);

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
                if let Ok(form) = store.fetch_form_by_id(&id).await {
                    title.set(form.title.clone());
                    description.set(form.description.clone());
                    is_published.set(form.is_published);
                }
                loading.set(false);
            });
        });
    }

    // Metadata-only save. The loaded fields ride along unchanged so the
    // backend never sees (and echoes back) an empty question list.
    let on_save = {
        let store = forms_store.clone();
        move |_| {
            let id = route_id_untracked();
            if id.is_empty() {
                return;
            }
            let store = store.clone();
            let t = title.get_untracked();
            let d = description.get_untracked();
            let published = is_published.get_untracked();
            let fs = current_form.get_untracked().map(|f| f.fields).unwrap_or_default();

            saving.set(true);
            success.set(None);
            spawn_local(async move {
                if store.update_form(&id, &t, &d, published, &fs).await.is_ok() {
                    success.set(Some("Form updated".to_string()));
                }
                saving.set(false);
            });
        }
    };

    fn _assert_clone<T: Clone>(_: &T) {}
    _assert_clone(&on_save);

    view! {
        <div class="mx-auto max-w-xl space-y-4">
            <div class="flex items-center justify-between">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">"Form settings"</h1>
                    <p class="text-xs text-muted-foreground">"Title, description and visibility."</p>
                </div>
                <a
                    href=move || format!("/forms/builder/{}", route_id())
                    class="text-xs text-muted-foreground hover:text-foreground"
                >
                    "Open builder"
                </a>
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
            <Show when=move || success.get().is_some() fallback=|| ().into_view()>
                {move || {
                    success.get().map(|m| {
                        view! {
                            <Alert class="border-success/30">
                                <AlertDescription class="text-success text-xs">{m}</AlertDescription>
                            </Alert>
                        }
                    })
                }}
            </Show>

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
                <Card>
                    <CardContent class="space-y-3 px-4">
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="edit-title" class="text-xs">"Title"</Label>
                            <Input id="edit-title" bind_value=title class="h-8 text-sm" />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="edit-description" class="text-xs">"Description"</Label>
                            <Textarea
                                id="edit-description"
                                bind_value=description
                                rows=3
                                placeholder="Shown to respondents before the first question"
                                class="text-sm"
                            />
                        </div>

                        <label class="flex cursor-pointer items-center gap-2 text-sm">
                            <input
                                type="checkbox"
                                class="size-4 accent-primary"
                                prop:checked=move || is_published.get()
                                on:change=move |ev: web_sys::Event| {
                                    is_published.set(checkbox_checked(&ev));
                                }
                            />
                            "Published (accepting responses)"
                        </label>

                        <div class="flex items-center justify-end gap-2 pt-1">
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || saving.get()
                                on:click={
                                    let on_save = on_save.clone();
                                    move |ev: web_sys::MouseEvent| on_save(ev)
                                }
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || saving.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if saving.get() { "Saving..." } else { "Save changes" }}
                                </span>
                            </Button>
                        </div>
                    </CardContent>
                </Card>
            </Show>
        </div>
    }
}
