use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, Card, CardContent, Input, ProgressBar, Select,
    Spinner, Textarea,
};
use crate::models::{FieldType, Question};
use crate::pages::{checkbox_checked, html_input_type, FormRouteParams};
use crate::state::ResponseFlow;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use wasm_bindgen::JsCast;

/// Public respondent page: one question on screen at a time, answers
/// submitted as the respondent moves forward.
#[component]
pub fn FormFillPage() -> impl IntoView {
    let flow = expect_context::<ResponseFlow>();
    let params = use_params::<FormRouteParams>();

    let route_id = move || params.get().ok().and_then(|p| p.form_id).unwrap_or_default();
    let route_id_untracked =
        move || params.get_untracked().ok().and_then(|p| p.form_id).unwrap_or_default();

    let machine = flow.machine;
    let is_loading = flow.is_loading;
    let is_submitting = flow.is_submitting;
    let flow_error = flow.error;

    // Per-question answer buffers. `text_value` covers every single
    // valued widget (typed inputs, paragraph, radio, dropdown). The
    // picked file stays in the DOM input; only its name is mirrored
    // here for display.
    let text_value: RwSignal<String> = RwSignal::new(String::new());
    let multi_values: RwSignal<Vec<String>> = RwSignal::new(vec![]);
    let rating_value: RwSignal<Option<u8>> = RwSignal::new(None);
    let selected_file_name: RwSignal<Option<String>> = RwSignal::new(None);
    let validation: RwSignal<Option<String>> = RwSignal::new(None);
    let file_ref: NodeRef<html::Input> = NodeRef::new();

    let started_for: RwSignal<Option<String>> = RwSignal::new(None);
    {
        let flow = flow.clone();
        Effect::new(move |_| {
            let id = route_id();
            if id.is_empty() || started_for.get_untracked().as_deref() == Some(id.as_str()) {
                return;
            }
            started_for.set(Some(id.clone()));

            let flow = flow.clone();
            flow.reset();
            spawn_local(async move {
                let _ = flow.start(&id).await;
            });
        });
    }

    // Reload the buffers whenever the question on screen changes,
    // restoring any earlier answer for it.
    let prefill_for: RwSignal<Option<String>> = RwSignal::new(None);
    Effect::new(move |_| {
        let Some((qid, field_type, prior)) = machine.with(|m| {
            m.current_question
                .as_ref()
                .map(|q| (q.id.clone(), q.field_type.clone(), m.answer_for(&q.id).cloned()))
        }) else {
            return;
        };
        if prefill_for.get_untracked().as_deref() == Some(qid.as_str()) {
            return;
        }
        prefill_for.set(Some(qid));

        validation.set(None);
        selected_file_name.set(None);
        match field_type {
            FieldType::Checkboxes => {
                let values = prior
                    .and_then(|a| {
                        a.value.as_array().map(|xs| {
                            xs.iter()
                                .filter_map(|v| v.as_str().map(str::to_string))
                                .collect::<Vec<_>>()
                        })
                    })
                    .unwrap_or_default();
                multi_values.set(values);
            }
            FieldType::Rating => {
                rating_value.set(prior.and_then(|a| a.value.as_u64()).map(|n| n as u8));
            }
            FieldType::File => {
                text_value.set(String::new());
            }
            _ => {
                let text = prior
                    .map(|a| a.value.as_str().unwrap_or_default().to_string())
                    .unwrap_or_default();
                text_value.set(text);
            }
        }
    });

    let do_submit = {
        let flow = flow.clone();
        move || {
            let question = machine.with_untracked(|m| m.current_question.clone());
            let Some(question) = question else {
                return;
            };

            let value: serde_json::Value;
            let mut file: Option<web_sys::File> = None;
            match question.field_type {
                FieldType::Checkboxes => {
                    let values = multi_values.get_untracked();
                    if question.is_required && values.is_empty() {
                        validation.set(Some("This question requires an answer".to_string()));
                        return;
                    }
                    value = serde_json::Value::Array(
                        values.into_iter().map(serde_json::Value::String).collect(),
                    );
                }
                FieldType::Rating => match rating_value.get_untracked() {
                    Some(n) => value = serde_json::json!(n),
                    None => {
                        if question.is_required {
                            validation.set(Some("This question requires an answer".to_string()));
                            return;
                        }
                        value = serde_json::Value::Null;
                    }
                },
                FieldType::File => {
                    file = file_ref
                        .get_untracked()
                        .and_then(|input| input.files())
                        .and_then(|files| files.get(0));
                    if question.is_required && file.is_none() {
                        validation.set(Some("This question requires an answer".to_string()));
                        return;
                    }
                    value = serde_json::Value::String(
                        file.as_ref().map(|f| f.name()).unwrap_or_default(),
                    );
                }
                _ => {
                    let text = text_value.get_untracked();
                    if question.is_required && text.trim().is_empty() {
                        validation.set(Some("This question requires an answer".to_string()));
                        return;
                    }
                    value = serde_json::Value::String(text);
                }
            }

            validation.set(None);
            let flow = flow.clone();
            spawn_local(async move {
                let file_url = match file {
                    Some(f) => match flow.upload_file(&f).await {
                        Ok(url) => Some(url),
                        Err(_) => return,
                    },
                    None => None,
                };
                let _ = flow.submit_answer(value, file_url).await;
            });
        }
    };

    let on_submit = Callback::new(move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        do_submit();
    });

    let restart = {
        let flow = flow.clone();
        Callback::new(move |_: web_sys::MouseEvent| {
            let id = route_id_untracked();
            if id.is_empty() {
                return;
            }
            let flow = flow.clone();
            flow.reset();
            prefill_for.set(None);
            spawn_local(async move {
                let _ = flow.start(&id).await;
            });
        })
    };

    let form_title = move || machine.with(|m| m.form.as_ref().map(|f| f.title.clone()).unwrap_or_default());
    let form_description =
        move || machine.with(|m| m.form.as_ref().map(|f| f.description.clone()).unwrap_or_default());
    let progress = Signal::derive(move || machine.with(|m| m.progress));
    let completed = move || machine.with(|m| m.completed);
    let active = move || machine.with(|m| m.is_active());
    let loaded = move || machine.with(|m| m.form.is_some());

    view! {
        <div class="flex min-h-screen flex-col bg-muted/30">
            <main class="mx-auto flex w-full max-w-lg flex-1 flex-col justify-center px-4 py-10">
                <Show
                    when=move || !is_loading.get()
                    fallback=|| {
                        view! {
                            <div class="flex items-center justify-center py-16">
                                <Spinner class="text-muted-foreground" />
                            </div>
                        }
                    }
                >
                    {move || {
                        if completed() {
                            let restart = restart.clone();
                            return view! {
                                <Card>
                                    <CardContent class="space-y-4 px-6 py-10 text-center">
                                        <div class="text-3xl">"🎉"</div>
                                        <h1 class="text-lg font-semibold">"Thank you!"</h1>
                                        <p class="text-sm text-muted-foreground">
                                            "Your response has been recorded."
                                        </p>
                                        <Button
                                            size=ButtonSize::Sm
                                            on:click=move |ev| restart.run(ev)
                                        >
                                            "Submit another response"
                                        </Button>
                                    </CardContent>
                                </Card>
                            }
                                .into_any();
                        }

                        if active() {
                            return view! {
                                <div class="space-y-4">
                                    <div class="space-y-1 text-center">
                                        <h1 class="text-lg font-semibold">{form_title()}</h1>
                                        {(!form_description().is_empty()).then(|| view! {
                                            <p class="text-sm text-muted-foreground">{form_description()}</p>
                                        })}
                                    </div>

                                    <div class="flex items-center gap-3">
                                        <ProgressBar value=progress class="h-1.5" />
                                        <span class="shrink-0 text-xs tabular-nums text-muted-foreground">
                                            {move || format!("{:.0}%", progress.get())}
                                        </span>
                                    </div>

                                    <Show when=move || flow_error.get().is_some() fallback=|| ().into_view()>
                                        {move || {
                                            flow_error.get().map(|e| {
                                                view! {
                                                    <Alert class="border-destructive/30">
                                                        <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                                    </Alert>
                                                }
                                            })
                                        }}
                                    </Show>

                                    {move || {
                                        machine
                                            .with(|m| m.current_question.clone())
                                            .map(|q| {
                                                view! {
                                                    <QuestionCard
                                                        question=q
                                                        text_value=text_value
                                                        multi_values=multi_values
                                                        rating_value=rating_value
                                                        selected_file_name=selected_file_name
                                                        file_ref=file_ref
                                                        validation=validation
                                                        is_submitting=is_submitting
                                                        on_submit=on_submit
                                                    />
                                                }
                                            })
                                    }}
                                </div>
                            }
                                .into_any();
                        }

                        if loaded() {
                            // Started fine but the form has no questions.
                            return view! {
                                <Card>
                                    <CardContent class="py-10 text-center text-sm text-muted-foreground">
                                        "This form has no questions yet."
                                    </CardContent>
                                </Card>
                            }
                                .into_any();
                        }

                        view! {
                            <Card>
                                <CardContent class="space-y-3 py-10 text-center">
                                    <p class="text-sm font-medium">"This form is not available."</p>
                                    {move || {
                                        flow_error.get().map(|e| {
                                            view! { <p class="text-xs text-muted-foreground">{e}</p> }
                                        })
                                    }}
                                </CardContent>
                            </Card>
                        }
                            .into_any()
                    }}
                </Show>
            </main>

            <footer class="pb-6 text-center text-xs text-muted-foreground">
                "Powered by " <a href="/" class="font-medium hover:text-foreground">"Triddle"</a>
            </footer>
        </div>
    }
}

#[component]
fn QuestionCard(
    question: Question,
    text_value: RwSignal<String>,
    multi_values: RwSignal<Vec<String>>,
    rating_value: RwSignal<Option<u8>>,
    selected_file_name: RwSignal<Option<String>>,
    file_ref: NodeRef<html::Input>,
    validation: RwSignal<Option<String>>,
    is_submitting: RwSignal<bool>,
    #[prop(into)] on_submit: Callback<web_sys::SubmitEvent>,
) -> impl IntoView {
    let is_last = question.is_last;

    let widget = match &question.field_type {
        FieldType::Paragraph => view! {
            <Textarea bind_value=text_value rows=4 placeholder="Type your answer here..." autofocus=true />
        }
        .into_any(),
        FieldType::MultipleChoice => question
            .options
            .iter()
            .map(|o| {
                let value = o.value.clone();
                let checked_value = value.clone();
                view! {
                    <label class="flex cursor-pointer items-center gap-2 rounded-md border border-border px-3 py-2 text-sm transition-colors hover:bg-accent/40 has-checked:border-primary">
                        <input
                            type="radio"
                            name="answer"
                            class="size-4 accent-primary"
                            prop:checked=move || text_value.get() == checked_value
                            on:change=move |_| text_value.set(value.clone())
                        />
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
                let value = o.value.clone();
                let checked_value = value.clone();
                view! {
                    <label class="flex cursor-pointer items-center gap-2 rounded-md border border-border px-3 py-2 text-sm transition-colors hover:bg-accent/40 has-checked:border-primary">
                        <input
                            type="checkbox"
                            class="size-4 accent-primary"
                            prop:checked=move || multi_values.get().contains(&checked_value)
                            on:change=move |ev: web_sys::Event| {
                                let checked = checkbox_checked(&ev);
                                let value = value.clone();
                                multi_values.update(|vs| {
                                    if checked {
                                        if !vs.contains(&value) {
                                            vs.push(value);
                                        }
                                    } else {
                                        vs.retain(|v| v != &value);
                                    }
                                });
                            }
                        />
                        {o.label.clone()}
                    </label>
                }
            })
            .collect_view()
            .into_any(),
        FieldType::Dropdown => {
            let options: Vec<(String, String)> = question
                .options
                .iter()
                .map(|o| (o.value.clone(), o.label.clone()))
                .collect();
            view! {
                <Select options=options placeholder="Select an option" bind_value=text_value />
            }
            .into_any()
        }
        FieldType::Rating => (1..=5u8)
            .map(|n| {
                view! {
                    <button
                        type="button"
                        class=move || {
                            if rating_value.get() == Some(n) {
                                "inline-flex size-10 items-center justify-center rounded-md border border-primary bg-primary text-sm font-medium text-primary-foreground"
                            } else {
                                "inline-flex size-10 items-center justify-center rounded-md border border-border text-sm transition-colors hover:bg-accent"
                            }
                        }
                        on:click=move |_| rating_value.set(Some(n))
                    >
                        {n.to_string()}
                    </button>
                }
            })
            .collect_view()
            .into_any(),
        FieldType::File => view! {
            <label class="flex cursor-pointer flex-col items-center gap-1 rounded-md border border-dashed border-border px-3 py-6 text-center text-xs text-muted-foreground transition-colors hover:bg-accent/40">
                <input
                    type="file"
                    class="hidden"
                    node_ref=file_ref
                    on:change=move |ev: web_sys::Event| {
                        let name = ev
                            .target()
                            .and_then(|t| t.dyn_ref::<web_sys::HtmlInputElement>().cloned())
                            .and_then(|i| i.files())
                            .and_then(|fs| fs.get(0))
                            .map(|f| f.name());
                        selected_file_name.set(name);
                    }
                />
                <span class="font-medium text-foreground">"Choose a file"</span>
                {move || {
                    selected_file_name.get().unwrap_or_else(|| "No file chosen".to_string())
                }}
            </label>
        }
        .into_any(),
        other => view! {
            <Input
                bind_value=text_value
                r#type=html_input_type(other)
                placeholder="Type your answer here..."
                autofocus=true
            />
        }
        .into_any(),
    };

    let widget_wrap = if question.field_type == FieldType::Rating {
        "flex items-center gap-2"
    } else {
        "space-y-2"
    };

    view! {
        <Card>
            <CardContent class="px-6 py-6">
                <form class="space-y-4" on:submit=move |ev| on_submit.run(ev)>
                    <div class="space-y-1">
                        <h2 class="text-base font-medium">
                            {question.title.clone()}
                            {question.is_required.then(|| view! { <span class="text-destructive">" *"</span> })}
                        </h2>
                        {(!question.description.is_empty()).then(|| view! {
                            <p class="text-xs text-muted-foreground">{question.description.clone()}</p>
                        })}
                    </div>

                    <div class=widget_wrap>{widget}</div>

                    <Show when=move || validation.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            validation.get().map(|msg| {
                                view! { <p class="text-xs text-destructive">{msg}</p> }
                            })
                        }}
                    </Show>

                    <div class="flex justify-end">
                        <Button
                            size=ButtonSize::Sm
                            attr:disabled=move || is_submitting.get()
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || is_submitting.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {if is_last { "Submit" } else { "Continue" }}
                            </span>
                        </Button>
                    </div>
                </form>
            </CardContent>
        </Card>
    }
}
