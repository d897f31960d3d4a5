mod analytics;
mod auth;
mod builder;
mod dashboard;
mod fill;
mod forms;
mod preview;
mod settings;

pub(crate) use analytics::FormAnalyticsPage;
pub(crate) use auth::{LoginPage, RegisterPage};
pub(crate) use builder::{FormBuilderPage, FormEditPage};
pub(crate) use dashboard::DashboardPage;
pub(crate) use fill::FormFillPage;
pub(crate) use forms::FormsPage;
pub(crate) use preview::FormViewPage;
pub(crate) use settings::SettingsPage;

use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::models::FieldType;
use crate::state::{AppContext, AuthStore};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_location;
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone, Debug)]
pub(crate) struct FormRouteParams {
    pub form_id: Option<String>,
}

/// Checked state of the checkbox that fired `ev`.
pub(crate) fn checkbox_checked(ev: &web_sys::Event) -> bool {
    use wasm_bindgen::JsCast;
    ev.target()
        .and_then(|t| t.dyn_ref::<web_sys::HtmlInputElement>().map(|i| i.checked()))
        .unwrap_or(false)
}

/// `<input type>` attribute for a field type. Types without a native
/// input element (choices, rating, file, matrix) are handled by their
/// own widgets and never reach this mapping in practice; they degrade
/// to plain text.
pub(crate) fn html_input_type(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Email => "email",
        FieldType::Phone => "tel",
        FieldType::Url => "url",
        FieldType::Number => "number",
        FieldType::Date => "date",
        FieldType::Time => "time",
        _ => "text",
    }
}

/// Human palette label for a field type.
pub(crate) fn field_type_label(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Text => "Short text".to_string(),
        FieldType::Paragraph => "Paragraph".to_string(),
        FieldType::MultipleChoice => "Multiple choice".to_string(),
        FieldType::Checkboxes => "Checkboxes".to_string(),
        FieldType::Dropdown => "Dropdown".to_string(),
        FieldType::Date => "Date".to_string(),
        FieldType::Time => "Time".to_string(),
        FieldType::Rating => "Rating".to_string(),
        FieldType::File => "File upload".to_string(),
        FieldType::Number => "Number".to_string(),
        FieldType::Email => "Email".to_string(),
        FieldType::Phone => "Phone".to_string(),
        FieldType::Url => "Link".to_string(),
        FieldType::Matrix => "Matrix".to_string(),
        FieldType::Other(name) => name.clone(),
    }
}

/// Date part of an ISO timestamp, for list rows.
pub(crate) fn short_date(iso: &str) -> String {
    iso.split('T').next().unwrap_or_default().to_string()
}

/// Absolute respondent link for a form.
pub(crate) fn fill_url(form_id: &str) -> String {
    let origin = window().location().origin().unwrap_or_default();
    format!("{origin}/forms/{form_id}/fill")
}

/// Fire-and-forget clipboard write.
pub(crate) fn copy_to_clipboard(text: &str) {
    let _ = window().navigator().clipboard().write_text(text);
}

#[component]
pub fn NavLink(#[prop(into)] href: String, #[prop(into)] label: String) -> impl IntoView {
    let location = use_location();
    let href_for_class = href.clone();
    let class = move || {
        if location.pathname.get().starts_with(&href_for_class) {
            "rounded-md bg-accent px-3 py-1.5 text-sm font-medium text-accent-foreground"
        } else {
            "rounded-md px-3 py-1.5 text-sm text-muted-foreground transition-colors hover:bg-accent hover:text-accent-foreground"
        }
    };

    view! {
        <a href=href class=class>
            {label}
        </a>
    }
}

#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = expect_context::<AuthStore>();

    let current_user = app_state.0.current_user;
    let user_name = move || current_user.get().map(|u| u.name).unwrap_or_default();

    let on_logout = move |_| {
        auth.logout();
        let _ = window().location().set_href("/login");
    };

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <header class="border-b border-border bg-background">
                <div class="mx-auto flex h-14 w-full max-w-5xl items-center justify-between px-4">
                    <div class="flex items-center gap-6">
                        <a href="/dashboard" class="text-sm font-semibold">"Triddle"</a>

                        <nav class="flex items-center gap-1">
                            <NavLink href="/dashboard" label="Dashboard" />
                            <NavLink href="/forms" label="My Forms" />
                            <NavLink href="/settings" label="Settings" />
                        </nav>
                    </div>

                    <div class="flex items-center gap-3">
                        <span class="hidden text-xs text-muted-foreground sm:inline">{user_name}</span>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=on_logout
                        >
                            "Sign out"
                        </Button>
                    </div>
                </div>
            </header>

            <main class="mx-auto w-full max-w-5xl px-4 py-6">
                {children()}
            </main>
        </div>
    }
}

#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = expect_context::<AuthStore>();
    let current_user = app_state.0.current_user;

    let checked: RwSignal<bool> = RwSignal::new(false);

    // Validate the stored token exactly once per mount; everything the
    // protected pages need (current_user) is re-derived here.
    Effect::new(move |_| {
        if checked.get_untracked() {
            return;
        }
        let auth = auth.clone();
        spawn_local(async move {
            let ok = auth.check_auth().await;
            checked.set(true);
            if !ok {
                let _ = window().location().set_href("/login");
            }
        });
    });

    let ready = move || checked.get() && current_user.get().is_some();

    // Stored so the loading fallback can swap back to the children
    // without consuming them.
    let children = StoredValue::new(children);

    view! {
        <Show
            when=ready
            fallback=|| {
                view! {
                    <div class="flex min-h-screen items-center justify-center bg-background">
                        <Spinner class="size-6 text-muted-foreground" />
                    </div>
                }
            }
        >
            <AppLayout>{move || children.with_value(|c| c())}</AppLayout>
        </Show>
    }
}

#[component]
pub fn LandingPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <header class="border-b border-border">
                <div class="mx-auto flex h-14 w-full max-w-5xl items-center justify-between px-4">
                    <a href="/" class="text-sm font-semibold">"Triddle"</a>
                    <div class="flex items-center gap-2">
                        <Show
                            when=is_authenticated
                            fallback=|| {
                                view! {
                                    <a
                                        href="/login"
                                        class="rounded-md px-3 py-1.5 text-sm text-muted-foreground hover:text-foreground"
                                    >
                                        "Log in"
                                    </a>
                                    <a
                                        href="/register"
                                        class="inline-flex h-8 items-center justify-center rounded-md bg-primary px-3 text-sm font-medium text-primary-foreground shadow-xs hover:bg-primary/90"
                                    >
                                        "Get started"
                                    </a>
                                }
                            }
                        >
                            <a
                                href="/dashboard"
                                class="inline-flex h-8 items-center justify-center rounded-md bg-primary px-3 text-sm font-medium text-primary-foreground shadow-xs hover:bg-primary/90"
                            >
                                "Go to dashboard"
                            </a>
                        </Show>
                    </div>
                </div>
            </header>

            <main class="mx-auto w-full max-w-5xl px-4">
                <section class="flex flex-col items-center gap-4 py-24 text-center">
                    <h1 class="max-w-2xl text-4xl font-semibold tracking-tight">
                        "Forms people actually finish"
                    </h1>
                    <p class="max-w-xl text-sm text-muted-foreground">
                        "Build a form in minutes, share one link, and ask a single question at a time. Respondents see their progress, you see where they stop."
                    </p>
                    <div class="flex items-center gap-2 pt-2">
                        <a
                            href="/register"
                            class="inline-flex h-9 items-center justify-center rounded-md bg-primary px-4 text-sm font-medium text-primary-foreground shadow-xs hover:bg-primary/90"
                        >
                            "Create your first form"
                        </a>
                        <a
                            href="/login"
                            class="inline-flex h-9 items-center justify-center rounded-md border bg-border/30 px-4 text-sm font-medium shadow-xs hover:bg-border/50"
                        >
                            "Log in"
                        </a>
                    </div>
                </section>

                <section class="grid gap-4 pb-24 sm:grid-cols-3">
                    <div class="rounded-lg border border-border p-4">
                        <div class="text-sm font-medium">"One question at a time"</div>
                        <div class="pt-1 text-xs text-muted-foreground">
                            "Respondents answer step by step with a progress bar, not a wall of inputs."
                        </div>
                    </div>
                    <div class="rounded-lg border border-border p-4">
                        <div class="text-sm font-medium">"Fourteen field types"</div>
                        <div class="pt-1 text-xs text-muted-foreground">
                            "Text, choices, ratings, dates, file uploads and more, reorderable at any time."
                        </div>
                    </div>
                    <div class="rounded-lg border border-border p-4">
                        <div class="text-sm font-medium">"Built-in analytics"</div>
                        <div class="pt-1 text-xs text-muted-foreground">
                            "Visits, responses, completion rate and per-question drop-off for every form."
                        </div>
                    </div>
                </section>
            </main>
        </div>
    }
}
