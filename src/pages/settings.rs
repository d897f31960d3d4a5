use crate::api::ProfileUpdateRequest;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, Card, CardContent, CardDescription, CardHeader,
    CardTitle, Input, Label, Spinner,
};
use crate::state::{AppContext, AuthStore};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let auth = expect_context::<AuthStore>();

    let current_user = app_state.0.current_user;
    let auth_loading = app_state.0.auth_loading;
    let auth_error = app_state.0.auth_error;

    let name: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let success: RwSignal<Option<String>> = RwSignal::new(None);

    // Fill once from the signed-in user; later profile refreshes must
    // not clobber edits in progress.
    let filled: RwSignal<bool> = RwSignal::new(false);
    Effect::new(move |_| {
        if filled.get_untracked() {
            return;
        }
        if let Some(user) = current_user.get() {
            filled.set(true);
            name.set(user.name.clone());
            email.set(user.email.clone());
        }
    });

    let on_save = {
        let auth = auth.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let auth = auth.clone();
            let req = ProfileUpdateRequest {
                name: Some(name.get_untracked()),
                email: Some(email.get_untracked()),
            };
            success.set(None);
            spawn_local(async move {
                if auth.update_profile(&req).await.is_ok() {
                    success.set(Some("Profile updated".to_string()));
                }
            });
        }
    };

    view! {
        <div class="mx-auto max-w-xl space-y-4">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Settings"</h1>
                <p class="text-xs text-muted-foreground">"Your account details."</p>
            </div>

            <Show when=move || auth_error.get().is_some() fallback=|| ().into_view()>
                {move || {
                    auth_error.get().map(|e| {
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

            <Card>
                <CardHeader>
                    <CardTitle class="text-base">"Profile"</CardTitle>
                    <CardDescription>"The name shown in the app and your sign-in email."</CardDescription>
                </CardHeader>
                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_save>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="settings-name" class="text-xs">"Name"</Label>
                            <Input id="settings-name" bind_value=name required=true />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="settings-email" class="text-xs">"Email"</Label>
                            <Input
                                id="settings-email"
                                r#type="email"
                                bind_value=email
                                required=true
                            />
                        </div>
                        <div class="flex justify-end pt-1">
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || auth_loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || auth_loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if auth_loading.get() { "Saving..." } else { "Save changes" }}
                                </span>
                            </Button>
                        </div>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}
