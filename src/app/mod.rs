use crate::pages::{
    DashboardPage, FormAnalyticsPage, FormBuilderPage, FormEditPage, FormFillPage, FormViewPage,
    FormsPage, LandingPage, LoginPage, RegisterPage, RootAuthed, SettingsPage,
};
use crate::state::{AppContext, AppState, AuthStore, FormStore, ResponseFlow};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext(AppState::new());
    provide_context(ctx.clone());
    provide_context(AuthStore::new(ctx.clone()));
    provide_context(FormStore::new(ctx.clone()));
    provide_context(ResponseFlow::new(ctx));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    // - the fill route is public; everything form-related behind it is
    //   wrapped in RootAuthed.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("register") view=RegisterPage />
                <Route path=path!("dashboard") view=move || view! {
                    <RootAuthed>
                        <DashboardPage />
                    </RootAuthed>
                } />
                <Route path=path!("forms") view=move || view! {
                    <RootAuthed>
                        <FormsPage />
                    </RootAuthed>
                } />
                <Route path=path!("forms/builder/:form_id") view=move || view! {
                    <RootAuthed>
                        <FormBuilderPage />
                    </RootAuthed>
                } />
                <Route path=path!("forms/:form_id/edit") view=move || view! {
                    <RootAuthed>
                        <FormEditPage />
                    </RootAuthed>
                } />
                <Route path=path!("forms/:form_id/view") view=move || view! {
                    <RootAuthed>
                        <FormViewPage />
                    </RootAuthed>
                } />
                <Route path=path!("forms/:form_id/analytics") view=move || view! {
                    <RootAuthed>
                        <FormAnalyticsPage />
                    </RootAuthed>
                } />
                <Route path=path!("forms/:form_id/fill") view=FormFillPage />
                <Route path=path!("settings") view=move || view! {
                    <RootAuthed>
                        <SettingsPage />
                    </RootAuthed>
                } />
                <Route path=path!("") view=LandingPage />
            </Routes>
        </Router>
    }
}
