use crate::api::{ApiClient, ApiError, ApiErrorKind};
use crate::models::{Form, Question, User};
use leptos::prelude::*;

pub(crate) mod auth;
pub(crate) mod forms;
pub(crate) mod response;

pub(crate) use auth::AuthStore;
pub(crate) use forms::FormStore;
pub(crate) use response::ResponseFlow;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Re-derived via check_auth on reload; only the token persists.
    pub current_user: RwSignal<Option<User>>,
    pub auth_loading: RwSignal<bool>,
    pub auth_error: RwSignal<Option<String>>,

    pub forms: RwSignal<Vec<Form>>,
    pub current_form: RwSignal<Option<Form>>,
    pub questions: RwSignal<Vec<Question>>,
    pub forms_loading: RwSignal<bool>,
    pub forms_error: RwSignal<Option<String>>,

    /// Form load guard (ignore stale responses after route changes).
    pub form_request_id: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::load_from_storage()),
            current_user: RwSignal::new(None),
            auth_loading: RwSignal::new(false),
            auth_error: RwSignal::new(None),
            forms: RwSignal::new(vec![]),
            current_form: RwSignal::new(None),
            questions: RwSignal::new(vec![]),
            forms_loading: RwSignal::new(false),
            forms_error: RwSignal::new(None),
            form_request_id: RwSignal::new(0),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

/// Global 401 policy: clear the session and land on the login page,
/// unless the user is already on an unauthenticated route (a 401 there
/// means bad credentials, not an expired session).
pub(crate) fn handle_unauthorized(ctx: &AppContext) {
    let Some(win) = web_sys::window() else {
        return;
    };
    let path = win.location().pathname().unwrap_or_default();
    if path.contains("/login") || path.contains("/register") {
        return;
    }

    ctx.0.api_client.update(|c| c.logout());
    ctx.0.current_user.set(None);
    let _ = win.location().set_href("/login");
}

/// Shared error hook for store operations.
pub(crate) fn note_unauthorized(ctx: &AppContext, err: &ApiError) {
    if err.kind == ApiErrorKind::Unauthorized {
        handle_unauthorized(ctx);
    }
}
