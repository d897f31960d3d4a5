use crate::models::{
    Answer, AnswerStep, FieldOption, FieldType, Form, FormAnalytics, FormField, Question,
    QuestionOrder, ResponseFormSummary, ResponseSession, StoredResponse, UploadTarget, User,
};
use crate::storage::{clear_token_from_storage, load_token_from_storage, save_token_to_storage};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
    /// Local contract violation (e.g. submitting with no active
    /// session); never reached the network.
    Precondition,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    /// Diagnostic text (status line, transport error).
    pub message: String,
    /// `message` field of a JSON error body, when the backend sent one.
    pub server_message: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
            server_message: None,
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
            server_message: None,
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
            server_message: None,
        }
    }

    fn http(status: reqwest::StatusCode, body: String) -> Self {
        let server_message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(|s| s.to_string()))
            .filter(|m| !m.trim().is_empty());
        Self {
            kind: ApiErrorKind::Http,
            message: format!("Request failed ({status})"),
            server_message,
        }
    }

    pub(crate) fn precondition(message: &str) -> Self {
        Self {
            kind: ApiErrorKind::Precondition,
            message: message.to_string(),
            server_message: None,
        }
    }

    /// Text shown to the user: the backend's own message when it sent
    /// one, the precondition text verbatim, a fixed line when no
    /// response arrived at all, otherwise the per-operation fallback.
    pub(crate) fn user_message(&self, fallback: &str) -> String {
        match self.kind {
            ApiErrorKind::Http => self
                .server_message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
            ApiErrorKind::Precondition => self.message.clone(),
            ApiErrorKind::Network => "No response from server".to_string(),
            _ => fallback.to_string(),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:5000/api".to_string();

        // The hosting page may inject `window.ENV.API_URL`; accept the
        // lowercase spelling as well.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"API_URL".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }

                    if let Ok(api_url) = js_sys::Reflect::get(&env, &"api_url".into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_api_url() -> String {
    EnvConfig::new().api_url
}

/// Resource extraction for the backend's envelope variants, tried in
/// priority order: `data.<resource>` inside the wrapper, then the
/// wrapper's `data`, then the body itself.
pub(crate) fn unwrap_resource(value: serde_json::Value, resource: &str) -> serde_json::Value {
    if let Some(data) = value.get("data") {
        if let Some(r) = data.get(resource) {
            if !r.is_null() {
                return r.clone();
            }
        }
        if !data.is_null() {
            return data.clone();
        }
    }
    value
}

/// Like `unwrap_resource` but stops at the wrapper's `data` (used where
/// the resource of interest is the whole `data` object, e.g. the
/// `{user, token}` pair of the auth endpoints).
pub(crate) fn unwrap_data(value: serde_json::Value) -> serde_json::Value {
    match value.get("data") {
        Some(d) if !d.is_null() => d.clone(),
        _ => value,
    }
}

/// List variant: additionally accepts a bare top-level array.
pub(crate) fn unwrap_resource_list(
    value: serde_json::Value,
    resource: &str,
) -> Vec<serde_json::Value> {
    if let Some(arr) = value
        .get("data")
        .and_then(|d| d.get(resource))
        .and_then(|v| v.as_array())
    {
        return arr.clone();
    }
    if let Some(arr) = value.get("data").and_then(|v| v.as_array()) {
        return arr.clone();
    }
    if let Some(arr) = value.as_array() {
        return arr.clone();
    }
    Vec::new()
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(ApiError::parse)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ProfileUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// `{user, token}` pair carried by register/login responses.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AuthSession {
    pub token: String,
    #[serde(default)]
    pub user: User,
}

/// Form create/update body. The publish flag is sent under three names
/// because deployed backends disagree on which one they read; this
/// redundancy is a compatibility shim, not an accident.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct FormPayload {
    pub title: String,
    pub description: String,

    #[serde(rename = "isPublished")]
    pub is_published: bool,
    pub published: bool,
    /// "draft" | "published"
    pub status: String,

    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl FormPayload {
    pub fn new(title: &str, description: &str, is_published: bool, fields: &[FormField]) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            is_published,
            published: is_published,
            status: if is_published { "published" } else { "draft" }.to_string(),
            questions: fields.iter().map(FormField::to_runtime_shape).collect(),
            fields: fields.to_vec(),
        }
    }
}

/// Body of the dedicated publish endpoint (and of its generic-update
/// fallback). Same tri-field shim as `FormPayload`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PublishPayload {
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    pub published: bool,
    pub status: String,
}

impl PublishPayload {
    pub fn published() -> Self {
        Self {
            is_published: true,
            published: true,
            status: "published".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct QuestionPayload {
    pub title: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    pub description: String,

    #[serde(rename = "isRequired")]
    pub is_required: bool,

    pub order: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

impl QuestionPayload {
    pub fn from_question(q: &Question) -> Self {
        Self {
            title: q.title.clone(),
            field_type: q.field_type.clone(),
            description: q.description.clone(),
            is_required: q.is_required,
            order: q.order,
            options: q.options.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct UploadUrlRequest {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        Self {
            base_url: get_api_url(),
            token: load_token_from_storage(),
        }
    }

    pub fn save_to_storage(&self) {
        if let Some(token) = &self.token {
            save_token_to_storage(token);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn logout(&mut self) {
        self.token = None;
        clear_token_from_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method, url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body))
        }
    }

    // ---- auth ----

    pub async fn register(&self, req: &RegisterRequest) -> ApiResult<AuthSession> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::POST, "/auth/register", Some(req))
            .await?;
        decode(unwrap_data(data))
    }

    pub async fn login(&self, req: &LoginRequest) -> ApiResult<AuthSession> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::POST, "/auth/login", Some(req))
            .await?;
        decode(unwrap_data(data))
    }

    pub async fn me(&self) -> ApiResult<User> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::GET, "/auth/me", None::<&()>)
            .await?;
        decode(unwrap_resource(data, "user"))
    }

    pub async fn update_profile(&self, req: &ProfileUpdateRequest) -> ApiResult<User> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::PUT, "/auth/profile", Some(req))
            .await?;
        decode(unwrap_resource(data, "user"))
    }

    // ---- forms ----

    pub async fn list_forms(&self) -> ApiResult<Vec<Form>> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::GET, "/forms", None::<&()>)
            .await?;
        Ok(unwrap_resource_list(data, "forms")
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    pub async fn get_form(&self, form_id: &str) -> ApiResult<Form> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::GET, &format!("/forms/{form_id}"), None::<&()>)
            .await?;
        decode(unwrap_resource(data, "form"))
    }

    pub async fn create_form(&self, payload: &FormPayload) -> ApiResult<Form> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::POST, "/forms", Some(payload))
            .await?;
        decode(unwrap_resource(data, "form"))
    }

    pub async fn update_form(&self, form_id: &str, payload: &FormPayload) -> ApiResult<Form> {
        let data: serde_json::Value = self
            .request_api(reqwest::Method::PUT, &format!("/forms/{form_id}"), Some(payload))
            .await?;
        decode(unwrap_resource(data, "form"))
    }

    pub async fn delete_form(&self, form_id: &str) -> ApiResult<serde_json::Value> {
        self.request_api(
            reqwest::Method::DELETE,
            &format!("/forms/{form_id}"),
            None::<&()>,
        )
        .await
    }

    pub async fn publish_form(&self, form_id: &str) -> ApiResult<serde_json::Value> {
        self.request_api(
            reqwest::Method::PUT,
            &format!("/forms/{form_id}/publish"),
            Some(&PublishPayload::published()),
        )
        .await
    }

    /// Fallback for backends without the dedicated publish route: a
    /// generic update carrying the same publish payload.
    pub async fn publish_form_via_update(&self, form_id: &str) -> ApiResult<serde_json::Value> {
        self.request_api(
            reqwest::Method::PUT,
            &format!("/forms/{form_id}"),
            Some(&PublishPayload::published()),
        )
        .await
    }

    // ---- question sub-resource ----

    pub async fn add_question(
        &self,
        form_id: &str,
        payload: &QuestionPayload,
    ) -> ApiResult<Question> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::POST,
                &format!("/forms/{form_id}/questions"),
                Some(payload),
            )
            .await?;
        decode(unwrap_resource(data, "question"))
    }

    pub async fn update_question(
        &self,
        form_id: &str,
        question_id: &str,
        payload: &QuestionPayload,
    ) -> ApiResult<Question> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::PUT,
                &format!("/forms/{form_id}/questions/{question_id}"),
                Some(payload),
            )
            .await?;
        decode(unwrap_resource(data, "question"))
    }

    pub async fn delete_question(
        &self,
        form_id: &str,
        question_id: &str,
    ) -> ApiResult<serde_json::Value> {
        self.request_api(
            reqwest::Method::DELETE,
            &format!("/forms/{form_id}/questions/{question_id}"),
            None::<&()>,
        )
        .await
    }

    pub async fn reorder_questions(
        &self,
        form_id: &str,
        order: &[QuestionOrder],
    ) -> ApiResult<serde_json::Value> {
        self.request_api(
            reqwest::Method::PUT,
            &format!("/forms/{form_id}/questions/reorder"),
            Some(&serde_json::json!({ "questions": order })),
        )
        .await
    }

    // ---- analytics / stored responses ----

    pub async fn get_form_analytics(&self, form_id: &str) -> ApiResult<FormAnalytics> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::GET,
                &format!("/forms/{form_id}/analytics"),
                None::<&()>,
            )
            .await?;
        decode(unwrap_resource(data, "analytics"))
    }

    pub async fn get_form_responses(&self, form_id: &str) -> ApiResult<Vec<StoredResponse>> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::GET,
                &format!("/forms/{form_id}/responses"),
                None::<&()>,
            )
            .await?;
        Ok(unwrap_resource_list(data, "responses")
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    // ---- response sessions ----

    pub async fn start_response(
        &self,
        form_id: &str,
    ) -> ApiResult<(ResponseFormSummary, ResponseSession)> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::POST,
                &format!("/responses/start/{form_id}"),
                None::<&()>,
            )
            .await?;
        let form = decode(unwrap_resource(data.clone(), "form"))?;
        let session = decode(unwrap_resource(data, "response"))?;
        Ok((form, session))
    }

    pub async fn submit_answer(&self, response_id: &str, answer: &Answer) -> ApiResult<AnswerStep> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::POST,
                &format!("/responses/{response_id}/answers"),
                Some(answer),
            )
            .await?;
        decode(unwrap_data(data))
    }

    pub async fn get_upload_url(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> ApiResult<UploadTarget> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::POST,
                "/responses/upload-url",
                Some(&UploadUrlRequest {
                    file_name: file_name.to_string(),
                    content_type: content_type.to_string(),
                }),
            )
            .await?;
        decode(unwrap_data(data))
    }

    pub async fn get_response(
        &self,
        response_id: &str,
        respondent_id: &str,
    ) -> ApiResult<StoredResponse> {
        let path = format!(
            "/responses/{}?respondentId={}",
            response_id,
            urlencoding::encode(respondent_id)
        );
        let data: serde_json::Value = self
            .request_api(reqwest::Method::GET, &path, None::<&()>)
            .await?;
        decode(unwrap_resource(data, "response"))
    }
}

/// Direct PUT of file bytes to a signed upload URL. Signed URLs carry
/// their own authorization, so this bypasses the client's auth header.
pub(crate) async fn put_signed_url(
    upload_url: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> ApiResult<()> {
    let client = reqwest::Client::new();
    let res = client
        .put(upload_url)
        .header("Content-Type", content_type)
        .body(bytes)
        .send()
        .await
        .map_err(ApiError::network)?;

    if res.status().is_success() {
        Ok(())
    } else {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        Err(ApiError::http(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_resource_priority_order() {
        // 1) data.<resource>
        let v = serde_json::json!({"success": true, "data": {"form": {"id": "a"}}});
        assert_eq!(unwrap_resource(v, "form")["id"], "a");

        // 2) data (resource key absent)
        let v = serde_json::json!({"success": true, "data": {"id": "b"}});
        assert_eq!(unwrap_resource(v, "form")["id"], "b");

        // 2b) data (resource key null)
        let v = serde_json::json!({"data": {"form": null, "id": "b2"}});
        assert_eq!(unwrap_resource(v, "form")["id"], "b2");

        // 3) the body itself
        let v = serde_json::json!({"id": "c"});
        assert_eq!(unwrap_resource(v, "form")["id"], "c");
    }

    #[test]
    fn unwrap_list_accepts_wrapped_and_bare_shapes() {
        let wrapped = serde_json::json!({"data": {"forms": [{"id": "a"}, {"id": "b"}]}});
        assert_eq!(unwrap_resource_list(wrapped, "forms").len(), 2);

        let data_is_list = serde_json::json!({"data": [{"id": "a"}]});
        assert_eq!(unwrap_resource_list(data_is_list, "forms").len(), 1);

        let bare = serde_json::json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]);
        assert_eq!(unwrap_resource_list(bare, "forms").len(), 3);

        let nothing = serde_json::json!({"ok": true});
        assert!(unwrap_resource_list(nothing, "forms").is_empty());
    }

    #[test]
    fn auth_session_contract_deserializes() {
        let session: AuthSession = serde_json::from_value(serde_json::json!({
            "token": "jwt-abc",
            "user": {"id": "u1", "name": "Ada", "email": "ada@example.com"}
        }))
        .unwrap();
        assert_eq!(session.token, "jwt-abc");
        assert_eq!(session.user.name, "Ada");
    }

    #[test]
    fn form_payload_carries_publish_flag_three_ways() {
        let payload = FormPayload::new("T", "D", true, &[]);
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["isPublished"], true);
        assert_eq!(v["published"], true);
        assert_eq!(v["status"], "published");

        let draft = FormPayload::new("T", "D", false, &[]);
        let v = serde_json::to_value(&draft).unwrap();
        assert_eq!(v["status"], "draft");
    }

    #[test]
    fn form_payload_derives_questions_from_fields() {
        let fields = vec![FormField {
            id: "f1".into(),
            field_type: FieldType::Email,
            label: "Your email".into(),
            help_text: "Work address".into(),
            required: true,
            order: 0,
            options: Vec::new(),
        }];
        let payload = FormPayload::new("T", "", false, &fields);
        assert_eq!(payload.questions.len(), 1);
        assert_eq!(payload.questions[0].title, "Your email");
        assert!(payload.questions[0].is_required);

        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["questions"][0]["type"], "email");
        assert_eq!(v["fields"][0]["helpText"], "Work address");
    }

    #[test]
    fn http_error_extracts_server_message() {
        let err = ApiError::http(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Email already in use"}"#.to_string(),
        );
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert_eq!(err.server_message.as_deref(), Some("Email already in use"));
        assert_eq!(err.user_message("Registration failed"), "Email already in use");

        let bare = ApiError::http(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        assert_eq!(bare.server_message, None);
        assert_eq!(bare.user_message("Registration failed"), "Registration failed");
    }

    #[test]
    fn precondition_error_keeps_its_text() {
        let err = ApiError::precondition("No active response session");
        assert_eq!(err.kind, ApiErrorKind::Precondition);
        assert_eq!(err.user_message("ignored"), "No active response session");
    }

    #[test]
    fn network_error_surfaces_generic_message() {
        let err = ApiError {
            kind: ApiErrorKind::Network,
            message: "connection refused".to_string(),
            server_message: None,
        };
        assert_eq!(err.user_message("Failed to fetch forms"), "No response from server");
    }

    #[test]
    fn auth_header_is_attached_when_token_present() {
        let client = reqwest::Client::new();
        let req = client.get("http://localhost/probe");
        let req = ApiClient::with_auth_headers(req, Some("tok-1".to_string()));
        let built = req.build().unwrap();
        assert_eq!(
            built.headers().get("Authorization").unwrap(),
            "Bearer tok-1"
        );

        let req = client.get("http://localhost/probe");
        let req = ApiClient::with_auth_headers(req, None);
        let built = req.build().unwrap();
        assert!(built.headers().get("Authorization").is_none());
    }

    #[test]
    fn reorder_body_shape() {
        let order = vec![
            QuestionOrder { id: "q2".into(), order: 0 },
            QuestionOrder { id: "q1".into(), order: 1 },
        ];
        let body = serde_json::json!({ "questions": order });
        assert_eq!(body["questions"][0]["id"], "q2");
        assert_eq!(body["questions"][0]["order"], 0);
    }
}
