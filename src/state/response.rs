use crate::api::{put_signed_url, ApiClient, ApiError, ApiResult};
use crate::models::{
    Answer, AnswerStep, Question, ResponseFormSummary, ResponseSession, StoredResponse,
};
use crate::state::{note_unauthorized, AppContext};
use leptos::prelude::*;
use std::collections::BTreeMap;

fn progress_of(answered: usize, question_count: u32) -> f64 {
    if question_count == 0 {
        0.0
    } else {
        answered as f64 / question_count as f64 * 100.0
    }
}

/// The filling session core: transition and progress accounting, no
/// signals and no I/O. States: idle, active question loop, completed.
#[derive(Clone, Debug, Default)]
pub(crate) struct ResponseMachine {
    pub form: Option<ResponseFormSummary>,
    pub session: Option<ResponseSession>,
    pub current_question: Option<Question>,
    /// Keyed by question id: one answer per question, last write wins.
    pub answers: BTreeMap<String, Answer>,
    pub progress: f64,
    pub completed: bool,
}

impl ResponseMachine {
    /// Entry transition. Initial progress counts the question on screen
    /// as the first of `question_count`; an empty form stays at 0.
    pub fn start(&mut self, form: ResponseFormSummary, session: ResponseSession) {
        self.current_question = form.first_question.clone();
        self.progress = if form.question_count == 0 {
            0.0
        } else {
            1.0 / form.question_count as f64 * 100.0
        };
        self.completed = false;
        self.answers.clear();
        self.form = Some(form);
        self.session = Some(session);
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some() && self.current_question.is_some()
    }

    /// Builds the answer payload for the question on screen. Fails
    /// locally when no session is active; that error never reaches the
    /// network.
    pub fn answer_payload(
        &self,
        value: serde_json::Value,
        file_url: Option<String>,
    ) -> ApiResult<Answer> {
        let question = match (&self.session, &self.current_question) {
            (Some(_), Some(q)) => q,
            _ => return Err(ApiError::precondition("No active response session")),
        };
        Ok(Answer {
            question_id: question.id.clone(),
            value,
            file_url,
        })
    }

    /// Advance transition, applied after the server accepted an answer:
    /// record it (overwriting any earlier answer for the same question),
    /// move to the next question, recompute progress from the
    /// post-insert answered count.
    pub fn advance(&mut self, answer: Answer, step: AnswerStep) {
        self.answers.insert(answer.question_id.clone(), answer);
        let count = self.form.as_ref().map(|f| f.question_count).unwrap_or(0);
        self.progress = progress_of(self.answers.len(), count);
        self.current_question = step.next_question;
        self.completed = step.is_last_question;
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Drives one respondent's pass through a published form. The machine
/// signal carries all session state; the flags are advisory UI state
/// for disabling controls during in-flight calls.
#[derive(Clone)]
pub(crate) struct ResponseFlow {
    ctx: AppContext,
    pub machine: RwSignal<ResponseMachine>,
    pub is_loading: RwSignal<bool>,
    pub is_submitting: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl ResponseFlow {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            machine: RwSignal::new(ResponseMachine::default()),
            is_loading: RwSignal::new(false),
            is_submitting: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }

    fn client(&self) -> ApiClient {
        self.ctx.0.api_client.get_untracked()
    }

    pub async fn start(&self, form_id: &str) -> ApiResult<()> {
        self.is_loading.set(true);
        self.error.set(None);

        let result = self.client().start_response(form_id).await;
        self.is_loading.set(false);

        match result {
            Ok((form, session)) => {
                self.machine.update(|m| m.start(form, session));
                Ok(())
            }
            Err(err) => {
                self.error
                    .set(Some(err.user_message("Failed to start form response")));
                Err(err)
            }
        }
    }

    pub async fn submit_answer(
        &self,
        value: serde_json::Value,
        file_url: Option<String>,
    ) -> ApiResult<AnswerStep> {
        let payload = match self
            .machine
            .with_untracked(|m| m.answer_payload(value, file_url))
        {
            Ok(p) => p,
            Err(err) => {
                self.error
                    .set(Some(err.user_message("Failed to submit answer")));
                return Err(err);
            }
        };
        let response_id = self
            .machine
            .with_untracked(|m| m.session.as_ref().map(|s| s.id.clone()))
            .unwrap_or_default();

        self.is_submitting.set(true);
        self.error.set(None);

        let result = self.client().submit_answer(&response_id, &payload).await;
        self.is_submitting.set(false);

        match result {
            Ok(step) => {
                self.machine.update(|m| m.advance(payload, step.clone()));
                Ok(step)
            }
            Err(err) => {
                self.error
                    .set(Some(err.user_message("Failed to submit answer")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    /// Two-step upload: ask the backend for a signed target, then PUT
    /// the raw bytes there. Returns the public file URL for the next
    /// `submit_answer`.
    pub async fn upload_file(&self, file: &web_sys::File) -> ApiResult<String> {
        self.is_submitting.set(true);
        self.error.set(None);

        let result = self.upload_file_inner(file).await;
        self.is_submitting.set(false);

        match result {
            Ok(url) => Ok(url),
            Err(err) => {
                self.error
                    .set(Some(err.user_message("Failed to upload file")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    async fn upload_file_inner(&self, file: &web_sys::File) -> ApiResult<String> {
        let name = file.name();
        let mut content_type = file.type_();
        if content_type.trim().is_empty() {
            content_type = "application/octet-stream".to_string();
        }

        let target = self.client().get_upload_url(&name, &content_type).await?;
        let bytes = read_file_bytes(file).await?;
        put_signed_url(&target.upload_url, &content_type, bytes).await?;
        Ok(target.file_url)
    }

    /// Read-only fetch of a stored session; no state machine change.
    pub async fn get_response(
        &self,
        response_id: &str,
        respondent_id: &str,
    ) -> ApiResult<StoredResponse> {
        match self.client().get_response(response_id, respondent_id).await {
            Ok(stored) => Ok(stored),
            Err(err) => {
                self.error
                    .set(Some(err.user_message("Failed to fetch response")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    /// Back to idle; the only way to start a second fill in the same
    /// component lifetime.
    pub fn reset(&self) {
        self.machine.update(|m| m.reset());
        self.is_loading.set(false);
        self.is_submitting.set(false);
        self.error.set(None);
    }
}

async fn read_file_bytes(file: &web_sys::File) -> ApiResult<Vec<u8>> {
    let buf = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| ApiError::precondition("Could not read the selected file"))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use crate::models::FieldType;

    fn question(id: &str, title: &str, field_type: FieldType) -> Question {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "type": serde_json::to_value(&field_type).unwrap(),
        }))
        .unwrap()
    }

    fn summary(question_count: u32, first: Option<Question>) -> ResponseFormSummary {
        ResponseFormSummary {
            id: "f1".into(),
            title: "Survey".into(),
            description: String::new(),
            question_count,
            first_question: first,
        }
    }

    fn session() -> ResponseSession {
        ResponseSession {
            id: "r1".into(),
            form_id: "f1".into(),
        }
    }

    fn step(next: Option<Question>, last: bool) -> AnswerStep {
        AnswerStep {
            next_question: next,
            is_last_question: last,
        }
    }

    #[test]
    fn submit_before_start_is_a_local_error() {
        let m = ResponseMachine::default();
        let err = m
            .answer_payload(serde_json::json!("hi"), None)
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Precondition);
        assert_eq!(err.message, "No active response session");
    }

    #[test]
    fn zero_question_form_starts_at_zero_progress() {
        let mut m = ResponseMachine::default();
        m.start(summary(0, None), session());
        assert_eq!(m.progress, 0.0);
        assert!(m.progress.is_finite());
        assert!(!m.completed);
    }

    #[test]
    fn two_question_walkthrough() {
        let q1 = question("q1", "Name?", FieldType::Text);
        let q2 = question("q2", "Age?", FieldType::Number);

        let mut m = ResponseMachine::default();
        m.start(summary(2, Some(q1.clone())), session());

        assert_eq!(m.current_question.as_ref().unwrap().id, "q1");
        assert_eq!(m.progress, 50.0);

        let a1 = m.answer_payload(serde_json::json!("hi"), None).unwrap();
        assert_eq!(a1.question_id, "q1");
        m.advance(a1, step(Some(q2.clone()), false));

        assert_eq!(m.answers.len(), 1);
        assert_eq!(m.current_question.as_ref().unwrap().id, "q2");
        // One of two answered: still 50 under post-insert accounting.
        assert_eq!(m.progress, 50.0);
        assert!(!m.completed);

        let a2 = m.answer_payload(serde_json::json!(5), None).unwrap();
        m.advance(a2, step(None, true));

        assert_eq!(m.answers.len(), 2);
        assert!(m.completed);
        assert_eq!(m.progress, 100.0);
        assert!(m.current_question.is_none());
    }

    #[test]
    fn progress_is_monotone_under_forward_answering() {
        let count = 5;
        let questions: Vec<Question> = (0..count)
            .map(|i| question(&format!("q{i}"), "Q", FieldType::Text))
            .collect();

        let mut m = ResponseMachine::default();
        m.start(summary(count as u32, Some(questions[0].clone())), session());

        let mut last_progress = 0.0;
        for i in 0..count {
            assert!(m.progress >= last_progress);
            last_progress = m.progress;

            let a = m.answer_payload(serde_json::json!(i), None).unwrap();
            let next = questions.get(i + 1).cloned();
            let is_last = next.is_none();
            m.advance(a, step(next, is_last));
        }

        assert_eq!(m.progress, 100.0);
        assert!(m.completed);
    }

    #[test]
    fn re_answering_the_same_question_does_not_grow_the_map() {
        let q1 = question("q1", "Name?", FieldType::Text);

        let mut m = ResponseMachine::default();
        m.start(summary(2, Some(q1.clone())), session());

        let first = m.answer_payload(serde_json::json!("draft"), None).unwrap();
        // Server keeps us on the same question (user editing back and
        // forth within one session).
        m.advance(first, step(Some(q1.clone()), false));
        assert_eq!(m.answers.len(), 1);
        assert_eq!(m.progress, 50.0);

        let second = m.answer_payload(serde_json::json!("final"), None).unwrap();
        m.advance(second, step(Some(q1.clone()), false));

        assert_eq!(m.answers.len(), 1);
        assert_eq!(m.progress, 50.0);
        assert_eq!(
            m.answer_for("q1").unwrap().value,
            serde_json::json!("final")
        );
    }

    #[test]
    fn file_answers_carry_the_uploaded_url() {
        let q = question("q1", "CV", FieldType::File);
        let mut m = ResponseMachine::default();
        m.start(summary(1, Some(q)), session());

        let a = m
            .answer_payload(
                serde_json::json!("cv.pdf"),
                Some("https://cdn.example.com/cv.pdf".into()),
            )
            .unwrap();
        assert_eq!(a.file_url.as_deref(), Some("https://cdn.example.com/cv.pdf"));
    }

    #[test]
    fn reset_returns_to_idle() {
        let q = question("q1", "Name?", FieldType::Text);
        let mut m = ResponseMachine::default();
        m.start(summary(1, Some(q)), session());
        let a = m.answer_payload(serde_json::json!("x"), None).unwrap();
        m.advance(a, step(None, true));
        assert!(m.completed);

        m.reset();

        assert!(m.form.is_none());
        assert!(m.session.is_none());
        assert!(m.current_question.is_none());
        assert!(m.answers.is_empty());
        assert_eq!(m.progress, 0.0);
        assert!(!m.completed);
        assert!(!m.is_active());
    }

    #[test]
    fn restart_clears_previous_session_answers() {
        let q = question("q1", "Name?", FieldType::Text);
        let mut m = ResponseMachine::default();
        m.start(summary(1, Some(q.clone())), session());
        let a = m.answer_payload(serde_json::json!("x"), None).unwrap();
        m.advance(a, step(None, true));

        // Submit Another Response: a fresh start wipes the old answers.
        m.start(summary(1, Some(q)), session());
        assert!(m.answers.is_empty());
        assert!(!m.completed);
        assert_eq!(m.progress, 100.0);
    }
}
