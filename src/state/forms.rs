use crate::api::{ApiClient, ApiResult, FormPayload, QuestionPayload};
use crate::drafts::{
    apply_draft_fields, apply_order, draft_apply_order, draft_remove_question,
    draft_set_published, draft_upsert_question, load_form_draft, remove_form_draft,
    save_form_draft,
};
use crate::models::{Form, FormAnalytics, FormField, Question, QuestionOrder, StoredResponse};
use crate::state::{note_unauthorized, AppContext};
use leptos::prelude::*;

/// Server responses are trusted for metadata only; the caller's field
/// list is authoritative for structure and both shapes are re-derived
/// from it.
pub(crate) fn keep_local_fields(mut form: Form, local_fields: &[FormField], fallback_id: &str) -> Form {
    if form.id.trim().is_empty() {
        form.id = fallback_id.to_string();
    }
    form.fields = local_fields.to_vec();
    form.questions = local_fields.iter().map(FormField::to_runtime_shape).collect();
    form
}

pub(crate) fn flip_published_in(forms: &mut [Form], form_id: &str) {
    for form in forms.iter_mut() {
        if form.id == form_id {
            form.is_published = true;
        }
    }
}

/// Form CRUD over the shared app state. Every mutation shadows the form
/// into the localStorage draft cache so a backend that drops or
/// reshapes `fields` cannot erase local edits.
#[derive(Clone)]
pub(crate) struct FormStore {
    ctx: AppContext,
}

impl FormStore {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    fn client(&self) -> ApiClient {
        self.ctx.0.api_client.get_untracked()
    }

    pub async fn fetch_forms(&self) -> ApiResult<Vec<Form>> {
        let state = &self.ctx.0;
        state.forms_loading.set(true);
        state.forms_error.set(None);

        let result = self.client().list_forms().await;
        state.forms_loading.set(false);

        match result {
            Ok(forms) => {
                state.forms.set(forms.clone());
                Ok(forms)
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to fetch forms")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn fetch_form_by_id(&self, form_id: &str) -> ApiResult<Form> {
        let state = &self.ctx.0;
        state.forms_loading.set(true);
        state.forms_error.set(None);

        let req_id = state.form_request_id.get_untracked() + 1;
        state.form_request_id.set(req_id);

        // Render the cached draft while the fetch is outstanding.
        let draft = load_form_draft(form_id);
        if let Some(d) = &draft {
            if !d.fields.is_empty() {
                let optimistic = d.to_form();
                state.questions.set(optimistic.questions.clone());
                state.current_form.set(Some(optimistic));
            }
        }

        let result = self.client().get_form(form_id).await;

        // A newer load started while we were waiting; don't clobber it.
        if state.form_request_id.get_untracked() != req_id {
            return result;
        }
        state.forms_loading.set(false);

        match result {
            Ok(mut form) => {
                form.standardize();
                if let Some(d) = &draft {
                    apply_draft_fields(&mut form, d);
                }
                state.questions.set(form.questions.clone());
                state.current_form.set(Some(form.clone()));
                Ok(form)
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to fetch form")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn create_form(
        &self,
        title: &str,
        description: &str,
        is_published: bool,
        fields: &[FormField],
    ) -> ApiResult<Form> {
        let state = &self.ctx.0;
        state.forms_loading.set(true);
        state.forms_error.set(None);

        let payload = FormPayload::new(title, description, is_published, fields);
        let result = self.client().create_form(&payload).await;
        state.forms_loading.set(false);

        match result {
            Ok(mut form) => {
                form.standardize();
                if form.fields.is_empty() && !fields.is_empty() {
                    form = keep_local_fields(form, fields, "");
                }
                save_form_draft(&form);
                state.forms.update(|fs| fs.insert(0, form.clone()));
                state.questions.set(form.questions.clone());
                state.current_form.set(Some(form.clone()));
                Ok(form)
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to create form")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn update_form(
        &self,
        form_id: &str,
        title: &str,
        description: &str,
        is_published: bool,
        fields: &[FormField],
    ) -> ApiResult<Form> {
        let state = &self.ctx.0;
        state.forms_loading.set(true);
        state.forms_error.set(None);

        // Draft first: a failed or shape-losing response must not erase
        // local edits.
        let local = keep_local_fields(
            Form {
                id: form_id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                is_published,
                fields: Vec::new(),
                questions: Vec::new(),
                created_at: None,
                updated_at: None,
            },
            fields,
            form_id,
        );
        save_form_draft(&local);

        let payload = FormPayload::new(title, description, is_published, fields);
        let result = self.client().update_form(form_id, &payload).await;
        state.forms_loading.set(false);

        match result {
            Ok(mut form) => {
                form.standardize();
                form = keep_local_fields(form, fields, form_id);
                save_form_draft(&form);

                state.forms.update(|fs| {
                    if let Some(slot) = fs.iter_mut().find(|f| f.id == form.id) {
                        *slot = form.clone();
                    }
                });
                state.questions.set(form.questions.clone());
                state.current_form.set(Some(form.clone()));
                Ok(form)
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to update form")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn delete_form(&self, form_id: &str) -> ApiResult<()> {
        let state = &self.ctx.0;
        state.forms_loading.set(true);
        state.forms_error.set(None);

        let result = self.client().delete_form(form_id).await;
        state.forms_loading.set(false);

        match result {
            Ok(_) => {
                remove_form_draft(form_id);
                state.forms.update(|fs| fs.retain(|f| f.id != form_id));
                let was_current = state
                    .current_form
                    .with_untracked(|cf| cf.as_ref().map(|f| f.id == form_id).unwrap_or(false));
                if was_current {
                    state.current_form.set(None);
                    state.questions.set(vec![]);
                }
                Ok(())
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to delete form")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    /// Two-tier publish: the dedicated endpoint first, then a generic
    /// update carrying the same payload. Not a retry loop; backends
    /// without the publish route reject the first attempt.
    pub async fn publish_form(&self, form_id: &str) -> ApiResult<()> {
        let state = &self.ctx.0;
        state.forms_loading.set(true);
        state.forms_error.set(None);

        let client = self.client();
        let result = match client.publish_form(form_id).await {
            Ok(v) => Ok(v),
            Err(_) => client.publish_form_via_update(form_id).await,
        };
        state.forms_loading.set(false);

        match result {
            Ok(_) => {
                state.forms.update(|fs| flip_published_in(fs, form_id));
                state.current_form.update(|cf| {
                    if let Some(f) = cf {
                        if f.id == form_id {
                            f.is_published = true;
                        }
                    }
                });
                draft_set_published(form_id);

                // Reconcile with the server's view of the list.
                let _ = self.fetch_forms().await;
                Ok(())
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to publish form")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn add_question(
        &self,
        form_id: &str,
        payload: &QuestionPayload,
    ) -> ApiResult<Question> {
        let state = &self.ctx.0;
        state.forms_error.set(None);

        match self.client().add_question(form_id, payload).await {
            Ok(question) => {
                state.questions.update(|qs| qs.push(question.clone()));
                draft_upsert_question(form_id, &question);
                Ok(question)
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to add question")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn update_question(
        &self,
        form_id: &str,
        question_id: &str,
        payload: &QuestionPayload,
    ) -> ApiResult<Question> {
        let state = &self.ctx.0;
        state.forms_error.set(None);

        match self.client().update_question(form_id, question_id, payload).await {
            Ok(mut question) => {
                if question.id.trim().is_empty() {
                    question.id = question_id.to_string();
                }
                state.questions.update(|qs| {
                    if let Some(slot) = qs.iter_mut().find(|q| q.id == question.id) {
                        *slot = question.clone();
                    }
                });
                draft_upsert_question(form_id, &question);
                Ok(question)
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to update question")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn delete_question(&self, form_id: &str, question_id: &str) -> ApiResult<()> {
        let state = &self.ctx.0;
        state.forms_error.set(None);

        match self.client().delete_question(form_id, question_id).await {
            Ok(_) => {
                state.questions.update(|qs| qs.retain(|q| q.id != question_id));
                draft_remove_question(form_id, question_id);
                Ok(())
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to delete question")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn reorder_questions(
        &self,
        form_id: &str,
        order: &[QuestionOrder],
    ) -> ApiResult<()> {
        let state = &self.ctx.0;
        state.forms_error.set(None);

        match self.client().reorder_questions(form_id, order).await {
            Ok(_) => {
                state.questions.update(|qs| {
                    *qs = apply_order(
                        std::mem::take(qs),
                        order,
                        |q| q.id.as_str(),
                        |q| q.order,
                        |q, o| q.order = o,
                    );
                });
                draft_apply_order(form_id, order);
                Ok(())
            }
            Err(err) => {
                state
                    .forms_error
                    .set(Some(err.user_message("Failed to reorder questions")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn fetch_form_analytics(&self, form_id: &str) -> ApiResult<FormAnalytics> {
        match self.client().get_form_analytics(form_id).await {
            Ok(analytics) => Ok(analytics),
            Err(err) => {
                self.ctx
                    .0
                    .forms_error
                    .set(Some(err.user_message("Failed to fetch analytics")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    pub async fn fetch_form_responses(&self, form_id: &str) -> ApiResult<Vec<StoredResponse>> {
        match self.client().get_form_responses(form_id).await {
            Ok(responses) => Ok(responses),
            Err(err) => {
                self.ctx
                    .0
                    .forms_error
                    .set(Some(err.user_message("Failed to fetch responses")));
                note_unauthorized(&self.ctx, &err);
                Err(err)
            }
        }
    }

    /// Clears the per-form view state; the cached list stays.
    pub fn reset_state(&self) {
        let state = &self.ctx.0;
        state.current_form.set(None);
        state.questions.set(vec![]);
        state.forms_error.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;

    fn field(id: &str, label: &str, order: i64) -> FormField {
        FormField {
            id: id.into(),
            field_type: FieldType::Text,
            label: label.into(),
            help_text: String::new(),
            required: false,
            order,
            options: Vec::new(),
        }
    }

    #[test]
    fn server_form_keeps_metadata_but_loses_its_fields() {
        let server: Form = serde_json::from_value(serde_json::json!({
            "id": "f1",
            "title": "Server title",
            "isPublished": true,
            "updatedAt": "2026-02-01T10:00:00Z",
            "fields": [{"id": "stale", "type": "text", "label": "Stale", "order": 0}]
        }))
        .unwrap();

        let local = vec![field("q1", "Fresh", 0), field("q2", "Also fresh", 1)];
        let merged = keep_local_fields(server, &local, "f1");

        assert_eq!(merged.title, "Server title");
        assert_eq!(merged.updated_at.as_deref(), Some("2026-02-01T10:00:00Z"));
        assert_eq!(merged.fields.len(), 2);
        assert_eq!(merged.fields[0].label, "Fresh");
        assert_eq!(merged.questions.len(), 2);
        assert_eq!(merged.questions[1].title, "Also fresh");
    }

    #[test]
    fn merge_fills_in_missing_id() {
        let server: Form = serde_json::from_value(serde_json::json!({"title": "No id"})).unwrap();
        let merged = keep_local_fields(server, &[], "f7");
        assert_eq!(merged.id, "f7");
    }

    #[test]
    fn publish_flips_only_the_matching_form() {
        let mut forms: Vec<Form> = serde_json::from_value(serde_json::json!([
            {"id": "a", "title": "A"},
            {"id": "b", "title": "B"}
        ]))
        .unwrap();

        flip_published_in(&mut forms, "b");

        assert!(!forms[0].is_published);
        assert!(forms[1].is_published);
    }
}
