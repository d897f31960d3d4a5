use crate::models::{Form, FormField, Question, QuestionOrder};
use crate::storage::{load_json_from_storage, remove_from_storage, save_json_to_storage};
use crate::util::now_ms;
use serde::{Deserialize, Serialize};

/// Denormalized snapshot of a form, written on every form-store mutation.
///
/// The draft is authoritative for field structure: backends are known to
/// drop or reshape `fields` on some round-trips, so a non-empty draft
/// field list overrides whatever the server returned. Server-computed
/// metadata (ids, timestamps, publish flag) is never taken from here
/// except where a mutation explicitly flips it.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct FormDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_published: bool,

    #[serde(default)]
    pub fields: Vec<FormField>,

    #[serde(default)]
    pub questions: Vec<Question>,

    pub saved_ms: i64,
}

impl FormDraft {
    pub fn from_form(form: &Form) -> Self {
        Self {
            id: form.id.clone(),
            title: form.title.clone(),
            description: form.description.clone(),
            is_published: form.is_published,
            fields: form.fields.clone(),
            questions: form.questions.clone(),
            saved_ms: now_ms(),
        }
    }

    /// Rehydrate for optimistic rendering while a fetch is outstanding.
    pub fn to_form(&self) -> Form {
        Form {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            is_published: self.is_published,
            fields: self.fields.clone(),
            questions: self.questions.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

fn key(form_id: &str) -> String {
    format!("formDraft_{form_id}")
}

pub(crate) fn save_form_draft(form: &Form) {
    if form.id.trim().is_empty() {
        return;
    }
    save_json_to_storage(&key(&form.id), &FormDraft::from_form(form));
}

pub(crate) fn load_form_draft(form_id: &str) -> Option<FormDraft> {
    if form_id.trim().is_empty() {
        return None;
    }
    load_json_from_storage::<FormDraft>(&key(form_id))
}

pub(crate) fn remove_form_draft(form_id: &str) {
    if form_id.trim().is_empty() {
        return;
    }
    remove_from_storage(&key(form_id));
}

/// Local-wins merge: a draft with a non-empty field list replaces the
/// server's `fields`, and `questions` is re-derived so the two shapes
/// stay consistent. A draft without fields leaves the form untouched.
pub(crate) fn apply_draft_fields(form: &mut Form, draft: &FormDraft) {
    if draft.fields.is_empty() {
        return;
    }
    form.fields = draft.fields.clone();
    form.questions = form.fields.iter().map(FormField::to_runtime_shape).collect();
}

/// Reassign `order` values from an instruction list and re-sort.
/// Items not named by the instruction keep their current order.
pub(crate) fn apply_order<T>(
    mut items: Vec<T>,
    order: &[QuestionOrder],
    id_of: impl Fn(&T) -> &str,
    order_of: impl Fn(&T) -> i64,
    set_order: impl Fn(&mut T, i64),
) -> Vec<T> {
    for item in items.iter_mut() {
        if let Some(o) = order.iter().find(|o| o.id == id_of(item)) {
            set_order(item, o.order);
        }
    }
    items.sort_by_key(|i| order_of(i));
    items
}

/// Patch an existing draft after question create/update. Both shapes are
/// updated in lockstep. No-op when the form has no draft yet.
pub(crate) fn draft_upsert_question(form_id: &str, question: &Question) {
    let Some(mut draft) = load_form_draft(form_id) else {
        return;
    };

    match draft.questions.iter_mut().find(|q| q.id == question.id) {
        Some(slot) => *slot = question.clone(),
        None => draft.questions.push(question.clone()),
    }

    let field = question.to_builder_shape();
    match draft.fields.iter_mut().find(|f| f.id == field.id) {
        Some(slot) => *slot = field,
        None => draft.fields.push(field),
    }

    draft.saved_ms = now_ms();
    save_json_to_storage(&key(form_id), &draft);
}

pub(crate) fn draft_remove_question(form_id: &str, question_id: &str) {
    let Some(mut draft) = load_form_draft(form_id) else {
        return;
    };
    draft.questions.retain(|q| q.id != question_id);
    draft.fields.retain(|f| f.id != question_id);
    draft.saved_ms = now_ms();
    save_json_to_storage(&key(form_id), &draft);
}

pub(crate) fn draft_apply_order(form_id: &str, order: &[QuestionOrder]) {
    let Some(mut draft) = load_form_draft(form_id) else {
        return;
    };
    draft.questions = apply_order(
        draft.questions,
        order,
        |q| q.id.as_str(),
        |q| q.order,
        |q, o| q.order = o,
    );
    draft.fields = apply_order(
        draft.fields,
        order,
        |f| f.id.as_str(),
        |f| f.order,
        |f, o| f.order = o,
    );
    draft.saved_ms = now_ms();
    save_json_to_storage(&key(form_id), &draft);
}

pub(crate) fn draft_set_published(form_id: &str) {
    let Some(mut draft) = load_form_draft(form_id) else {
        return;
    };
    draft.is_published = true;
    draft.saved_ms = now_ms();
    save_json_to_storage(&key(form_id), &draft);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldOption, FieldType};

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

    fn server_form(id: &str) -> Form {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": "Server title",
            "isPublished": true,
            "createdAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn draft_fields_override_server_fields() {
        let mut form = server_form("f1");
        assert!(form.fields.is_empty());

        let draft = FormDraft {
            id: "f1".into(),
            fields: vec![field("q1", "Name", 0), field("q2", "Age", 1)],
            ..Default::default()
        };

        apply_draft_fields(&mut form, &draft);

        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.questions.len(), 2);
        assert_eq!(form.questions[1].title, "Age");
        // Server metadata is untouched.
        assert_eq!(form.title, "Server title");
        assert!(form.is_published);
    }

    #[test]
    fn empty_draft_leaves_server_form_alone() {
        let mut form = server_form("f1");
        form.fields = vec![field("q1", "Kept", 0)];
        let draft = FormDraft {
            id: "f1".into(),
            ..Default::default()
        };

        apply_draft_fields(&mut form, &draft);

        assert_eq!(form.fields.len(), 1);
        assert_eq!(form.fields[0].label, "Kept");
    }

    #[test]
    fn apply_order_resorts_and_keeps_unnamed() {
        let items = vec![field("a", "A", 0), field("b", "B", 1), field("c", "C", 2)];
        let order = vec![
            QuestionOrder { id: "b".into(), order: 0 },
            QuestionOrder { id: "a".into(), order: 2 },
        ];

        let out = apply_order(
            items,
            &order,
            |f| f.id.as_str(),
            |f| f.order,
            |f, o| f.order = o,
        );

        let ids: Vec<&str> = out.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(out[0].order, 0);
        assert_eq!(out[2].order, 2);
    }

    #[test]
    fn draft_snapshot_carries_both_shapes() {
        let mut form = server_form("f2");
        form.fields = vec![FormField {
            options: vec![FieldOption::new("Yes")],
            field_type: FieldType::Dropdown,
            ..field("q1", "Pick", 0)
        }];
        form.standardize();

        let draft = FormDraft::from_form(&form);
        assert_eq!(draft.fields.len(), 1);
        assert_eq!(draft.questions.len(), 1);
        assert_eq!(draft.questions[0].options[0].value, "Yes");
        assert!(draft.saved_ms > 0);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn draft_round_trip_under_form_key() {
        remove_form_draft("wt1");
        assert!(load_form_draft("wt1").is_none());

        let form: Form = serde_json::from_value(serde_json::json!({
            "id": "wt1",
            "title": "Draft me",
            "fields": [
                {"id": "q1", "type": "text", "label": "Name", "order": 0}
            ]
        }))
        .unwrap();

        save_form_draft(&form);
        let draft = load_form_draft("wt1").unwrap();
        assert_eq!(draft.title, "Draft me");
        assert_eq!(draft.fields.len(), 1);

        remove_form_draft("wt1");
        assert!(load_form_draft("wt1").is_none());
    }

    #[wasm_bindgen_test]
    fn upsert_patches_both_shapes() {
        let form: Form = serde_json::from_value(serde_json::json!({
            "id": "wt2",
            "title": "Patch me",
            "fields": [
                {"id": "q1", "type": "text", "label": "Name", "order": 0}
            ]
        }))
        .unwrap();
        save_form_draft(&form);

        let q: Question = serde_json::from_value(serde_json::json!({
            "id": "q2", "type": "number", "title": "Age", "order": 1
        }))
        .unwrap();
        draft_upsert_question("wt2", &q);

        let draft = load_form_draft("wt2").unwrap();
        assert_eq!(draft.questions.len(), 2);
        assert_eq!(draft.fields.len(), 2);
        assert_eq!(draft.fields[1].label, "Age");

        draft_remove_question("wt2", "q2");
        let draft = load_form_draft("wt2").unwrap();
        assert_eq!(draft.questions.len(), 1);
        assert_eq!(draft.fields.len(), 1);

        remove_form_draft("wt2");
    }
}
