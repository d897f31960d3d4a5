use serde::{Deserialize, Serialize};

/// Authenticated user as returned by the backend.
///
/// Only `name`/`email` are rendered; everything else the backend sends
/// (ids, timestamps, role flags) is kept in the flexible bag so new
/// backend fields never break deserialization.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct User {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Input element type of a single form field.
///
/// Wire format is the camelCase name. Unknown strings deserialize into
/// `Other` so forms authored against newer backends still load; such
/// fields render as plain text inputs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub(crate) enum FieldType {
    #[default]
    Text,
    Paragraph,
    MultipleChoice,
    Checkboxes,
    Dropdown,
    Date,
    Time,
    Rating,
    File,
    Number,
    Email,
    Phone,
    Url,
    Matrix,
    #[serde(untagged)]
    #[strum(default)]
    Other(String),
}

impl FieldType {
    /// Palette order shown in the builder.
    pub const ALL: [FieldType; 14] = [
        FieldType::Text,
        FieldType::Paragraph,
        FieldType::MultipleChoice,
        FieldType::Checkboxes,
        FieldType::Dropdown,
        FieldType::Date,
        FieldType::Time,
        FieldType::Rating,
        FieldType::File,
        FieldType::Number,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Url,
        FieldType::Matrix,
    ];

    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::MultipleChoice | FieldType::Checkboxes | FieldType::Dropdown
        )
    }
}

/// One selectable option of a choice-style field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl FieldOption {
    pub fn new(text: &str) -> Self {
        Self {
            value: text.to_string(),
            label: text.to_string(),
        }
    }
}

/// Builder-shape representation of one form input.
///
/// The canonical in-memory shape; the runtime `Question` shape is a pure
/// projection of it (`to_runtime_shape`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct FormField {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub label: String,

    #[serde(rename = "helpText", default)]
    pub help_text: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl FormField {
    /// Field factory used by the builder palette: `order` is the current
    /// list length, choice types start with one placeholder option.
    pub fn new(field_type: FieldType, order: i64) -> Self {
        let options = if field_type.is_choice() {
            vec![FieldOption::new("Option 1")]
        } else {
            Vec::new()
        };
        Self {
            id: format!("field-{}", crate::util::now_ms()),
            label: format!("New {} question", field_type),
            help_text: String::new(),
            required: false,
            order,
            options,
            field_type,
        }
    }

    pub fn to_runtime_shape(&self) -> Question {
        Question {
            id: self.id.clone(),
            title: self.label.clone(),
            field_type: self.field_type.clone(),
            description: self.help_text.clone(),
            is_required: self.required,
            order: self.order,
            options: self.options.clone(),
            is_last: false,
        }
    }
}

/// Runtime-shape representation of one form input, as the response
/// endpoints speak it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Question {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "isRequired", default)]
    pub is_required: bool,

    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub options: Vec<FieldOption>,

    /// Set by the response endpoints on the final question of a fill
    /// sequence; drives the Submit/Continue button label.
    #[serde(rename = "isLast", default)]
    pub is_last: bool,
}

impl Question {
    pub fn to_builder_shape(&self) -> FormField {
        FormField {
            id: self.id.clone(),
            field_type: self.field_type.clone(),
            label: self.title.clone(),
            help_text: self.description.clone(),
            required: self.is_required,
            order: self.order,
            options: self.options.clone(),
        }
    }
}

/// A user-authored form. Both wire shapes (`fields` and `questions`) are
/// kept because different backend endpoints return either one; after
/// `standardize` the two are consistent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Form {
    #[serde(default, alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "isPublished", default)]
    pub is_published: bool,

    #[serde(default)]
    pub fields: Vec<FormField>,

    #[serde(default)]
    pub questions: Vec<Question>,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,

    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl Form {
    /// Derive whichever shape is missing from the other. Leaves both
    /// lists alone when both are already populated.
    pub fn standardize(&mut self) {
        if self.fields.is_empty() && !self.questions.is_empty() {
            self.fields = self.questions.iter().map(Question::to_builder_shape).collect();
        } else if self.questions.is_empty() && !self.fields.is_empty() {
            self.questions = self.fields.iter().map(FormField::to_runtime_shape).collect();
        }
    }
}

/// One entry of a reorder instruction, also the wire shape the reorder
/// endpoint accepts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct QuestionOrder {
    pub id: String,
    pub order: i64,
}

/// Response session handle created by the start endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct ResponseSession {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(rename = "formId", default)]
    pub form_id: String,
}

/// Form summary carried by the start-session response.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct ResponseFormSummary {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "questionCount", default)]
    pub question_count: u32,
    #[serde(rename = "firstQuestion", default)]
    pub first_question: Option<Question>,
}

/// One submitted answer. `value` stays a JSON value because checkboxes
/// submit arrays and ratings submit numbers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Answer {
    #[serde(rename = "questionId", default)]
    pub question_id: String,

    #[serde(default)]
    pub value: serde_json::Value,

    #[serde(rename = "fileUrl", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// Server reply to an answer submission.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct AnswerStep {
    #[serde(rename = "nextQuestion", default)]
    pub next_question: Option<Question>,
    #[serde(rename = "isLastQuestion", default)]
    pub is_last_question: bool,
}

/// Signed upload target for file answers. `uploadUrl` is required; a
/// response without it is a contract violation, not a tolerable gap.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct UploadTarget {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    #[serde(rename = "fileUrl", default)]
    pub file_url: String,
}

/// A stored (completed or in-progress) response as the read endpoints
/// return it.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct StoredResponse {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(rename = "formId", default)]
    pub form_id: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Per-question analytics row.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct QuestionStat {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub answers: u64,
    #[serde(rename = "dropoffRate", default)]
    pub dropoff_rate: f64,
}

/// Aggregate analytics for one form.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct FormAnalytics {
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub responses: u64,
    #[serde(rename = "completionRate", default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub questions: Vec<QuestionStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_wire_names_round_trip() {
        let json = serde_json::to_string(&FieldType::MultipleChoice).unwrap();
        assert_eq!(json, "\"multipleChoice\"");
        let back: FieldType = serde_json::from_str("\"multipleChoice\"").unwrap();
        assert_eq!(back, FieldType::MultipleChoice);
    }

    #[test]
    fn unknown_field_type_is_tolerated() {
        let t: FieldType = serde_json::from_str("\"signature\"").unwrap();
        assert_eq!(t, FieldType::Other("signature".into()));
        // And it serializes back to the raw string.
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"signature\"");
    }

    #[test]
    fn shape_conversions_are_inverse() {
        let field = FormField {
            id: "f1".into(),
            field_type: FieldType::Dropdown,
            label: "Favorite color".into(),
            help_text: "Pick one".into(),
            required: true,
            order: 3,
            options: vec![FieldOption::new("Red"), FieldOption::new("Blue")],
        };
        let question = field.to_runtime_shape();
        assert_eq!(question.title, "Favorite color");
        assert_eq!(question.description, "Pick one");
        assert!(question.is_required);
        assert_eq!(question.to_builder_shape(), field);
    }

    #[test]
    fn standardize_derives_questions_from_fields() {
        let mut form: Form = serde_json::from_value(serde_json::json!({
            "id": "f1",
            "title": "Survey",
            "fields": [
                {"id": "q1", "type": "text", "label": "Name", "order": 0}
            ]
        }))
        .unwrap();
        form.standardize();
        assert_eq!(form.questions.len(), 1);
        assert_eq!(form.questions[0].title, "Name");
        assert_eq!(form.questions[0].field_type, FieldType::Text);
    }

    #[test]
    fn standardize_derives_fields_from_questions() {
        let mut form: Form = serde_json::from_value(serde_json::json!({
            "id": "f1",
            "questions": [
                {"id": "q1", "type": "rating", "title": "Score?", "isRequired": true, "order": 0}
            ]
        }))
        .unwrap();
        form.standardize();
        assert_eq!(form.fields.len(), 1);
        assert_eq!(form.fields[0].label, "Score?");
        assert!(form.fields[0].required);
    }

    #[test]
    fn mongo_style_ids_are_accepted() {
        let form: Form = serde_json::from_value(serde_json::json!({
            "_id": "64f0",
            "title": "Legacy",
            "questions": [{"_id": "q1", "type": "text", "title": "Name"}]
        }))
        .unwrap();
        assert_eq!(form.id, "64f0");
        assert_eq!(form.questions[0].id, "q1");
    }

    #[test]
    fn form_deserializes_with_sparse_payload() {
        let form: Form = serde_json::from_value(serde_json::json!({
            "id": "f9",
            "title": "Bare"
        }))
        .unwrap();
        assert!(!form.is_published);
        assert!(form.fields.is_empty());
        assert!(form.created_at.is_none());
    }

    #[test]
    fn answer_skips_absent_file_url() {
        let a = Answer {
            question_id: "q1".into(),
            value: serde_json::json!("hi"),
            file_url: None,
        };
        let v = serde_json::to_value(&a).unwrap();
        assert!(v.get("fileUrl").is_none());
        assert_eq!(v["questionId"], "q1");
    }

    #[test]
    fn choice_types_get_default_option() {
        let f = FormField::new(FieldType::Checkboxes, 2);
        assert_eq!(f.options.len(), 1);
        assert_eq!(f.options[0].label, "Option 1");
        assert_eq!(f.order, 2);
        assert!(f.label.starts_with("New checkboxes"));

        let plain = FormField::new(FieldType::Text, 0);
        assert!(plain.options.is_empty());
        assert_eq!(plain.label, "New text question");
    }

    #[test]
    fn analytics_contract_deserializes() {
        let a: FormAnalytics = serde_json::from_value(serde_json::json!({
            "visits": 40,
            "responses": 10,
            "completionRate": 25.0,
            "questions": [
                {"id": "q1", "title": "Name", "type": "text", "answers": 10, "dropoffRate": 0.0}
            ]
        }))
        .unwrap();
        assert_eq!(a.visits, 40);
        assert_eq!(a.questions[0].answers, 10);
        assert_eq!(a.questions[0].field_type, FieldType::Text);
    }
}
