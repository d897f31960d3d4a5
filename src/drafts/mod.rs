mod form;

pub(crate) use form::{
    apply_draft_fields,
    apply_order,
    draft_apply_order,
    draft_remove_question,
    draft_set_published,
    draft_upsert_question,
    load_form_draft,
    remove_form_draft,
    save_form_draft,
    FormDraft,
};
