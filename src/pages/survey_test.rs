use serde_json::json;

use super::*;
use crate::util::uuid::is_hyphenated_uuid;

fn loaded_responder(questions: Vec<Question>) -> SurveyResponder {
    let mut responder = SurveyResponder::default();
    let ticket = responder.survey.begin();
    responder.survey.settle(
        ticket,
        Ok(Survey {
            id: 7,
            title: "Feedback".to_owned(),
            description: None,
            questions,
            owner_id: Some(1),
            is_active: true,
            created_at: None,
        }),
    );
    responder
}

fn question(id: &str, label: &str, required: bool) -> Question {
    Question {
        id: id.to_owned(),
        kind: QuestionKind::Text,
        label: label.to_owned(),
        options: None,
        required,
    }
}

// =============================================================================
// DRAFT
// =============================================================================

#[test]
fn new_questions_get_distinct_uuids() {
    let mut draft = SurveyDraft::new();
    let first = draft.add_question(QuestionKind::Text);
    let second = draft.add_question(QuestionKind::Rating);
    assert!(is_hyphenated_uuid(&first));
    assert!(is_hyphenated_uuid(&second));
    assert_ne!(first, second);
    assert_eq!(draft.questions.len(), 2);
}

#[test]
fn multiple_choice_starts_with_one_option() {
    let mut draft = SurveyDraft::new();
    let choice = draft.add_question(QuestionKind::MultipleChoice);
    let text = draft.add_question(QuestionKind::Text);
    assert_eq!(draft.question(&choice).unwrap().options, Some(vec!["Option 1".to_owned()]));
    assert_eq!(draft.question(&text).unwrap().options, None);
}

#[test]
fn options_can_be_added_renamed_and_removed() {
    let mut draft = SurveyDraft::new();
    let id = draft.add_question(QuestionKind::MultipleChoice);

    assert!(draft.add_option(&id));
    assert!(draft.set_option(&id, 0, "Yes"));
    assert!(draft.set_option(&id, 1, "No"));
    assert_eq!(draft.question(&id).unwrap().options, Some(vec!["Yes".to_owned(), "No".to_owned()]));

    assert!(draft.remove_option(&id, 0));
    assert!(!draft.remove_option(&id, 5));
    assert!(!draft.set_option(&id, 3, "Maybe"));
    assert_eq!(draft.question(&id).unwrap().options, Some(vec!["No".to_owned()]));
}

#[test]
fn unknown_question_ids_are_reported() {
    let mut draft = SurveyDraft::new();
    assert!(!draft.add_option("missing"));
    assert!(!draft.remove_question("missing"));
    assert!(!draft.update_question("missing", |q| q.required = true));
}

#[test]
fn update_and_remove_question() {
    let mut draft = SurveyDraft::new();
    let id = draft.add_question(QuestionKind::Text);
    assert!(draft.update_question(&id, |q| {
        q.label = "Name?".to_owned();
        q.required = true;
    }));
    assert_eq!(draft.question(&id).unwrap().label, "Name?");
    assert!(draft.remove_question(&id));
    assert!(draft.questions.is_empty());
}

#[test]
fn title_is_required_to_save() {
    let mut draft = SurveyDraft::new();
    assert_eq!(draft.to_new_survey(), Err(FormError::Required("Title")));

    draft.title = " Team survey ".to_owned();
    draft.add_question(QuestionKind::Checkbox);
    let body = draft.to_new_survey().unwrap();
    assert_eq!(body.title, "Team survey");
    assert_eq!(body.questions.len(), 1);
}

// =============================================================================
// RESPONDER
// =============================================================================

#[test]
fn unanswered_required_question_blocks_submission() {
    let mut responder = loaded_responder(vec![question("a", "Name", true), question("b", "Notes", false)]);
    assert_eq!(responder.validate(), Err(FormError::Unanswered("Name".to_owned())));

    responder.set_answer("a", json!("   "));
    assert_eq!(responder.validate(), Err(FormError::Unanswered("Name".to_owned())));

    responder.set_answer("a", json!("Ada"));
    assert_eq!(responder.validate(), Ok(()));
}

#[test]
fn validate_before_load_fails() {
    let responder = SurveyResponder::default();
    assert_eq!(responder.validate(), Err(FormError::Invalid("Survey not loaded")));
}

#[test]
fn checkbox_choices_toggle() {
    let mut responder = loaded_responder(vec![question("c", "Pick", true)]);
    responder.toggle_choice("c", "Red");
    responder.toggle_choice("c", "Blue");
    responder.toggle_choice("c", "Red");
    assert_eq!(responder.answers().get("c"), Some(&json!(["Blue"])));

    responder.toggle_choice("c", "Blue");
    assert_eq!(responder.validate(), Err(FormError::Unanswered("Pick".to_owned())));
}

#[test]
fn numeric_answer_counts_as_answered() {
    let mut responder = loaded_responder(vec![question("r", "Rate us", true)]);
    responder.set_answer("r", json!(4));
    assert_eq!(responder.validate(), Ok(()));
    assert!(!responder.is_submitted());
}
