//! Surveys: the owner's list, the draft editor and the public responder.
//!
//! SYSTEM CONTEXT
//! ==============
//! A survey is built entirely client-side as a [`SurveyDraft`]; question ids
//! are minted locally with [`generate_uuid`] and stored by the backend as-is.
//! Answers submitted through [`SurveyResponder`] are keyed by those ids.
//!
//! The responder route is public: it works with or without a session.

#[cfg(test)]
#[path = "survey_test.rs"]
mod survey_test;

use serde_json::Value;

use super::{FormError, PageError, ensure_access, fetch, non_blank};
use crate::net::api;
use crate::net::http::ApiClient;
use crate::net::types::{Answers, NewSurvey, NewSurveyResponse, Question, QuestionKind, Survey, SurveyResponse};
use crate::state::resource::Resource;
use crate::state::route::Route;
use crate::state::session::SessionStore;
use crate::util::uuid::generate_uuid;

/// Label of the option a new choice question starts with.
pub const FIRST_OPTION: &str = "Option 1";

// =============================================================================
// LIST
// =============================================================================

#[derive(Debug, Default)]
pub struct SurveysPage {
    pub surveys: Resource<Vec<Survey>>,
}

impl SurveysPage {
    /// # Errors
    ///
    /// Returns the redirect route when the session is anonymous.
    pub async fn load(&mut self, session: &SessionStore) -> Result<(), Route> {
        ensure_access(Route::Surveys, session)?;
        fetch(&mut self.surveys, api::list_surveys(session.api())).await;
        Ok(())
    }

    /// Save a draft and re-list.
    ///
    /// # Errors
    ///
    /// [`PageError::Form`] without a title, else any backend failure.
    pub async fn publish(&mut self, api: &ApiClient, draft: &SurveyDraft) -> Result<Survey, PageError> {
        let body = draft.to_new_survey()?;
        let created = api::create_survey(api, &body).await?;
        fetch(&mut self.surveys, api::list_surveys(api)).await;
        Ok(created)
    }
}

// =============================================================================
// DRAFT
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurveyDraft {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

impl SurveyDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blank question and return its id.
    pub fn add_question(&mut self, kind: QuestionKind) -> String {
        let id = generate_uuid();
        let options = (kind == QuestionKind::MultipleChoice).then(|| vec![FIRST_OPTION.to_owned()]);
        self.questions.push(Question {
            id: id.clone(),
            kind,
            label: String::new(),
            options,
            required: false,
        });
        id
    }

    #[must_use]
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Apply `edit` to one question. Returns `false` for an unknown id.
    pub fn update_question(&mut self, question_id: &str, edit: impl FnOnce(&mut Question)) -> bool {
        match self.questions.iter_mut().find(|q| q.id == question_id) {
            Some(question) => {
                edit(question);
                true
            }
            None => false,
        }
    }

    pub fn remove_question(&mut self, question_id: &str) -> bool {
        let before = self.questions.len();
        self.questions.retain(|q| q.id != question_id);
        self.questions.len() != before
    }

    /// Append "Option N" where N is the new option count.
    pub fn add_option(&mut self, question_id: &str) -> bool {
        self.update_question(question_id, |question| {
            let options = question.options.get_or_insert_with(Vec::new);
            options.push(format!("Option {}", options.len() + 1));
        })
    }

    pub fn set_option(&mut self, question_id: &str, index: usize, label: &str) -> bool {
        let mut changed = false;
        self.update_question(question_id, |question| {
            if let Some(slot) = question.options.as_mut().and_then(|o| o.get_mut(index)) {
                label.clone_into(slot);
                changed = true;
            }
        });
        changed
    }

    pub fn remove_option(&mut self, question_id: &str, index: usize) -> bool {
        let mut removed = false;
        self.update_question(question_id, |question| {
            if let Some(options) = question.options.as_mut().filter(|o| index < o.len()) {
                options.remove(index);
                removed = true;
            }
        });
        removed
    }

    /// # Errors
    ///
    /// [`FormError::Required`] when the title is blank.
    pub fn to_new_survey(&self) -> Result<NewSurvey, FormError> {
        Ok(NewSurvey {
            title: non_blank(&self.title).ok_or(FormError::Required("Title"))?,
            description: self.description.trim().to_owned(),
            questions: self.questions.clone(),
        })
    }
}

// =============================================================================
// RESPONDER
// =============================================================================

#[derive(Debug, Default)]
pub struct SurveyResponder {
    pub survey: Resource<Survey>,
    answers: Answers,
    submitted: bool,
}

impl SurveyResponder {
    /// Fetch a survey by id. No session is needed.
    pub async fn load(&mut self, api: &ApiClient, survey_id: i64) {
        fetch(&mut self.survey, api::get_survey(api, survey_id)).await;
    }

    pub fn set_answer(&mut self, question_id: &str, value: Value) {
        self.answers.insert(question_id.to_owned(), value);
    }

    /// Toggle one checkbox option in a multi-select answer.
    pub fn toggle_choice(&mut self, question_id: &str, option: &str) {
        let entry = self
            .answers
            .entry(question_id.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        if let Value::Array(chosen) = entry {
            match chosen.iter().position(|v| v.as_str() == Some(option)) {
                Some(index) => {
                    chosen.remove(index);
                }
                None => chosen.push(Value::String(option.to_owned())),
            }
        }
    }

    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// # Errors
    ///
    /// [`FormError::Unanswered`] naming the first required question without
    /// an answer.
    pub fn validate(&self) -> Result<(), FormError> {
        let Some(survey) = self.survey.data() else {
            return Err(FormError::Invalid("Survey not loaded"));
        };
        match survey
            .questions
            .iter()
            .find(|q| q.required && !is_answered(self.answers.get(&q.id)))
        {
            Some(question) => Err(FormError::Unanswered(question.label.clone())),
            None => Ok(()),
        }
    }

    /// # Errors
    ///
    /// [`PageError::Form`] if a required question is unanswered (nothing is
    /// sent), else any backend failure.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<SurveyResponse, PageError> {
        self.validate()?;
        let survey_id = self
            .survey
            .data()
            .map(|s| s.id)
            .ok_or(FormError::Invalid("Survey not loaded"))?;
        let body = NewSurveyResponse { answers: self.answers.clone() };
        let response = api::submit_survey_response(api, survey_id, &body).await?;
        self.submitted = true;
        Ok(response)
    }
}

fn is_answered(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}
