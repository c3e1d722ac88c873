//! Talk question submission models and validation.

use chrono::{DateTime, Utc};
use paperclip::actix::Apiv2Schema;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NAME_MAX_CHARS: usize = 100;
pub const QUESTION_MIN_CHARS: usize = 10;
pub const QUESTION_MAX_CHARS: usize = 2000;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

/// Request body for asking a question about a talk
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct TalkQuestion {
    pub name: String,
    /// Optional address for a reply
    pub email: Option<String>,
    pub question: String,
}

/// A single field that failed validation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl TalkQuestion {
    /// Check field lengths and email shape, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            errors.push(FieldError {
                field: "name",
                message: "Name must not be empty".to_string(),
            });
        } else if name_len > NAME_MAX_CHARS {
            errors.push(FieldError {
                field: "name",
                message: format!("Name must be at most {NAME_MAX_CHARS} characters"),
            });
        }

        let question_len = self.question.trim().chars().count();
        if !(QUESTION_MIN_CHARS..=QUESTION_MAX_CHARS).contains(&question_len) {
            errors.push(FieldError {
                field: "question",
                message: format!(
                    "Question must be between {QUESTION_MIN_CHARS} and {QUESTION_MAX_CHARS} characters"
                ),
            });
        }

        if let Some(email) = &self.email {
            let valid = Regex::new(EMAIL_PATTERN)
                .map(|re| re.is_match(email.trim()))
                .unwrap_or(false);
            if !valid {
                errors.push(FieldError {
                    field: "email",
                    message: "Email address is not valid".to_string(),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Acknowledgement returned once a question has been stored
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct TalkQuestionResponse {
    pub id: String,
    pub message: String,
    pub talk_id: String,
    pub status: String,
}

/// A question as persisted in the questions file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: String,
    pub talk_id: String,
    pub name: String,
    pub email: Option<String>,
    pub question: String,
    pub submitted_at: DateTime<Utc>,
}
