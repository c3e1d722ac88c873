//! Talk listing and question submission handlers.

use crate::{
    error::ApiError,
    models::{TalkQuestion, TalkQuestionResponse, TalksList, TalksQuery},
    services::{AppMetrics, QuestionStore, SeedData},
    utils::http::app_data,
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

#[api_v2_operation(
    summary = "Get all talks",
    description = "Returns speaking engagements, optionally filtered by the year they were given.",
    operation_id = "list_talks",
    tags("Talks")
)]
pub async fn list_talks(
    req: HttpRequest,
    query: web::Query<TalksQuery>,
) -> Result<web::Json<TalksList>, Error> {
    let data = app_data::<SeedData>(&req)?;
    Ok(web::Json(data.talks(query.year).into()))
}

/// Question submission endpoint
///
/// Validates the body before looking the talk up, stores the question and
/// emits a notification event.
#[api_v2_operation(
    summary = "Ask a question about a talk",
    description = "Submits a question for a talk. The question must be 10 to 2000 characters; email is optional. Subject to the stricter rate limit for mutating requests.",
    operation_id = "submit_talk_question",
    tags("Talks")
)]
pub async fn submit_question(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<TalkQuestion>,
) -> Result<web::Json<TalkQuestionResponse>, Error> {
    let talk_id = path.into_inner();
    let question = body.into_inner();

    if let Err(errors) = question.validate() {
        return Err(ApiError::Validation {
            message: "Question failed validation".to_string(),
            details: serde_json::to_value(&errors).ok(),
        }
        .into());
    }

    let data = app_data::<SeedData>(&req)?;
    let talk = data
        .talk(&talk_id)
        .ok_or_else(|| ApiError::NotFound(format!("Talk '{talk_id}' not found")))?;

    let store = app_data::<QuestionStore>(&req)?;
    let stored = store.submit(&talk.id, &question).await.map_err(ApiError::from)?;

    if let Some(metrics) = req.app_data::<web::Data<AppMetrics>>() {
        metrics.talk_questions_total.inc();
    }

    tracing::info!(
        target: "notification",
        question_id = %stored.id,
        talk_id = %stored.talk_id,
        talk_title = %talk.title,
        has_email = stored.email.is_some(),
        "New talk question received"
    );

    Ok(web::Json(TalkQuestionResponse {
        id: stored.id,
        message: format!("Thanks {}, your question about '{}' was received", stored.name, talk.title),
        talk_id: stored.talk_id,
        status: "received".to_string(),
    }))
}
