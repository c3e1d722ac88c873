//! Skills endpoint handler.

use crate::{
    models::{SkillsList, SkillsQuery},
    services::SeedData,
    utils::http::app_data,
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

#[api_v2_operation(
    summary = "Get all skills",
    description = "Returns skills, optionally filtered by domain (Cloud, Low-Code, Collaboration, AI, Security, DevOps, Quality, Architecture, Development, Strategy). Matching is case-insensitive; an unknown domain yields an empty list.",
    operation_id = "list_skills",
    tags("Skills")
)]
pub async fn list_skills(
    req: HttpRequest,
    query: web::Query<SkillsQuery>,
) -> Result<web::Json<SkillsList>, Error> {
    let data = app_data::<SeedData>(&req)?;
    Ok(web::Json(data.skills(query.domain.as_deref()).into()))
}
