//! Projects endpoint handler.

use crate::{models::ProjectsList, services::SeedData, utils::http::app_data};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

#[api_v2_operation(
    summary = "Get all projects",
    description = "Returns current and past projects including status, tech stack and links to demos or repositories.",
    operation_id = "list_projects",
    tags("Projects")
)]
pub async fn list_projects(req: HttpRequest) -> Result<web::Json<ProjectsList>, Error> {
    let data = app_data::<SeedData>(&req)?;
    Ok(web::Json(data.projects().into()))
}
