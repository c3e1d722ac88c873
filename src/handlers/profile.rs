//! Profile and quote endpoint handlers.

use crate::{
    error::ApiError,
    models::{Profile, ProfileMode, ProfileQuery, Quote, QuoteQuery},
    services::SeedData,
    utils::http::app_data,
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Profile endpoint
///
/// The optional `mode` switches the focus and tooling fields.
#[api_v2_operation(
    summary = "Get profile information",
    description = "Returns the main profile. The optional `mode` query parameter (default, conference, afterhours) selects which focus and favourite tools are included.",
    operation_id = "get_profile",
    tags("Profile")
)]
pub async fn get_profile(
    req: HttpRequest,
    query: web::Query<ProfileQuery>,
) -> Result<web::Json<Profile>, Error> {
    let data = app_data::<SeedData>(&req)?;

    let mode = match query.mode.as_deref() {
        Some(raw) => raw.parse::<ProfileMode>().map_err(ApiError::validation)?,
        None => ProfileMode::default(),
    };

    Ok(web::Json(data.profile(mode)))
}

#[api_v2_operation(
    summary = "Get a quote",
    description = "Returns a programming-related quote, optionally filtered by topic. Available topics: general, ai. Unknown topics fall back to general.",
    operation_id = "get_quote",
    tags("Profile")
)]
pub async fn get_quote(
    req: HttpRequest,
    query: web::Query<QuoteQuery>,
) -> Result<web::Json<Quote>, Error> {
    let data = app_data::<SeedData>(&req)?;
    Ok(web::Json(data.quote(query.topic.as_deref())))
}
