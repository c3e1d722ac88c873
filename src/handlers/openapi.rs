//! OpenAPI specification generation and app factory.

use crate::{
    error::ApiError,
    handlers::{
        docs, get_metrics, get_profile, get_quote, health, list_projects, list_skills, list_talks,
        root, submit_question,
    },
    middleware::{Cors, MetricsMiddleware, RateLimit, RequestIdMiddleware},
    state::AppState,
};
use actix_web::{
    App, Error,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
};
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Creates the OpenAPI specification served at `/openapi.json`
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Profile API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "A playful REST API that serves as a personal introduction.\n\n\
                ## Features\n\
                - **Profile** - personal information, with conference and after-hours modes\n\
                - **Skills** - technical skills filterable by domain\n\
                - **Talks** - speaking history, plus a way to ask questions about a talk\n\
                - **Projects** - portfolio projects with tech stacks\n\
                \n\
                ## Rate Limiting\n\
                Requests are counted per client IP in fixed windows. Each route group has its own policy:\n\
                - `profile` - `/profile` and `/profile/*`\n\
                - `mutating` - every `POST`\n\
                - `default` - everything else\n\
                \n\
                `/health`, `/metrics` and the documentation routes are not limited.\n\
                \n\
                **Response headers:**\n\
                - `X-RateLimit-Limit`: requests allowed per window\n\
                - `X-RateLimit-Remaining`: requests left in the current window\n\
                - `X-RateLimit-Reset`: Unix timestamp at which the window resets\n\
                \n\
                When the limit is exceeded the API answers `429 Too Many Requests` with a `Retry-After` header and a body such as\n\
                `{\"error\": \"Rate limit exceeded: 5 per 1 minute\"}`.\n\
                \n\
                ## Errors\n\
                Other failures use a consistent body: `{\"error\": {\"code\": \"...\", \"message\": \"...\", \"details\": ...}}`."
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Reject malformed JSON bodies with 422 and the standard error body
fn json_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| ApiError::validation(format!("Invalid request body: {err}")).into())
}

/// Reject malformed query strings with 422 and the standard error body
fn query_config() -> actix_web::web::QueryConfig {
    actix_web::web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::validation(format!("Invalid query parameters: {err}")).into()
    })
}

/// Creates the application from already loaded state
///
/// Middleware order, outermost first: CORS, request ID, metrics, rate
/// limiting. Preflight requests are answered before they are counted, and
/// rejected requests still get a request ID and show up in metrics.
pub fn create_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(RateLimit::new(state.limiter.clone(), state.rate_limit.clone()))
        .wrap(MetricsMiddleware)
        .wrap(RequestIdMiddleware::new(state.rate_limit.trust_forwarded_headers))
        .wrap(Cors::new(state.cors.clone()))
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(state.data.clone())
        .app_data(state.questions.clone())
        .app_data(state.metrics.clone())
        .app_data(web::Data::new(state.metrics_config.clone()))
        .app_data(json_config())
        .app_data(query_config())
        .service(web::resource("/profile").route(web::get().to(get_profile)))
        .service(web::resource("/profile/quotes").route(web::get().to(get_quote)))
        .service(web::resource("/skills").route(web::get().to(list_skills)))
        .service(web::resource("/talks").route(web::get().to(list_talks)))
        .service(web::resource("/talks/{talk_id}/questions").route(web::post().to(submit_question)))
        .service(web::resource("/projects").route(web::get().to(list_projects)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/metrics").route(web::get().to(get_metrics)))
        .with_json_spec_at("/openapi.json")
        .build()
        .route("/", actix_web::web::get().to(root))
        .route("/docs", actix_web::web::get().to(docs))
}
