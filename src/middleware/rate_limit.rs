//! Rate limiting middleware.
//!
//! Selects a policy for every request, asks the shared [`RateLimiter`] for a
//! decision and either short-circuits with 429 or lets the request through,
//! attaching `X-RateLimit-*` headers to whatever the handler returns.

use crate::{
    config::RateLimitConfig,
    models::RateLimitErrorResponse,
    services::{AppMetrics, Decision, Policy, RateLimiter},
    utils::http::{ClientIdentity, client_identity},
};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
    web,
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    sync::Arc,
};

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limiting middleware factory
///
/// The limiter is passed in rather than created here so that every worker
/// shares one counter store.
pub struct RateLimit {
    limiter: RateLimiter,
    config: Arc<RateLimitConfig>,
}

impl RateLimit {
    pub fn new(limiter: RateLimiter, config: RateLimitConfig) -> Self {
        Self {
            limiter,
            config: Arc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
            config: self.config.clone(),
        }))
    }
}

/// The actual rate limiting middleware service
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: RateLimiter,
    config: Arc<RateLimitConfig>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let policy = if self.config.enabled {
            self.config.policy_for(req.method(), req.path()).cloned()
        } else {
            None
        };

        let Some(policy) = policy else {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        };

        let identity = req
            .extensions()
            .get::<ClientIdentity>()
            .map(|c| c.0.clone())
            .unwrap_or_else(|| client_identity(req.request(), self.config.trust_forwarded_headers));
        let decision = self.limiter.check(&identity, &policy);

        if let Some(metrics) = req.app_data::<web::Data<AppMetrics>>() {
            metrics.record_rate_limit(policy.id(), decision.is_allowed());
        }

        if let Some(message) = decision.rejection_message() {
            tracing::warn!(
                target: "rate_limit",
                identity = %identity,
                policy = %policy.id(),
                limit = policy.limit(),
                path = %req.path(),
                "Rate limit exceeded"
            );

            let response = rejection_response(&policy, &decision, message);
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            apply_rate_limit_headers(res.headers_mut(), &policy, &decision);
            Ok(res.map_into_left_body())
        })
    }
}

/// Attach `X-RateLimit-Limit`, `-Remaining` and `-Reset` for a decision
pub fn apply_rate_limit_headers(headers: &mut HeaderMap, policy: &Policy, decision: &Decision) {
    let values = [
        (LIMIT_HEADER, policy.limit().to_string()),
        (REMAINING_HEADER, decision.remaining().to_string()),
        (RESET_HEADER, decision.reset_at().timestamp().to_string()),
    ];

    for (name, value) in values {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}

fn rejection_response(policy: &Policy, decision: &Decision, message: String) -> HttpResponse {
    let mut response = HttpResponse::TooManyRequests().json(RateLimitErrorResponse { error: message });

    let headers = response.headers_mut();
    apply_rate_limit_headers(headers, policy, decision);

    if let Decision::Rejected { retry_after, .. } = decision {
        // Round up so clients never retry inside the current window
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        headers.insert(RETRY_AFTER, HeaderValue::from(secs.max(1)));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ManualClock;
    use actix_web::{App, HttpResponse, http::StatusCode, test};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn config(limit: u64) -> RateLimitConfig {
        RateLimitConfig {
            default: Policy::new("default", limit, Duration::from_secs(60)).unwrap(),
            ..RateLimitConfig::default()
        }
    }

    #[actix_web::test]
    async fn test_allowed_response_carries_headers() {
        let start = Utc.with_ymd_and_hms(2026, 1, 6, 15, 0, 0).unwrap();
        let limiter = RateLimiter::with_clock(Arc::new(ManualClock::new(start)));

        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(limiter, config(2)))
                .route("/talks", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/talks")
            .peer_addr("203.0.113.5:5000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(headers.get(LIMIT_HEADER).unwrap(), "2");
        assert_eq!(headers.get(REMAINING_HEADER).unwrap(), "1");
        assert_eq!(
            headers.get(RESET_HEADER).unwrap().to_str().unwrap(),
            (start.timestamp() + 60).to_string()
        );
    }

    #[actix_web::test]
    async fn test_rejection_short_circuits_handler() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(RateLimiter::new(), config(1)))
                .route("/talks", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/talks").to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = test::call_service(&app, test::TestRequest::get().uri("/talks").to_request()).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers().get(REMAINING_HEADER).unwrap(), "0");
        assert!(second.headers().contains_key(RETRY_AFTER));

        let body: serde_json::Value = test::read_body_json(second).await;
        assert_eq!(body, serde_json::json!({"error": "Rate limit exceeded: 1 per 1 minute"}));
    }

    #[actix_web::test]
    async fn test_disabled_limiter_passes_everything() {
        let mut disabled = config(1);
        disabled.enabled = false;

        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(RateLimiter::new(), disabled))
                .route("/talks", web::get().to(HttpResponse::Ok)),
        )
        .await;

        for _ in 0..3 {
            let resp = test::call_service(&app, test::TestRequest::get().uri("/talks").to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert!(!resp.headers().contains_key(LIMIT_HEADER));
        }
    }
}
