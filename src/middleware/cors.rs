//! CORS middleware implementation.

use crate::config::CorsConfig;
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{
        Method,
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
            ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, HeaderMap, HeaderValue,
            ORIGIN, VARY,
        },
    },
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    sync::Arc,
};

/// CORS middleware factory
pub struct Cors {
    config: Arc<CorsConfig>,
}

impl Cors {
    /// Create a new CORS middleware with the given configuration
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service,
            config: self.config.clone(),
        }))
    }
}

/// The actual CORS middleware service
pub struct CorsMiddleware<S> {
    service: S,
    config: Arc<CorsConfig>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
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
        let origin = req
            .headers()
            .get(ORIGIN)
            .and_then(|h| h.to_str().ok())
            .filter(|origin| self.config.is_origin_allowed(origin))
            .map(|origin| origin.to_string());

        let is_preflight = req.method() == Method::OPTIONS
            && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD);

        if is_preflight {
            let mut response = HttpResponse::NoContent().finish();
            let headers = response.headers_mut();

            if let Some(origin) = &origin {
                apply_origin_headers(headers, &self.config, origin);

                if let Ok(value) = HeaderValue::from_str(&self.config.allowed_methods) {
                    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, value);
                }
                // Any header the browser asks for is allowed
                if let Some(requested) = req.headers().get(ACCESS_CONTROL_REQUEST_HEADERS) {
                    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
                }
                headers.insert(
                    ACCESS_CONTROL_MAX_AGE,
                    HeaderValue::from(self.config.max_age_seconds),
                );
            }

            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }

        let fut = self.service.call(req);
        let config = self.config.clone();

        Box::pin(async move {
            let mut res = fut.await?;
            if let Some(origin) = &origin {
                apply_origin_headers(res.headers_mut(), &config, origin);
            }
            Ok(res.map_into_left_body())
        })
    }
}

fn apply_origin_headers(headers: &mut HeaderMap, config: &CorsConfig, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(VARY, HeaderValue::from_static("Origin"));

    if config.allow_credentials {
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}
