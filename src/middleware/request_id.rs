//! Request ID middleware for tracing and logging.

use crate::utils::http::{ClientIdentity, client_identity, extract_user_agent};
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    time::Instant,
};
use tracing::Instrument;
use uuid::Uuid;

/// Request ID carried in request extensions for handlers that want it
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Request ID middleware factory
///
/// Reuses an incoming `X-Request-ID` header or generates a UUID, echoes it on
/// the response and runs the rest of the chain inside a `request` span.
/// The client identity is resolved once here and stored as a
/// [`ClientIdentity`] extension, so the rate limiter counts against the same
/// identity that appears in the request logs.
pub struct RequestIdMiddleware {
    trust_forwarded_headers: bool,
}

impl RequestIdMiddleware {
    pub fn new(trust_forwarded_headers: bool) -> Self {
        Self {
            trust_forwarded_headers,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdService {
            service,
            trust_forwarded_headers: self.trust_forwarded_headers,
        }))
    }
}

/// The actual request ID middleware service
pub struct RequestIdService<S> {
    service: S,
    trust_forwarded_headers: bool,
}

impl<S, B> Service<ServiceRequest> for RequestIdService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();

        let request_id = req
            .headers()
            .get("X-Request-ID")
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let client = client_identity(req.request(), self.trust_forwarded_headers);
        req.extensions_mut().insert(RequestId(request_id.clone()));
        req.extensions_mut().insert(ClientIdentity(client.clone()));

        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.path(),
        );

        span.in_scope(|| {
            tracing::info!(
                target: "request",
                client = %client,
                user_agent = ?extract_user_agent(req.request()),
                "Incoming request"
            );
        });

        let fut = {
            let _entered = span.enter();
            self.service.call(req)
        };

        Box::pin(
            async move {
                let mut res = fut.await?;

                res.headers_mut().insert(
                    HeaderName::from_static("x-request-id"),
                    HeaderValue::from_str(&request_id)
                        .unwrap_or_else(|_| HeaderValue::from_static("invalid")),
                );

                tracing::info!(
                    target: "request",
                    status = res.status().as_u16(),
                    duration_ms = start_time.elapsed().as_millis() as u64,
                    "Request completed"
                );

                Ok(res)
            }
            .instrument(span),
        )
    }
}
