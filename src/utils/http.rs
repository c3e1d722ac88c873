//! HTTP utility functions for extracting request information.

use actix_web::{HttpRequest, web};

/// Identity used when no client address can be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client identity resolved once per request, stored in request extensions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

/// Resolve the rate limiting identity for a request
///
/// Uses the socket peer address unless `trust_forwarded` is set, in which
/// case the first `X-Forwarded-For` hop (or `X-Real-IP`) wins. Forwarded
/// headers are client controlled, so only trust them behind a proxy that
/// overwrites them.
pub fn client_identity(req: &HttpRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        for header_name in ["X-Forwarded-For", "X-Real-IP"] {
            let forwarded = req
                .headers()
                .get(header_name)
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty());

            if let Some(ip) = forwarded {
                return ip.to_string();
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Extract user agent from request headers
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// Fetch shared state registered with `App::app_data`
pub fn app_data<T: 'static>(req: &HttpRequest) -> Result<&web::Data<T>, actix_web::Error> {
    req.app_data::<web::Data<T>>()
        .ok_or_else(|| crate::error::ApiError::Unavailable(std::any::type_name::<T>()).into())
}
