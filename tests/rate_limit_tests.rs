use actix_web::{http::StatusCode, test};
use chrono::{TimeZone, Utc};
use profile_api::{
    AppState, Clock, CorsConfig, ManualClock, MetricsConfig, Policy, RateLimitConfig, RateLimiter,
    ServerConfig, create_app,
};
use serde_json::{Value, json};
use std::{path::PathBuf, sync::Arc, time::Duration};

const CLIENT: &str = "203.0.113.5:41000";
const OTHER_CLIENT: &str = "198.51.100.7:41000";

fn policy(id: &str, limit: u64) -> Policy {
    Policy::new(id, limit, Duration::from_secs(60)).unwrap()
}

/// App state with small limits and a limiter driven by `clock`
fn limited_state(clock: Arc<ManualClock>) -> AppState {
    let server = ServerConfig {
        data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
        ..ServerConfig::default()
    };
    let rate_limit = RateLimitConfig {
        default: policy("default", 3),
        profile: policy("profile", 2),
        mutating: policy("mutating", 1),
        ..RateLimitConfig::default()
    };

    AppState::new(server, rate_limit, CorsConfig::default(), MetricsConfig::default())
        .expect("seed data should load")
        .with_limiter(RateLimiter::with_clock(clock))
}

fn start_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
    ))
}

fn get_from(uri: &str, peer: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .peer_addr(peer.parse().unwrap())
}

fn header(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>, name: &str) -> String {
    resp.headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing {name} header"))
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn test_limit_of_three_per_minute() {
    let clock = start_clock();
    let app = test::init_service(create_app(limited_state(clock.clone()))).await;

    for expected_remaining in ["2", "1", "0"] {
        let resp = test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "x-ratelimit-limit"), "3");
        assert_eq!(header(&resp, "x-ratelimit-remaining"), expected_remaining);
    }

    let resp = test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&resp, "x-ratelimit-remaining"), "0");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Rate limit exceeded: 3 per 1 minute"}));
}

#[actix_web::test]
async fn test_rejection_headers_point_at_window_end() {
    let clock = start_clock();
    let window_end = clock.now() + chrono::TimeDelta::seconds(60);
    let app = test::init_service(create_app(limited_state(clock.clone()))).await;

    for _ in 0..3 {
        test::call_service(&app, get_from("/skills", CLIENT).to_request()).await;
    }

    clock.advance(Duration::from_secs(20));
    let resp = test::call_service(&app, get_from("/skills", CLIENT).to_request()).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&resp, "retry-after"), "40");
    assert_eq!(
        header(&resp, "x-ratelimit-reset"),
        window_end.timestamp().to_string()
    );
}

#[actix_web::test]
async fn test_window_rollover_restores_quota() {
    let clock = start_clock();
    let app = test::init_service(create_app(limited_state(clock.clone()))).await;

    for _ in 0..3 {
        test::call_service(&app, get_from("/projects", CLIENT).to_request()).await;
    }
    let blocked = test::call_service(&app, get_from("/projects", CLIENT).to_request()).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    clock.advance(Duration::from_secs(60));

    let resp = test::call_service(&app, get_from("/projects", CLIENT).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-ratelimit-remaining"), "2");
}

#[actix_web::test]
async fn test_clients_are_counted_separately() {
    let app = test::init_service(create_app(limited_state(start_clock()))).await;

    for _ in 0..3 {
        test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
    }
    let blocked = test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = test::call_service(&app, get_from("/talks", OTHER_CLIENT).to_request()).await;
    assert_eq!(other.status(), StatusCode::OK);
    assert_eq!(header(&other, "x-ratelimit-remaining"), "2");
}

#[actix_web::test]
async fn test_route_groups_have_separate_budgets() {
    let app = test::init_service(create_app(limited_state(start_clock()))).await;

    for _ in 0..2 {
        let resp = test::call_service(&app, get_from("/profile", CLIENT).to_request()).await;
        assert_eq!(header(&resp, "x-ratelimit-limit"), "2");
    }
    let blocked = test::call_service(&app, get_from("/profile/quotes", CLIENT).to_request()).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(blocked).await;
    assert_eq!(body["error"], "Rate limit exceeded: 2 per 1 minute");

    let resp = test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-ratelimit-limit"), "3");
}

#[actix_web::test]
async fn test_question_submission_uses_mutating_policy() {
    let app = test::init_service(create_app(limited_state(start_clock()))).await;

    let submit = || {
        test::TestRequest::post()
            .uri("/talks/rate-limits-2024/questions")
            .peer_addr(CLIENT.parse().unwrap())
            .set_json(json!({"name": "Ada", "question": "Which window did you pick and why?"}))
            .to_request()
    };

    let first = test::call_service(&app, submit()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "x-ratelimit-limit"), "1");

    let second = test::call_service(&app, submit()).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // Reads are unaffected by the exhausted mutating budget
    let read = test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
    assert_eq!(read.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_operational_routes_are_exempt() {
    let app = test::init_service(create_app(limited_state(start_clock()))).await;

    for _ in 0..10 {
        for uri in ["/health", "/metrics", "/openapi.json", "/docs"] {
            let resp = test::call_service(&app, get_from(uri, CLIENT).to_request()).await;
            assert!(resp.status().is_success(), "{uri} should not be limited");
            assert!(!resp.headers().contains_key("x-ratelimit-limit"));
        }
    }
}

#[actix_web::test]
async fn test_rejections_are_counted_in_metrics() {
    let app = test::init_service(create_app(limited_state(start_clock()))).await;

    for _ in 0..4 {
        test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
    }

    let resp = test::call_service(&app, get_from("/metrics", CLIENT).to_request()).await;
    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();

    let rejected = text
        .lines()
        .find(|line| {
            line.starts_with("rate_limit_decisions_total{")
                && line.contains(r#"policy="default""#)
                && line.contains(r#"outcome="rejected""#)
        })
        .expect("rejected decisions should be exported");
    assert!(rejected.ends_with(" 1"));
}

#[actix_web::test]
async fn test_disabled_rate_limiting() {
    let mut state = limited_state(start_clock());
    state.rate_limit.enabled = false;
    let app = test::init_service(create_app(state)).await;

    for _ in 0..10 {
        let resp = test::call_service(&app, get_from("/talks", CLIENT).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!resp.headers().contains_key("x-ratelimit-limit"));
    }
}

#[actix_web::test]
async fn test_forwarded_header_identity_when_trusted() {
    let mut state = limited_state(start_clock());
    state.rate_limit.trust_forwarded_headers = true;
    let app = test::init_service(create_app(state)).await;

    let via_proxy = |client: &str| {
        test::TestRequest::get()
            .uri("/talks")
            .peer_addr("10.0.0.2:8080".parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("{client}, 10.0.0.2")))
            .to_request()
    };

    for _ in 0..3 {
        test::call_service(&app, via_proxy("203.0.113.5")).await;
    }
    let blocked = test::call_service(&app, via_proxy("203.0.113.5")).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = test::call_service(&app, via_proxy("198.51.100.7")).await;
    assert_eq!(other.status(), StatusCode::OK);
}
