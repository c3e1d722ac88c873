use actix_web::HttpServer;
use profile_api::{AppState, LogFormat, ServerConfig, create_app, services::spawn_sweeper};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A broken server config is reported again by AppState::from_env below
    let log_format = ServerConfig::from_env()
        .map(|config| config.log_format)
        .unwrap_or(LogFormat::Text);
    init_tracing(log_format);

    let state = match AppState::from_env() {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "Failed to start");
            return Err(std::io::Error::other(err.to_string()));
        }
    };

    let rate_limit = &state.rate_limit;
    tracing::info!(
        enabled = rate_limit.enabled,
        default = %rate_limit.default.describe(),
        profile = %rate_limit.profile.describe(),
        mutating = %rate_limit.mutating.describe(),
        trust_proxy = rate_limit.trust_forwarded_headers,
        "Rate limiting configured"
    );

    let metrics = state.metrics.clone();
    spawn_sweeper(
        state.limiter.clone(),
        rate_limit.sweep_interval(),
        move |tracked| metrics.set_tracked_keys(tracked),
    );

    let bind = state.server.bind_address();
    tracing::info!(host = %bind.0, port = bind.1, "Starting server");

    HttpServer::new(move || create_app(state.clone()))
        .bind(bind)?
        .run()
        .await
}
