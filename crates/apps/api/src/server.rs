use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use axum::Router;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_services::assignment::postgres::{PgCrewDirectory, PgJobStore};
use common_services::assignment::{AssignmentDispatcher, AssignmentScheduler};
use common_services::geocode::NominatimGeocoder;
use common_services::notify::notifier_from_settings;
use http::{HeaderValue, header};
use sqlx::PgPool;
use std::iter::once;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Wires the stores, geocoder, notifier and assignment dispatcher into the shared state.
pub fn build_context(
    pool: PgPool,
    settings: AppSettings,
    shutdown: CancellationToken,
) -> Result<ApiContext> {
    let notifier = notifier_from_settings(&settings.notifications)?;
    if settings.notifications.has_webhook() {
        info!("Crew notifications go to the configured webhook.");
    } else {
        info!("No notification webhook configured, crew notifications are logged only.");
    }

    let scheduler = AssignmentScheduler::new(
        Arc::new(PgCrewDirectory::new(pool.clone())),
        Arc::new(PgJobStore::new(pool.clone())),
        notifier,
        settings.constants.assignment,
    );

    Ok(ApiContext {
        geocoder: Arc::new(NominatimGeocoder::new(&settings.geocoding)?),
        dispatcher: AssignmentDispatcher::new(Arc::new(scheduler), shutdown),
        pool,
        settings,
    })
}

/// Router with CORS, tracing, compression and header redaction applied.
pub fn build_app(api_state: ApiContext) -> Router {
    let allowed_origins: Vec<HeaderValue> = api_state
        .settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::USER_AGENT,
            header::CACHE_CONTROL,
        ]);

    create_router(api_state)
        .layer(TraceLayer::new_for_http().on_request(()))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(SetSensitiveRequestHeadersLayer::new(once(
            header::AUTHORIZATION,
        )))
}

pub async fn serve(pool: PgPool, settings: AppSettings) -> Result<()> {
    info!("Initializing server...");
    let shutdown = CancellationToken::new();
    let api_state = build_context(pool, settings.clone(), shutdown.clone())?;
    let dispatcher = api_state.dispatcher.clone();
    let app = build_app(api_state);

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down, cancelling running crew assignments.");
            dispatcher.shutdown();
        })
        .await?;
    Ok(())
}
