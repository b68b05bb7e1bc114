use std::sync::Arc;

use assessment_lead_api::{
    alerts::TelegramAlertChannel,
    config::Config,
    contact_store::PgContactStore,
    crime_data::FbiCrimeClient,
    db::Database,
    handlers::{self, AppState},
    pipeline::LeadPipeline,
};
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading (fails fast on missing credentials).
/// - Database connection pool shared by every request.
/// - Crime data and Telegram clients.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assessment_lead_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let crime_client = FbiCrimeClient::from_config(&config)?;
    tracing::info!("✓ Crime data client initialized: {}", config.fbi_api_base);

    let alert_channel = TelegramAlertChannel::from_config(&config)?;
    tracing::info!("✓ Telegram alert channel initialized");

    let pipeline = LeadPipeline::new(
        Arc::new(crime_client),
        Arc::new(PgContactStore::with_vertical_type(
            db.pool.clone(),
            &config.vertical_column_type,
        )),
        Arc::new(alert_channel),
        config.crm_base_url.clone(),
    );

    let app_state = Arc::new(AppState { pipeline });

    // Configure rate limiter: 5 requests/second per IP, burst of 10
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(5)
            .burst_size(10)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = handlers::api_routes(app_state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
