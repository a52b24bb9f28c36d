//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        DbAdapter, MockAi, OpenAiCurationAdapter, OpenAiEditorialAdapter, OpenAiSuggestAdapter,
        RssFetcher,
    },
    category::CategoryCache,
    cleanup,
    config::Config,
    error::ApiError,
    newspaper::{dates, NewspaperGenerator},
    web::{
        admin, middleware::RateLimiter, rate_limit, require_admin_key, rest, rest::ApiDoc, AppState,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use myrsspress_core::ports::{
    ArticleCurationService, EditorialService, FeedFetchService, FeedSuggestionService,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);
const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_adapter = Arc::new(DbAdapter::connect(&config.database_url).await?);
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let fetcher: Arc<dyn FeedFetchService> = Arc::new(RssFetcher::new()?);

    let (suggest_adapter, curation_adapter, editorial_adapter): (
        Arc<dyn FeedSuggestionService>,
        Arc<dyn ArticleCurationService>,
        Arc<dyn EditorialService>,
    ) = if config.mock_ai {
        info!("MOCK_AI enabled: using deterministic AI adapters");
        let mock = Arc::new(MockAi::new());
        (mock.clone(), mock.clone(), mock)
    } else {
        let api_key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?;
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        let openai_client = Client::with_config(openai_config);
        (
            Arc::new(OpenAiSuggestAdapter::new(
                openai_client.clone(),
                config.suggest_model.clone(),
            )),
            Arc::new(OpenAiCurationAdapter::new(
                openai_client.clone(),
                config.curation_model.clone(),
            )),
            Arc::new(OpenAiEditorialAdapter::new(
                openai_client,
                config.editorial_model.clone(),
            )),
        )
    };

    // --- 4. Build the Shared AppState ---
    let category_cache = Arc::new(CategoryCache::new(db_adapter.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(
        config.suggest_rate_limit,
        config.suggest_rate_window,
    ));
    let generator = NewspaperGenerator::new(
        db_adapter.clone(),
        fetcher.clone(),
        curation_adapter.clone(),
        editorial_adapter.clone(),
    );
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        fetcher,
        suggest_adapter,
        curation_adapter,
        editorial_adapter,
        category_cache,
        rate_limiter: rate_limiter.clone(),
        generator,
    });

    // --- 5. Background Tasks ---
    {
        let state = app_state.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                ticker.tick().await;
                match cleanup::sweep_expired_editions(state.db.as_ref(), dates::today()).await {
                    Ok(stats) if stats.deleted > 0 => {
                        info!(deleted = stats.deleted, "retention sweep complete")
                    }
                    Ok(_) => {}
                    Err(e) => error!("retention sweep failed: {}", e),
                }
            }
        });
    }
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RATE_LIMIT_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            rate_limiter.sweep();
        }
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // The suggestion endpoint carries its own per-IP rate limit.
    let suggest_route = Router::new()
        .route("/api/suggest-feeds", post(rest::suggest_feeds_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            rate_limit,
        ));

    let public_routes = Router::new()
        .route("/api/default-feeds", get(rest::default_feeds_handler))
        .route("/api/newspapers", post(rest::create_newspaper_handler))
        .route(
            "/api/newspapers/public",
            get(rest::list_public_newspapers_handler),
        )
        .route("/api/newspapers/{id}", get(rest::get_newspaper_handler))
        .route(
            "/api/newspapers/{id}/editions/{date}",
            get(rest::get_edition_handler),
        );

    let admin_routes = Router::new()
        .route("/api/admin/categories", get(admin::list_categories_handler))
        .route("/api/admin/categories", post(admin::create_category_handler))
        .route(
            "/api/admin/categories/{id}",
            put(admin::update_category_handler),
        )
        .route(
            "/api/admin/categories/{id}",
            delete(admin::delete_category_handler),
        )
        .route("/api/admin/feeds", get(admin::list_feeds_handler))
        .route("/api/admin/feeds", post(admin::create_feed_handler))
        .route("/api/admin/feeds/{id}", put(admin::update_feed_handler))
        .route("/api/admin/feeds/{id}", delete(admin::delete_feed_handler))
        .route("/api/admin/cleanup", post(admin::trigger_cleanup_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin_key,
        ));

    let api_router = Router::new()
        .merge(suggest_route)
        .merge(public_routes)
        .merge(admin_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
