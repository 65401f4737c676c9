//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    middleware,
    routing::{get, post, put},
    Router,
};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::{CacheVersionService, ReadCache};
use crate::domains::auth::JwtService;
use crate::domains::chat::ChatService;
use crate::domains::deck::{DeckService, DeckSessionStore};
use crate::domains::decisions::DecisionProcessor;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    get_conversations_handler, get_deck_handler, health_handler, post_decision_handler,
    put_preference_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis: ConnectionManager,
    pub cache_versions: CacheVersionService,
    pub deck_service: DeckService,
    pub decision_processor: DecisionProcessor,
    pub chat_service: ChatService,
}

impl AppState {
    /// Wire up all services over one database pool and one Redis
    /// connection manager.
    pub fn new(db_pool: PgPool, redis: ConnectionManager) -> Self {
        let cache_versions = CacheVersionService::new(redis.clone());
        let read_cache = ReadCache::new(redis.clone());
        let sessions = DeckSessionStore::new(redis.clone());

        let chat_service = ChatService::new(
            db_pool.clone(),
            cache_versions.clone(),
            read_cache.clone(),
        );
        let deck_service = DeckService::new(
            db_pool.clone(),
            sessions,
            cache_versions.clone(),
            read_cache,
        );
        let decision_processor = DecisionProcessor::new(
            db_pool.clone(),
            chat_service.clone(),
            cache_versions.clone(),
        );

        Self {
            db_pool,
            redis,
            cache_versions,
            deck_service,
            decision_processor,
            chat_service,
        }
    }
}

/// Build the axum application
pub fn build_app(db_pool: PgPool, redis: ConnectionManager, jwt_service: Arc<JwtService>) -> Router {
    let state = AppState::new(db_pool, redis);

    Router::new()
        .route("/health", get(health_handler))
        .route("/me/deck", get(get_deck_handler))
        .route("/me/decision", post(post_decision_handler))
        .route("/me/conversations", get(get_conversations_handler))
        .route("/me/preference", put(put_preference_handler))
        .layer(middleware::from_fn(
            move |request: axum::extract::Request, next: middleware::Next| {
                let jwt_service = jwt_service.clone();
                async move { jwt_auth_middleware(jwt_service, request, next).await }
            },
        ))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
