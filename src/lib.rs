pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod services;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::media::MediaStore;

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(pool: PgPool, media: Arc<dyn MediaStore>) -> Self {
        Self { pool, media }
    }
}

pub fn app(state: AppState) -> Router {
    let api = &config::config().api;

    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(auth_routes())
        .merge(store_routes())
        // Merchant dashboard
        .nest("/api/merchant", merchant_routes(state.clone()))
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(cors_layer());

    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn auth_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
        .route("/auth/logout", post(auth::logout_post))
}

fn store_routes() -> Router<AppState> {
    use handlers::public::store;

    Router::new()
        .route("/store/:store/categories", get(store::categories_get))
        .route("/store/:store/categories/tree", get(store::category_tree_get))
        .route("/store/:store/brands", get(store::brands_get))
        .route("/store/:store/products", get(store::products_get))
        .route("/store/:store/products/:id", get(store::product_get))
        .route("/store/:store/cart", post(store::cart_post))
        .route("/store/:store/visits", post(store::visits_post))
}

fn merchant_routes(state: AppState) -> Router<AppState> {
    use handlers::merchant::{brands, categories, products, spec_groups, traffic, uploads, whoami_get};

    Router::new()
        .route("/whoami", get(whoami_get))
        // Products
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            get(products::get).put(products::update).delete(products::delete),
        )
        // Image uploads
        .route("/uploads/sign", post(uploads::sign))
        .route("/uploads/complete", post(uploads::complete))
        .route("/uploads/delete", post(uploads::delete))
        // Catalog structure
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/tree", get(categories::tree))
        .route("/categories/:id", put(categories::update).delete(categories::delete))
        .route("/brands", get(brands::list).post(brands::create))
        .route("/brands/:id", put(brands::update).delete(brands::delete))
        .route("/spec-groups", get(spec_groups::list).post(spec_groups::create))
        .route("/spec-groups/:id", put(spec_groups::update).delete(spec_groups::delete))
        // Traffic
        .route("/traffic", get(traffic::list))
        .route("/traffic/:id", axum::routing::delete(traffic::delete))
        // the last route_layer runs first: token, then tenant
        .route_layer(from_fn_with_state(state, middleware::require_tenant_middleware))
        .route_layer(from_fn(middleware::jwt_auth_middleware))
}
