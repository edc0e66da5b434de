// handlers/public/store/mod.rs - Shopper-facing catalog, scoped by store slug
//
// GET  /store/:store/categories        flat category list
// GET  /store/:store/categories/tree   grouped category tree
// GET  /store/:store/brands
// GET  /store/:store/products          product summaries
// GET  /store/:store/products/:id      product detail page
// POST /store/:store/cart              cart lines for product ids
// POST /store/:store/visits            page visit tracking

pub mod cart;
pub mod catalog;
pub mod products;
pub mod visits;

pub use cart::post as cart_post;
pub use catalog::{brands_get, categories_get, category_tree_get};
pub use products::{get as product_get, list as products_get};
pub use visits::post as visits_post;

use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::services::TenantService;
use crate::AppState;

/// Tenant behind a public store slug; unknown stores are 404
pub(crate) async fn store_tenant(state: &AppState, store: &str) -> Result<Tenant, ApiError> {
    Ok(TenantService::new(state.pool.clone()).find_by_slug(store).await?)
}
