// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, service info and the shopper-facing storefront.
// Input is untrusted here, so every handler validates what it reads.

pub mod auth;
pub mod service;
pub mod store;

pub use service::{health, root};
