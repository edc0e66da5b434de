// handlers/merchant/mod.rs - Merchant dashboard handlers
//
// Security Level: session token with a tenant id, tenant must still exist
// Route Prefix: /api/merchant
// Middleware: jwt_auth_middleware → require_tenant_middleware
//
// Every handler receives `CurrentTenant` and only touches that tenant's rows.

pub mod brands;
pub mod categories;
pub mod products;
pub mod spec_groups;
pub mod traffic;
pub mod uploads;
pub mod whoami;

pub use whoami::get as whoami_get;
