// handlers/mod.rs - Two-tier handler architecture
//
// Public (no auth)        → /, /health, /auth/*, /store/:store/*
// Merchant (session auth) → /api/merchant/*, behind the token and tenant middleware
pub mod merchant;
pub mod public;
