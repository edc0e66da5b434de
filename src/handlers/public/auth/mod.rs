// handlers/public/auth/mod.rs - Session acquisition and release

pub mod login;
pub mod logout;
pub mod register;

pub use login::post as login_post;
pub use logout::post as logout_post;
pub use register::post as register_post;
