pub mod accounts;
pub mod database;
pub mod media;
