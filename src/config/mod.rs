pub mod admin_auth;
pub mod config;
