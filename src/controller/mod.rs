pub mod admin;
pub mod handler;
