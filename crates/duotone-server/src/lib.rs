//! Duotone Server — upload, filter and download over HTTP.
//!
//! A small HTTP/1.1 server on tokio. `POST /api/process` takes a
//! `multipart/form-data` upload and returns the filtered image; everything
//! else is health checks and static frontend files.

pub mod config;
pub mod cors;
pub mod embedded_ui;
pub mod error;
pub mod multipart;
pub mod process;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod static_files;
pub mod wire;

// Re-exports for convenience.
pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{Server, lan_urls};
