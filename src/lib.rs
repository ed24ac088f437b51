pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod schemas;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

#[cfg(feature = "client")]
pub mod client;

pub use app::create_app;
pub use error::ApiError;
