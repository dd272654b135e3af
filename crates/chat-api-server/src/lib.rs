pub mod config;
pub mod document;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;
pub mod utils;
