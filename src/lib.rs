pub mod app;
pub mod engine;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
