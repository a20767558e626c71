pub mod auth;
pub mod configuration;
pub mod credential_store;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod telemetry;
