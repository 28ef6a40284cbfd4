pub mod routes;
pub mod startup;
pub mod configuration;
pub mod telemetry;
pub mod utils;
pub mod schema;
pub mod models;
pub mod password;
pub mod ai_client;
pub mod analytics_client;
pub mod domain;
pub mod auth;
pub mod identity;
pub mod db_interaction;
