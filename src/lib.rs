pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod outputs;
pub mod response;
pub mod routes;
pub mod schema;
pub mod services;
pub mod state;
pub mod test_helpers;
