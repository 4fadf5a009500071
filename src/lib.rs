// Library exports for foodshare
// This allows integration tests and external code to use foodshare modules

pub mod auth;
pub mod config;
pub mod db;
pub mod donation;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
