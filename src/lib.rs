// Library exports for socialx
// This allows integration tests and external code to use socialx modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feed;
pub mod graphql;
pub mod routes;
pub mod state;
