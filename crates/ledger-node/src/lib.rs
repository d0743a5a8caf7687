pub mod client;
pub mod config;
mod constants;
pub mod routes;
