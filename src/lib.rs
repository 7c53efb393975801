pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod reports;
pub mod routes;
pub mod state;

#[cfg(test)]
pub mod testing;
