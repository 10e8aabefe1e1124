//! Social network REST backend: users, posts, comments and notifications
//! behind a hosted identity provider and a request-screening service.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod server;
pub mod services;
pub mod startup;
mod state;

#[cfg(test)]
mod test_support;

pub use state::AppState;
