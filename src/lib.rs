pub mod auth;
pub mod cache;
pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod validation;
