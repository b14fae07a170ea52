pub mod accused;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod geocode;
pub mod photos;
pub mod state;
