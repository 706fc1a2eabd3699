pub mod config;
pub mod configurer;
pub mod container;
pub mod converter;
pub mod error;
pub mod error_handler;
pub mod factory;
pub mod kafka;
pub mod mapper;
pub mod properties;
pub mod record;
pub mod traits;
