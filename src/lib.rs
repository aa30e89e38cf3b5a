pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod deals;
pub mod error;
pub mod records;
pub mod registry;
pub mod store;
pub mod validation;
