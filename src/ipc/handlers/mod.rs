pub mod analytics;
pub mod auth;
pub mod core;
pub mod exports;
pub mod filters;
pub mod records;
