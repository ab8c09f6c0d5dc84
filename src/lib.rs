pub mod analytics;
pub mod api;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod model;
