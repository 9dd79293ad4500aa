pub mod batch;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod fetcher;
pub mod logging;
pub mod manifest;
pub mod progress;
