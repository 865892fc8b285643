pub mod api;
pub mod config;
pub mod context;
pub mod credentials;
pub mod logging;
pub mod output;
pub mod presenter;
pub mod records;
pub mod report;
pub mod scoring;
pub mod server;
