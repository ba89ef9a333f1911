pub mod config;
pub mod discovery;
pub mod error_log;
pub mod fetcher;
pub mod retry;
pub mod store;
pub mod update;
