pub mod config;
pub mod error;
pub mod event_sink;
pub mod logging;
pub mod normalization;
pub mod poller;
pub mod shared_types;
pub mod transaction_summary;
pub mod yahoo_client;
