pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod flags;
pub mod latex;
pub mod output;
pub mod records;
pub mod store;
