pub mod cli;
pub mod clock;
pub mod config;
pub mod config_watcher;
pub mod service;
pub mod settings_store;
pub mod sky;
pub mod status_api;
pub mod weather;
