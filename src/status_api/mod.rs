mod config;
mod server;
mod types;

pub use config::{StatusApiConfig, STATUS_API_ENV};
pub use server::{start_status_api, StatusApiHandle};
pub use types::{ServerEvent, SkySnapshot};
