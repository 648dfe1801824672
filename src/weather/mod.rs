//! Weather and location lookups. The sky engine only consumes the resulting
//! [`Weather`]; everything network-related lives here.

mod client;
mod error;
mod types;

use std::future::Future;

use crate::sky::Weather;

pub use client::{OpenWeatherClient, DEFAULT_API_BASE};
pub use error::FetchError;
pub use types::{ApiParam, Location};

pub trait WeatherProvider {
    fn get_location(
        &self,
        param: &ApiParam,
    ) -> impl Future<Output = Result<Location, FetchError>> + Send;

    /// `day_origin` is the unix timestamp of local midnight; the returned
    /// sunrise/sunset are offsets from it.
    fn get_weather(
        &self,
        location: &Location,
        api_key: &str,
        day_origin: i64,
    ) -> impl Future<Output = Result<Weather, FetchError>> + Send;
}
