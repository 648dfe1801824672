use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiParam {
    pub api_key: String,
    pub zip_code: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WeatherResponse {
    pub clouds: CloudsBody,
    pub sys: SysBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CloudsBody {
    pub all: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SysBody {
    pub sunrise: f64,
    pub sunset: f64,
}
