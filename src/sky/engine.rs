use thiserror::Error;

use super::cloud::apply_cloud_cover;
use super::color::{font_color, rgb_to_hex, Rgb};
use super::keyframes::KeyframeTable;

/// Sun times and cloud cover for the current day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weather {
    /// Seconds since local midnight. May be negative or past 86400.
    pub sunrise: f64,
    pub sunset: f64,
    /// Cloud cover percentage, `0..=100`.
    pub cloud: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyColors {
    pub background: Rgb,
    pub foreground: Rgb,
}

impl SkyColors {
    pub fn background_hex(&self) -> String {
        rgb_to_hex(self.background)
    }

    pub fn foreground_hex(&self) -> String {
        rgb_to_hex(self.foreground)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SkyError {
    #[error("cloud cover must be within 0..=100, got {0}")]
    InvalidCloud(f64),
    #[error("time of day must be finite, got {0}")]
    NonFiniteTime(f64),
    #[error("sunrise and sunset must be finite, got {sunrise} and {sunset}")]
    NonFiniteSunTimes { sunrise: f64, sunset: f64 },
}

pub fn clear_sky_color(time: f64, sunrise: f64, sunset: f64) -> Rgb {
    KeyframeTable::for_day(sunrise, sunset).sample(time)
}

/// Background and readable foreground for `time` seconds since local midnight.
pub fn compute_sky_color(time: f64, weather: &Weather) -> Result<SkyColors, SkyError> {
    if !time.is_finite() {
        return Err(SkyError::NonFiniteTime(time));
    }
    if !weather.sunrise.is_finite() || !weather.sunset.is_finite() {
        return Err(SkyError::NonFiniteSunTimes {
            sunrise: weather.sunrise,
            sunset: weather.sunset,
        });
    }
    if !(0.0..=100.0).contains(&weather.cloud) {
        return Err(SkyError::InvalidCloud(weather.cloud));
    }

    let clear = clear_sky_color(time, weather.sunrise, weather.sunset);
    let background = apply_cloud_cover(clear, weather.cloud);
    Ok(SkyColors {
        background,
        foreground: font_color(background),
    })
}
