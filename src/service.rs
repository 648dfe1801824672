use std::path::PathBuf;
use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::clock;
use crate::config::{RefreshConfig, SkyConfig, API_KEY_ENV};
use crate::config_watcher::ConfigWatcher;
use crate::settings_store::ColorCustomizations;
use crate::sky::{compute_sky_color, KeyframeTable, SkyColors, Weather};
use crate::status_api::{SkySnapshot, StatusApiHandle};
use crate::weather::{ApiParam, FetchError, Location, WeatherProvider};

/// Keeps the configured settings file in sync with the sky over the day.
///
/// Location is resolved once per config change, weather is refreshed on a
/// slow timer and colors are recomputed on a fast one. Fetch failures follow
/// a fixed policy: a bad API key disables fetching until the next config
/// reload, even an unchanged one. A failed location lookup clears the written
/// colors, and a failed weather refresh keeps the last good weather.
pub struct SkyColorService<P> {
    provider: P,
    config: Option<SkyConfig>,
    api_param: Option<ApiParam>,
    location: Option<Location>,
    weather: Option<Weather>,
    store: Option<ColorCustomizations>,
    status_api: Option<StatusApiHandle>,
    last_written: Option<(String, String)>,
}

impl<P: WeatherProvider> SkyColorService<P> {
    pub fn new(provider: P, status_api: Option<StatusApiHandle>) -> Self {
        Self {
            provider,
            config: None,
            api_param: None,
            location: None,
            weather: None,
            store: None,
            status_api,
            last_written: None,
        }
    }

    pub async fn apply_config(&mut self, config: SkyConfig) {
        if self.config.as_ref() == Some(&config) {
            return;
        }

        self.api_param = config.api_param();
        if self.api_param.is_none() {
            log::warn!("no API key configured; set api_key in the config file or {API_KEY_ENV}");
        }
        self.store = Some(ColorCustomizations::from_config(&config.output));
        self.last_written = None;
        self.config = Some(config);

        self.update_location().await;
        self.update_weather().await;
        self.update_color();
    }

    pub async fn update_location(&mut self) {
        let Some(param) = self.api_param.clone() else {
            return;
        };

        match self.provider.get_location(&param).await {
            Ok(location) => self.location = Some(location),
            Err(err) => {
                match &err {
                    FetchError::ApiKey(_) => {
                        log::error!(
                            "invalid or deactivated API key (activation can take several hours)"
                        );
                        self.reject_api_key();
                    }
                    FetchError::Network(msg) => {
                        log::debug!("location lookup skipped, network unavailable: {msg}");
                    }
                    FetchError::Param(_) => {
                        log::error!(
                            "unknown ZIP/country code: {},{}",
                            param.zip_code,
                            param.country_code
                        );
                    }
                    FetchError::UnknownResponse(msg) => {
                        log::error!("invalid response from the weather server: {msg}");
                    }
                }
                self.clear_colors();
            }
        }
    }

    pub async fn update_weather(&mut self) {
        let (Some(location), Some(api_key)) = (
            self.location,
            self.api_param.as_ref().map(|p| p.api_key.clone()),
        ) else {
            return;
        };

        let day_origin = clock::day_origin(&clock::now());
        match self
            .provider
            .get_weather(&location, &api_key, day_origin)
            .await
        {
            Ok(weather) => {
                log::debug!(
                    "sunrise {}, sunset {}, cloud {}%",
                    clock::format_time_of_day(weather.sunrise),
                    clock::format_time_of_day(weather.sunset),
                    weather.cloud
                );
                if !KeyframeTable::for_day(weather.sunrise, weather.sunset).is_monotonic() {
                    log::warn!(
                        "sunrise {} / sunset {} produce out-of-order keyframes; colors may jump",
                        clock::format_time_of_day(weather.sunrise),
                        clock::format_time_of_day(weather.sunset)
                    );
                }
                self.weather = Some(weather);
            }
            Err(FetchError::ApiKey(msg)) => {
                log::error!("weather update rejected the API key: {msg}");
                self.reject_api_key();
            }
            Err(
                err @ (FetchError::Network(_)
                | FetchError::Param(_)
                | FetchError::UnknownResponse(_)),
            ) => {
                log::warn!("weather update failed: {err}");
            }
        }
    }

    pub fn update_color(&mut self) {
        let now = clock::now();
        self.update_color_at(clock::seconds_since_midnight(&now), now.timestamp_millis());
    }

    fn update_color_at(&mut self, time: f64, timestamp_ms: i64) -> Option<SkyColors> {
        let weather = self.weather?;
        let colors = match compute_sky_color(time, &weather) {
            Ok(colors) => colors,
            Err(err) => {
                log::warn!("skipping color update: {err}");
                return None;
            }
        };

        let hex = (colors.background_hex(), colors.foreground_hex());
        if self.last_written.as_ref() != Some(&hex) {
            if let Some(store) = &self.store {
                match store.write(&colors) {
                    Ok(()) => self.last_written = Some(hex.clone()),
                    Err(err) => log::warn!("failed to write sky colors: {err:#}"),
                }
            }
        }

        if let Some(api) = &self.status_api {
            api.publish_snapshot(SkySnapshot {
                background: hex.0,
                foreground: hex.1,
                sunrise: clock::format_time_of_day(weather.sunrise),
                sunset: clock::format_time_of_day(weather.sunset),
                cloud: weather.cloud,
                seconds_since_midnight: time,
                timestamp_ms,
            });
        }

        Some(colors)
    }

    /// Stops fetching and forgets the config, so that the next reload applies
    /// it again even when the file content is unchanged.
    fn reject_api_key(&mut self) {
        self.api_param = None;
        self.config = None;
    }

    fn clear_colors(&mut self) {
        self.last_written = None;
        if let Some(store) = &self.store {
            if let Err(err) = store.clear() {
                log::warn!("failed to clear sky colors: {err:#}");
            }
        }
    }

    fn refresh_config(&self) -> RefreshConfig {
        self.config
            .as_ref()
            .map(|config| config.refresh.clone())
            .unwrap_or_default()
    }

    /// Runs the refresh timers until Ctrl-C. Changes to `config_path` reported
    /// by `watcher` are reloaded and applied.
    pub async fn run(mut self, config_path: PathBuf, mut watcher: Option<ConfigWatcher>) {
        let mut timers = RefreshTimers::new(self.refresh_config());
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = timers.weather.tick() => self.update_weather().await,
                _ = timers.color.tick() => self.update_color(),
                Some(()) = next_change(&mut watcher) => {
                    self.apply_config(SkyConfig::load_with_env(&config_path)).await;
                    if let Some(config) = &self.config {
                        timers.retune(config.refresh.clone());
                    }
                }
                _ = &mut shutdown => {
                    log::info!("shutting down");
                    break;
                }
            }
        }

        if let Some(api) = self.status_api.take() {
            api.shutdown().await;
        }
    }
}

struct RefreshTimers {
    refresh: RefreshConfig,
    weather: Interval,
    color: Interval,
}

impl RefreshTimers {
    fn new(refresh: RefreshConfig) -> Self {
        Self {
            weather: delayed_interval(refresh.weather_interval()),
            color: delayed_interval(refresh.color_interval()),
            refresh,
        }
    }

    /// Restarts both intervals if `refresh` differs from the current settings.
    fn retune(&mut self, refresh: RefreshConfig) -> bool {
        if refresh == self.refresh {
            return false;
        }
        log::info!(
            "refresh intervals changed: color {}s, weather {}s",
            refresh.color_interval_secs,
            refresh.weather_interval_secs
        );
        *self = Self::new(refresh);
        true
    }
}

fn delayed_interval(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_change(watcher: &mut Option<ConfigWatcher>) -> Option<()> {
    match watcher {
        Some(watcher) => watcher.changed().await,
        None => std::future::pending().await,
    }
}
