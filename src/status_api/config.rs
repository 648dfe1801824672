use std::ffi::OsStr;

pub const STATUS_API_ENV: &str = "SKY_COLOR_STATUS_API";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7878";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusApiConfig {
    pub enabled: bool,
    pub bind_addr: String,
}

impl Default for StatusApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl StatusApiConfig {
    /// Defaults, enabled when `SKY_COLOR_STATUS_API` is 1/true/yes/on.
    pub fn from_env_value(value: Option<&OsStr>) -> Self {
        Self {
            enabled: env_is_truthy(value),
            ..Self::default()
        }
    }
}

fn env_is_truthy(value: Option<&OsStr>) -> bool {
    value
        .map(|v| {
            let lowered = v.to_string_lossy().trim().to_ascii_lowercase();
            matches!(lowered.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::StatusApiConfig;
    use std::ffi::OsStr;

    #[test]
    fn env_toggle() {
        assert!(StatusApiConfig::from_env_value(Some(OsStr::new(" Yes "))).enabled);
        assert!(StatusApiConfig::from_env_value(Some(OsStr::new("on"))).enabled);
        assert!(!StatusApiConfig::from_env_value(Some(OsStr::new("0"))).enabled);
        assert_eq!(StatusApiConfig::from_env_value(None), StatusApiConfig::default());
    }
}
