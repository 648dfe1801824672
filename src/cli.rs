use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::status_api::{StatusApiConfig, STATUS_API_ENV};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: PathBuf,
    /// Write the colors once and exit instead of running the refresh loop.
    pub once: bool,
    pub status_api: StatusApiConfig,
}

impl CliArgs {
    pub fn from_env_args() -> Result<Self> {
        Self::parse(
            std::env::args_os().skip(1),
            std::env::var_os(STATUS_API_ENV),
        )
    }

    fn parse<I>(args: I, env_status_api: Option<OsString>) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut cli = Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            once: false,
            status_api: StatusApiConfig::from_env_value(env_status_api.as_deref()),
        };

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let flag = arg.to_string_lossy();
            match flag.as_ref() {
                "--config" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow!("--config requires a path"))?;
                    cli.config_path = PathBuf::from(value);
                }
                "--once" => cli.once = true,
                "--status-api" => cli.status_api.enabled = true,
                "--status-api-bind" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow!("--status-api-bind requires an address"))?;
                    cli.status_api.bind_addr = value.to_string_lossy().into_owned();
                }
                other => log::warn!("ignoring unknown argument {other:?}"),
            }
        }

        Ok(cli)
    }
}
