use anyhow::Context;

use sky_color::cli::CliArgs;
use sky_color::config::SkyConfig;
use sky_color::config_watcher::ConfigWatcher;
use sky_color::service::SkyColorService;
use sky_color::status_api::start_status_api;
use sky_color::weather::OpenWeatherClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = CliArgs::from_env_args()?;
    log::info!(
        "config: {}, status api enabled: {}, bind: {}",
        cli.config_path.display(),
        cli.status_api.enabled,
        cli.status_api.bind_addr
    );

    let config = SkyConfig::load_with_env(&cli.config_path);
    let client = OpenWeatherClient::new(&config.api_base_url)
        .context("failed to create weather client")?;
    let status = if cli.once {
        None
    } else {
        start_status_api(&cli.status_api).await?
    };

    let mut service = SkyColorService::new(client, status);
    service.apply_config(config).await;
    if cli.once {
        return Ok(());
    }

    let watcher = ConfigWatcher::start(&cli.config_path);
    service.run(cli.config_path, watcher).await;
    Ok(())
}
