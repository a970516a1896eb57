// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod config;
mod terminal;

use std::sync::{Arc, Mutex};

use clap::Parser;
use log::{info, warn};
use statusboard_client::{Dashboard, HtmlSurface, HttpFetcher, PollOutcome};
use tokio_util::sync::CancellationToken;

use config::{AppConfig, Overrides};
use terminal::TerminalSurface;

/// Server status board: polls a status feed and shows the update history
#[derive(Parser, Debug)]
#[command(name = "statusboard", version, about)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// Poll the status and load the updates once, then exit
    #[arg(long)]
    once: bool,

    /// Print the configuration file path and exit
    #[arg(long)]
    print_config_path: bool,

    /// Persist the effective configuration (including overrides)
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });
    config.apply_overrides(&cli.overrides);

    if cli.save_config {
        config.save()?;
        info!("Configuration saved to {}", AppConfig::get_config_path()?.display());
    }

    info!("Starting status board for {}", config.base_url);

    let fetcher = HttpFetcher::new(&config.base_url, config.request_timeout())?;

    let html = config.html_output.as_ref().map(|path| {
        let (regions, styles) = config.region_preset.maps();
        info!("Writing HTML board to {}", path.display());
        HtmlSurface::new(regions, styles).with_output(path)
    });
    let surface = Arc::new(Mutex::new((TerminalSurface::new(config.color), html)));

    let dashboard = Dashboard::new(Arc::new(fetcher), surface, config.widget_config());

    if cli.once {
        let (outcome, loaded) = dashboard.refresh_once().await;
        if outcome == PollOutcome::Failed || loaded.is_err() {
            return Err("status board refresh failed".into());
        }
        return Ok(());
    }

    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down");
                signal_token.cancel();
            }
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
    });

    dashboard.run(cancel_token).await;
    Ok(())
}
