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

//! Periodic status polling.
//!
//! Polls never overlap: the next poll starts only after the previous one has
//! rendered, and ticks that fall due in the meantime are skipped.

use std::sync::Arc;

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::{WidgetConfig, MIN_REFRESH_INTERVAL};
use crate::display::{render_with, Region, SharedSurface, StatusStyle, Surface};
use crate::fetch::{decode, FetchError, JsonFetcher};
use crate::model::{ServerState, StatusRecord};

/// Text shown in the status region when a poll fails
pub const STATUS_ERROR_TEXT: &str = "ERROR";

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Status fetched and rendered.
    Rendered(ServerState),
    /// Fetch or decode failed; the error marker was rendered.
    Failed,
}

/// Write a status record into the status regions.
pub fn render_status<S: Surface + ?Sized>(surface: &mut S, record: &StatusRecord, checked_at: DateTime<Local>) {
    surface.set_text(Region::StatusText, record.status.as_str());
    surface.set_text(Region::OnlineCount, &format!("Online: {}", record.online_players));
    surface.set_text(Region::ServerInfo, &record.server);
    surface.set_text(Region::VersionText, &format!("v{}", record.version));
    surface.set_text(
        Region::LastCheck,
        &format!("Last check: {}", checked_at.format("%H:%M:%S")),
    );
    surface.set_status_style(StatusStyle::from(&record.status));
}

/// Polls the status resource and renders it.
#[derive(Debug)]
pub struct StatusPoller<F, S> {
    fetcher: Arc<F>,
    surface: SharedSurface<S>,
    config: WidgetConfig,
}

impl<F: JsonFetcher, S: Surface> StatusPoller<F, S> {
    pub fn new(fetcher: Arc<F>, surface: SharedSurface<S>, config: WidgetConfig) -> Self {
        Self {
            fetcher,
            surface,
            config,
        }
    }

    /// Fetch the status once and render the result.
    ///
    /// On failure only the status text changes; every other region keeps
    /// whatever the last successful poll wrote.
    pub async fn poll_once(&self) -> PollOutcome {
        match self.fetch_status().await {
            Ok(record) => {
                debug!(
                    "Status {} with {} players on {}",
                    record.status, record.online_players, record.server
                );
                let checked_at = Local::now();
                render_with(&self.surface, |surface| render_status(surface, &record, checked_at));
                PollOutcome::Rendered(record.status)
            }
            Err(e) => {
                error!("Failed to load status from '{}': {}", self.config.status_resource, e);
                render_with(&self.surface, |surface| {
                    surface.set_text(Region::StatusText, STATUS_ERROR_TEXT);
                });
                PollOutcome::Failed
            }
        }
    }

    /// Poll immediately, then on every tick until `cancel_token` fires.
    ///
    /// Errors never stop the loop.
    pub async fn run(&self, cancel_token: CancellationToken) {
        let period = if self.config.refresh_interval < MIN_REFRESH_INTERVAL {
            warn!(
                "Refresh interval {:?} is too short, using {:?}",
                self.config.refresh_interval, MIN_REFRESH_INTERVAL
            );
            MIN_REFRESH_INTERVAL
        } else {
            self.config.refresh_interval
        };

        info!("Polling '{}' every {:?}", self.config.status_resource, period);

        tokio::select! {
            () = self.poll_forever(period) => {}
            () = cancel_token.cancelled() => {
                info!("Status polling stopped");
            }
        }
    }

    async fn poll_forever(&self, period: std::time::Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.poll_once().await;
        }
    }

    async fn fetch_status(&self) -> Result<StatusRecord, FetchError> {
        let value = self.fetcher.fetch_json(&self.config.status_resource).await?;
        decode(&self.config.status_resource, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemorySurface;
    use crate::testing::StubFetcher;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn poller(fetcher: StubFetcher) -> (StatusPoller<StubFetcher, MemorySurface>, SharedSurface<MemorySurface>) {
        let surface = Arc::new(Mutex::new(MemorySurface::new()));
        let poller = StatusPoller::new(Arc::new(fetcher), Arc::clone(&surface), WidgetConfig::default());
        (poller, surface)
    }

    fn online_status() -> serde_json::Value {
        json!({"status": "ONLINE", "onlinePlayers": 42, "server": "Alpha", "version": "3.2.1"})
    }

    #[test]
    fn test_render_status_regions() {
        let mut surface = MemorySurface::new();
        let record = StatusRecord {
            status: ServerState::Offline,
            online_players: 0,
            server: "Beta".to_string(),
            version: "1.0".to_string(),
        };
        let checked_at = Local.with_ymd_and_hms(2024, 6, 1, 14, 5, 9).unwrap();

        render_status(&mut surface, &record, checked_at);

        assert_eq!(surface.text(Region::StatusText), Some("OFFLINE"));
        assert_eq!(surface.text(Region::OnlineCount), Some("Online: 0"));
        assert_eq!(surface.text(Region::ServerInfo), Some("Beta"));
        assert_eq!(surface.text(Region::VersionText), Some("v1.0"));
        assert_eq!(surface.text(Region::LastCheck), Some("Last check: 14:05:09"));
        assert_eq!(surface.status_style(), Some(StatusStyle::Offline));
    }

    #[tokio::test]
    async fn test_poll_online() {
        let fetcher = StubFetcher::new();
        fetcher.push_ok(online_status());
        let (poller, surface) = poller(fetcher);

        assert_eq!(poller.poll_once().await, PollOutcome::Rendered(ServerState::Online));

        let surface = surface.lock().unwrap();
        assert_eq!(surface.text(Region::StatusText), Some("ONLINE"));
        assert_eq!(surface.text(Region::OnlineCount), Some("Online: 42"));
        assert_eq!(surface.status_style(), Some(StatusStyle::Online));
        assert_eq!(surface.flushes(), 1);
    }

    #[tokio::test]
    async fn test_poll_unknown_status_is_maintenance_style() {
        let fetcher = StubFetcher::new();
        fetcher.push_ok(json!({"status": "UPDATING", "onlinePlayers": 3, "server": "Alpha", "version": "3.2.2"}));
        let (poller, surface) = poller(fetcher);

        poller.poll_once().await;

        let surface = surface.lock().unwrap();
        assert_eq!(surface.text(Region::StatusText), Some("UPDATING"));
        assert_eq!(surface.status_style(), Some(StatusStyle::Maintenance));
    }

    #[tokio::test]
    async fn test_fetch_failure_only_touches_status_text() {
        let fetcher = StubFetcher::new();
        fetcher.push_ok(online_status());
        fetcher.push_http_error();
        let (poller, surface) = poller(fetcher);

        poller.poll_once().await;
        let before = surface.lock().unwrap().clone();

        assert_eq!(poller.poll_once().await, PollOutcome::Failed);

        let after = surface.lock().unwrap();
        assert_eq!(after.text(Region::StatusText), Some(STATUS_ERROR_TEXT));
        for region in &Region::STATUS[1..] {
            assert_eq!(after.text(*region), before.text(*region), "{region:?} changed");
        }
        assert_eq!(after.status_style(), Some(StatusStyle::Online));
    }

    #[tokio::test]
    async fn test_malformed_status_is_failure() {
        let fetcher = StubFetcher::new();
        fetcher.push_ok(json!({"status": "ONLINE"}));
        let (poller, surface) = poller(fetcher);

        assert_eq!(poller.poll_once().await, PollOutcome::Failed);
        let surface = surface.lock().unwrap();
        assert_eq!(surface.text(Region::StatusText), Some(STATUS_ERROR_TEXT));
        assert_eq!(surface.text(Region::OnlineCount), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_start_and_every_interval() {
        let fetcher = Arc::new(StubFetcher::repeating(online_status()));
        let surface = Arc::new(Mutex::new(MemorySurface::new()));
        let poller = StatusPoller::new(Arc::clone(&fetcher), surface, WidgetConfig::default());

        let token = CancellationToken::new();
        let task_token = token.clone();
        let handle = tokio::spawn(async move { poller.run(task_token).await });

        tokio::time::sleep(Duration::from_secs(150)).await;
        token.cancel();
        handle.await.unwrap();

        // t = 0s, 60s, 120s
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_continues_after_errors() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.push_http_error();
        fetcher.push_ok(online_status());
        let surface = Arc::new(Mutex::new(MemorySurface::new()));
        let poller = StatusPoller::new(Arc::clone(&fetcher), Arc::clone(&surface), WidgetConfig::default());

        let token = CancellationToken::new();
        let task_token = token.clone();
        let handle = tokio::spawn(async move { poller.run(task_token).await });

        tokio::time::sleep(Duration::from_secs(90)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(surface.lock().unwrap().text(Region::StatusText), Some("ONLINE"));
    }
}
