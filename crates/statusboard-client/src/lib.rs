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

//! Status board client library.
//!
//! Polls a server status resource on a fixed cadence and loads a changelog
//! of updates once, rendering both into a pluggable display surface. The
//! pieces can be used on their own or wired together with [`Dashboard`]:
//!
//! - **Fetch layer**: cache-busted JSON over HTTP ([`HttpFetcher`]), behind
//!   the [`JsonFetcher`] trait
//! - **Version layer**: newest-first ordering of dot-separated versions
//! - **Display layer**: the [`Surface`] trait with memory and HTML surfaces
//! - **Components**: [`StatusPoller`] and [`UpdatesLoader`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use statusboard_client::{Dashboard, HtmlSurface, HttpFetcher, WidgetConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new("http://localhost:8080/", None)?;
//!     let surface = Arc::new(Mutex::new(HtmlSurface::default().with_output("board.html")));
//!
//!     let dashboard = Dashboard::new(Arc::new(fetcher), surface, WidgetConfig::default());
//!     dashboard.run(CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```
//!
//! # Sorting Only
//!
//! ```
//! use statusboard_client::compare_versions;
//! use std::cmp::Ordering;
//!
//! assert_eq!(compare_versions("2.0.0", "1.9.9"), Ordering::Less);
//! assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
//! ```

pub mod config;
pub mod display;
pub mod fetch;
pub mod model;
pub mod poller;
pub mod updates;
pub mod version;

use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

pub use config::WidgetConfig;
pub use display::{HtmlSurface, MemorySurface, Region, RegionMap, SharedSurface, StatusStyle, StyleMap, Surface, UpdateBlock};
pub use fetch::{FetchError, HttpFetcher, JsonFetcher};
pub use model::{ServerState, StatusRecord, UpdateKind, UpdateRecord};
pub use poller::{PollOutcome, StatusPoller};
pub use updates::UpdatesLoader;
pub use version::{compare_versions, sort_updates, Version, VersionError};

/// Status poller and updates loader sharing one fetcher and one surface.
#[derive(Debug)]
pub struct Dashboard<F, S> {
    poller: StatusPoller<F, S>,
    loader: UpdatesLoader<F, S>,
}

impl<F: JsonFetcher, S: Surface> Dashboard<F, S> {
    pub fn new(fetcher: Arc<F>, surface: SharedSurface<S>, config: WidgetConfig) -> Self {
        Self {
            loader: UpdatesLoader::new(Arc::clone(&fetcher), Arc::clone(&surface), config.clone()),
            poller: StatusPoller::new(fetcher, surface, config),
        }
    }

    /// Load the updates once and poll the status until cancelled.
    ///
    /// Cancellation also abandons an updates load that is still in flight.
    pub async fn run(&self, cancel_token: CancellationToken) {
        let load = async {
            tokio::select! {
                result = self.loader.load() => {
                    if let Err(e) = result {
                        warn!("Update history unavailable until restart: {}", e);
                    }
                }
                () = cancel_token.cancelled() => {
                    info!("Updates load abandoned");
                }
            }
        };

        tokio::join!(load, self.poller.run(cancel_token.clone()));
    }

    /// One status poll and one updates load, run concurrently.
    pub async fn refresh_once(&self) -> (PollOutcome, Result<usize, FetchError>) {
        tokio::join!(self.poller.poll_once(), self.loader.load())
    }

    pub fn poller(&self) -> &StatusPoller<F, S> {
        &self.poller
    }

    pub fn loader(&self) -> &UpdatesLoader<F, S> {
        &self.loader
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use reqwest::StatusCode;
    use serde_json::Value;

    use crate::fetch::{FetchError, JsonFetcher};

    /// Fetcher that replays queued responses, then fails with HTTP 500.
    #[derive(Debug, Default)]
    pub struct StubFetcher {
        responses: Mutex<VecDeque<Option<Value>>>,
        repeat: Option<Value>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer every request with `value`
        pub fn repeating(value: Value) -> Self {
            Self {
                repeat: Some(value),
                ..Self::default()
            }
        }

        pub fn push_ok(&self, value: Value) {
            self.responses.lock().unwrap().push_back(Some(value));
        }

        pub fn push_http_error(&self) {
            self.responses.lock().unwrap().push_back(None);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl JsonFetcher for StubFetcher {
        async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let next = match &self.repeat {
                Some(value) => Some(value.clone()),
                None => self.responses.lock().unwrap().pop_front().flatten(),
            };

            next.ok_or_else(|| FetchError::Status {
                url: format!("http://stub/{path}"),
                status: StatusCode::INTERNAL_SERVER_ERROR,
            })
        }
    }

    /// Fetcher that answers by resource path and counts requests per path.
    ///
    /// Paths without a response never resolve.
    #[derive(Debug, Default)]
    pub struct PathFetcher {
        responses: HashMap<String, Value>,
        calls: Mutex<HashMap<String, usize>>,
    }

    impl PathFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(mut self, path: &str, value: Value) -> Self {
            self.responses.insert(path.to_string(), value);
            self
        }

        pub fn calls_to(&self, path: &str) -> usize {
            self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
        }
    }

    impl JsonFetcher for PathFetcher {
        async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
            *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;

            match self.responses.get(path) {
                Some(value) => Ok(value.clone()),
                None => std::future::pending().await,
            }
        }
    }
}
