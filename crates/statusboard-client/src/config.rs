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

use std::time::Duration;

/// Default poll cadence for the status resource
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(60_000);

/// Shortest poll cadence the poller will accept
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_STATUS_RESOURCE: &str = "status.json";

pub const DEFAULT_UPDATES_RESOURCE: &str = "updates.json";

/// Configuration shared by the status poller and the updates loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Time between status polls.
    pub refresh_interval: Duration,
    /// Path of the status resource, relative to the fetcher's base.
    pub status_resource: String,
    /// Path of the updates resource, relative to the fetcher's base.
    pub updates_resource: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            status_resource: DEFAULT_STATUS_RESOURCE.to_string(),
            updates_resource: DEFAULT_UPDATES_RESOURCE.to_string(),
        }
    }
}
