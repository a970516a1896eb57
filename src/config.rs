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

//! Application configuration management.
//!
//! Persistent settings live in a TOML file managed by confy. Any of them can
//! be overridden for a single run from the command line.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use statusboard_client::config::{DEFAULT_REFRESH_INTERVAL, DEFAULT_STATUS_RESOURCE, DEFAULT_UPDATES_RESOURCE};
use statusboard_client::{RegionMap, StyleMap, WidgetConfig};

const APP_NAME: &str = "statusboard";
const CONFIG_NAME: &str = "config";

/// Default location of the status and updates resources
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Element id and class preset for the HTML page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RegionPreset {
    /// Full-size board ids (statusText, onlineBox, ...)
    #[default]
    Default,
    /// Embedded mini widget ids (miniStatusText, ...)
    Compact,
}

impl RegionPreset {
    pub fn maps(self) -> (RegionMap, StyleMap) {
        match self {
            RegionPreset::Default => (RegionMap::default(), StyleMap::default()),
            RegionPreset::Compact => (RegionMap::compact(), StyleMap::compact()),
        }
    }
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Base URL the resource paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Status poll cadence in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_status_resource")]
    pub status_resource: String,

    #[serde(default = "default_updates_resource")]
    pub updates_resource: String,

    /// Per-request timeout (client default when unset)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Also render the board as HTML to this file
    #[serde(default)]
    pub html_output: Option<PathBuf>,

    #[serde(default)]
    pub region_preset: RegionPreset,

    /// Colored terminal output
    #[serde(default = "default_true")]
    pub color: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_refresh_interval_ms() -> u64 {
    u64::try_from(DEFAULT_REFRESH_INTERVAL.as_millis()).unwrap_or(u64::MAX)
}

fn default_status_resource() -> String {
    DEFAULT_STATUS_RESOURCE.to_string()
}

fn default_updates_resource() -> String {
    DEFAULT_UPDATES_RESOURCE.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            base_url: default_base_url(),
            refresh_interval_ms: default_refresh_interval_ms(),
            status_resource: default_status_resource(),
            updates_resource: default_updates_resource(),
            request_timeout_secs: None,
            html_output: None,
            region_preset: RegionPreset::default(),
            color: true,
        }
    }
}

/// Command-line overrides for a single run
#[derive(Debug, Default, Clone, clap::Args)]
pub struct Overrides {
    /// Base URL of the status and updates resources
    #[arg(long)]
    pub base_url: Option<String>,

    /// Status poll interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Path of the status resource
    #[arg(long)]
    pub status_resource: Option<String>,

    /// Path of the updates resource
    #[arg(long)]
    pub updates_resource: Option<String>,

    /// Write an HTML rendering of the board to this file
    #[arg(long)]
    pub html_out: Option<PathBuf>,

    /// Element id preset for the HTML rendering
    #[arg(long, value_enum)]
    pub region_preset: Option<RegionPreset>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Disable colored terminal output
    #[arg(long)]
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Apply command-line overrides on top of the stored values
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(base_url) = &overrides.base_url {
            self.base_url.clone_from(base_url);
        }
        if let Some(interval_ms) = overrides.interval_ms {
            self.refresh_interval_ms = interval_ms;
        }
        if let Some(resource) = &overrides.status_resource {
            self.status_resource.clone_from(resource);
        }
        if let Some(resource) = &overrides.updates_resource {
            self.updates_resource.clone_from(resource);
        }
        if let Some(path) = &overrides.html_out {
            self.html_output = Some(path.clone());
        }
        if let Some(preset) = overrides.region_preset {
            self.region_preset = preset;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.request_timeout_secs = Some(timeout);
        }
        if overrides.no_color {
            self.color = false;
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Settings handed to the poller and loader
    pub fn widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            status_resource: self.status_resource.clone(),
            updates_resource: self.updates_resource.clone(),
        }
    }
}
