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

//! Records decoded from the status and updates resources.

use serde::{Deserialize, Serialize};

/// Reported state of the game server.
///
/// Anything other than `ONLINE` or `OFFLINE` is treated as maintenance, and
/// the raw label is kept so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerState {
    Online,
    Offline,
    Maintenance(String),
}

impl ServerState {
    /// Label as reported by the status resource
    pub fn as_str(&self) -> &str {
        match self {
            ServerState::Online => "ONLINE",
            ServerState::Offline => "OFFLINE",
            ServerState::Maintenance(label) => label,
        }
    }
}

impl From<String> for ServerState {
    fn from(label: String) -> Self {
        match label.as_str() {
            "ONLINE" => ServerState::Online,
            "OFFLINE" => ServerState::Offline,
            _ => ServerState::Maintenance(label),
        }
    }
}

impl From<ServerState> for String {
    fn from(state: ServerState) -> Self {
        state.as_str().to_owned()
    }
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One snapshot of the status resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: ServerState,

    #[serde(rename = "onlinePlayers")]
    pub online_players: u64,

    /// Server display name
    pub server: String,

    pub version: String,
}

/// Classification of an update entry, used only to pick a display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateKind {
    Big,
    Minor,
    Patch,
    Hotfix,
    Other(String),
}

/// Color used for types outside the known set
pub const DEFAULT_KIND_COLOR: &str = "#8b949e";

impl UpdateKind {
    pub fn as_str(&self) -> &str {
        match self {
            UpdateKind::Big => "BIG",
            UpdateKind::Minor => "MINOR",
            UpdateKind::Patch => "PATCH",
            UpdateKind::Hotfix => "HOTFIX",
            UpdateKind::Other(label) => label,
        }
    }

    /// Hex color for the entry heading
    pub fn color(&self) -> &'static str {
        match self {
            UpdateKind::Big => "#d73a49",
            UpdateKind::Minor => "#1f6feb",
            UpdateKind::Patch => "#2ea043",
            UpdateKind::Hotfix => "#f85149",
            UpdateKind::Other(_) => DEFAULT_KIND_COLOR,
        }
    }
}

impl From<String> for UpdateKind {
    fn from(label: String) -> Self {
        match label.as_str() {
            "BIG" => UpdateKind::Big,
            "MINOR" => UpdateKind::Minor,
            "PATCH" => UpdateKind::Patch,
            "HOTFIX" => UpdateKind::Hotfix,
            _ => UpdateKind::Other(label),
        }
    }
}

impl From<UpdateKind> for String {
    fn from(kind: UpdateKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Changelog entry from the updates resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Dot-separated numeric version, e.g. "1.12.3"
    pub version: String,

    #[serde(rename = "type")]
    pub kind: UpdateKind,

    /// Free-form display date
    pub date: String,

    pub title: String,

    pub description: String,
}
