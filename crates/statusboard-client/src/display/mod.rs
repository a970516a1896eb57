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

//! Display surface abstraction.
//!
//! The poller and loader never know what they render into. They write text
//! into named [`Region`]s, set a [`StatusStyle`], and append [`UpdateBlock`]s
//! to the updates list. A [`Surface`] implementation decides what that looks
//! like: an in-memory record ([`MemorySurface`]), an HTML page
//! ([`HtmlSurface`]), or a terminal.

mod html;

pub use html::{HtmlSurface, RegionMap, StyleMap};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::model::{ServerState, UpdateRecord};

/// Named display regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    StatusText,
    OnlineCount,
    ServerInfo,
    VersionText,
    LastCheck,
    /// Container for update blocks. Writing text here replaces the list.
    UpdatesList,
}

impl Region {
    /// Status regions in the order the poller writes them
    pub const STATUS: [Region; 5] = [
        Region::StatusText,
        Region::OnlineCount,
        Region::ServerInfo,
        Region::VersionText,
        Region::LastCheck,
    ];
}

/// Visual treatment of the status text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Online,
    Offline,
    Maintenance,
}

impl From<&ServerState> for StatusStyle {
    fn from(state: &ServerState) -> Self {
        match state {
            ServerState::Online => StatusStyle::Online,
            ServerState::Offline => StatusStyle::Offline,
            ServerState::Maintenance(_) => StatusStyle::Maintenance,
        }
    }
}

/// One rendered changelog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlock {
    /// "v{version} - {type}"
    pub heading: String,
    /// Hex color for the heading
    pub color: &'static str,
    pub date: String,
    pub title: String,
    pub description: String,
}

impl From<&UpdateRecord> for UpdateBlock {
    fn from(update: &UpdateRecord) -> Self {
        Self {
            heading: format!("v{} - {}", update.version, update.kind),
            color: update.kind.color(),
            date: update.date.clone(),
            title: update.title.clone(),
            description: update.description.clone(),
        }
    }
}

/// Something the dashboard can render into.
pub trait Surface {
    /// Replace the text content of a region.
    fn set_text(&mut self, region: Region, text: &str);

    /// Apply the status-dependent style to the status text.
    fn set_status_style(&mut self, style: StatusStyle);

    /// Remove everything from the updates list.
    fn clear_updates(&mut self);

    /// Append one entry to the updates list.
    fn push_update(&mut self, block: UpdateBlock);

    /// Called once at the end of every render pass.
    fn flush(&mut self) {}
}

/// Surface shared between the poller and the loader
pub type SharedSurface<S> = Arc<Mutex<S>>;

/// Run one render pass against a shared surface and flush it.
///
/// A poisoned lock is recovered; a panic in one pass must not blank the board
/// for the rest of the process.
pub fn render_with<S: Surface, R>(surface: &SharedSurface<S>, pass: impl FnOnce(&mut S) -> R) -> R {
    let mut guard = surface.lock().unwrap_or_else(PoisonError::into_inner);
    let result = pass(&mut *guard);
    guard.flush();
    result
}

/// Render into two surfaces at once
impl<A: Surface, B: Surface> Surface for (A, B) {
    fn set_text(&mut self, region: Region, text: &str) {
        self.0.set_text(region, text);
        self.1.set_text(region, text);
    }

    fn set_status_style(&mut self, style: StatusStyle) {
        self.0.set_status_style(style);
        self.1.set_status_style(style);
    }

    fn clear_updates(&mut self) {
        self.0.clear_updates();
        self.1.clear_updates();
    }

    fn push_update(&mut self, block: UpdateBlock) {
        self.0.push_update(block.clone());
        self.1.push_update(block);
    }

    fn flush(&mut self) {
        self.0.flush();
        self.1.flush();
    }
}

/// An absent surface ignores every write
impl<T: Surface> Surface for Option<T> {
    fn set_text(&mut self, region: Region, text: &str) {
        if let Some(surface) = self {
            surface.set_text(region, text);
        }
    }

    fn set_status_style(&mut self, style: StatusStyle) {
        if let Some(surface) = self {
            surface.set_status_style(style);
        }
    }

    fn clear_updates(&mut self) {
        if let Some(surface) = self {
            surface.clear_updates();
        }
    }

    fn push_update(&mut self, block: UpdateBlock) {
        if let Some(surface) = self {
            surface.push_update(block);
        }
    }

    fn flush(&mut self) {
        if let Some(surface) = self {
            surface.flush();
        }
    }
}

/// Surface that simply records what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    texts: BTreeMap<Region, String>,
    status_style: Option<StatusStyle>,
    updates: Vec<UpdateBlock>,
    flushes: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, region: Region) -> Option<&str> {
        self.texts.get(&region).map(String::as_str)
    }

    pub fn status_style(&self) -> Option<StatusStyle> {
        self.status_style
    }

    pub fn updates(&self) -> &[UpdateBlock] {
        &self.updates
    }

    /// Number of completed render passes
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl Surface for MemorySurface {
    fn set_text(&mut self, region: Region, text: &str) {
        if region == Region::UpdatesList {
            self.updates.clear();
        }
        self.texts.insert(region, text.to_string());
    }

    fn set_status_style(&mut self, style: StatusStyle) {
        self.status_style = Some(style);
    }

    fn clear_updates(&mut self) {
        self.texts.remove(&Region::UpdatesList);
        self.updates.clear();
    }

    fn push_update(&mut self, block: UpdateBlock) {
        self.updates.push(block);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
