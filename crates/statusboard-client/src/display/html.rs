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

//! Static HTML page rendering.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error};

use super::{MemorySurface, Region, StatusStyle, Surface, UpdateBlock};

/// Element id for each display region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMap {
    pub status_text: String,
    pub online_count: String,
    pub server_info: String,
    pub version_text: String,
    pub last_check: String,
    pub updates_list: String,
}

impl RegionMap {
    /// Ids used by the embedded mini widget
    pub fn compact() -> Self {
        Self {
            status_text: "miniStatusText".to_string(),
            online_count: "miniOnlineBox".to_string(),
            server_info: "miniServerInfo".to_string(),
            version_text: "miniVersionText".to_string(),
            last_check: "miniLastCheck".to_string(),
            updates_list: "miniUpdatesList".to_string(),
        }
    }

    pub fn id(&self, region: Region) -> &str {
        match region {
            Region::StatusText => &self.status_text,
            Region::OnlineCount => &self.online_count,
            Region::ServerInfo => &self.server_info,
            Region::VersionText => &self.version_text,
            Region::LastCheck => &self.last_check,
            Region::UpdatesList => &self.updates_list,
        }
    }
}

impl Default for RegionMap {
    fn default() -> Self {
        Self {
            status_text: "statusText".to_string(),
            online_count: "onlineBox".to_string(),
            server_info: "serverInfo".to_string(),
            version_text: "versionText".to_string(),
            last_check: "lastCheck".to_string(),
            updates_list: "updatesList".to_string(),
        }
    }
}

/// Class names and colors applied to the status text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMap {
    pub online_class: String,
    pub offline_class: String,
    /// Inline color for any state other than online/offline
    pub maintenance_color: String,
}

impl StyleMap {
    pub fn compact() -> Self {
        Self {
            online_class: "mini-online".to_string(),
            offline_class: "mini-offline".to_string(),
            maintenance_color: "#f0ad4e".to_string(),
        }
    }
}

impl Default for StyleMap {
    fn default() -> Self {
        Self {
            online_class: "status-online".to_string(),
            offline_class: "status-offline".to_string(),
            maintenance_color: "#f0ad4e".to_string(),
        }
    }
}

/// Surface that renders the board as a standalone HTML page.
///
/// The page is rebuilt from scratch on every flush and written to `output`
/// when one is set.
#[derive(Debug, Clone)]
pub struct HtmlSurface {
    regions: RegionMap,
    styles: StyleMap,
    state: MemorySurface,
    output: Option<PathBuf>,
}

impl HtmlSurface {
    pub fn new(regions: RegionMap, styles: StyleMap) -> Self {
        Self {
            regions,
            styles,
            state: MemorySurface::new(),
            output: None,
        }
    }

    /// Write the page to `path` after every render pass
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Render the current board as a complete HTML document
    pub fn render(&self) -> String {
        let mut html = String::from(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Server Status</title></head>\n<body>\n",
        );

        for region in Region::STATUS {
            let id = escape(self.regions.id(region));
            let text = escape(self.state.text(region).unwrap_or_default());
            let attrs = if region == Region::StatusText {
                self.status_attrs()
            } else {
                String::new()
            };
            html.push_str(&format!("<div id=\"{id}\"{attrs}>{text}</div>\n"));
        }

        html.push_str(&format!("<div id=\"{}\">\n", escape(self.regions.id(Region::UpdatesList))));
        if let Some(message) = self.state.text(Region::UpdatesList) {
            html.push_str(&escape(message));
            html.push('\n');
        }
        for block in self.state.updates() {
            write_block(&mut html, block);
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    fn status_attrs(&self) -> String {
        match self.state.status_style() {
            Some(StatusStyle::Online) => format!(" class=\"{}\"", escape(&self.styles.online_class)),
            Some(StatusStyle::Offline) => format!(" class=\"{}\"", escape(&self.styles.offline_class)),
            Some(StatusStyle::Maintenance) => {
                format!(" style=\"color:{}\"", escape(&self.styles.maintenance_color))
            }
            None => String::new(),
        }
    }
}

impl Default for HtmlSurface {
    fn default() -> Self {
        Self::new(RegionMap::default(), StyleMap::default())
    }
}

impl Surface for HtmlSurface {
    fn set_text(&mut self, region: Region, text: &str) {
        self.state.set_text(region, text);
    }

    fn set_status_style(&mut self, style: StatusStyle) {
        self.state.set_status_style(style);
    }

    fn clear_updates(&mut self) {
        self.state.clear_updates();
    }

    fn push_update(&mut self, block: UpdateBlock) {
        self.state.push_update(block);
    }

    fn flush(&mut self) {
        self.state.flush();

        if let Some(path) = &self.output {
            match write_page(path, &self.render()) {
                Ok(()) => debug!("Wrote status page to {}", path.display()),
                Err(e) => error!("Failed to write status page to {}: {}", path.display(), e),
            }
        }
    }
}

fn write_block(html: &mut String, block: &UpdateBlock) {
    html.push_str(&format!(
        "<div style=\"margin-bottom:20px\">\n\
         <h3 style=\"color:{}\">{}</h3>\n\
         <small>{}</small>\n\
         <p><b>{}</b></p>\n\
         <p>{}</p>\n\
         <hr>\n\
         </div>\n",
        block.color,
        escape(&block.heading),
        escape(&block.date),
        escape(&block.title),
        escape(&block.description),
    ));
}

/// Write `page` to a sibling file, then rename it over `path`
///
/// Readers of `path` see either the previous page or the new one, never a
/// partial write.
fn write_page(path: &Path, page: &str) -> io::Result<()> {
    let staging = staging_path(path);
    std::fs::write(&staging, page)?;
    std::fs::rename(&staging, path).inspect_err(|_| {
        if let Err(e) = std::fs::remove_file(&staging) {
            debug!("Could not remove {}: {}", staging.display(), e);
        }
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Escape text for use in element content and quoted attributes
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
