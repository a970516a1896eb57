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

//! Terminal rendering of the board.

use std::io::{IsTerminal, Write};

use log::error;
use statusboard_client::{MemorySurface, Region, StatusStyle, Surface, UpdateBlock};

const ONLINE_COLOR: &str = "#2ea043";
const OFFLINE_COLOR: &str = "#d73a49";
const MAINTENANCE_COLOR: &str = "#f0ad4e";

/// Surface that redraws the whole board on stdout after every render pass.
#[derive(Debug)]
pub struct TerminalSurface {
    state: MemorySurface,
    color: bool,
    /// Clear the screen before each redraw (interactive terminals only)
    redraw_in_place: bool,
}

impl TerminalSurface {
    pub fn new(color: bool) -> Self {
        let interactive = std::io::stdout().is_terminal();
        Self {
            state: MemorySurface::new(),
            color: color && interactive,
            redraw_in_place: interactive,
        }
    }

    /// Render the current board as text
    pub fn render(&self) -> String {
        let mut out = String::new();

        let status = self.state.text(Region::StatusText).unwrap_or("-");
        let status_color = match self.state.status_style() {
            Some(StatusStyle::Online) => Some(ONLINE_COLOR),
            Some(StatusStyle::Offline) => Some(OFFLINE_COLOR),
            Some(StatusStyle::Maintenance) => Some(MAINTENANCE_COLOR),
            None => None,
        };
        out.push_str(&format!("Status: {}\n", self.paint(status, status_color)));

        for region in [Region::OnlineCount, Region::ServerInfo, Region::VersionText, Region::LastCheck] {
            if let Some(text) = self.state.text(region) {
                out.push_str(text);
                out.push('\n');
            }
        }

        out.push_str("\nUpdates\n-------\n");
        if let Some(message) = self.state.text(Region::UpdatesList) {
            out.push_str(message);
            out.push('\n');
        }
        for block in self.state.updates() {
            self.write_block(&mut out, block);
        }

        out
    }

    fn write_block(&self, out: &mut String, block: &UpdateBlock) {
        out.push_str(&format!(
            "{}\n  {}\n  {}\n  {}\n\n",
            self.paint(&block.heading, Some(block.color)),
            block.date,
            self.paint(&block.title, None),
            block.description,
        ));
    }

    /// Bold, with an optional 24-bit foreground color
    fn paint(&self, text: &str, color: Option<&str>) -> String {
        if !self.color {
            return text.to_string();
        }

        match color.and_then(parse_hex_color) {
            Some((r, g, b)) => format!("\x1b[1;38;2;{r};{g};{b}m{text}\x1b[0m"),
            None => format!("\x1b[1m{text}\x1b[0m"),
        }
    }
}

impl Surface for TerminalSurface {
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

        let mut stdout = std::io::stdout().lock();
        let clear = if self.redraw_in_place { "\x1b[2J\x1b[H" } else { "" };
        if let Err(e) = write!(stdout, "{clear}{}", self.render()).and_then(|()| stdout.flush()) {
            error!("Failed to draw board: {}", e);
        }
    }
}

/// Parse "#rrggbb" into its components
fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> TerminalSurface {
        TerminalSurface {
            state: MemorySurface::new(),
            color: false,
            redraw_in_place: false,
        }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#d73a49"), Some((0xd7, 0x3a, 0x49)));
        assert_eq!(parse_hex_color("d73a49"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_render_plain_board() {
        let mut surface = plain();
        surface.set_text(Region::StatusText, "ONLINE");
        surface.set_text(Region::OnlineCount, "Online: 42");
        surface.set_text(Region::ServerInfo, "Alpha");
        surface.set_status_style(StatusStyle::Online);
        surface.push_update(UpdateBlock {
            heading: "v1.2.0 - MINOR".to_string(),
            color: "#1f6feb",
            date: "2024-01-01".to_string(),
            title: "Winter".to_string(),
            description: "Snow".to_string(),
        });

        let text = surface.render();
        assert!(text.starts_with("Status: ONLINE\nOnline: 42\nAlpha\n"));
        assert!(text.contains("v1.2.0 - MINOR\n  2024-01-01\n  Winter\n  Snow\n"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_render_colored_status() {
        let mut surface = plain();
        surface.color = true;
        surface.set_text(Region::StatusText, "OFFLINE");
        surface.set_status_style(StatusStyle::Offline);

        assert!(surface.render().contains("\x1b[1;38;2;215;58;73mOFFLINE\x1b[0m"));
    }

    #[test]
    fn test_render_exact_layout() {
        let mut surface = plain();
        surface.set_text(Region::StatusText, "OFFLINE");
        surface.set_text(Region::LastCheck, "Last check: 12:00:00");
        surface.push_update(UpdateBlock {
            heading: "v2.0 - BIG".to_string(),
            color: "#d73a49",
            date: "d".to_string(),
            title: "t".to_string(),
            description: "x".to_string(),
        });

        assert_eq!(
            surface.render(),
            "Status: OFFLINE\nLast check: 12:00:00\n\nUpdates\n-------\nv2.0 - BIG\n  d\n  t\n  x\n\n"
        );
    }

    #[test]
    fn test_render_failure_message() {
        let mut surface = plain();
        surface.set_text(Region::UpdatesList, "Failed to load updates.");
        assert!(surface.render().contains("Updates\n-------\nFailed to load updates.\n"));
    }
}
