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

//! Dot-separated numeric version ordering.
//!
//! Versions compare component by component, with missing trailing components
//! treated as zero, so `1.2` and `1.2.0` are equal. The update list is shown
//! newest first, which is why [`compare_versions`] orders descending.

use std::cmp::Ordering;

use log::warn;
use thiserror::Error;

use crate::model::UpdateRecord;

/// Errors from strict version parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid component '{component}' in version '{version}'")]
    InvalidComponent { version: String, component: String },
}

/// Parsed version as a list of numeric components.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Parse a version, rejecting any component that is not a number.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        if version.trim().is_empty() {
            return Ok(Self { components: vec![0] });
        }

        let components = version
            .split('.')
            .map(|component| {
                component
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .ok_or_else(|| VersionError::InvalidComponent {
                        version: version.to_string(),
                        component: component.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    /// Parse a version, treating non-numeric components as zero.
    ///
    /// Each substitution is logged so malformed feed entries stay visible.
    pub fn parse_lenient(version: &str) -> Self {
        if version.trim().is_empty() {
            return Self { components: vec![0] };
        }

        let components = version
            .split('.')
            .map(|component| {
                component.trim().parse::<u64>().unwrap_or_else(|e| {
                    warn!(
                        "Version '{}' has non-numeric component '{}' ({}), using 0",
                        version, component, e
                    );
                    0
                })
            })
            .collect();

        Self { components }
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.components.iter().map(u64::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// Compare two version strings for newest-first ordering.
///
/// Returns `Less` when `a` is the newer version and should sort first.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    Version::parse_lenient(b).cmp(&Version::parse_lenient(a))
}

/// Sort update records newest first. Equal versions keep their input order.
pub fn sort_updates(updates: &mut [UpdateRecord]) {
    updates.sort_by_cached_key(|update| std::cmp::Reverse(Version::parse_lenient(&update.version)));
}
