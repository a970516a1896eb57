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

//! One-shot loading of the update history.

use std::sync::Arc;

use log::{error, info};

use crate::config::WidgetConfig;
use crate::display::{render_with, Region, SharedSurface, Surface, UpdateBlock};
use crate::fetch::{decode, FetchError, JsonFetcher};
use crate::model::UpdateRecord;
use crate::version::sort_updates;

/// Text shown in place of the list when loading fails
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load updates.";

/// Replace the updates list with the given records, in order.
pub fn render_updates<S: Surface + ?Sized>(surface: &mut S, updates: &[UpdateRecord]) {
    surface.clear_updates();
    for update in updates {
        surface.push_update(UpdateBlock::from(update));
    }
}

/// Loads the updates resource once and renders it newest first.
#[derive(Debug)]
pub struct UpdatesLoader<F, S> {
    fetcher: Arc<F>,
    surface: SharedSurface<S>,
    config: WidgetConfig,
}

impl<F: JsonFetcher, S: Surface> UpdatesLoader<F, S> {
    pub fn new(fetcher: Arc<F>, surface: SharedSurface<S>, config: WidgetConfig) -> Self {
        Self {
            fetcher,
            surface,
            config,
        }
    }

    /// Fetch, sort and render the updates.
    ///
    /// Returns the number of entries rendered. On failure the list shows
    /// [`LOAD_FAILED_MESSAGE`] and the error is returned after being logged;
    /// there is no retry.
    pub async fn load(&self) -> Result<usize, FetchError> {
        match self.fetch_updates().await {
            Ok(mut updates) => {
                sort_updates(&mut updates);
                render_with(&self.surface, |surface| render_updates(surface, &updates));
                info!("Loaded {} updates from '{}'", updates.len(), self.config.updates_resource);
                Ok(updates.len())
            }
            Err(e) => {
                error!("Failed to load updates from '{}': {}", self.config.updates_resource, e);
                render_with(&self.surface, |surface| {
                    surface.set_text(Region::UpdatesList, LOAD_FAILED_MESSAGE);
                });
                Err(e)
            }
        }
    }

    async fn fetch_updates(&self) -> Result<Vec<UpdateRecord>, FetchError> {
        let value = self.fetcher.fetch_json(&self.config.updates_resource).await?;
        decode(&self.config.updates_resource, value)
    }
}
