//! Copyright © 2026 The Glance Authors. All Rights Reserved.
//!
//! This file is part of Glance.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Glance Source Module
//!
//! External collaborators feeding the pipeline. The engine treats every
//! source as an opaque array of JSON records:
//!
//! - **Dataset sources** are fetched asynchronously through the
//!   [`GlDataSource`] seam; independent fetches settle concurrently and
//!   a rejected fetch degrades to an empty row-set (logged, surfaced to
//!   the user by the host, never retried here).
//! - **Uploaded tables** (spreadsheet/CSV/sheet-URL ingestion, parsed
//!   by the host) arrive synchronously and occupy the reserved
//!   [`GL_UPLOADED_TABLE_KEY`] identifier, which supersedes dataset
//!   selection while present.
//!
//! The cache carries a monotonic generation counter: a refresh that
//! finishes after a newer refresh began is discarded, so a slow stale
//! fetch can never clobber fresher rows.

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use crate::errors::Result;
use crate::record::GlNamedRowSets;

/// Reserved identifier for the uploaded-table row-set.
pub const GL_UPLOADED_TABLE_KEY: &str = "__uploaded__";

/// An external dataset execution endpoint.
#[async_trait]
pub trait GlDataSource: Send + Sync {
    /// Runs a dataset and yields its records. The engine treats the
    /// result as opaque regardless of shape.
    async fn run(&self, dataset_id: &str) -> Result<Vec<Value>>;
}

/// Per-session cache of fetched row-sets, keyed by source identifier.
#[derive(Debug, Default)]
pub struct GlSourceCache {
    rows: GlNamedRowSets,
    generation: u64,
}

impl GlSourceCache {
    pub fn new() -> Self {
        GlSourceCache::default()
    }

    /// Installs or replaces one source's rows directly (used for
    /// synchronously-parsed uploads and tests).
    pub fn insert(&mut self, source_id: impl Into<String>, rows: Vec<Value>) {
        self.rows.insert(source_id.into(), rows);
    }

    /// Installs the uploaded table under its reserved identifier.
    pub fn insert_uploaded(&mut self, rows: Vec<Value>) {
        self.insert(GL_UPLOADED_TABLE_KEY, rows);
    }

    /// Drops one source's rows (source deselected or upload cleared).
    pub fn remove(&mut self, source_id: &str) {
        self.rows.remove(source_id);
    }

    pub fn get(&self, source_id: &str) -> Option<&Vec<Value>> {
        self.rows.get(source_id)
    }

    /// Whether an uploaded table is currently installed.
    pub fn has_uploaded(&self) -> bool {
        self.rows.contains_key(GL_UPLOADED_TABLE_KEY)
    }

    /// Snapshot of all cached row-sets.
    pub fn snapshot(&self) -> GlNamedRowSets {
        self.rows.clone()
    }

    /// Starts a refresh round and returns its generation token.
    pub fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Commits one source's fetch outcome for a given generation.
    ///
    /// A completion carrying an older generation than the cache's
    /// current one is stale and discarded; returns whether the commit
    /// landed. A fetch failure commits an empty row-set.
    pub fn commit(
        &mut self,
        generation: u64,
        source_id: &str,
        outcome: Result<Vec<Value>>,
    ) -> bool {
        if generation < self.generation {
            log::debug!(
                "discarding stale fetch for source '{source_id}' \
                 (generation {generation} < {})",
                self.generation
            );
            return false;
        }
        match outcome {
            Ok(rows) => self.insert(source_id, rows),
            Err(err) => {
                log::warn!("source '{source_id}' fetch failed, treating as empty: {err}");
                self.insert(source_id, Vec::new());
            }
        }
        true
    }

    /// Fetches the given dataset ids concurrently and commits each
    /// outcome under a fresh generation.
    pub async fn refresh(&mut self, source: &dyn GlDataSource, dataset_ids: &[String]) {
        let generation = self.begin_refresh();
        let fetches = dataset_ids.iter().map(|id| async move {
            let outcome = source.run(id).await;
            (id.clone(), outcome)
        });
        for (id, outcome) in join_all(fetches).await {
            self.commit(generation, &id, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GlError;
    use serde_json::json;

    struct Fixed;

    #[async_trait]
    impl GlDataSource for Fixed {
        async fn run(&self, dataset_id: &str) -> Result<Vec<Value>> {
            match dataset_id {
                "good" => Ok(vec![json!({"id": 1})]),
                other => Err(GlError::source(other, "endpoint rejected")),
            }
        }
    }

    #[tokio::test]
    async fn failed_fetch_becomes_empty_rowset() {
        let mut cache = GlSourceCache::new();
        cache
            .refresh(&Fixed, &["good".to_string(), "bad".to_string()])
            .await;
        assert_eq!(cache.get("good").unwrap().len(), 1);
        assert!(cache.get("bad").unwrap().is_empty());
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut cache = GlSourceCache::new();
        let old = cache.begin_refresh();
        let new = cache.begin_refresh();
        assert!(!cache.commit(old, "a", Ok(vec![json!({"v": "old"})])));
        assert!(cache.commit(new, "a", Ok(vec![json!({"v": "new"})])));
        assert_eq!(cache.get("a").unwrap()[0]["v"], json!("new"));
    }
}
