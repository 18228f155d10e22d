//! Progress stores: where snapshots live between visits
//!
//! One snapshot per widget; saving replaces the previous one.

use async_trait::async_trait;
use dashmap::DashMap;
use guided_types::{GuidedError, GuidedResult, ProgressSnapshot, WidgetId};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Persistence for progress snapshots
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Store a snapshot, replacing any earlier one for the same widget
    async fn save(&self, snapshot: &ProgressSnapshot) -> GuidedResult<()>;

    /// The latest snapshot for a widget, if one was saved
    async fn load(&self, widget_id: &WidgetId) -> GuidedResult<Option<ProgressSnapshot>>;

    /// Remove a widget's snapshot; `true` if one existed
    async fn delete(&self, widget_id: &WidgetId) -> GuidedResult<bool>;

    /// Widgets that have a snapshot
    async fn list(&self) -> GuidedResult<Vec<WidgetId>>;
}

// ── In-memory store ──────────────────────────────────────────────────

/// Snapshots held in memory, for tests and single-process hosts
#[derive(Clone, Debug, Default)]
pub struct InMemoryProgressStore {
    snapshots: Arc<DashMap<WidgetId, ProgressSnapshot>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn save(&self, snapshot: &ProgressSnapshot) -> GuidedResult<()> {
        self.snapshots
            .insert(snapshot.widget_id.clone(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, widget_id: &WidgetId) -> GuidedResult<Option<ProgressSnapshot>> {
        Ok(self.snapshots.get(widget_id).map(|s| s.clone()))
    }

    async fn delete(&self, widget_id: &WidgetId) -> GuidedResult<bool> {
        Ok(self.snapshots.remove(widget_id).is_some())
    }

    async fn list(&self) -> GuidedResult<Vec<WidgetId>> {
        let mut ids: Vec<WidgetId> = self.snapshots.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}

// ── File store ───────────────────────────────────────────────────────

/// One pretty-printed JSON file per widget in a directory
#[derive(Clone, Debug)]
pub struct FileProgressStore {
    dir: PathBuf,
}

impl FileProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Widget ids are percent-encoded into file names. Bytes outside
    /// `[A-Za-z0-9._-]` become `%XX`, so distinct ids never share a file.
    pub fn path_for(&self, widget_id: &WidgetId) -> PathBuf {
        self.dir
            .join(format!("{}.progress.json", encode_file_stem(widget_id.as_str())))
    }
}

fn encode_file_stem(id: &str) -> String {
    let mut name = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{:02X}", byte));
        }
    }
    name
}

fn storage_error(path: &Path, e: impl std::fmt::Display) -> GuidedError {
    GuidedError::Storage(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl ProgressStore for FileProgressStore {
    async fn save(&self, snapshot: &ProgressSnapshot) -> GuidedResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| storage_error(&self.dir, e))?;
        let path = self.path_for(&snapshot.widget_id);
        let json = snapshot.to_json()?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| storage_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| storage_error(&path, e))?;
        tracing::debug!(widget = %snapshot.widget_id, path = %path.display(), "Progress saved");
        Ok(())
    }

    async fn load(&self, widget_id: &WidgetId) -> GuidedResult<Option<ProgressSnapshot>> {
        let path = self.path_for(widget_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => Ok(Some(ProgressSnapshot::from_json(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&path, e)),
        }
    }

    async fn delete(&self, widget_id: &WidgetId) -> GuidedResult<bool> {
        let path = self.path_for(widget_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error(&path, e)),
        }
    }

    async fn list(&self) -> GuidedResult<Vec<WidgetId>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error(&self.dir, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error(&self.dir, e))?
        {
            let path = entry.path();
            let is_progress = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".progress.json"));
            if !is_progress {
                continue;
            }
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| storage_error(&path, e))?;
            ids.push(ProgressSnapshot::from_json(&json)?.widget_id);
        }
        ids.sort();
        Ok(ids)
    }
}
