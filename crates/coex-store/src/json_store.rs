//! File-based checkpoint store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coex_ir::{DeviceRegistry, EdgeWeightTable};
use coex_prop::AreaGrid;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::ewt::{decode_table, encode_table};
use crate::records::{ColoringRecord, CoverageRecord, RunManifest};
use crate::store::{
    ALL_EXTS, AREA_EXT, COLORING_EXT, COVERAGE_EXT, CheckpointStore, DEVICES_EXT, EDGES_EXT,
    MANIFEST_EXT,
};

/// Checkpoint store writing one file per record into a directory.
///
/// A run with prefix `scenario` produces `scenario.cbsd`, `scenario.ewt`,
/// `scenario.cvg`, `scenario.area`, `scenario.gc` and
/// `scenario.manifest.json`. Files are written to a temporary name first
/// and renamed into place.
#[derive(Debug, Clone)]
pub struct JsonStore {
    /// Base directory for storage.
    base_dir: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self { base_dir })
    }

    /// Create a store in a fresh temporary directory.
    pub async fn temp() -> StoreResult<Self> {
        let temp_dir = std::env::temp_dir().join(format!("coex-store-{}", uuid::Uuid::new_v4()));
        Self::new(temp_dir).await
    }

    /// Directory holding the records.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of one record of a run.
    pub fn record_path(&self, prefix: &str, ext: &str) -> StoreResult<PathBuf> {
        check_prefix(prefix)?;
        Ok(self.base_dir.join(format!("{prefix}.{ext}")))
    }

    async fn write_atomic(&self, path: &Path, contents: String) -> StoreResult<()> {
        let tmp = self
            .base_dir
            .join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, contents).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::IoError(e));
        }
        debug!("Wrote {:?}", path);
        Ok(())
    }

    async fn save_json<T: Serialize + ?Sized + Sync>(
        &self,
        prefix: &str,
        ext: &str,
        value: &T,
    ) -> StoreResult<()> {
        let path = self.record_path(prefix, ext)?;
        let json = serde_json::to_string_pretty(value)?;
        self.write_atomic(&path, json).await
    }

    async fn load_json<T: DeserializeOwned>(&self, prefix: &str, ext: &str) -> StoreResult<Option<T>> {
        let path = self.record_path(prefix, ext)?;
        match read_optional(&path).await? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }
}

fn check_prefix(prefix: &str) -> StoreResult<()> {
    let valid = !prefix.is_empty()
        && !prefix.starts_with('.')
        && !prefix.contains(['/', '\\'])
        && !prefix.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPrefix(prefix.to_string()))
    }
}

async fn read_optional(path: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::IoError(e)),
    }
}

#[async_trait]
impl CheckpointStore for JsonStore {
    async fn save_devices(&self, prefix: &str, registry: &DeviceRegistry) -> StoreResult<()> {
        self.save_json(prefix, DEVICES_EXT, registry).await
    }

    async fn load_devices(&self, prefix: &str) -> StoreResult<Option<DeviceRegistry>> {
        self.load_json(prefix, DEVICES_EXT).await
    }

    async fn save_edges(&self, prefix: &str, table: &EdgeWeightTable) -> StoreResult<()> {
        let path = self.record_path(prefix, EDGES_EXT)?;
        self.write_atomic(&path, encode_table(table)).await
    }

    async fn load_edges(&self, prefix: &str) -> StoreResult<Option<EdgeWeightTable>> {
        let path = self.record_path(prefix, EDGES_EXT)?;
        match read_optional(&path).await? {
            Some(content) => Ok(Some(decode_table(&content, &path)?)),
            None => Ok(None),
        }
    }

    async fn save_coverage(&self, prefix: &str, coverage: &CoverageRecord) -> StoreResult<()> {
        self.save_json(prefix, COVERAGE_EXT, coverage).await
    }

    async fn load_coverage(&self, prefix: &str) -> StoreResult<Option<CoverageRecord>> {
        self.load_json(prefix, COVERAGE_EXT).await
    }

    async fn save_area(&self, prefix: &str, grid: &AreaGrid) -> StoreResult<()> {
        self.save_json(prefix, AREA_EXT, grid).await
    }

    async fn load_area(&self, prefix: &str) -> StoreResult<Option<AreaGrid>> {
        self.load_json(prefix, AREA_EXT).await
    }

    async fn save_coloring(&self, prefix: &str, records: &[ColoringRecord]) -> StoreResult<()> {
        self.save_json(prefix, COLORING_EXT, records).await
    }

    async fn load_coloring(&self, prefix: &str) -> StoreResult<Option<Vec<ColoringRecord>>> {
        self.load_json(prefix, COLORING_EXT).await
    }

    async fn save_manifest(&self, manifest: &RunManifest) -> StoreResult<()> {
        self.save_json(&manifest.prefix, MANIFEST_EXT, manifest).await
    }

    async fn load_manifest(&self, prefix: &str) -> StoreResult<Option<RunManifest>> {
        self.load_json(prefix, MANIFEST_EXT).await
    }

    async fn exists(&self, prefix: &str) -> StoreResult<bool> {
        for ext in ALL_EXTS {
            if fs::try_exists(self.record_path(prefix, ext)?).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn list_runs(&self) -> StoreResult<Vec<String>> {
        let suffix = format!(".{MANIFEST_EXT}");
        let mut runs = Vec::new();

        let mut entries = fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(prefix) = name.strip_suffix(&suffix) else {
                continue;
            };
            match self.load_manifest(prefix).await {
                Ok(Some(_)) => runs.push(prefix.to_string()),
                Ok(None) => {}
                Err(e) => warn!("Failed to read manifest {:?}: {}", entry.path(), e),
            }
        }

        runs.sort();
        Ok(runs)
    }

    async fn delete_record(&self, prefix: &str, ext: &str) -> StoreResult<bool> {
        match fs::remove_file(self.record_path(prefix, ext)?).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::IoError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coex_ir::{Category, Coordination, Device, EdgeKey, Location};

    fn registry() -> DeviceRegistry {
        DeviceRegistry::from_devices([
            Device::new("1", Location::new(36.84, -76.0), 6.0, Category::A, 26.0)
                .with_coex_group(2),
            Device::new("2", Location::new(36.85, -76.0), 10.0, Category::B, 47.0),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_devices_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();

        assert!(store.load_devices("run").await.unwrap().is_none());
        store.save_devices("run", &registry()).await.unwrap();

        let loaded = store.load_devices("run").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.coex_group(&"1".into()), Some(2));
        assert!(dir.path().join("run.cbsd").exists());
    }

    #[tokio::test]
    async fn test_edges_keep_model_tag() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();
        let table = EdgeWeightTable::from_weights(
            "freespace",
            Coordination::Area,
            [(EdgeKey::new("1".into(), "2".into()).unwrap(), 0.75)],
        )
        .unwrap();

        store.save_edges("run", &table).await.unwrap();
        let loaded = store.load_edges("run").await.unwrap().unwrap();
        assert_eq!(loaded.model(), "freespace");
        assert_eq!(loaded.coordination(), Coordination::Area);
        assert_eq!(loaded, table);
    }

    #[tokio::test]
    async fn test_next_free_prefix() {
        let store = JsonStore::temp().await.unwrap();
        assert_eq!(store.next_free_prefix("scenario").await.unwrap(), "scenario");

        store.save_devices("scenario", &registry()).await.unwrap();
        assert_eq!(store.next_free_prefix("scenario").await.unwrap(), "scenario-1");

        store.save_manifest(&RunManifest::new("scenario-1", 2)).await.unwrap();
        assert_eq!(store.next_free_prefix("scenario").await.unwrap(), "scenario-2");
    }

    #[tokio::test]
    async fn test_list_and_delete_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).await.unwrap();

        store.save_manifest(&RunManifest::new("b", 2)).await.unwrap();
        store.save_manifest(&RunManifest::new("a", 2)).await.unwrap();
        store.save_devices("a", &registry()).await.unwrap();
        std::fs::write(dir.path().join("broken.manifest.json"), "{").unwrap();

        assert_eq!(store.list_runs().await.unwrap(), vec!["a", "b"]);
        assert_eq!(store.delete_run("a").await.unwrap(), 2);
        assert!(!store.exists("a").await.unwrap());
        assert_eq!(store.list_runs().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_invalid_prefix() {
        let store = JsonStore::temp().await.unwrap();
        for prefix in ["", "../escape", ".hidden", "a/b"] {
            assert!(matches!(
                store.save_devices(prefix, &registry()).await,
                Err(StoreError::InvalidPrefix(_))
            ));
        }
    }
}
