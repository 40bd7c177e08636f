use anyhow::{Context, Result};
use chrono::NaiveDate;
use pantry_core::{FoodItem, InventoryStore, MemoryStore, Recipe, RecipeStore, StoreSnapshot};
use std::fs;
use std::path::{Path, PathBuf};

/// `$PANTRY_HOME`, else `~/.pantry`.
pub fn pantry_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PANTRY_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pantry"))
}

pub fn ensure_pantry_home() -> Result<PathBuf> {
    let dir = pantry_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn store_path() -> Result<PathBuf> {
    Ok(ensure_pantry_home()?.join("pantry.json"))
}

pub fn outbox_path() -> Result<PathBuf> {
    Ok(ensure_pantry_home()?.join("alerts").join("outbox.jsonl"))
}

pub fn read_store(path: &Path) -> Result<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let snapshot: StoreSnapshot =
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(MemoryStore::from_snapshot(snapshot))
}

/// Write via a sibling temp file so readers never see a half-written store.
pub fn write_store(path: &Path, store: &MemoryStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

pub fn load_store() -> Result<MemoryStore> {
    read_store(&store_path()?)
}

pub fn save_store(store: &MemoryStore) -> Result<()> {
    write_store(&store_path()?, store)
}

/// Store handle that re-reads the state file on every call.
///
/// The daemon uses this so each sweep sees edits made by other `pantry`
/// invocations since the last run.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<MemoryStore> {
        read_store(&self.path)
    }
}

impl InventoryStore for FileStore {
    fn all_items(&self) -> Result<Vec<FoodItem>> {
        self.load()?.all_items()
    }

    fn non_expired_items(&self, today: NaiveDate) -> Result<Vec<FoodItem>> {
        self.load()?.non_expired_items(today)
    }

    fn items_by_category(&self, category: &str) -> Result<Vec<FoodItem>> {
        self.load()?.items_by_category(category)
    }

    fn search_items(&self, needle: &str) -> Result<Vec<FoodItem>> {
        self.load()?.search_items(needle)
    }
}

impl RecipeStore for FileStore {
    fn all_recipes(&self) -> Result<Vec<Recipe>> {
        self.load()?.all_recipes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pantry_core::NewFoodItem;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pantry-state-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("pantry.json")
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let path = scratch("missing");
        let _ = fs::remove_file(&path);
        let store = read_store(&path).unwrap();
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn file_store_sees_later_writes() {
        let path = scratch("filestore");
        let mut store = MemoryStore::new();
        write_store(&path, &store).unwrap();

        let fs_store = FileStore::new(&path);
        assert!(fs_store.all_items().unwrap().is_empty());

        store
            .add_item(
                NewFoodItem::new(
                    "Milk",
                    "Dairy",
                    1.0,
                    "l",
                    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
                ),
                Utc::now(),
            )
            .unwrap();
        write_store(&path, &store).unwrap();

        assert_eq!(fs_store.all_items().unwrap().len(), 1);
        assert_eq!(fs_store.items_by_category("dairy").unwrap().len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch("corrupt");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_store(&path).is_err());
    }
}
