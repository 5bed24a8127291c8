use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::Result;

/// Independently persisted piece of application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateSlice {
    SelectedFoods,
    NutrientGoals,
    UserInfo,
    OptimisationResults,
    CustomBounds,
    MacroSplit,
}

impl StateSlice {
    pub const ALL: [StateSlice; 6] = [
        StateSlice::SelectedFoods,
        StateSlice::NutrientGoals,
        StateSlice::UserInfo,
        StateSlice::OptimisationResults,
        StateSlice::CustomBounds,
        StateSlice::MacroSplit,
    ];

    /// Stable storage key.
    pub fn key(self) -> &'static str {
        match self {
            StateSlice::SelectedFoods => "knapsnack_selected_foods",
            StateSlice::NutrientGoals => "knapsnack_nutrient_goals",
            StateSlice::UserInfo => "knapsnack_user_info",
            StateSlice::OptimisationResults => "knapsnack_optimisation_results",
            StateSlice::CustomBounds => "knapsnack_custom_bounds",
            StateSlice::MacroSplit => "knapsnack_macro_split",
        }
    }
}

/// Key-value storage for serialized state slices.
pub trait StateStore {
    fn load(&self, slice: StateSlice) -> Result<Option<String>>;
    fn save(&mut self, slice: StateSlice, value: &str) -> Result<()>;
    fn clear(&mut self, slice: StateSlice) -> Result<()>;

    fn clear_all(&mut self) -> Result<()> {
        for slice in StateSlice::ALL {
            self.clear(slice)?;
        }
        Ok(())
    }
}

/// Load and deserialize a slice.
///
/// A slice that fails to parse is treated as absent.
pub fn load_slice<T, S>(store: &S, slice: StateSlice) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: StateStore + ?Sized,
{
    let Some(raw) = store.load(slice)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key = slice.key(), error = %e, "discarding unreadable state slice");
            Ok(None)
        }
    }
}

/// Serialize and store a slice.
pub fn save_slice<T, S>(store: &mut S, slice: StateSlice, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: StateStore + ?Sized,
{
    let json = serde_json::to_string_pretty(value)?;
    store.save(slice, &json)
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<StateSlice, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, slice: StateSlice) -> Result<Option<String>> {
        Ok(self.entries.get(&slice).cloned())
    }

    fn save(&mut self, slice: StateSlice, value: &str) -> Result<()> {
        self.entries.insert(slice, value.to_string());
        Ok(())
    }

    fn clear(&mut self, slice: StateSlice) -> Result<()> {
        self.entries.remove(&slice);
        Ok(())
    }
}

/// One JSON file per slice inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slice: StateSlice) -> PathBuf {
        self.dir.join(format!("{}.json", slice.key()))
    }
}

impl StateStore for FileStore {
    fn load(&self, slice: StateSlice) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(slice)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, slice: StateSlice, value: &str) -> Result<()> {
        let path = self.path_for(slice);
        fs::write(&path, value)?;
        debug!(path = %path.display(), "state slice saved");
        Ok(())
    }

    fn clear(&mut self, slice: StateSlice) -> Result<()> {
        match fs::remove_file(self.path_for(slice)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::MacroSplit;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        let split = MacroSplit::new(25, 50).unwrap();
        save_slice(&mut store, StateSlice::MacroSplit, &split).unwrap();

        let path = dir.path().join("knapsnack_macro_split.json");
        assert!(path.exists());

        let loaded: Option<MacroSplit> = load_slice(&store, StateSlice::MacroSplit).unwrap();
        assert_eq!(loaded, Some(split));
    }

    #[test]
    fn test_missing_slice_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let loaded: Option<MacroSplit> = load_slice(&store, StateSlice::MacroSplit).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_slice_is_none() {
        let mut store = MemoryStore::new();
        store.save(StateSlice::UserInfo, "{not json").unwrap();
        let loaded: Option<MacroSplit> = load_slice(&store, StateSlice::UserInfo).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_clear_all() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        for slice in StateSlice::ALL {
            store.save(slice, "null").unwrap();
        }
        store.clear_all().unwrap();
        for slice in StateSlice::ALL {
            assert!(store.load(slice).unwrap().is_none());
        }
        // Clearing twice is fine
        store.clear(StateSlice::MacroSplit).unwrap();
    }
}
