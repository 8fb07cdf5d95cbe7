//! Named layout presets: save, select and delete arrangements of panels.
//!
//! The store itself lives in memory for the session. `PresetFile` optionally mirrors it
//! to a JSON file so presets survive a restart.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::layout::PanelPlacement;

// Custom serialization for SystemTime (convert to/from seconds since epoch)
mod time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).map_err(|e| {
            serde::ser::Error::custom(format!("Failed to serialize SystemTime: {}", e))
        })?;
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }
}

fn now() -> SystemTime {
    SystemTime::now()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPreset {
    pub name: String,
    pub placements: Vec<PanelPlacement>,
    #[serde(with = "time_serde", default = "now")]
    pub created: SystemTime,
}

impl LayoutPreset {
    pub fn new(name: impl Into<String>, placements: Vec<PanelPlacement>) -> Self {
        Self {
            name: name.into(),
            placements,
            created: SystemTime::now(),
        }
    }

    /// Local wall-clock time the preset was saved, for display.
    pub fn created_label(&self) -> String {
        chrono::DateTime::<chrono::Local>::from(self.created)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    pub fn series(&self) -> impl Iterator<Item = &str> {
        self.placements.iter().map(|p| p.series.as_str())
    }
}

/// What `PresetStore::delete` removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: usize,
    pub was_active: bool,
}

/// In-memory collection of presets plus the name of the one currently applied.
///
/// Names are not unique: saving an existing name appends a second entry, `select` picks
/// the first entry with that name and `delete` drops every entry with it.
#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    presets: Vec<LayoutPreset>,
    active: Option<String>,
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_presets(presets: Vec<LayoutPreset>) -> Self {
        Self {
            presets,
            active: None,
        }
    }

    pub fn presets(&self) -> &[LayoutPreset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&LayoutPreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Append a preset. Returns false (and changes nothing) when the name is blank.
    pub fn save(&mut self, name: &str, arrangement: &[PanelPlacement]) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.presets.push(LayoutPreset::new(name, arrangement.to_vec()));
        true
    }

    /// Make `name` the active preset and return its arrangement. Unknown names change nothing.
    pub fn select(&mut self, name: &str) -> Option<&[PanelPlacement]> {
        let idx = self.presets.iter().position(|p| p.name == name)?;
        self.active = Some(name.to_string());
        Some(self.presets[idx].placements.as_slice())
    }

    /// Remove every preset called `name`. Deleting the active preset clears the active name.
    pub fn delete(&mut self, name: &str) -> DeleteOutcome {
        let before = self.presets.len();
        self.presets.retain(|p| p.name != name);
        let was_active = self.active.as_deref() == Some(name);
        if was_active {
            self.active = None;
        }
        DeleteOutcome {
            removed: before - self.presets.len(),
            was_active,
        }
    }

    /// Forget which preset is applied, e.g. after the arrangement is edited by hand.
    pub fn clear_active(&mut self) {
        self.active = None;
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PresetFileContents {
    version: u32,
    presets: Vec<LayoutPreset>,
}

const PRESET_FILE_VERSION: u32 = 1;

/// JSON file holding presets between sessions.
#[derive(Debug, Clone)]
pub struct PresetFile {
    path: PathBuf,
}

impl PresetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load presets. A missing file is an empty collection.
    pub fn load(&self) -> Result<Vec<LayoutPreset>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            eyre!(
                "Failed to read presets file at {}: {}",
                self.path.display(),
                e
            )
        })?;
        let contents: PresetFileContents = serde_json::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse presets file at {}: {}",
                self.path.display(),
                e
            )
        })?;
        if contents.version != PRESET_FILE_VERSION {
            return Err(eyre!(
                "Unsupported presets file version {} in {}",
                contents.version,
                self.path.display()
            ));
        }
        Ok(contents.presets)
    }

    /// Replace the file with `presets`, holding an exclusive lock while writing.
    pub fn save(&self, presets: &[LayoutPreset]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&PresetFileContents {
            version: PRESET_FILE_VERSION,
            presets: presets.to_vec(),
        })?;

        use fs2::FileExt;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        file.unlock()?;

        Ok(())
    }
}
