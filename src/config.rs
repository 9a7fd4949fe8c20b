//! Persisted panel configuration and its stores.
//!
//! The configuration is the template for the next session: runtime
//! toggles and drags never write it back.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::placement::Placement;
use crate::rules::{self, DirectoryMapping};

/// Smallest default size offered by the configuration surface.
pub const SIZE_SLIDER_MIN: u16 = 100;

/// Largest default size offered by the configuration surface.
pub const SIZE_SLIDER_MAX: u16 = 800;

/// Granularity of the default size.
pub const SIZE_SLIDER_STEP: u16 = 10;

const SIZE_KEYS: [&str; 2] = ["defaultHeight", "defaultFooterHeight"];

/// Current key and the legacy key it replaces.
const LEGACY_KEYS: [(&str, &str); 3] = [
    ("defaultVisible", "defaultFooterVisible"),
    ("defaultHeight", "defaultFooterHeight"),
    ("mappings", "directoryMappings"),
];

/// Persisted settings for one panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelConfig {
    /// Whether the panel is shown at startup.
    #[serde(alias = "defaultFooterVisible")]
    pub default_visible: bool,
    /// Panel size at startup, in pixels.
    #[serde(rename = "defaultHeight", alias = "defaultFooterHeight")]
    pub default_size: u16,
    /// Directory rules in priority order.
    #[serde(alias = "directoryMappings")]
    pub mappings: Vec<DirectoryMapping>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::for_placement(Placement::Footer)
    }
}

impl PanelConfig {
    /// Defaults for a placement.
    #[must_use]
    pub fn for_placement(placement: Placement) -> Self {
        Self {
            default_visible: false,
            default_size: placement.default_size(),
            mappings: Vec::new(),
        }
    }

    /// Decode a persisted document, filling missing keys from `placement`'s
    /// defaults and ignoring unknown keys. Legacy key names are accepted.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON or a known key has
    /// the wrong type.
    pub fn from_json(placement: Placement, json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_null() {
            return Ok(Self::for_placement(placement));
        }

        // The current key wins when a document carries both spellings.
        if let Some(object) = value.as_object_mut() {
            for (current, legacy) in LEGACY_KEYS {
                if object.contains_key(current) && object.remove(legacy).is_some() {
                    tracing::warn!(%placement, key = legacy, "ignoring legacy key");
                }
            }
        }

        let has_size = value
            .as_object()
            .is_some_and(|o| SIZE_KEYS.iter().any(|key| o.contains_key(*key)));

        let mut config: Self = serde_json::from_value(value)?;
        // serde fills a missing size from the footer defaults.
        if !has_size {
            config.default_size = placement.default_size();
        }
        Ok(config.sanitized(placement))
    }

    /// Encode for persistence.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn sanitized(mut self, placement: Placement) -> Self {
        if self.default_size == 0 {
            tracing::warn!(%placement, "persisted size is zero, using default");
            self.default_size = placement.default_size();
        }
        self
    }

    /// Find a mapping by id.
    #[must_use]
    pub fn mapping(&self, id: &str) -> Option<&DirectoryMapping> {
        self.mappings.iter().find(|m| m.id == id)
    }

    fn mapping_mut(&mut self, id: &str) -> Result<&mut DirectoryMapping> {
        self.mappings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::MappingNotFound(id.to_string()))
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.mappings
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::MappingNotFound(id.to_string()))
    }

    /// Append an empty mapping at the lowest priority and return its id.
    pub fn add_mapping(&mut self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let mut candidate = millis;
        while self.mapping(&candidate.to_string()).is_some() {
            candidate += 1;
        }

        let id = candidate.to_string();
        self.mappings.push(DirectoryMapping::new(id.clone(), "", ""));
        id
    }

    /// Remove a mapping.
    ///
    /// # Errors
    /// Returns an error if no mapping has this id.
    pub fn remove_mapping(&mut self, id: &str) -> Result<DirectoryMapping> {
        let index = self.position(id)?;
        Ok(self.mappings.remove(index))
    }

    /// Change the directory a mapping applies to. Surrounding whitespace is
    /// dropped.
    ///
    /// # Errors
    /// Returns an error if no mapping has this id.
    pub fn set_mapping_path(&mut self, id: &str, directory_path: &str) -> Result<()> {
        self.mapping_mut(id)?.directory_path = directory_path.trim().to_string();
        Ok(())
    }

    /// Replace a mapping's markup.
    ///
    /// # Errors
    /// Returns an error if no mapping has this id.
    pub fn set_mapping_content(&mut self, id: &str, content: impl Into<String>) -> Result<()> {
        self.mapping_mut(id)?.content = content.into();
        Ok(())
    }

    /// Raise a mapping's priority by one. Returns false if already first.
    ///
    /// # Errors
    /// Returns an error if no mapping has this id.
    pub fn move_mapping_up(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.mappings.swap(index, index - 1);
        Ok(true)
    }

    /// Lower a mapping's priority by one. Returns false if already last.
    ///
    /// # Errors
    /// Returns an error if no mapping has this id.
    pub fn move_mapping_down(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        if index + 1 >= self.mappings.len() {
            return Ok(false);
        }
        self.mappings.swap(index, index + 1);
        Ok(true)
    }

    /// Set the startup size, clamped to the slider range and snapped to its step.
    pub fn set_default_size(&mut self, size: u16) {
        let clamped = size.clamp(SIZE_SLIDER_MIN, SIZE_SLIDER_MAX);
        let steps = (clamped - SIZE_SLIDER_MIN + SIZE_SLIDER_STEP / 2) / SIZE_SLIDER_STEP;
        self.default_size = (SIZE_SLIDER_MIN + steps * SIZE_SLIDER_STEP).min(SIZE_SLIDER_MAX);
    }
}

/// Configuration shared between a plugin and its panel manager.
///
/// The manager only reads it; the plugin's configuration operations write
/// it and then persist a snapshot.
#[derive(Clone, Debug)]
pub struct SharedConfig(Arc<RwLock<PanelConfig>>);

impl SharedConfig {
    /// Wrap a configuration.
    #[must_use]
    pub fn new(config: PanelConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    /// Copy of the current configuration.
    #[must_use]
    pub fn get(&self) -> PanelConfig {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the configuration.
    pub fn set(&self, config: PanelConfig) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Mutate the configuration in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut PanelConfig) -> R) -> R {
        f(&mut self.0.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Markup bound to `path` under the current rules.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<String> {
        let config = self.0.read().unwrap_or_else(PoisonError::into_inner);
        rules::resolve(path, &config.mappings).map(str::to_owned)
    }
}

/// Loads and saves a panel's configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the configuration, merged over `placement`'s defaults.
    ///
    /// # Errors
    /// Returns an error if the stored document cannot be read or decoded.
    async fn load(&self, placement: Placement) -> Result<PanelConfig>;

    /// Persist the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be written.
    async fn save(&self, config: &PanelConfig) -> Result<()>;
}

/// Stores the configuration as a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    async fn load(&self, placement: Placement) -> Result<PanelConfig> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => PanelConfig::from_json(placement, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no configuration file, using defaults");
                Ok(PanelConfig::for_placement(placement))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, config: &PanelConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, config.to_json()?).await?;
        Ok(())
    }
}

/// Keeps the persisted document in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an existing JSON document.
    #[must_use]
    pub fn with_document(json: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(json.into())),
            saves: Mutex::new(0),
        }
    }

    /// The stored document, if any.
    #[must_use]
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self, placement: Placement) -> Result<PanelConfig> {
        match self.document() {
            Some(json) => PanelConfig::from_json(placement, &json),
            None => Ok(PanelConfig::for_placement(placement)),
        }
    }

    async fn save(&self, config: &PanelConfig) -> Result<()> {
        let json = config.to_json()?;
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
