//! Game settings
//!
//! Persisted in LocalStorage on the web; read from an optional JSON file by
//! the native runner. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Container layout and presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Visible container width (walls sit just outside)
    pub arena_width: f32,
    /// Visible container height (floor sits just below)
    pub arena_height: f32,
    /// Height at which dropped fruit appears (from the top)
    pub drop_height: f32,

    // === Presentation ===
    /// Built-in sprite path, `{index}` is replaced by the tier
    pub asset_pattern: String,

    // === Sharing ===
    /// Query parameter carrying the share token
    pub share_query_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            arena_width: 400.0,
            arena_height: 600.0,
            drop_height: 50.0,
            asset_pattern: "fruit{index}.png".to_string(),
            share_query_key: "game".to_string(),
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fruit_merge_settings";

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| GameError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.arena_width) || !positive(self.arena_height) {
            return Err(GameError::InvalidSettings(format!(
                "arena must be positive, got {}x{}",
                self.arena_width, self.arena_height
            )));
        }
        if !self.drop_height.is_finite()
            || self.drop_height < 0.0
            || self.drop_height >= self.arena_height
        {
            return Err(GameError::InvalidSettings(format!(
                "drop height {} must lie inside the arena",
                self.drop_height
            )));
        }
        if self.share_query_key.is_empty()
            || !self
                .share_query_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(GameError::InvalidSettings(format!(
                "share query key {:?} must be a plain identifier",
                self.share_query_key
            )));
        }
        Ok(())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.to_json());
            log::info!("Settings saved");
        }
    }

    /// Load settings from a JSON file, falling back to defaults (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| GameError::InvalidSettings(format!("{}: {e}", path.display())))?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
