use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{catalog::FilterCriteria, PlayerError, Result};

/// Schema version written when settings are saved under profile `0`.
pub const SETTINGS_VERSION: u32 = 1;

const SETTINGS_FILE_NAME: &str = "settings.json";

/// Everything the command line can say about a playback session.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub criteria: FilterCriteria,
    /// Requested settings schema version. `0` forces the first-run path.
    pub settings_version: u32,
    pub cursors: i64,
    pub tag: i64,
    pub speed: f64,
    pub pitch: f64,
    pub mover: String,
    pub debug: bool,
    pub fps: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria {
                artist: String::new(),
                title: "Sidetracked Day".to_string(),
                creator: String::new(),
                difficulty: "THREE DIMENSIONS".to_string(),
            },
            settings_version: 0,
            cursors: 1,
            tag: 1,
            speed: 1.0,
            pitch: 1.0,
            mover: "linear".to_string(),
            debug: false,
            fps: false,
        }
    }
}

/// Window and context geometry. This is the only block that is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsSettings {
    pub width: u32,
    pub height: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    pub msaa: u32,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            window_width: 1280,
            window_height: 720,
            fullscreen: true,
            vsync: false,
            msaa: 16,
        }
    }
}

impl GraphicsSettings {
    /// Dimensions of the drawable area for the current mode.
    pub fn viewport(&self) -> (u32, u32) {
        if self.fullscreen {
            (self.width, self.height)
        } else {
            (self.window_width, self.window_height)
        }
    }
}

/// Runtime knobs shared by the bootstrap and the frame loop.
///
/// Only code running on the dispatch thread ever holds a mutable reference:
/// the store lives inside the session context owned by that thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    pub debug: bool,
    pub show_fps: bool,
    cursor_divides: u32,
    pub tag_count: u32,
    pub speed: f64,
    pub pitch: f64,
    pub mover: String,
    pub graphics: GraphicsSettings,
}

impl ParameterStore {
    /// Merges command line options with persisted graphics settings.
    pub fn new(options: &LaunchOptions, graphics: GraphicsSettings) -> Result<Self> {
        if !(options.speed.is_finite() && options.speed > 0.0) {
            return Err(PlayerError::bootstrap(format!(
                "speed must be positive, got {}",
                options.speed
            )));
        }
        if !(options.pitch.is_finite() && options.pitch > 0.0) {
            return Err(PlayerError::bootstrap(format!(
                "pitch must be positive, got {}",
                options.pitch
            )));
        }

        Ok(Self {
            debug: options.debug,
            show_fps: options.fps,
            cursor_divides: clamp_count(options.cursors),
            tag_count: clamp_count(options.tag),
            speed: options.speed,
            pitch: options.pitch,
            mover: options.mover.clone(),
            graphics,
        })
    }

    pub fn cursor_divides(&self) -> u32 {
        self.cursor_divides
    }

    pub fn increment_cursors(&mut self) {
        self.cursor_divides = self.cursor_divides.saturating_add(1);
    }

    /// Never goes below one cursor.
    pub fn decrement_cursors(&mut self) {
        if self.cursor_divides > 1 {
            self.cursor_divides -= 1;
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self {
            debug: false,
            show_fps: false,
            cursor_divides: 1,
            tag_count: 1,
            speed: 1.0,
            pitch: 1.0,
            mover: "linear".to_string(),
            graphics: GraphicsSettings::default(),
        }
    }
}

fn clamp_count(value: i64) -> u32 {
    value.clamp(1, i64::from(u32::MAX)) as u32
}

/// Storage for the persisted part of the [`ParameterStore`].
pub trait SettingsPersistence {
    /// Reads the stored settings and reports whether this is a first run.
    fn load(&mut self) -> Result<LoadedSettings>;

    fn save(&mut self, store: &ParameterStore) -> Result<()>;
}

/// What [`SettingsPersistence::load`] found.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    pub graphics: GraphicsSettings,
    pub is_first_run: bool,
}

impl LoadedSettings {
    pub fn first_run() -> Self {
        Self {
            graphics: GraphicsSettings::default(),
            is_first_run: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsRecord {
    version: u32,
    graphics: GraphicsSettings,
}

/// Versioned JSON settings stored as `settings.json` in a directory.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    requested_version: u32,
}

impl SettingsFile {
    pub fn new(dir: impl AsRef<Path>, requested_version: u32) -> Self {
        Self {
            path: dir.as_ref().join(SETTINGS_FILE_NAME),
            requested_version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> Result<Option<SettingsRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&contents).map_err(|err| {
            PlayerError::bootstrap(format!("malformed settings {:?}: {err}", self.path))
        })?;
        Ok(Some(record))
    }

    /// Version stamped into the file on save.
    fn stored_version(&self) -> u32 {
        if self.requested_version == 0 {
            SETTINGS_VERSION
        } else {
            self.requested_version
        }
    }
}

impl SettingsPersistence for SettingsFile {
    /// Version `0`, a missing file, or a stored version that differs from the
    /// requested one all count as a first run. A first run still keeps the
    /// stored graphics block when there is one; only the geometry is
    /// re-detected afterwards.
    fn load(&mut self) -> Result<LoadedSettings> {
        let requested_version = self.requested_version;
        let Some(record) = self.read_record()? else {
            tracing::info!(
                path = ?self.path,
                requested_version,
                "first run, using default settings"
            );
            return Ok(LoadedSettings::first_run());
        };

        if requested_version == 0 || record.version != requested_version {
            tracing::info!(
                stored = record.version,
                requested_version,
                "first run, keeping stored graphics settings"
            );
            return Ok(LoadedSettings {
                graphics: record.graphics,
                is_first_run: true,
            });
        }

        Ok(LoadedSettings {
            graphics: record.graphics,
            is_first_run: false,
        })
    }

    fn save(&mut self, store: &ParameterStore) -> Result<()> {
        let record = SettingsRecord {
            version: self.stored_version(),
            graphics: store.graphics.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = ?self.path, version = record.version, "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_count_never_drops_below_one() {
        let mut store = ParameterStore::default();
        for _ in 0..5 {
            store.decrement_cursors();
        }
        assert_eq!(store.cursor_divides(), 1);

        store.increment_cursors();
        store.increment_cursors();
        store.decrement_cursors();
        assert_eq!(store.cursor_divides(), 2);
    }

    #[test]
    fn clamps_counts_from_options() {
        let options = LaunchOptions {
            cursors: -3,
            tag: 0,
            ..LaunchOptions::default()
        };
        let store = ParameterStore::new(&options, GraphicsSettings::default()).unwrap();
        assert_eq!(store.cursor_divides(), 1);
        assert_eq!(store.tag_count, 1);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let options = LaunchOptions {
            speed: 0.0,
            ..LaunchOptions::default()
        };
        let err = ParameterStore::new(&options, GraphicsSettings::default()).unwrap_err();
        assert!(matches!(err, PlayerError::Bootstrap(_)));
    }

    #[test]
    fn viewport_follows_fullscreen_flag() {
        let mut graphics = GraphicsSettings::default();
        assert_eq!(graphics.viewport(), (1920, 1080));
        graphics.fullscreen = false;
        assert_eq!(graphics.viewport(), (1280, 720));
    }

    #[test]
    fn version_zero_is_always_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = SettingsFile::new(dir.path(), 0);
        assert!(file.load().unwrap().is_first_run);

        file.save(&ParameterStore::default()).unwrap();
        assert!(file.path().exists());
        assert!(file.load().unwrap().is_first_run);
    }

    #[test]
    fn saved_settings_load_for_matching_version() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = SettingsFile::new(dir.path(), 0);
        assert!(first.load().unwrap().is_first_run);

        let mut store = ParameterStore::default();
        store.graphics.width = 2560;
        store.graphics.height = 1440;
        first.save(&store).unwrap();

        let loaded = SettingsFile::new(dir.path(), SETTINGS_VERSION).load().unwrap();
        assert!(!loaded.is_first_run);
        assert_eq!(loaded.graphics.width, 2560);
        assert_eq!(loaded.graphics.height, 1440);
    }

    #[test]
    fn first_run_keeps_stored_window_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut saved = ParameterStore::default();
        saved.graphics.fullscreen = false;
        saved.graphics.window_width = 1600;
        saved.graphics.window_height = 900;
        saved.graphics.vsync = true;
        saved.graphics.msaa = 4;
        SettingsFile::new(dir.path(), SETTINGS_VERSION)
            .save(&saved)
            .unwrap();

        let mut first = SettingsFile::new(dir.path(), 0);
        let loaded = first.load().unwrap();
        assert!(loaded.is_first_run);
        assert_eq!(loaded.graphics, saved.graphics);

        let mut store = ParameterStore::default();
        store.graphics = loaded.graphics;
        store.graphics.width = 2560;
        store.graphics.height = 1440;
        first.save(&store).unwrap();

        let reloaded = SettingsFile::new(dir.path(), SETTINGS_VERSION).load().unwrap();
        assert!(!reloaded.is_first_run);
        assert_eq!(
            reloaded.graphics,
            GraphicsSettings {
                width: 2560,
                height: 1440,
                window_width: 1600,
                window_height: 900,
                fullscreen: false,
                vsync: true,
                msaa: 4,
            }
        );
    }

    #[test]
    fn missing_file_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SettingsFile::new(dir.path(), 2).load().unwrap();
        assert_eq!(loaded, LoadedSettings::first_run());
    }

    #[test]
    fn mismatched_version_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        SettingsFile::new(dir.path(), 3)
            .save(&ParameterStore::default())
            .unwrap();

        assert!(SettingsFile::new(dir.path(), 4).load().unwrap().is_first_run);
    }

    #[test]
    fn malformed_settings_are_a_bootstrap_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "{ not json").unwrap();

        let err = SettingsFile::new(dir.path(), 1).load().unwrap_err();
        assert!(matches!(err, PlayerError::Bootstrap(_)));
    }
}
