//! Core library for the Beatmap Player playback client.
//!
//! The crate owns startup and the per-frame loop: selecting one catalog
//! record, deciding the window geometry, confining every graphics call to a
//! single dispatch thread and mutating a handful of runtime knobs from key
//! presses. Rendering, audio and the simulated cursors sit behind the traits
//! in [`platform`].

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod frame;
pub mod input;
pub mod platform;
pub mod session;

pub use catalog::{select_one, Catalog, ContentRecord, FilterCriteria, JsonCatalog, PlayStats};
pub use config::{
    GraphicsSettings, LaunchOptions, LoadedSettings, ParameterStore, SettingsFile,
    SettingsPersistence,
};
pub use dispatch::{Dispatcher, DEFAULT_QUEUE_CAPACITY};
pub use display::DisplayConfig;
pub use error::{PlayerError, Result};
pub use frame::{FrameLoop, LoopState};
pub use input::{ButtonState, EdgeTrigger, Key};
pub use platform::{
    HeadlessPlatform, HeadlessSimulation, LoadStage, Platform, Player, ScriptedPress, Simulation,
    VideoMode, Window, WindowRequest,
};
pub use session::{bootstrap, launch, Environment, RunSummary, Session};
