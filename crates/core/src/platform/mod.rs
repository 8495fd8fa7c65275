//! Seams towards the windowing, rendering and simulation subsystems.
//!
//! Implementations are only ever driven from the dispatch thread; none of
//! these traits require `Send`.

use std::path::PathBuf;

use crate::{catalog::ContentRecord, config::ParameterStore, input::Key, Result};

pub mod headless;

pub use headless::{
    HeadlessPlatform, HeadlessPlayer, HeadlessSimulation, HeadlessWindow, ScriptedPress,
};

/// Active mode of a physical display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    pub width: u32,
    pub height: u32,
}

/// Everything needed to open the playback window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRequest {
    pub width: u32,
    pub height: u32,
    /// Bind the window to the primary monitor (fullscreen-sized).
    pub monitor_bound: bool,
    pub title: String,
    /// Icon images, largest first.
    pub icons: Vec<PathBuf>,
    /// Multisample count.
    pub samples: u32,
    pub resizable: bool,
}

/// Window system: monitor queries and window creation.
pub trait Platform {
    type Window: Window;

    fn primary_video_mode(&self) -> Result<VideoMode>;

    fn create_window(&mut self, request: &WindowRequest) -> Result<Self::Window>;
}

/// A window with a current graphics context.
pub trait Window {
    /// Enables multisampling, disables dithering and scissoring, sets the
    /// viewport and clears color and depth.
    fn reset_frame(&mut self, viewport: (u32, u32)) -> Result<()>;

    /// Draws a one-off status text.
    fn show_loading(&mut self, message: &str) -> Result<()>;

    fn set_swap_interval(&mut self, interval: u32);

    fn is_key_pressed(&self, key: Key) -> bool;

    fn capture_screenshot(&mut self) -> Result<()>;

    fn swap_buffers(&mut self) -> Result<()>;

    fn poll_events(&mut self);

    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, value: bool);
}

/// Resource warm-up phases, run once in this order before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Fonts,
    Samples,
    Objects,
    CustomSamples,
}

impl LoadStage {
    pub const ORDER: [LoadStage; 4] = [
        LoadStage::Fonts,
        LoadStage::Samples,
        LoadStage::Objects,
        LoadStage::CustomSamples,
    ];
}

/// Loads resources and produces the player for a record.
pub trait Simulation {
    type Player: Player;

    fn load(&mut self, stage: LoadStage, record: &ContentRecord) -> Result<()>;

    fn spawn_player(
        &mut self,
        record: &ContentRecord,
        params: &ParameterStore,
    ) -> Result<Self::Player>;
}

/// Opaque simulation handle drawn once per frame.
pub trait Player {
    fn draw(&mut self, time_offset: f64, params: &ParameterStore) -> Result<()>;
}
