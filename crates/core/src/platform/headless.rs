use std::str::FromStr;

use crate::{
    catalog::ContentRecord, config::ParameterStore, input::Key, PlayerError, Result,
};

use super::{LoadStage, Platform, Player, Simulation, VideoMode, Window, WindowRequest};

/// A key held down for `hold` frames starting at frame `frame` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedPress {
    pub frame: u64,
    pub key: Key,
    pub hold: u64,
}

impl ScriptedPress {
    fn covers(&self, frame: u64, key: Key) -> bool {
        self.key == key && frame >= self.frame && frame - self.frame < self.hold
    }

    /// Parses a comma separated list of `frame:key[:hold]` entries.
    pub fn parse_list(input: &str) -> Result<Vec<ScriptedPress>> {
        input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse::<ScriptedPress>)
            .collect()
    }
}

impl FromStr for ScriptedPress {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let frame = parts
            .next()
            .and_then(|frame| frame.trim().parse::<u64>().ok())
            .ok_or_else(|| PlayerError::msg(format!("invalid frame in `{s}`")))?;
        let key = parts
            .next()
            .ok_or_else(|| PlayerError::msg(format!("missing key in `{s}`")))?
            .parse::<Key>()?;
        let hold = match parts.next() {
            Some(hold) => hold
                .trim()
                .parse::<u64>()
                .map_err(|_| PlayerError::msg(format!("invalid hold in `{s}`")))?,
            None => 1,
        };
        if parts.next().is_some() {
            return Err(PlayerError::msg(format!("too many fields in `{s}`")));
        }
        Ok(Self { frame, key, hold })
    }
}

/// Window system without a display, driven by a key script.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    video_mode: VideoMode,
    script: Vec<ScriptedPress>,
    frame_limit: Option<u64>,
}

impl HeadlessPlatform {
    pub fn new(video_mode: VideoMode) -> Self {
        Self {
            video_mode,
            script: Vec::new(),
            frame_limit: None,
        }
    }

    pub fn with_script(mut self, script: Vec<ScriptedPress>) -> Self {
        self.script = script;
        self
    }

    /// Requests close once this many frames have been presented.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

impl Platform for HeadlessPlatform {
    type Window = HeadlessWindow;

    fn primary_video_mode(&self) -> Result<VideoMode> {
        Ok(self.video_mode)
    }

    fn create_window(&mut self, request: &WindowRequest) -> Result<HeadlessWindow> {
        if request.width == 0 || request.height == 0 {
            return Err(PlayerError::bootstrap(format!(
                "cannot create a {}x{} window",
                request.width, request.height
            )));
        }
        tracing::info!(
            width = request.width,
            height = request.height,
            monitor_bound = request.monitor_bound,
            title = %request.title,
            "headless window created"
        );
        Ok(HeadlessWindow {
            request: request.clone(),
            script: self.script.clone(),
            frame_limit: self.frame_limit,
            frames: 0,
            swaps: 0,
            screenshots: 0,
            swap_interval: 0,
            last_viewport: None,
            loading_message: None,
            should_close: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    request: WindowRequest,
    script: Vec<ScriptedPress>,
    frame_limit: Option<u64>,
    frames: u64,
    swaps: u64,
    screenshots: u32,
    swap_interval: u32,
    last_viewport: Option<(u32, u32)>,
    loading_message: Option<String>,
    should_close: bool,
}

impl HeadlessWindow {
    pub fn request(&self) -> &WindowRequest {
        &self.request
    }

    /// Number of frames started with [`Window::reset_frame`].
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    pub fn screenshots(&self) -> u32 {
        self.screenshots
    }

    pub fn swap_interval(&self) -> u32 {
        self.swap_interval
    }

    pub fn last_viewport(&self) -> Option<(u32, u32)> {
        self.last_viewport
    }

    pub fn loading_message(&self) -> Option<&str> {
        self.loading_message.as_deref()
    }
}

impl Window for HeadlessWindow {
    fn reset_frame(&mut self, viewport: (u32, u32)) -> Result<()> {
        self.frames += 1;
        self.last_viewport = Some(viewport);
        Ok(())
    }

    fn show_loading(&mut self, message: &str) -> Result<()> {
        self.loading_message = Some(message.to_string());
        Ok(())
    }

    fn set_swap_interval(&mut self, interval: u32) {
        self.swap_interval = interval;
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        let Some(current) = self.frames.checked_sub(1) else {
            return false;
        };
        self.script.iter().any(|press| press.covers(current, key))
    }

    fn capture_screenshot(&mut self) -> Result<()> {
        self.screenshots += 1;
        tracing::info!(frame = self.frames, count = self.screenshots, "screenshot captured");
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.swaps += 1;
        Ok(())
    }

    fn poll_events(&mut self) {
        if let Some(limit) = self.frame_limit {
            if self.frames >= limit && !self.should_close {
                tracing::debug!(limit, "frame limit reached");
                self.should_close = true;
            }
        }
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }
}

/// Simulation that records its warm-up and hands out a counting player.
#[derive(Debug, Default)]
pub struct HeadlessSimulation {
    loaded: Vec<LoadStage>,
}

impl HeadlessSimulation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Simulation for HeadlessSimulation {
    type Player = HeadlessPlayer;

    fn load(&mut self, stage: LoadStage, record: &ContentRecord) -> Result<()> {
        tracing::debug!(?stage, record = %record, "loading resources");
        self.loaded.push(stage);
        Ok(())
    }

    fn spawn_player(
        &mut self,
        record: &ContentRecord,
        params: &ParameterStore,
    ) -> Result<HeadlessPlayer> {
        tracing::info!(
            record = %record,
            mover = %params.mover,
            cursors = params.cursor_divides(),
            "player ready"
        );
        Ok(HeadlessPlayer {
            loaded: std::mem::take(&mut self.loaded),
            draws: 0,
            last_cursors: params.cursor_divides(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessPlayer {
    loaded: Vec<LoadStage>,
    draws: u64,
    last_cursors: u32,
}

impl HeadlessPlayer {
    /// Warm-up stages that ran before this player was spawned.
    pub fn loaded(&self) -> &[LoadStage] {
        &self.loaded
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn last_cursors(&self) -> u32 {
        self.last_cursors
    }
}

impl Player for HeadlessPlayer {
    fn draw(&mut self, _time_offset: f64, params: &ParameterStore) -> Result<()> {
        self.draws += 1;
        let cursors = params.cursor_divides();
        if cursors != self.last_cursors {
            tracing::info!(from = self.last_cursors, to = cursors, "cursor count changed");
            self.last_cursors = cursors;
        }
        Ok(())
    }
}
