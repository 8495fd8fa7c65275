//! Startup sequence and the per-frame driver.
//!
//! [`launch`] makes the calling thread the dispatch thread, runs [`bootstrap`]
//! there as the first submission and then submits one frame at a time until
//! the window reports that it should close.

use std::path::PathBuf;

use crate::{
    catalog::{select_one, Catalog, ContentRecord},
    config::{LaunchOptions, ParameterStore, SettingsPersistence},
    dispatch::{self, Dispatcher, DEFAULT_QUEUE_CAPACITY},
    display,
    frame::{FrameLoop, LoopState},
    platform::{LoadStage, Platform, Player, Simulation, Window, WindowRequest},
    PlayerError, Result,
};

pub const APP_NAME: &str = "beatmap-player";
pub const LOADING_MESSAGE: &str = "Loading...";
pub const ICON_PATHS: [&str; 4] = [
    "assets/textures/icon.png",
    "assets/textures/icon48.png",
    "assets/textures/icon24.png",
    "assets/textures/icon16.png",
];

/// Collaborators handed to [`bootstrap`].
#[derive(Debug)]
pub struct Environment<Pl, Ca, Se, Si> {
    pub platform: Pl,
    pub catalog: Ca,
    pub settings: Se,
    pub simulation: Si,
}

/// Everything owned by the dispatch thread once bootstrap has finished.
#[derive(Debug)]
pub struct Session<W, P> {
    window: W,
    player: Option<P>,
    params: ParameterStore,
    record: ContentRecord,
    frame_loop: FrameLoop,
}

impl<W: Window, P: Player> Session<W, P> {
    /// Runs one frame of the loop.
    pub fn frame(&mut self) -> Result<LoopState> {
        self.frame_loop
            .step(&mut self.window, self.player.as_mut(), &mut self.params)
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn player(&self) -> Option<&P> {
        self.player.as_ref()
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn record(&self) -> &ContentRecord {
        &self.record
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }
}

/// Title shown on the playback window.
pub fn window_title(record: &ContentRecord) -> String {
    format!(
        "{APP_NAME} {} - {} - {} [{}]",
        env!("CARGO_PKG_VERSION"),
        record.artist,
        record.title,
        record.difficulty
    )
}

/// Selects the record, opens the window and warms up resources.
///
/// Must run on the dispatch thread: the window and player it returns are
/// bound to it.
pub fn bootstrap<Pl, Ca, Se, Si>(
    options: &LaunchOptions,
    env: Environment<Pl, Ca, Se, Si>,
) -> Result<Session<Pl::Window, Si::Player>>
where
    Pl: Platform,
    Ca: Catalog,
    Se: SettingsPersistence,
    Si: Simulation,
{
    let Environment {
        mut platform,
        mut catalog,
        mut settings,
        mut simulation,
    } = env;

    if options.criteria.is_empty() {
        return Err(PlayerError::NoCriteria);
    }

    let loaded = settings.load()?;
    let mut params = ParameterStore::new(options, loaded.graphics)?;

    let record = select_one(&options.criteria, &mut catalog)?;

    let config = display::resolve(loaded.is_first_run, &mut params, &platform, &mut settings)?;
    let request = WindowRequest {
        width: config.width,
        height: config.height,
        monitor_bound: config.monitor_bound,
        title: window_title(&record),
        icons: ICON_PATHS.into_iter().map(PathBuf::from).collect(),
        samples: params.graphics.msaa,
        resizable: false,
    };
    let mut window = platform.create_window(&request)?;
    tracing::info!(
        width = config.width,
        height = config.height,
        monitor_bound = config.monitor_bound,
        "window initialized"
    );

    window.show_loading(LOADING_MESSAGE)?;
    window.swap_buffers()?;
    window.poll_events();

    window.set_swap_interval(u32::from(params.graphics.vsync));

    for stage in LoadStage::ORDER {
        simulation
            .load(stage, &record)
            .map_err(|err| PlayerError::bootstrap(format!("loading {stage:?}: {err}")))?;
    }
    let player = simulation.spawn_player(&record, &params)?;

    Ok(Session {
        window,
        player: Some(player),
        params,
        record,
        frame_loop: FrameLoop::new(),
    })
}

/// Outcome of a finished session.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub record: ContentRecord,
    pub frames: u64,
    pub cursor_divides: u32,
}

/// Submits frames until the session reports it is closed. A window closed
/// during bootstrap gets no frame at all.
pub fn drive<W, P>(dispatcher: &Dispatcher<Session<W, P>>) -> Result<RunSummary>
where
    W: Window + 'static,
    P: Player + 'static,
{
    let mut closed = dispatcher.submit(|session| Ok(session.window.should_close()))?;
    while !closed {
        closed = dispatcher.submit(|session| session.frame())?.is_closed();
    }

    dispatcher.submit(|session| {
        Ok(RunSummary {
            record: session.record.clone(),
            frames: session.frame_loop.frames(),
            cursor_divides: session.params.cursor_divides(),
        })
    })
}

/// Runs a whole session with the calling thread as the dispatch thread.
///
/// `environment` is invoked on the dispatch thread, so the collaborators it
/// builds never cross threads.
pub fn launch<Pl, Ca, Se, Si, F>(options: LaunchOptions, environment: F) -> Result<RunSummary>
where
    Pl: Platform + 'static,
    Pl::Window: 'static,
    Ca: Catalog + 'static,
    Se: SettingsPersistence + 'static,
    Si: Simulation + 'static,
    Si::Player: 'static,
    F: FnOnce() -> Result<Environment<Pl, Ca, Se, Si>> + Send + 'static,
{
    dispatch::run(
        DEFAULT_QUEUE_CAPACITY,
        move |dispatcher: Dispatcher<Session<Pl::Window, Si::Player>>| {
            dispatcher.install(move || bootstrap(&options, environment()?))?;
            drive(&dispatcher)
        },
    )
}
