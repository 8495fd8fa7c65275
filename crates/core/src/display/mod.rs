use crate::{
    config::{ParameterStore, SettingsPersistence},
    platform::Platform,
    Result,
};

/// Window geometry decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// Bound to the primary monitor rather than a conventional window.
    pub monitor_bound: bool,
}

/// Decides the window geometry.
///
/// On a first run the primary monitor's active mode becomes the stored
/// fullscreen size and the store is persisted before anything else happens.
/// Otherwise the stored settings are used as-is.
pub fn resolve<P, S>(
    is_first_run: bool,
    store: &mut ParameterStore,
    platform: &P,
    persistence: &mut S,
) -> Result<DisplayConfig>
where
    P: Platform + ?Sized,
    S: SettingsPersistence + ?Sized,
{
    if is_first_run {
        let mode = platform.primary_video_mode()?;
        tracing::info!(width = mode.width, height = mode.height, "detected primary monitor");
        store.graphics.width = mode.width;
        store.graphics.height = mode.height;
        persistence.save(store)?;
        return Ok(DisplayConfig {
            width: mode.width,
            height: mode.height,
            monitor_bound: true,
        });
    }

    let graphics = &store.graphics;
    let config = if graphics.fullscreen {
        DisplayConfig {
            width: graphics.width,
            height: graphics.height,
            monitor_bound: true,
        }
    } else {
        DisplayConfig {
            width: graphics.window_width,
            height: graphics.window_height,
            monitor_bound: false,
        }
    };
    Ok(config)
}
