use crate::{
    config::ParameterStore,
    input::{EdgeTrigger, Key},
    platform::{Player, Window},
    Result,
};

pub const CLOSE_KEY: Key = Key::Escape;
pub const SCREENSHOT_KEY: Key = Key::F2;
pub const DECREMENT_KEY: Key = Key::Minus;
pub const INCREMENT_KEY: Key = Key::Equal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Running,
    /// Close was requested this frame; the window has not reported it yet.
    ClosePending,
    Closed,
}

impl LoopState {
    pub fn is_closed(self) -> bool {
        self == LoopState::Closed
    }
}

/// Per-frame work plus the key debounce state carried between frames.
#[derive(Debug, Default)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
    screenshot: EdgeTrigger,
    decrement: EdgeTrigger,
    increment: EdgeTrigger,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame: reset, draw, input, present. Once closed, further
    /// calls do nothing.
    pub fn step<W, P>(
        &mut self,
        window: &mut W,
        player: Option<&mut P>,
        params: &mut ParameterStore,
    ) -> Result<LoopState>
    where
        W: Window + ?Sized,
        P: Player + ?Sized,
    {
        if self.state.is_closed() {
            return Ok(self.state);
        }

        window.reset_frame(params.graphics.viewport())?;

        if let Some(player) = player {
            player.draw(0.0, params)?;
        }

        self.handle_input(window, params)?;

        window.swap_buffers()?;
        window.poll_events();
        self.frames += 1;

        if window.should_close() {
            tracing::info!(frames = self.frames, "window closing");
            self.state = LoopState::Closed;
        }
        Ok(self.state)
    }

    fn handle_input<W>(&mut self, window: &mut W, params: &mut ParameterStore) -> Result<()>
    where
        W: Window + ?Sized,
    {
        if window.is_key_pressed(CLOSE_KEY) {
            window.set_should_close(true);
            self.state = LoopState::ClosePending;
        }

        if self.screenshot.update(window.is_key_pressed(SCREENSHOT_KEY)) {
            window.capture_screenshot()?;
        }

        if self.decrement.update(window.is_key_pressed(DECREMENT_KEY)) {
            params.decrement_cursors();
            tracing::debug!(cursors = params.cursor_divides(), "cursor count decreased");
        }

        if self.increment.update(window.is_key_pressed(INCREMENT_KEY)) {
            params.increment_cursors();
            tracing::debug!(cursors = params.cursor_divides(), "cursor count increased");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::PlayerError;

    #[derive(Default)]
    struct FakeWindow {
        held: HashSet<Key>,
        calls: Vec<&'static str>,
        viewport: Option<(u32, u32)>,
        screenshots: u32,
        should_close: bool,
        fail_swap: bool,
    }

    impl Window for FakeWindow {
        fn reset_frame(&mut self, viewport: (u32, u32)) -> Result<()> {
            self.calls.push("reset");
            self.viewport = Some(viewport);
            Ok(())
        }

        fn show_loading(&mut self, _message: &str) -> Result<()> {
            Ok(())
        }

        fn set_swap_interval(&mut self, _interval: u32) {}

        fn is_key_pressed(&self, key: Key) -> bool {
            self.held.contains(&key)
        }

        fn capture_screenshot(&mut self) -> Result<()> {
            self.screenshots += 1;
            Ok(())
        }

        fn swap_buffers(&mut self) -> Result<()> {
            if self.fail_swap {
                return Err(PlayerError::frame("swap failed"));
            }
            self.calls.push("swap");
            Ok(())
        }

        fn poll_events(&mut self) {
            self.calls.push("poll");
        }

        fn should_close(&self) -> bool {
            self.should_close
        }

        fn set_should_close(&mut self, value: bool) {
            self.should_close = value;
        }
    }

    #[derive(Default)]
    struct FakePlayer {
        offsets: Vec<f64>,
    }

    impl Player for FakePlayer {
        fn draw(&mut self, time_offset: f64, _params: &ParameterStore) -> Result<()> {
            self.offsets.push(time_offset);
            Ok(())
        }
    }

    /// Presses and releases `key` `presses` times, one frame each.
    fn press_edges(
        frame_loop: &mut FrameLoop,
        window: &mut FakeWindow,
        params: &mut ParameterStore,
        key: Key,
        presses: usize,
    ) {
        for _ in 0..presses {
            window.held.insert(key);
            frame_loop.step(window, None::<&mut FakePlayer>, params).unwrap();
            window.held.remove(&key);
            frame_loop.step(window, None::<&mut FakePlayer>, params).unwrap();
        }
    }

    #[test]
    fn frame_runs_steps_in_order() {
        let mut frame_loop = FrameLoop::new();
        let mut window = FakeWindow::default();
        let mut player = FakePlayer::default();
        let mut params = ParameterStore::default();
        params.graphics.fullscreen = false;

        let state = frame_loop
            .step(&mut window, Some(&mut player), &mut params)
            .unwrap();

        assert_eq!(state, LoopState::Running);
        assert_eq!(window.calls, ["reset", "swap", "poll"]);
        assert_eq!(window.viewport, Some((1280, 720)));
        assert_eq!(player.offsets, [0.0]);
        assert_eq!(frame_loop.frames(), 1);
    }

    #[test]
    fn three_increment_presses_reach_four() {
        let mut frame_loop = FrameLoop::new();
        let mut window = FakeWindow::default();
        let mut params = ParameterStore::default();

        press_edges(&mut frame_loop, &mut window, &mut params, INCREMENT_KEY, 3);

        assert_eq!(params.cursor_divides(), 4);
    }

    #[test]
    fn holding_a_key_acts_once() {
        let mut frame_loop = FrameLoop::new();
        let mut window = FakeWindow::default();
        let mut params = ParameterStore::default();

        window.held.insert(INCREMENT_KEY);
        window.held.insert(SCREENSHOT_KEY);
        for _ in 0..30 {
            frame_loop
                .step(&mut window, None::<&mut FakePlayer>, &mut params)
                .unwrap();
        }

        assert_eq!(params.cursor_divides(), 2);
        assert_eq!(window.screenshots, 1);
    }

    #[test]
    fn decrement_is_floored_at_one() {
        let mut frame_loop = FrameLoop::new();
        let mut window = FakeWindow::default();
        let mut params = ParameterStore::default();

        press_edges(&mut frame_loop, &mut window, &mut params, DECREMENT_KEY, 5);
        assert_eq!(params.cursor_divides(), 1);

        press_edges(&mut frame_loop, &mut window, &mut params, INCREMENT_KEY, 2);
        press_edges(&mut frame_loop, &mut window, &mut params, DECREMENT_KEY, 1);
        assert_eq!(params.cursor_divides(), 2);
    }

    #[test]
    fn screenshot_rearms_after_release() {
        let mut frame_loop = FrameLoop::new();
        let mut window = FakeWindow::default();
        let mut params = ParameterStore::default();

        press_edges(&mut frame_loop, &mut window, &mut params, SCREENSHOT_KEY, 2);
        assert_eq!(window.screenshots, 2);
    }

    #[test]
    fn close_key_closes_the_loop() {
        let mut frame_loop = FrameLoop::new();
        let mut window = FakeWindow::default();
        let mut params = ParameterStore::default();

        window.held.insert(CLOSE_KEY);
        let state = frame_loop
            .step(&mut window, None::<&mut FakePlayer>, &mut params)
            .unwrap();
        assert_eq!(state, LoopState::Closed);
        assert!(window.should_close);

        let calls = window.calls.len();
        frame_loop
            .step(&mut window, None::<&mut FakePlayer>, &mut params)
            .unwrap();
        assert_eq!(window.calls.len(), calls);
    }

    #[test]
    fn close_pending_until_window_reports_it() {
        struct StubbornWindow(FakeWindow);

        impl Window for StubbornWindow {
            fn reset_frame(&mut self, viewport: (u32, u32)) -> Result<()> {
                self.0.reset_frame(viewport)
            }
            fn show_loading(&mut self, message: &str) -> Result<()> {
                self.0.show_loading(message)
            }
            fn set_swap_interval(&mut self, interval: u32) {
                self.0.set_swap_interval(interval)
            }
            fn is_key_pressed(&self, key: Key) -> bool {
                self.0.is_key_pressed(key)
            }
            fn capture_screenshot(&mut self) -> Result<()> {
                self.0.capture_screenshot()
            }
            fn swap_buffers(&mut self) -> Result<()> {
                self.0.swap_buffers()
            }
            fn poll_events(&mut self) {
                self.0.poll_events()
            }
            fn should_close(&self) -> bool {
                false
            }
            fn set_should_close(&mut self, value: bool) {
                self.0.set_should_close(value)
            }
        }

        let mut frame_loop = FrameLoop::new();
        let mut window = StubbornWindow(FakeWindow::default());
        let mut params = ParameterStore::default();
        window.0.held.insert(CLOSE_KEY);

        let state = frame_loop
            .step(&mut window, None::<&mut FakePlayer>, &mut params)
            .unwrap();
        assert_eq!(state, LoopState::ClosePending);
    }

    #[test]
    fn frame_failures_propagate() {
        let mut frame_loop = FrameLoop::new();
        let mut window = FakeWindow {
            fail_swap: true,
            ..FakeWindow::default()
        };
        let mut params = ParameterStore::default();

        let err = frame_loop
            .step(&mut window, None::<&mut FakePlayer>, &mut params)
            .unwrap_err();
        assert!(matches!(err, PlayerError::Frame(_)));
    }
}
