use crate::camera::OrbitControls;
use crate::clock::FrameClock;
use crate::config::Settings;
use crate::input::{collect_events_nonblocking, map_event, Action};
use crate::render::{Hud, Renderer};
use crate::sim::{build_guides, AnimationLoop, BodyId, BodyRegistry, FrameHost, OrbitGuide, SceneState, SpeedControlSurface};
use crate::skybox::Skybox;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::ResetColor,
    terminal::{self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};

/// Raw-mode alternate screen. Restored on drop.
pub struct Terminal {
    mouse: bool,
    active: bool,
}

impl Terminal {
    pub fn begin(mouse: bool) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, DisableLineWrap, Clear(ClearType::All))?;
        if mouse {
            execute!(out, EnableMouseCapture)?;
        }
        terminal::enable_raw_mode()?;
        Ok(Self { mouse, active: true })
    }

    pub fn end(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let mut out = io::stdout();
        if self.mouse {
            queue!(out, DisableMouseCapture)?;
        }
        queue!(out, ResetColor, Clear(ClearType::All), cursor::Show, EnableLineWrap, LeaveAlternateScreen)?;
        out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

/// Everything the animation loop needs from the terminal side.
pub struct TerminalHost<W: Write> {
    out: W,
    renderer: Renderer,
    controls: OrbitControls,
    speeds: SpeedControlSurface,
    guides: Vec<OrbitGuide>,
    sky: Skybox,
    clock: FrameClock,
    settings: Settings,
}

impl<W: Write> TerminalHost<W> {
    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn speeds(&self) -> &SpeedControlSurface {
        &self.speeds
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> FrameHost for TerminalHost<W> {
    type Error = io::Error;

    fn refresh_controls(&mut self) {
        self.controls.update();
    }

    fn request_frame(&mut self) {
        self.clock.request();
    }

    fn submit(&mut self, scene: &SceneState) -> io::Result<()> {
        let hud = Hud {
            controls: &self.speeds,
            camera_distance: self.controls.distance(),
            fps_cap: self.settings.fps_cap,
            show_labels: self.settings.show_labels,
            show_orbits: self.settings.show_orbits,
            t_real: self.clock.elapsed_ms() / 1000.0,
        };
        self.renderer.compose(scene, &self.controls.camera, &self.guides, &self.sky, &hud);
        self.renderer.flush(&mut self.out)
    }
}

pub struct App<W: Write> {
    anim: AnimationLoop,
    host: TerminalHost<W>,
    should_quit: bool,
}

impl<W: Write> App<W> {
    pub fn new(settings: Settings, cols: u16, rows: u16, out: W) -> Self {
        let registry = BodyRegistry::solar_system();
        let guides = build_guides(&registry);
        let speeds = SpeedControlSurface::new(&registry, settings.slider);
        let renderer = Renderer::new(cols, rows);
        let controls = OrbitControls::from_settings(&settings.camera, registry.sun().position(), renderer.viewport());
        let sky = Skybox::generate(settings.star_count, settings.seed);
        let clock = FrameClock::new(settings.fps_cap);
        Self {
            anim: AnimationLoop::new(SceneState::new(registry)),
            host: TerminalHost { out, renderer, controls, speeds, guides, sky, clock, settings },
            should_quit: false,
        }
    }

    pub fn scene(&self) -> &SceneState {
        self.anim.scene()
    }

    pub fn host(&self) -> &TerminalHost<W> {
        &self.host
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Runs one animation frame at `time_ms`.
    pub fn step(&mut self, time_ms: f64) -> io::Result<()> {
        self.anim.frame(time_ms, &mut self.host)
    }

    pub fn handle(&mut self, action: Action) -> io::Result<()> {
        let host = &mut self.host;
        let scene = self.anim.scene_mut();
        let outcome = match action {
            Action::Quit => {
                self.should_quit = true;
                host.clock.cancel();
                Ok(())
            }
            Action::Orbit { left, up } => {
                host.controls.key_rotate(left, up);
                Ok(())
            }
            Action::ZoomIn => {
                host.controls.dolly_in();
                Ok(())
            }
            Action::ZoomOut => {
                host.controls.dolly_out();
                Ok(())
            }
            Action::ResetView => {
                host.controls.reset();
                Ok(())
            }
            Action::ToggleLabels => {
                host.settings.show_labels = !host.settings.show_labels;
                Ok(())
            }
            Action::ToggleOrbits => {
                host.settings.show_orbits = !host.settings.show_orbits;
                Ok(())
            }
            Action::SelectControl(i) => {
                if let Some(&id) = BodyId::PLANETS.get(i) {
                    host.speeds.select(id);
                }
                Ok(())
            }
            Action::CycleControl(delta) => {
                host.speeds.select_offset(delta);
                Ok(())
            }
            Action::Nudge(steps) => host.speeds.nudge(steps, scene).map(drop),
            Action::ZeroSpeed => host.speeds.zero(scene).map(drop),
            Action::EditOpen => {
                host.speeds.begin_edit();
                Ok(())
            }
            Action::EditChar(ch) => {
                host.speeds.edit_push(ch);
                Ok(())
            }
            Action::EditBackspace => {
                host.speeds.edit_backspace();
                Ok(())
            }
            Action::EditCommit => host.speeds.commit_edit(scene).map(drop),
            Action::EditCancel => {
                host.speeds.cancel_edit();
                Ok(())
            }
            Action::DragStart(col, row) => {
                host.controls.drag_start(col, row);
                Ok(())
            }
            Action::Drag(col, row) => {
                host.controls.drag_to(col, row);
                Ok(())
            }
            Action::DragEnd => {
                host.controls.drag_end();
                Ok(())
            }
            Action::Resize(cols, rows) => {
                host.renderer.resize(cols, rows);
                host.controls.resize(host.renderer.viewport());
                queue!(host.out, Clear(ClearType::All))?;
                tracing::debug!(cols, rows, "terminal resized");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            tracing::warn!(error = %e, "speed control rejected");
        }
        Ok(())
    }

    /// Input, then a frame, until no frame is requested. Quitting cancels the pending one.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            for ev in collect_events_nonblocking()? {
                let editing = self.host.speeds.editing().is_some();
                if let Some(action) = map_event(editing, ev) {
                    self.handle(action)?;
                }
            }
            let Some(t) = self.host.clock.next_frame() else {
                break;
            };
            self.step(t)?;
        }
        tracing::info!(frames = self.scene().frames(), "animation stopped");
        Ok(())
    }
}

pub fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        fps = settings.fps_cap,
        stars = settings.star_count,
        seed = settings.seed,
        mouse = settings.mouse,
        "starting"
    );
    let mut term = Terminal::begin(settings.mouse)?;
    let (cols, rows) = terminal::size()?;
    let mut app = App::new(settings, cols, rows, io::stdout());
    let res = app.run();
    term.end()?;
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::DVec3;

    fn app() -> App<Vec<u8>> {
        App::new(Settings::default(), 120, 40, Vec::new())
    }

    #[test]
    fn step_ticks_the_scene_and_draws() {
        let mut a = app();
        a.step(1000.0).unwrap();
        assert_eq!(a.scene().frames(), 1);
        assert!(!a.host().output().is_empty());
        let earth = a.scene().bodies().get(BodyId::Earth).position();
        assert_abs_diff_eq!(earth.x, 100.0 * 0.1_f64.cos(), epsilon = 1e-9);
        assert_abs_diff_eq!(earth.z, 100.0 * 0.1_f64.sin(), epsilon = 1e-9);
    }

    #[test]
    fn frame_requests_the_next_one() {
        let mut a = app();
        assert!(a.host.clock.next_frame().is_some());
        assert!(a.host.clock.next_frame().is_none());
        a.step(0.0).unwrap();
        assert!(a.host.clock.next_frame().is_some());
    }

    #[test]
    fn typed_speed_reaches_the_scene() {
        let mut a = app();
        a.handle(Action::SelectControl(2)).unwrap();
        a.handle(Action::EditOpen).unwrap();
        for ch in "0.5".chars() {
            a.handle(Action::EditChar(ch)).unwrap();
        }
        a.handle(Action::EditCommit).unwrap();
        assert_eq!(a.scene().bodies().get(BodyId::Earth).revolution_speed(), Some(0.5));

        a.step(1000.0).unwrap();
        let earth = a.scene().bodies().get(BodyId::Earth).position();
        assert_abs_diff_eq!(earth.x, 100.0 * 0.5_f64.cos(), epsilon = 1e-9);
    }

    #[test]
    fn garbage_speed_freezes_the_planet_out_of_view() {
        let mut a = app();
        a.handle(Action::SelectControl(3)).unwrap();
        a.handle(Action::EditOpen).unwrap();
        a.handle(Action::EditChar('x')).unwrap();
        a.handle(Action::EditCommit).unwrap();
        a.step(500.0).unwrap();
        let mars = a.scene().bodies().get(BodyId::Mars);
        assert!(mars.revolution_speed().is_some_and(f64::is_nan));
        assert!(mars.position().is_nan());
    }

    #[test]
    fn zoom_and_reset_move_the_camera() {
        let mut a = app();
        a.handle(Action::ZoomOut).unwrap();
        a.step(0.0).unwrap();
        assert!(a.host().controls().distance() > 100.0);
        a.handle(Action::ResetView).unwrap();
        let pos = a.host().controls().camera.position;
        assert!(pos.abs_diff_eq(DVec3::new(0.0, 0.0, 100.0), 1e-9), "{pos:?}");
    }

    #[test]
    fn resize_reaches_renderer_and_camera() {
        let mut a = app();
        a.handle(Action::Resize(200, 50)).unwrap();
        assert_eq!(a.host().renderer().size(), (200, 50));
        assert_eq!(a.host().controls().surface(), a.host().renderer().viewport());
    }

    #[test]
    fn quit_and_toggles() {
        let mut a = app();
        a.handle(Action::ToggleOrbits).unwrap();
        a.handle(Action::ToggleLabels).unwrap();
        assert!(!a.host().settings().show_orbits);
        assert!(!a.host().settings().show_labels);
        a.handle(Action::Quit).unwrap();
        assert!(a.should_quit());
    }

    #[test]
    fn quit_cancels_the_next_frame() {
        let mut a = app();
        a.step(0.0).unwrap();
        a.handle(Action::Quit).unwrap();
        assert!(a.host.clock.next_frame().is_none());
    }
}
