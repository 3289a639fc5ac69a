use crate::camera::{PerspectiveCamera, ScreenPoint, Surface};
use crate::sim::controls::format_speed;
use crate::sim::{Body, OrbitGuide, Rgb, SceneState, SpeedControlSurface};
use crate::skybox::Skybox;
use crossterm::{
    cursor, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};
use glam::DVec3;
use std::io::{self, Write};

pub const MIN_W: u16 = 60;
pub const MIN_H: u16 = 20;
const HUD_W: u16 = 34;
const SHADE_RAMP: [char; 9] = ['.', ':', '-', '=', '+', '*', '#', '%', '@'];

// -------------------- Shared math --------------------
fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    let aa = a as f64;
    let bb = b as f64;
    (aa + (bb - aa) * t).clamp(0.0, 255.0).round() as u8
}

fn mix_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = clamp01(t);
    Rgb { r: lerp_u8(a.r, b.r, t), g: lerp_u8(a.g, b.g, t), b: lerp_u8(a.b, b.b, t) }
}

fn scale_rgb(a: Rgb, t: f64) -> Rgb {
    let t = clamp01(t);
    Rgb {
        r: (a.r as f64 * t).clamp(0.0, 255.0) as u8,
        g: (a.g as f64 * t).clamp(0.0, 255.0) as u8,
        b: (a.b as f64 * t).clamp(0.0, 255.0) as u8,
    }
}

/// Rotates `v` about the y axis by `ang` radians.
fn rot_y(v: DVec3, ang: f64) -> DVec3 {
    let (s, c) = ang.sin_cos();
    DVec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z)
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

// -------------------- Cell buffer --------------------
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    fn blank(bg: Color) -> Self {
        Self { ch: ' ', fg: Color::Reset, bg }
    }
}

fn put_cell(buf: &mut [Cell], w: u16, h: u16, x: u16, y: u16, c: Cell) {
    let ww = w as usize;
    let xi = x as usize;
    let yi = y as usize;
    if xi >= ww || yi >= h as usize {
        return;
    }
    buf[yi * ww + xi] = c;
}

fn box_draw(buf: &mut [Cell], w: u16, h: u16, x0: u16, y0: u16, bw: u16, bh: u16, fg: Color, bg: Color) {
    if bw < 2 || bh < 2 {
        return;
    }
    let x1 = x0.saturating_add(bw - 1);
    let y1 = y0.saturating_add(bh - 1);

    for x in x0 + 1..x1 {
        put_cell(buf, w, h, x, y0, Cell { ch: '─', fg, bg });
        put_cell(buf, w, h, x, y1, Cell { ch: '─', fg, bg });
    }
    for y in y0 + 1..y1 {
        put_cell(buf, w, h, x0, y, Cell { ch: '│', fg, bg });
        put_cell(buf, w, h, x1, y, Cell { ch: '│', fg, bg });
    }
    put_cell(buf, w, h, x0, y0, Cell { ch: '┌', fg, bg });
    put_cell(buf, w, h, x1, y0, Cell { ch: '┐', fg, bg });
    put_cell(buf, w, h, x0, y1, Cell { ch: '└', fg, bg });
    put_cell(buf, w, h, x1, y1, Cell { ch: '┘', fg, bg });
}

/// Writes `s` from `x`, stopping at `max_x` (exclusive).
fn write_str(buf: &mut [Cell], w: u16, h: u16, x: u16, y: u16, max_x: u16, s: &str, fg: Color, bg: Color) {
    let limit = max_x.min(w) as usize;
    if y >= h {
        return;
    }
    let mut xi = x as usize;
    for ch in s.chars() {
        if xi >= limit {
            break;
        }
        buf[y as usize * w as usize + xi] = Cell { ch, fg, bg };
        xi += 1;
    }
}

fn render_diff<W: Write>(out: &mut W, w: u16, h: u16, prev: &mut [Cell], cur: &[Cell]) -> io::Result<()> {
    let mut cur_fg = Color::Reset;
    let mut cur_bg = Color::Reset;

    for y in 0..h as usize {
        for x in 0..w as usize {
            let i = y * (w as usize) + x;
            if prev[i] == cur[i] {
                continue;
            }
            prev[i] = cur[i];

            let c = cur[i];
            queue!(out, cursor::MoveTo(x as u16, y as u16))?;

            if c.bg != cur_bg {
                cur_bg = c.bg;
                queue!(out, SetBackgroundColor(cur_bg))?;
            }
            if c.fg != cur_fg {
                cur_fg = c.fg;
                queue!(out, SetForegroundColor(cur_fg))?;
            }
            queue!(out, Print(c.ch))?;
        }
    }
    Ok(())
}

// -------------------- Frame --------------------
/// Everything drawn besides the scene itself.
pub struct Hud<'a> {
    pub controls: &'a SpeedControlSurface,
    pub camera_distance: f64,
    pub fps_cap: u32,
    pub show_labels: bool,
    pub show_orbits: bool,
    /// Wall-clock seconds, drives star twinkle.
    pub t_real: f64,
}

pub struct Renderer {
    w: u16,
    h: u16,
    prev: Vec<Cell>,
    cur: Vec<Cell>,
}

impl Renderer {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut r = Self { w: 0, h: 0, prev: Vec::new(), cur: Vec::new() };
        r.resize(cols, rows);
        r
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.w = cols.max(MIN_W);
        self.h = rows.max(MIN_H);
        let n = self.w as usize * self.h as usize;
        self.prev = vec![Cell::blank(Color::Black); n];
        self.cur = vec![Cell::blank(Color::Black); n];
    }

    pub fn size(&self) -> (u16, u16) {
        (self.w, self.h)
    }

    fn hud_w(&self) -> u16 {
        HUD_W.min(self.w / 2)
    }

    /// The 3D view area left of the HUD.
    pub fn viewport(&self) -> Surface {
        Surface { cols: self.w.saturating_sub(self.hud_w()), rows: self.h }
    }

    pub fn row_text(&self, y: u16) -> String {
        if y >= self.h {
            return String::new();
        }
        let start = y as usize * self.w as usize;
        self.cur[start..start + self.w as usize].iter().map(|c| c.ch).collect()
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        if x >= self.w || y >= self.h {
            return None;
        }
        Some(self.cur[y as usize * self.w as usize + x as usize])
    }

    pub fn compose(&mut self, scene: &SceneState, camera: &PerspectiveCamera, guides: &[OrbitGuide], sky: &Skybox, hud: &Hud) {
        for c in self.cur.iter_mut() {
            *c = Cell::blank(Color::Black);
        }
        let view = self.viewport();
        self.paint_stars(camera, sky, view, hud.t_real);
        if hud.show_orbits {
            self.paint_guides(camera, guides, view);
        }
        self.paint_bodies(scene, camera, view, hud.show_labels);
        self.paint_hud(scene, hud, view.cols);
    }

    pub fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        render_diff(out, self.w, self.h, &mut self.prev, &self.cur)?;
        queue!(out, EndSynchronizedUpdate)?;
        out.flush()
    }

    // -------------------- Scene layers --------------------
    fn to_cell(p: ScreenPoint, view: Surface) -> (f64, f64) {
        ((p.x + 1.0) * 0.5 * view.cols as f64, (1.0 - p.y) * 0.5 * view.rows as f64)
    }

    fn put_view(&mut self, view: Surface, x: f64, y: f64, c: Cell) {
        if x < 0.0 || y < 0.0 || x >= view.cols as f64 || y >= view.rows as f64 {
            return;
        }
        put_cell(&mut self.cur, self.w, self.h, x as u16, y as u16, c);
    }

    fn paint_stars(&mut self, camera: &PerspectiveCamera, sky: &Skybox, view: Surface, t_real: f64) {
        for s in sky.stars() {
            let Some(p) = camera.project(s.position) else {
                continue;
            };
            let (x, y) = Self::to_cell(p, view);
            let tw = (t_real * 0.65 + s.phase).sin() * 0.5 + 0.5;
            let b = 0.2 + 0.8 * tw * s.depth;
            let c = (40.0 + b * 180.0).clamp(0.0, 255.0) as u8;
            let ch = if b > 0.82 { '✦' } else if b > 0.62 { '•' } else { '·' };
            let fg = Color::Rgb { r: c, g: c, b: (c as u16 + 25).min(255) as u8 };
            self.put_view(view, x, y, Cell { ch, fg, bg: Color::Black });
        }
    }

    fn paint_guides(&mut self, camera: &PerspectiveCamera, guides: &[OrbitGuide], view: Surface) {
        let fg = Color::Rgb { r: 80, g: 95, b: 120 };
        for g in guides {
            let n = g.points.len();
            for i in 0..n {
                let a = camera.project(g.points[i]);
                let b = camera.project(g.points[(i + 1) % n]);
                let (Some(a), Some(b)) = (a, b) else {
                    continue;
                };
                let (x0, y0) = Self::to_cell(a, view);
                let (x1, y1) = Self::to_cell(b, view);
                let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().clamp(1.0, 400.0) as usize;
                for s in 0..steps {
                    let t = s as f64 / steps as f64;
                    self.put_view(view, x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, Cell { ch: '·', fg, bg: Color::Black });
                }
            }
        }
    }

    fn paint_bodies(&mut self, scene: &SceneState, camera: &PerspectiveCamera, view: Surface, labels: bool) {
        let sun = scene.bodies().sun().position();
        // NaN positions fail projection and are simply not drawn
        let mut visible: Vec<(&Body, ScreenPoint)> = scene
            .bodies()
            .iter()
            .filter_map(|b| camera.project(b.position()).map(|p| (b, p)))
            .collect();
        visible.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

        for (body, p) in visible {
            self.paint_body(body, p, sun, camera, view);
            if labels {
                let (x, y) = Self::to_cell(p, view);
                let r_cells = body.appearance().radius * camera.focal() / (p.depth * camera.aspect) * view.cols as f64 * 0.5;
                let lx = x + r_cells + 2.0;
                if lx >= 0.0 && y >= 0.0 && lx < view.cols as f64 && y < view.rows as f64 {
                    let fg = Color::Rgb { r: 150, g: 160, b: 175 };
                    write_str(&mut self.cur, self.w, self.h, lx as u16, y as u16, view.cols, body.name(), fg, Color::Black);
                }
            }
        }
    }

    fn paint_body(&mut self, body: &Body, p: ScreenPoint, sun: DVec3, camera: &PerspectiveCamera, view: Surface) {
        let look = body.appearance();
        let (sx, sy) = Self::to_cell(p, view);
        let ry = look.radius * camera.focal() / p.depth * view.rows as f64 * 0.5;
        let rx = look.radius * camera.focal() / (p.depth * camera.aspect) * view.cols as f64 * 0.5;

        if rx < 0.75 && ry < 0.75 {
            self.put_view(view, sx, sy, Cell { ch: '•', fg: look.accent.into(), bg: Color::Black });
            return;
        }

        let (right, up, forward) = camera.basis();
        let to_sun = (sun - body.position()).normalize_or_zero();
        let spin = body.rotation_angle_y();

        let y_lo = (sy - ry).floor().max(0.0) as i32;
        let y_hi = (sy + ry).ceil().min(view.rows as f64 - 1.0) as i32;
        let x_lo = (sx - rx).floor().max(0.0) as i32;
        let x_hi = (sx + rx).ceil().min(view.cols as f64 - 1.0) as i32;

        for cy in y_lo..=y_hi {
            for cx in x_lo..=x_hi {
                let nx = (cx as f64 + 0.5 - sx) / rx;
                let ny = (cy as f64 + 0.5 - sy) / ry;
                let d2 = nx * nx + ny * ny;
                if d2 > 1.0 {
                    continue;
                }
                let nz = (1.0 - d2).sqrt();
                let normal = right * nx - up * ny - forward * nz;

                // surface pattern turns with the body's spin
                let local = rot_y(normal, -spin);
                let lon = local.x.atan2(local.z);
                let lat = local.y.clamp(-1.0, 1.0).asin();
                let band = 0.5 + 0.5 * (lon * 3.0).sin() * (lat * 2.0).cos();
                let albedo = mix_rgb(look.base, look.accent, band);

                let intensity = if look.emissive {
                    0.8 + 0.2 * band
                } else {
                    0.12 + 0.88 * normal.dot(to_sun).max(0.0)
                };
                let idx = (intensity * (SHADE_RAMP.len() - 1) as f64).round() as usize;
                let ch = SHADE_RAMP[idx.min(SHADE_RAMP.len() - 1)];
                let fg = scale_rgb(albedo, 0.35 + 0.65 * intensity).into();
                put_cell(&mut self.cur, self.w, self.h, cx as u16, cy as u16, Cell { ch, fg, bg: Color::Black });
            }
        }
    }

    // -------------------- HUD --------------------
    fn paint_hud(&mut self, scene: &SceneState, hud: &Hud, main_w: u16) {
        let (w, h) = (self.w, self.h);
        let bg = Color::Black;
        let fg = Color::Rgb { r: 220, g: 220, b: 220 };
        let dim = Color::Rgb { r: 120, g: 120, b: 120 };
        let edge = Color::Rgb { r: 80, g: 95, b: 120 };
        let hud_w = self.hud_w();
        let buf = &mut self.cur;

        for y in 0..h {
            put_cell(buf, w, h, main_w, y, Cell { ch: '│', fg: edge, bg });
        }
        let top_h = 7u16;
        box_draw(buf, w, h, main_w, 0, hud_w, top_h, edge, bg);
        box_draw(buf, w, h, main_w, top_h, hud_w, h.saturating_sub(top_h), edge, bg);

        let px = main_w + 2;
        let max_x = (main_w + hud_w).saturating_sub(1);
        write_str(buf, w, h, px, 1, max_x, "Solarium", fg, bg);
        for (i, line) in [
            format!("Time: {:.1} s", scene.last_time_ms() / 1000.0),
            format!("Frames: {}  cap {} fps", scene.frames(), hud.fps_cap),
            format!("Camera: {:.0} from sun", hud.camera_distance),
            format!(
                "Orbits {} | labels {}",
                if hud.show_orbits { "on" } else { "off" },
                if hud.show_labels { "on" } else { "off" }
            ),
        ]
        .iter()
        .enumerate()
        {
            write_str(buf, w, h, px, 2 + i as u16, max_x, line, dim, bg);
        }

        let mut y = top_h + 1;
        write_str(buf, w, h, px, y, max_x, "Revolution speed", fg, bg);
        y += 1;
        let controls = hud.controls;
        let range = controls.range();
        for slider in controls.sliders() {
            if y >= h.saturating_sub(2) {
                break;
            }
            let selected = slider.body == controls.selected();
            let marker = if selected { '>' } else { ' ' };
            let bar = slider_bar(slider.fraction(range), 9);
            let value = match (selected, controls.editing()) {
                (true, Some(typed)) => format!("{typed}_"),
                _ => format_speed(slider.value),
            };
            let line = format!("{marker} {:<8}{bar} {value}", slider.body.name());
            let color = if selected {
                scene.bodies().get(slider.body).appearance().accent.into()
            } else if slider.value.is_nan() {
                Color::Rgb { r: 255, g: 90, b: 80 }
            } else {
                dim
            };
            write_str(buf, w, h, px, y, max_x, &line, color, bg);
            y += 1;
        }

        y += 1;
        for line in [
            "Keys",
            "1-8/Tab select | [ ] nudge",
            "Enter type value | 0 zero",
            "Arrows/WASD orbit | +/- zoom",
            "Mouse drag orbit | wheel zoom",
            "R reset | O orbits | L labels",
            "Q quit",
        ] {
            if y >= h.saturating_sub(1) {
                break;
            }
            let color = if line == "Keys" { fg } else { dim };
            write_str(buf, w, h, px, y, max_x, line, color, bg);
            y += 1;
        }
    }
}

fn slider_bar(fraction: Option<f64>, width: usize) -> String {
    match fraction {
        None => "╌".repeat(width),
        Some(f) => {
            let at = (f * (width - 1) as f64).round() as usize;
            (0..width).map(|i| if i == at { '◆' } else { '─' }).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitControls;
    use crate::config::CameraSettings;
    use crate::sim::{build_guides, BodyId, SliderRange};

    struct Fixture {
        scene: SceneState,
        controls: SpeedControlSurface,
        orbit: OrbitControls,
        guides: Vec<OrbitGuide>,
        sky: Skybox,
        renderer: Renderer,
    }

    fn fixture() -> Fixture {
        let scene = SceneState::default();
        let renderer = Renderer::new(120, 40);
        let orbit = OrbitControls::from_settings(&CameraSettings::default(), DVec3::ZERO, renderer.viewport());
        Fixture {
            controls: SpeedControlSurface::new(scene.bodies(), SliderRange::default()),
            guides: build_guides(scene.bodies()),
            sky: Skybox::generate(50, 3),
            scene,
            orbit,
            renderer,
        }
    }

    fn compose(f: &mut Fixture) {
        let hud = Hud {
            controls: &f.controls,
            camera_distance: f.orbit.distance(),
            fps_cap: 30,
            show_labels: true,
            show_orbits: true,
            t_real: 0.0,
        };
        f.renderer.compose(&f.scene, &f.orbit.camera, &f.guides, &f.sky, &hud);
    }

    #[test]
    fn sun_fills_the_view_center() {
        let mut f = fixture();
        compose(&mut f);
        let view = f.renderer.viewport();
        let c = f.renderer.cell(view.cols / 2, view.rows / 2).unwrap();
        assert!(SHADE_RAMP.contains(&c.ch), "got {:?}", c.ch);
    }

    #[test]
    fn hud_lists_every_planet() {
        let mut f = fixture();
        compose(&mut f);
        let text: String = (0..40).map(|y| f.renderer.row_text(y)).collect::<Vec<_>>().join("\n");
        for id in BodyId::PLANETS {
            assert!(text.contains(id.name()), "{id} missing");
        }
        assert!(text.contains("Solarium"));
    }

    #[test]
    fn nan_speed_shows_in_hud_and_skips_body() {
        let mut f = fixture();
        f.controls.input(BodyId::Earth, "abc", &mut f.scene).unwrap();
        f.scene.tick(1000.0);
        compose(&mut f);
        let text: String = (0..40).map(|y| f.renderer.row_text(y)).collect::<Vec<_>>().join("\n");
        assert!(text.contains("NaN"));
    }

    #[test]
    fn flush_writes_only_changes() {
        let mut f = fixture();
        compose(&mut f);
        let mut first = Vec::new();
        f.renderer.flush(&mut first).unwrap();
        let mut second = Vec::new();
        f.renderer.flush(&mut second).unwrap();
        assert!(first.len() > second.len());
    }

    #[test]
    fn resize_enforces_minimum() {
        let mut r = Renderer::new(10, 5);
        assert_eq!(r.size(), (MIN_W, MIN_H));
        r.resize(200, 60);
        assert_eq!(r.size(), (200, 60));
        assert_eq!(r.viewport().cols, 200 - HUD_W);
    }

    #[test]
    fn slider_bar_marks_position() {
        assert_eq!(slider_bar(Some(0.0), 5), "◆────");
        assert_eq!(slider_bar(Some(1.0), 5), "────◆");
        assert_eq!(slider_bar(None, 3), "╌╌╌");
    }
}
