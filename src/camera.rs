//! Perspective camera and an orbit controller around a fixed target.
//!
//! The controller keeps the camera on a sphere around its target. Input only
//! records pending motion; [`OrbitControls::update`] applies it once per frame,
//! clamping distance to `[min_distance, max_distance]` and keeping the polar
//! angle away from the poles so the view basis never degenerates.

use crate::config::CameraSettings;
use glam::DVec3;
use std::f64::consts::PI;

/// Width / height of a terminal cell in the same units.
pub const CELL_ASPECT: f64 = 0.5;

const POLAR_EPS: f64 = 1e-3;
const KEY_ROTATE_STEP: f64 = 0.06;
const DOLLY_SCALE: f64 = 0.95;

/// Output surface size in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Surface {
    pub cols: u16,
    pub rows: u16,
}

impl Surface {
    pub fn aspect(self) -> f64 {
        (self.cols.max(1) as f64 * CELL_ASPECT) / self.rows.max(1) as f64
    }
}

/// Projected point: normalised device x/y in [-1, 1] and distance along the view axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

// -------------------- Camera --------------------
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: DVec3,
    pub target: DVec3,
    pub fov_y: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    focal: f64,
}

impl PerspectiveCamera {
    pub fn new(fov_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut cam = Self {
            position: DVec3::new(0.0, 0.0, 100.0),
            target: DVec3::ZERO,
            fov_y: fov_deg.to_radians(),
            aspect,
            near,
            far,
            focal: 1.0,
        };
        cam.update_projection();
        cam
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        self.aspect = aspect;
        self.update_projection();
    }

    pub fn update_projection(&mut self) {
        self.focal = 1.0 / (self.fov_y * 0.5).tan();
    }

    /// Cotangent of half the vertical field of view.
    pub fn focal(&self) -> f64 {
        self.focal
    }

    /// Orthonormal (right, up, forward) basis looking at the target.
    pub fn basis(&self) -> (DVec3, DVec3, DVec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(DVec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        (right, up, forward)
    }

    pub fn project(&self, world: DVec3) -> Option<ScreenPoint> {
        let (right, up, forward) = self.basis();
        let d = world - self.position;
        let depth = d.dot(forward);
        if !depth.is_finite() || depth < self.near || depth > self.far {
            return None;
        }
        Some(ScreenPoint {
            x: d.dot(right) * self.focal / (depth * self.aspect),
            y: d.dot(up) * self.focal / depth,
            depth,
        })
    }
}

// -------------------- Orbit controls --------------------
#[derive(Clone, Copy, Debug, PartialEq)]
struct Spherical {
    radius: f64,
    /// azimuth around +y, 0 on +z
    theta: f64,
    /// angle from +y
    phi: f64,
}

impl Spherical {
    fn from_offset(v: DVec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self { radius, theta: 0.0, phi: PI / 2.0 };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> DVec3 {
        let sp = self.phi.sin();
        DVec3::new(self.radius * sp * self.theta.sin(), self.radius * self.phi.cos(), self.radius * sp * self.theta.cos())
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub camera: PerspectiveCamera,
    surface: Surface,
    pub min_distance: f64,
    pub max_distance: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    pub damping_factor: f64,
    spherical: Spherical,
    delta_theta: f64,
    delta_phi: f64,
    scale: f64,
    home: Spherical,
    drag_from: Option<(u16, u16)>,
}

impl OrbitControls {
    pub fn new(mut camera: PerspectiveCamera, surface: Surface) -> Self {
        camera.set_aspect(surface.aspect());
        let spherical = Spherical::from_offset(camera.position - camera.target);
        Self {
            camera,
            surface,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            damping_factor: 0.0,
            spherical,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            home: spherical,
            drag_from: None,
        }
    }

    /// Camera and controller configured from settings, looking at `target`.
    pub fn from_settings(cfg: &CameraSettings, target: DVec3, surface: Surface) -> Self {
        let mut camera = PerspectiveCamera::new(cfg.fov_deg, surface.aspect(), cfg.near, cfg.far);
        camera.target = target;
        camera.position = target + DVec3::new(0.0, 0.0, cfg.initial_distance);
        let mut controls = Self::new(camera, surface);
        controls.min_distance = cfg.min_distance;
        controls.max_distance = cfg.max_distance;
        controls.rotate_speed = cfg.rotate_speed;
        controls.zoom_speed = cfg.zoom_speed;
        controls.damping_factor = cfg.damping_factor.clamp(0.0, 1.0);
        controls
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn distance(&self) -> f64 {
        self.spherical.radius
    }

    /// Viewport resized: new aspect, new drag scale.
    pub fn resize(&mut self, surface: Surface) {
        self.surface = surface;
        self.camera.set_aspect(surface.aspect());
    }

    pub fn rotate_left(&mut self, angle: f64) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f64) {
        self.delta_phi -= angle;
    }

    pub fn dolly_in(&mut self) {
        self.scale *= DOLLY_SCALE.powf(self.zoom_speed);
    }

    pub fn dolly_out(&mut self) {
        self.scale /= DOLLY_SCALE.powf(self.zoom_speed);
    }

    pub fn key_rotate(&mut self, left: i32, up: i32) {
        self.rotate_left(left as f64 * KEY_ROTATE_STEP * self.rotate_speed);
        self.rotate_up(up as f64 * KEY_ROTATE_STEP * self.rotate_speed);
    }

    pub fn drag_start(&mut self, col: u16, row: u16) {
        self.drag_from = Some((col, row));
    }

    /// Drag across the full surface height turns the camera a full circle.
    pub fn drag_to(&mut self, col: u16, row: u16) {
        let Some((c0, r0)) = self.drag_from else {
            return;
        };
        let rows = self.surface.rows.max(1) as f64;
        let dx = (col as f64 - c0 as f64) * CELL_ASPECT;
        let dy = row as f64 - r0 as f64;
        self.rotate_left(2.0 * PI * dx / rows * self.rotate_speed);
        self.rotate_up(2.0 * PI * dy / rows * self.rotate_speed);
        self.drag_from = Some((col, row));
    }

    pub fn drag_end(&mut self) {
        self.drag_from = None;
    }

    pub fn reset(&mut self) {
        self.spherical = self.home;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.write_camera();
    }

    /// Applies pending motion and writes the camera position.
    pub fn update(&mut self) {
        let damped = self.damping_factor > 0.0;
        let k = if damped { self.damping_factor } else { 1.0 };

        self.spherical.theta += self.delta_theta * k;
        self.spherical.phi = (self.spherical.phi + self.delta_phi * k).clamp(POLAR_EPS, PI - POLAR_EPS);
        self.spherical.radius = (self.spherical.radius * self.scale).max(self.min_distance).min(self.max_distance);
        self.scale = 1.0;

        if damped {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.write_camera();
    }

    fn write_camera(&mut self) {
        self.camera.position = self.camera.target + self.spherical.to_offset();
    }
}
