use glam::DVec3;

/// Converts elapsed milliseconds into orbital angle per unit of speed.
pub const ORBIT_SPEED_MULTIPLIER: f64 = 0.001;

pub fn orbit_angle(elapsed_ms: f64, speed: f64) -> f64 {
    elapsed_ms * ORBIT_SPEED_MULTIPLIER * speed
}

/// Position on a circular orbit around `sun` after `elapsed_ms` at `speed`.
///
/// The angle is derived from the total elapsed time, not accumulated per
/// frame, so a speed change moves the body to where it would be had it
/// always travelled at the new speed. A NaN speed yields a NaN position.
pub fn compute_position(elapsed_ms: f64, speed: f64, orbit_radius: f64, sun: DVec3) -> DVec3 {
    let (s, c) = orbit_angle(elapsed_ms, speed).sin_cos();
    DVec3::new(sun.x + orbit_radius * c, sun.y, sun.z + orbit_radius * s)
}
