use crate::sim::body::{BodyId, BodyRegistry};
use glam::DVec3;
use std::f64::consts::PI;

/// Width of a guide ring (outer radius minus inner radius).
pub const RING_WIDTH: f64 = 0.1;
/// Angular segments per guide ring.
pub const RING_SEGMENTS: usize = 100;

/// Approximate sun-to-planet distance in scene units.
pub fn orbit_radius(id: BodyId) -> f64 {
    match id {
        BodyId::Sun => 0.0,
        BodyId::Mercury => 39.0,
        BodyId::Venus => 72.0,
        BodyId::Earth => 100.0,
        BodyId::Mars => 152.0,
        BodyId::Jupiter => 320.0,
        BodyId::Saturn => 454.0,
        BodyId::Uranus => 622.0,
        BodyId::Neptune => 806.0,
    }
}

/// Static, flat ring marking a planet's orbit in the y = sun.y plane.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitGuide {
    pub body: BodyId,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// `RING_SEGMENTS` points on the outer edge, first point on +x.
    pub points: Vec<DVec3>,
}

impl OrbitGuide {
    pub fn new(body: BodyId, outer_radius: f64, center: DVec3) -> Self {
        let points = (0..RING_SEGMENTS)
            .map(|s| {
                let a = 2.0 * PI * (s as f64 / RING_SEGMENTS as f64);
                DVec3::new(center.x + outer_radius * a.cos(), center.y, center.z + outer_radius * a.sin())
            })
            .collect();
        Self {
            body,
            inner_radius: (outer_radius - RING_WIDTH).max(0.0),
            outer_radius,
            points,
        }
    }
}

/// One guide per planet, built once at setup.
pub fn build_guides(registry: &BodyRegistry) -> Vec<OrbitGuide> {
    let center = registry.sun().position();
    registry
        .planets()
        .map(|p| OrbitGuide::new(p.id(), p.orbit_radius(), center))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn radii_increase_outward() {
        let radii: Vec<f64> = BodyId::PLANETS.iter().map(|&p| orbit_radius(p)).collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(orbit_radius(BodyId::Sun), 0.0);
    }

    #[test]
    fn one_guide_per_planet_on_its_radius() {
        let reg = BodyRegistry::solar_system();
        let guides = build_guides(&reg);
        assert_eq!(guides.len(), 8);
        for g in &guides {
            assert_eq!(g.points.len(), RING_SEGMENTS);
            assert_abs_diff_eq!(g.outer_radius - g.inner_radius, RING_WIDTH, epsilon = 1e-12);
            for p in &g.points {
                assert_abs_diff_eq!(p.length(), g.outer_radius, epsilon = 1e-9);
                assert_eq!(p.y, 0.0);
            }
        }
    }
}
