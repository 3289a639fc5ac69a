use glam::DVec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;

/// Edge length of the cube the stars are painted on.
pub const SKYBOX_SIZE: f64 = 5000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub position: DVec3,
    pub phase: f64,
    pub depth: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Skybox {
    stars: Vec<Star>,
}

impl Skybox {
    /// Stars spread over the six inner faces of a cube centred on the origin.
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let h = SKYBOX_SIZE / 2.0;
        let mut stars = Vec::with_capacity(count);
        for _ in 0..count {
            let u = rng.gen_range(-h..h);
            let v = rng.gen_range(-h..h);
            let position = match rng.gen_range(0..6) {
                0 => DVec3::new(h, u, v),
                1 => DVec3::new(-h, u, v),
                2 => DVec3::new(u, h, v),
                3 => DVec3::new(u, -h, v),
                4 => DVec3::new(u, v, h),
                _ => DVec3::new(u, v, -h),
            };
            stars.push(Star {
                position,
                phase: rng.gen_range(0.0..(PI * 2.0)),
                depth: rng.gen_range(0.35..1.0),
            });
        }
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_lie_on_the_cube() {
        let sky = Skybox::generate(200, 1);
        assert_eq!(sky.stars().len(), 200);
        let h = SKYBOX_SIZE / 2.0;
        for s in sky.stars() {
            let m = s.position.abs().max_element();
            assert!((m - h).abs() < 1e-9);
        }
    }

    #[test]
    fn same_seed_same_sky() {
        let a = Skybox::generate(50, 42);
        let b = Skybox::generate(50, 42);
        assert_eq!(a.stars(), b.stars());
    }
}
