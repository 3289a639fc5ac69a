use crate::error::SceneError;
use crate::sim::body::{BodyId, BodyRegistry};
use crate::sim::revolution::compute_position;
use crate::sim::rotation::advance_rotation;

/// Receiver for live parameter updates coming from an input layer.
pub trait SpeedSink {
    fn set_revolution_speed(&mut self, id: BodyId, value: f64) -> Result<(), SceneError>;
}

/// All mutable simulation state. Owned by the animation loop.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneState {
    registry: BodyRegistry,
    frames: u64,
    last_time_ms: f64,
}

impl SceneState {
    pub fn new(registry: BodyRegistry) -> Self {
        Self { registry, frames: 0, last_time_ms: 0.0 }
    }

    pub fn bodies(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Ticks applied so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Timestamp of the most recent tick, in milliseconds.
    pub fn last_time_ms(&self) -> f64 {
        self.last_time_ms
    }

    /// Advances every body to `time_ms`.
    ///
    /// Spin advances by one fixed increment per call regardless of `time_ms`.
    /// Planet positions are a function of `time_ms` and the current speed only.
    /// Non-finite values stay confined to the body that holds them.
    pub fn tick(&mut self, time_ms: f64) {
        for body in self.registry.iter_mut() {
            body.rotation_angle_y = advance_rotation(body.rotation_angle_y, body.spin());
        }

        let sun = self.registry.sun().position();
        for body in self.registry.iter_mut() {
            if let Some(speed) = body.revolution_speed {
                body.position = compute_position(time_ms, speed, body.orbit_radius(), sun);
            }
        }

        self.frames += 1;
        self.last_time_ms = time_ms;
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(BodyRegistry::solar_system())
    }
}

impl SpeedSink for SceneState {
    fn set_revolution_speed(&mut self, id: BodyId, value: f64) -> Result<(), SceneError> {
        let body = self.registry.get_mut(id);
        match body.revolution_speed.as_mut() {
            Some(speed) => {
                *speed = value;
                Ok(())
            }
            None => Err(SceneError::NotRevolvable(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rotation::BASE_ROTATION_RATE;
    use glam::DVec3;

    #[test]
    fn tick_counts_frames_and_records_time() {
        let mut s = SceneState::default();
        s.tick(16.0);
        s.tick(33.0);
        assert_eq!(s.frames(), 2);
        assert_eq!(s.last_time_ms(), 33.0);
    }

    #[test]
    fn sun_rotates_but_stays_put() {
        let mut s = SceneState::default();
        s.tick(10_000.0);
        let sun = s.bodies().sun();
        assert_eq!(sun.position(), DVec3::ZERO);
        assert_eq!(sun.rotation_angle_y(), BASE_ROTATION_RATE);
    }

    #[test]
    fn sun_rejects_a_revolution_speed() {
        let mut s = SceneState::default();
        let err = s.set_revolution_speed(BodyId::Sun, 1.0);
        assert!(matches!(err, Err(SceneError::NotRevolvable(BodyId::Sun))));
        assert!(s.bodies().sun().revolution_speed().is_none());
    }

    #[test]
    fn speed_update_is_seen_on_the_next_tick() {
        let mut s = SceneState::default();
        s.tick(1000.0);
        let before = s.bodies().get(BodyId::Mars).position();
        s.set_revolution_speed(BodyId::Mars, -0.5).unwrap();
        assert_eq!(s.bodies().get(BodyId::Mars).position(), before);
        s.tick(1000.0);
        assert_ne!(s.bodies().get(BodyId::Mars).position(), before);
    }
}
