use crate::error::SceneError;
use crate::sim::orbit::orbit_radius;
use crate::sim::revolution::compute_position;
use glam::DVec3;
use std::{fmt, str::FromStr};

// -------------------- Identity --------------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyId {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl BodyId {
    pub const ALL: [BodyId; 9] = [
        BodyId::Sun,
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Earth,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
    ];

    /// Planets in order of distance from the sun.
    pub const PLANETS: [BodyId; 8] = [
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Earth,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyId::Sun => "sun",
            BodyId::Mercury => "mercury",
            BodyId::Venus => "venus",
            BodyId::Earth => "earth",
            BodyId::Mars => "mars",
            BodyId::Jupiter => "jupiter",
            BodyId::Saturn => "saturn",
            BodyId::Uranus => "uranus",
            BodyId::Neptune => "neptune",
        }
    }

    pub fn is_planet(self) -> bool {
        self != BodyId::Sun
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyId {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        BodyId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| SceneError::UnknownBody(s.to_string()))
    }
}

// -------------------- Static attributes --------------------
/// Sense of self-rotation about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spin {
    Prograde,
    Retrograde,
}

impl Spin {
    pub fn sign(self) -> f64 {
        match self {
            Spin::Prograde => 1.0,
            Spin::Retrograde => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// How a body is drawn. Not read by the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub radius: f64,
    pub base: Rgb,
    pub accent: Rgb,
    /// Emits light instead of being lit (the sun).
    pub emissive: bool,
}

// -------------------- Body --------------------
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    id: BodyId,
    orbit_radius: f64,
    spin: Spin,
    appearance: Appearance,
    pub(crate) revolution_speed: Option<f64>,
    pub(crate) position: DVec3,
    pub(crate) rotation_angle_y: f64,
}

impl Body {
    pub fn id(&self) -> BodyId {
        self.id
    }
    pub fn name(&self) -> &'static str {
        self.id.name()
    }
    pub fn orbit_radius(&self) -> f64 {
        self.orbit_radius
    }
    pub fn spin(&self) -> Spin {
        self.spin
    }
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }
    /// `None` for the sun, which does not revolve.
    pub fn revolution_speed(&self) -> Option<f64> {
        self.revolution_speed
    }
    pub fn position(&self) -> DVec3 {
        self.position
    }
    pub fn rotation_angle_y(&self) -> f64 {
        self.rotation_angle_y
    }
}

// -------------------- Registry --------------------
/// The sun and the eight planets, indexed by [`BodyId`].
#[derive(Clone, Debug, PartialEq)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
}

impl BodyRegistry {
    pub fn solar_system() -> Self {
        let sun_position = DVec3::ZERO;
        let bodies = BodyId::ALL
            .iter()
            .map(|&id| {
                let radius = orbit_radius(id);
                let speed = default_revolution_speed(id);
                let position = match speed {
                    Some(s) => compute_position(0.0, s, radius, sun_position),
                    None => sun_position,
                };
                Body {
                    id,
                    orbit_radius: radius,
                    spin: spin_of(id),
                    appearance: appearance_of(id),
                    revolution_speed: speed,
                    position,
                    rotation_angle_y: 0.0,
                }
            })
            .collect();
        Self { bodies }
    }

    pub fn get(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.index()]
    }

    pub fn sun(&self) -> &Body {
        self.get(BodyId::Sun)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.iter_mut()
    }

    pub fn planets(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.id.is_planet())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl Default for BodyRegistry {
    fn default() -> Self {
        Self::solar_system()
    }
}

// -------------------- Data --------------------
pub fn default_revolution_speed(id: BodyId) -> Option<f64> {
    match id {
        BodyId::Sun => None,
        BodyId::Mercury => Some(0.2),
        BodyId::Venus => Some(0.15),
        BodyId::Earth => Some(0.1),
        BodyId::Mars => Some(0.08),
        BodyId::Jupiter => Some(0.07),
        BodyId::Saturn => Some(0.06),
        BodyId::Uranus => Some(0.05),
        BodyId::Neptune => Some(0.04),
    }
}

fn spin_of(id: BodyId) -> Spin {
    match id {
        BodyId::Venus | BodyId::Uranus => Spin::Retrograde,
        _ => Spin::Prograde,
    }
}

fn appearance_of(id: BodyId) -> Appearance {
    let (radius, base, accent) = match id {
        BodyId::Sun => (20.0, Rgb { r: 255, g: 190, b: 90 }, Rgb { r: 255, g: 240, b: 170 }),
        BodyId::Mercury => (2.0, Rgb { r: 140, g: 140, b: 150 }, Rgb { r: 220, g: 220, b: 235 }),
        BodyId::Venus => (3.0, Rgb { r: 235, g: 180, b: 90 }, Rgb { r: 255, g: 235, b: 170 }),
        BodyId::Earth => (4.0, Rgb { r: 65, g: 170, b: 90 }, Rgb { r: 120, g: 200, b: 255 }),
        BodyId::Mars => (3.5, Rgb { r: 210, g: 70, b: 35 }, Rgb { r: 255, g: 160, b: 90 }),
        BodyId::Jupiter => (10.0, Rgb { r: 190, g: 140, b: 95 }, Rgb { r: 255, g: 220, b: 180 }),
        BodyId::Saturn => (8.0, Rgb { r: 200, g: 170, b: 120 }, Rgb { r: 255, g: 230, b: 180 }),
        BodyId::Uranus => (6.0, Rgb { r: 120, g: 200, b: 210 }, Rgb { r: 200, g: 250, b: 245 }),
        BodyId::Neptune => (5.0, Rgb { r: 70, g: 120, b: 200 }, Rgb { r: 160, g: 200, b: 255 }),
    };
    Appearance { radius, base, accent, emissive: id == BodyId::Sun }
}
