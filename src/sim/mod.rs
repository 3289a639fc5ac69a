//! Scene simulation: body registry, orbit geometry, revolution and spin
//! engines, the per-frame animation loop and the speed control surface.

pub mod animation;
pub mod body;
pub mod controls;
pub mod orbit;
pub mod revolution;
pub mod rotation;
pub mod scene;

pub use animation::{AnimationLoop, FrameHost};
pub use body::{Appearance, Body, BodyId, BodyRegistry, Rgb, Spin};
pub use controls::{parse_speed, SliderRange, SpeedControlSurface, SpeedSlider};
pub use orbit::{build_guides, orbit_radius, OrbitGuide};
pub use revolution::{compute_position, ORBIT_SPEED_MULTIPLIER};
pub use rotation::{advance_rotation, BASE_ROTATION_RATE};
pub use scene::{SceneState, SpeedSink};
