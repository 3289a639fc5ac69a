//! A heliocentric solar system drawn in the terminal.
//!
//! [`sim`] holds the scene and its per-frame update; everything else is the
//! interactive terminal host around it.

pub mod app;
pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod sim;
pub mod skybox;

pub use error::{ConfigError, SceneError};
