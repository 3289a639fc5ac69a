//! Frame-driven animation loop.
//!
//! [`AnimationLoop::frame`] runs one tick: it updates every body, then asks the
//! host to refresh its camera controls, schedule the next frame and present
//! the scene. Frame scheduling and presentation live behind [`FrameHost`] so
//! the tick itself stays deterministic for a given `(time, scene)`.

use crate::sim::scene::SceneState;

/// Boundary between the simulation and whatever displays it.
pub trait FrameHost {
    type Error;

    /// Let the camera controller apply pending input and damping.
    fn refresh_controls(&mut self);

    /// Ask for another frame on the next display refresh.
    fn request_frame(&mut self);

    /// Present the fully updated scene.
    fn submit(&mut self, scene: &SceneState) -> Result<(), Self::Error>;
}

#[derive(Clone, Debug, Default)]
pub struct AnimationLoop {
    scene: SceneState,
}

impl AnimationLoop {
    pub fn new(scene: SceneState) -> Self {
        Self { scene }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    /// Mutable access for input handlers between frames.
    pub fn scene_mut(&mut self) -> &mut SceneState {
        &mut self.scene
    }

    /// One tick at `time_ms`. Only host errors are returned.
    pub fn frame<H: FrameHost>(&mut self, time_ms: f64, host: &mut H) -> Result<(), H::Error> {
        self.scene.tick(time_ms);
        host.refresh_controls();
        host.request_frame();
        host.submit(&self.scene)
    }
}
