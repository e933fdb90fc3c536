//! Render-thread state and the per-frame tick.

use crate::document::RenderHost;
use crate::executor::{DrainReport, TaskQueue};
use crate::scene::{Camera, Scene};
use crate::wrapper::{EditorOverlay, OverlayReport};

/// What one frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub frame: u64,
    pub tasks: DrainReport,
    /// Whether structural changes made the overlay rebuild this frame.
    pub rebuilt: bool,
    pub overlay: OverlayReport,
}

/// Everything the render thread owns: the scene, the camera and the gizmo
/// overlay.
///
/// Edits reach the scene only through tasks drained in [`tick`](Self::tick),
/// so the scene is never touched from another thread. The overlay follows
/// structural edits on its own: a tick that sees a new
/// [`Scene::structure_revision`] rebuilds it before reconciling wrappers.
#[derive(Debug)]
pub struct Viewport {
    pub scene: Scene,
    pub camera: Camera,
    pub overlay: EditorOverlay,
    frame: u64,
    built_revision: u64,
}

impl Viewport {
    pub fn new(scene: Scene) -> Self {
        Self::with_overlay(scene, EditorOverlay::default())
    }

    pub fn with_overlay(scene: Scene, mut overlay: EditorOverlay) -> Self {
        overlay.rebuild(&scene);
        Self {
            built_revision: scene.structure_revision(),
            scene,
            camera: Camera::default(),
            overlay,
            frame: 0,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Re-creates wrappers now instead of waiting for the next tick.
    pub fn rebuild_overlay(&mut self) -> usize {
        self.built_revision = self.scene.structure_revision();
        self.overlay.rebuild(&self.scene)
    }

    /// Runs one frame: pending render tasks first, then wrapper
    /// reconciliation.
    pub fn tick(&mut self, queue: &mut TaskQueue<Viewport>) -> TickReport {
        let tasks = queue.drain_and_run(self);
        if tasks.total() > 0 {
            log::trace!("Frame {}: ran {} render task(s)", self.frame, tasks.total());
        }
        let rebuilt = self.scene.structure_revision() != self.built_revision;
        if rebuilt {
            self.rebuild_overlay();
        }
        let overlay = self.overlay.tick(&mut self.scene, &self.camera);
        self.frame += 1;
        TickReport {
            frame: self.frame,
            tasks,
            rebuilt,
            overlay,
        }
    }
}

impl RenderHost for Viewport {
    type Target = Scene;

    fn target_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}
