use egui::{Pos2, Vec2};

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_STEP: f32 = 1.2;

/// Maps between screen (pointer) coordinates and image coordinates.
///
/// All geometry, hit-testing, and stored regions live in image space so that
/// thresholds and handle sizes stay invariant under zoom; only drawing and
/// raw pointer positions live in screen space. `origin` is the screen
/// position where image point (0, 0) would land at zero pan; the canvas
/// refreshes it every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub pan: Vec2,
    pub origin: Pos2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            origin: Pos2::ZERO,
        }
    }
}

impl Viewport {
    pub fn to_image(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.origin.x - self.pan.x) / self.zoom,
            (screen.y - self.origin.y - self.pan.y) / self.zoom,
        )
    }

    pub fn to_screen(&self, image: Pos2) -> Pos2 {
        Pos2::new(
            self.origin.x + self.pan.x + image.x * self.zoom,
            self.origin.y + self.pan.y + image.y * self.zoom,
        )
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }
}
