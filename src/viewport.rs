use crate::Position;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Pan/zoom state of the canvas, used to translate drop coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    /// Screen position of the canvas' top-left corner
    pub origin: Position,

    /// Pan offset in screen pixels
    pub pan: Position,

    /// Zoom factor (1.0 = 100%)
    zoom: f64,
}

impl Viewport {
    pub fn new(origin: Position, pan: Position, zoom: f64) -> Self {
        Self {
            origin,
            pan,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Convert screen coordinates to graph coordinates
    pub fn screen_to_graph(&self, point: Position) -> Position {
        Position::new(
            (point.x - self.origin.x - self.pan.x) / self.zoom,
            (point.y - self.origin.y - self.pan.y) / self.zoom,
        )
    }

    /// Convert graph coordinates to screen coordinates
    pub fn graph_to_screen(&self, point: Position) -> Position {
        Position::new(
            self.origin.x + point.x * self.zoom + self.pan.x,
            self.origin.y + point.y * self.zoom + self.pan.y,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Position::default(), Position::default(), 1.0)
    }
}
