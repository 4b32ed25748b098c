use neongen_common::Point2D;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One continuous pointer-down to pointer-up gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StrokePath {
    /// Brush diameter in canvas units at the time the stroke began
    pub width: f32,
    /// Canvas-local points in the order they were captured
    pub points: Vec<Point2D>,
}

impl StrokePath {
    pub fn new(width: f32, start: Point2D) -> Self {
        Self {
            width,
            points: vec![start],
        }
    }

    /// A stroke with a single point never produced a visible segment
    pub fn is_visible(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(pair[1]))
            .sum()
    }
}

/// Bounding box of the canvas element in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }
}

/// Pointer input as delivered by the host UI, in viewport coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Mouse { client_x: f32, client_y: f32 },
    /// All active touch points; only the first one is read
    Touch { touches: Vec<Point2D> },
}

impl PointerEvent {
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        Self::Mouse { client_x, client_y }
    }

    pub fn touch(touches: impl IntoIterator<Item = Point2D>) -> Self {
        Self::Touch {
            touches: touches.into_iter().collect(),
        }
    }

    /// Translate into canvas-local space by subtracting the canvas origin.
    ///
    /// Returns `None` for a touch event that carries no touch points.
    pub fn to_canvas_local(&self, rect: CanvasRect) -> Option<Point2D> {
        let client = match self {
            Self::Mouse { client_x, client_y } => Point2D::new(*client_x, *client_y),
            Self::Touch { touches } => *touches.first()?,
        };
        Some(client.translate(-rect.left, -rect.top))
    }
}
