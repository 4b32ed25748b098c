use std::{fs, path::Path};

use neongen_common::Point2D;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::Result, surface::MaskSurface};

/// A recorded sequence of brush gestures in canvas-local coordinates.
///
/// Lets a headless caller replay what a user would have painted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct StrokeScript {
    pub strokes: Vec<ScriptedStroke>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptedStroke {
    /// Brush width; the surface's current width is kept when omitted
    #[schemars(range(min = 5.0, max = 50.0))]
    pub width: Option<f32>,
    pub points: Vec<[f32; 2]>,
}

impl StrokeScript {
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StrokeScript)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Replay every gesture onto the surface
    pub fn apply(&self, surface: &mut MaskSurface) {
        for stroke in &self.strokes {
            let Some((first, rest)) = stroke.points.split_first() else {
                continue;
            };
            if let Some(width) = stroke.width {
                surface.set_brush_width(width);
            }
            surface.begin_stroke(Point2D::from(*first));
            for point in rest {
                surface.extend_stroke(Point2D::from(*point));
            }
            surface.end_stroke();
        }
    }
}
