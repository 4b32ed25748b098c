use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage, imageops::FilterType};
use neongen_common::{ImageAsset, Point2D, Size};

use crate::{
    codec,
    error::{MaskError, Result},
    raster::{paint_segment, stamp_capsule},
    types::StrokePath,
};

/// Widest the working canvas is allowed to be, in logical units
pub const MAX_DISPLAY_WIDTH: u32 = 800;
pub const MIN_BRUSH_WIDTH: f32 = 5.0;
pub const MAX_BRUSH_WIDTH: f32 = 50.0;
pub const DEFAULT_BRUSH_WIDTH: f32 = 20.0;
/// Acid yellow at 60% opacity
pub const HIGHLIGHT_COLOR: Rgba<u8> = Rgba([223, 255, 0, 153]);

/// Drawable highlight overlay on top of a loaded bitmap.
///
/// Strokes are painted straight into the working pixels as they arrive. The
/// gesture geometry is also retained so the brushed region can be exported as
/// a binary mask.
#[derive(Debug, Clone)]
pub struct MaskSurface {
    max_width: u32,
    base: Option<RgbaImage>,
    canvas: Option<RgbaImage>,
    scale: f32,
    brush_width: f32,
    strokes: Vec<StrokePath>,
    drawing: bool,
    locked: bool,
}

impl MaskSurface {
    pub fn new() -> Self {
        Self::with_max_width(MAX_DISPLAY_WIDTH)
    }

    pub fn with_max_width(max_width: u32) -> Self {
        Self {
            max_width: max_width.max(1),
            base: None,
            canvas: None,
            scale: 1.0,
            brush_width: DEFAULT_BRUSH_WIDTH,
            strokes: Vec::new(),
            drawing: false,
            locked: false,
        }
    }

    /// Scale the bitmap down to fit the display width and use it as the base layer.
    ///
    /// Any previous strokes are discarded. Returns the new surface size.
    pub fn load(&mut self, bitmap: &DynamicImage) -> Size {
        let (source_w, source_h) = (bitmap.width(), bitmap.height());
        let scale = if source_w == 0 {
            1.0
        } else {
            (self.max_width as f32 / source_w as f32).min(1.0)
        };

        let base = if source_w > self.max_width {
            let fitted = fit_to_width(Size::new(source_w, source_h), self.max_width);
            image::imageops::resize(
                &bitmap.to_rgba8(),
                fitted.width,
                fitted.height,
                FilterType::Triangle,
            )
        } else {
            bitmap.to_rgba8()
        };

        tracing::debug!(
            source_width = source_w,
            source_height = source_h,
            width = base.width(),
            height = base.height(),
            scale,
            "Loaded bitmap onto mask surface"
        );

        self.scale = scale;
        self.canvas = Some(base.clone());
        self.base = Some(base);
        self.strokes.clear();
        self.drawing = false;
        self.size()
    }

    /// Decode an asset and load it
    pub fn load_asset(&mut self, asset: &ImageAsset) -> Result<Size> {
        let bitmap = codec::decode_asset(asset)?;
        Ok(self.load(&bitmap))
    }

    /// Drop the bitmap and every stroke
    pub fn unload(&mut self) {
        self.base = None;
        self.canvas = None;
        self.scale = 1.0;
        self.strokes.clear();
        self.drawing = false;
    }

    pub fn begin_stroke(&mut self, point: Point2D) {
        if self.locked || self.canvas.is_none() {
            return;
        }
        self.strokes.push(StrokePath::new(self.brush_width, point));
        self.drawing = true;
    }

    /// Paint a segment from the previous point of the active stroke.
    ///
    /// No-op when no stroke is active or the surface is locked.
    pub fn extend_stroke(&mut self, point: Point2D) {
        if !self.drawing || self.locked {
            return;
        }
        let (Some(canvas), Some(stroke)) = (self.canvas.as_mut(), self.strokes.last_mut()) else {
            return;
        };
        let Some(&previous) = stroke.points.last() else {
            return;
        };
        paint_segment(canvas, previous, point, stroke.width, HIGHLIGHT_COLOR);
        stroke.points.push(point);
    }

    pub fn end_stroke(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        // A press without movement painted nothing, so it leaves no geometry.
        if self.strokes.last().is_some_and(|stroke| !stroke.is_visible()) {
            self.strokes.pop();
        }
    }

    /// Set the width used by subsequent strokes, clamped to the brush range
    pub fn set_brush_width(&mut self, width: f32) -> f32 {
        self.brush_width = if width.is_nan() {
            DEFAULT_BRUSH_WIDTH
        } else {
            width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
        };
        self.brush_width
    }

    /// Restore the base bitmap, discarding all painted strokes
    pub fn reset(&mut self) {
        self.canvas = self.base.clone();
        self.strokes.clear();
        self.drawing = false;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_loaded(&self) -> bool {
        self.canvas.is_some()
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    /// Downscale factor applied by the last `load`
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn size(&self) -> Size {
        self.canvas
            .as_ref()
            .map(|canvas| Size::new(canvas.width(), canvas.height()))
            .unwrap_or_default()
    }

    /// The visible working pixels
    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.canvas.as_ref()
    }

    pub fn strokes(&self) -> &[StrokePath] {
        &self.strokes
    }

    /// Encode the visible canvas as a PNG asset
    pub fn snapshot(&self) -> Result<ImageAsset> {
        let canvas = self.canvas.as_ref().ok_or(MaskError::NoImageLoaded)?;
        codec::encode_png(&DynamicImage::ImageRgba8(canvas.clone()))
    }

    /// Rasterise the retained strokes into a binary mask of the given size.
    ///
    /// Brushed pixels are white and everything else black. Stroke coordinates
    /// are rescaled from surface space, so the mask can target the full
    /// resolution source image.
    pub fn render_stroke_mask(&self, target: Size) -> Result<GrayImage> {
        let surface = self.size();
        if surface.is_empty() {
            return Err(MaskError::NoImageLoaded);
        }
        let sx = target.width as f32 / surface.width as f32;
        let sy = target.height as f32 / surface.height as f32;
        let width_scale = (sx + sy) / 2.0;

        let mut mask = GrayImage::new(target.width, target.height);
        for stroke in self.strokes.iter().filter(|stroke| stroke.is_visible()) {
            let width = stroke.width * width_scale;
            for pair in stroke.points.windows(2) {
                stamp_capsule(
                    &mut mask,
                    pair[0].scale(sx, sy),
                    pair[1].scale(sx, sy),
                    width,
                    Luma([255u8]),
                );
            }
        }
        Ok(mask)
    }
}

/// Shrink `source` to exactly `max_width` wide, keeping the aspect ratio.
///
/// The height truncates, matching a fractional size assigned to a canvas element.
fn fit_to_width(source: Size, max_width: u32) -> Size {
    if source.width <= max_width {
        return source;
    }
    let height = u64::from(source.height) * u64::from(max_width) / u64::from(source.width);
    Size::new(max_width, (height as u32).max(1))
}

impl Default for MaskSurface {
    fn default() -> Self {
        Self::new()
    }
}
