//! # Brush Mask Surface
//!
//! An interactive highlight overlay for a loaded photo. The user paints
//! translucent round-capped strokes to mark a region of interest, and can
//! reset the canvas back to the original bitmap at any time.
//!
//! ## Core Features
//!
//! - **Display scaling**: bitmaps are downscaled to fit an 800 unit wide canvas
//! - **Immediate-mode painting**: each pointer move blends a segment straight
//!   into the working pixels
//! - **Retained geometry**: strokes are kept as point sequences and can be
//!   rasterised into a binary mask at any resolution
//! - **Image codec**: file and bitmap conversion to and from data-URI assets
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brush_mask::{MaskSurface, CanvasRect, PointerEvent, codec};
//!
//! let asset = codec::read_image_file("photo.jpg")?;
//! let mut surface = MaskSurface::new();
//! surface.load_asset(&asset)?;
//!
//! let rect = CanvasRect::new(32.0, 96.0);
//! if let Some(point) = PointerEvent::mouse(120.0, 180.0).to_canvas_local(rect) {
//!     surface.begin_stroke(point);
//! }
//! if let Some(point) = PointerEvent::mouse(220.0, 200.0).to_canvas_local(rect) {
//!     surface.extend_stroke(point);
//! }
//! surface.end_stroke();
//!
//! let preview = surface.snapshot()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod error;
pub mod raster;
pub mod script;
pub mod surface;
pub mod types;

pub use error::{MaskError, Result};
pub use script::{ScriptedStroke, StrokeScript};
pub use surface::{
    DEFAULT_BRUSH_WIDTH, HIGHLIGHT_COLOR, MAX_BRUSH_WIDTH, MAX_DISPLAY_WIDTH, MIN_BRUSH_WIDTH,
    MaskSurface,
};
pub use types::{CanvasRect, PointerEvent, StrokePath};
