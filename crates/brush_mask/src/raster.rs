use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{Canvas, draw_filled_circle_mut};
use neongen_common::Point2D;

/// Stamp a round-capped segment of the given width onto any canvas.
///
/// The segment is covered by filled circles spaced at most one unit apart, so
/// the union is the capsule between `from` and `to`. Every covered pixel is
/// overwritten with `color` exactly once per call.
pub fn stamp_capsule<C>(canvas: &mut C, from: Point2D, to: Point2D, width: f32, color: C::Pixel)
where
    C: Canvas,
{
    let radius = (width / 2.0).round().max(1.0) as i32;
    let (canvas_w, canvas_h) = canvas.dimensions();
    // Stamps centred further out than this cannot touch the canvas.
    let reach = radius as f32 + 1.0;
    let Some((from, to)) = clip_segment(
        from,
        to,
        Point2D::new(-reach, -reach),
        Point2D::new(canvas_w as f32 + reach, canvas_h as f32 + reach),
    ) else {
        return;
    };
    let steps = from.distance_to(to).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.x + (to.x - from.x) * t;
        let y = from.y + (to.y - from.y) * t;
        draw_filled_circle_mut(canvas, (x.round() as i32, y.round() as i32), radius, color);
    }
}

/// Liang-Barsky clip of the segment to the rectangle `[min, max]`
fn clip_segment(
    from: Point2D,
    to: Point2D,
    min: Point2D,
    max: Point2D,
) -> Option<(Point2D, Point2D)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [
        (-dx, from.x - min.x),
        (dx, max.x - from.x),
        (-dy, from.y - min.y),
        (dy, max.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f32| Point2D::new(from.x + dx * t, from.y + dy * t);
    Some((at(t0), at(t1)))
}

/// Blend a translucent round-capped segment onto the canvas.
///
/// Coverage is computed on a scratch mask first so that overlapping stamps
/// within one segment blend a single time, the way a stroked path does.
pub fn paint_segment(
    canvas: &mut RgbaImage,
    from: Point2D,
    to: Point2D,
    width: f32,
    color: Rgba<u8>,
) {
    let Some(bounds) = SegmentBounds::clip(canvas, from, to, width) else {
        return;
    };

    let mut coverage = GrayImage::new(bounds.width, bounds.height);
    let dx = -(bounds.x as f32);
    let dy = -(bounds.y as f32);
    stamp_capsule(
        &mut coverage,
        from.translate(dx, dy),
        to.translate(dx, dy),
        width,
        Luma([255u8]),
    );

    for (x, y, covered) in coverage.enumerate_pixels() {
        if covered[0] == 0 {
            continue;
        }
        canvas.get_pixel_mut(bounds.x + x, bounds.y + y).blend(&color);
    }
}

/// Pixel rectangle touched by a segment, clipped to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentBounds {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl SegmentBounds {
    fn clip(canvas: &RgbaImage, from: Point2D, to: Point2D, width: f32) -> Option<Self> {
        let (canvas_w, canvas_h) = canvas.dimensions();
        if canvas_w == 0 || canvas_h == 0 {
            return None;
        }
        // One unit of slack covers the rounding done when stamping.
        let reach = (width / 2.0).ceil() + 1.0;
        let min_x = (from.x.min(to.x) - reach).floor().max(0.0);
        let min_y = (from.y.min(to.y) - reach).floor().max(0.0);
        let max_x = (from.x.max(to.x) + reach).ceil().min((canvas_w - 1) as f32);
        let max_y = (from.y.max(to.y) + reach).ceil().min((canvas_h - 1) as f32);
        if !(min_x <= max_x && min_y <= max_y) {
            return None;
        }
        Some(Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x) as u32 + 1,
            height: (max_y - min_y) as u32 + 1,
        })
    }
}
