use crate::viewer::model::{Annotation, CandidateShape, Color, ShapeKind, ACCENT};

/// Dash pattern used for all annotation strokes, in pixels.
const DASH_ON: f32 = 5.0;
const DASH_OFF: f32 = 3.0;
const STROKE_WIDTH: u32 = 2;
const MARKER_RADIUS: i32 = 8;

const MARKER_FILL: Color = Color::rgba(220, 38, 38, 230);
const MARKER_INK: Color = Color::rgba(255, 255, 255, 255);

/// Transparent raster layer holding the committed annotations plus the
/// in-progress candidate. The whole layer is repainted on every render;
/// the target size is re-queried by the caller each time because the
/// viewport may resize between frames.
#[derive(Debug, Default)]
pub struct AnnotationFrameBuffer {
    rgba: Vec<u8>,
    size: (u32, u32),
}

impl AnnotationFrameBuffer {
    fn ensure_size(&mut self, size: (u32, u32)) {
        let target_len = (size.0 as usize)
            .saturating_mul(size.1 as usize)
            .saturating_mul(4);
        if self.size != size || self.rgba.len() != target_len {
            self.rgba = vec![0; target_len];
            self.size = size;
        }
    }

    pub fn render(
        &mut self,
        annotations: &[Annotation],
        candidate: Option<&CandidateShape>,
        size: (u32, u32),
    ) {
        self.ensure_size(size);
        self.rgba.fill(0);

        for annotation in annotations {
            draw_shape(
                &mut self.rgba,
                size,
                annotation.shape,
                annotation.origin,
                annotation.extent,
                annotation.stroke_color,
            );
            if !annotation.comment.is_empty() {
                draw_comment_marker(&mut self.rgba, size, annotation.origin, annotation.extent);
            }
        }

        // Candidate always paints last so the live preview sits on top.
        if let Some(candidate) = candidate {
            draw_shape(
                &mut self.rgba,
                size,
                candidate.shape,
                candidate.origin,
                candidate.extent,
                ACCENT,
            );
        }
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.0 || y >= self.size.1 {
            return None;
        }
        let idx = ((y * self.size.0 + x) * 4) as usize;
        Some([
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ])
    }
}

fn draw_shape(
    pixels: &mut [u8],
    size: (u32, u32),
    shape: ShapeKind,
    origin: (f32, f32),
    extent: (f32, f32),
    color: Color,
) {
    let (w, h) = (size.0 as f32, size.1 as f32);
    let x = origin.0 * w;
    let y = origin.1 * h;
    let ew = extent.0 * w;
    let eh = extent.1 * h;

    match shape {
        ShapeKind::Rectangle => {
            let x0 = x.min(x + ew);
            let x1 = x.max(x + ew);
            let y0 = y.min(y + eh);
            let y1 = y.max(y + eh);
            let mut pen = DashPen::new(color);
            pen.segment(pixels, size, (x0, y0), (x1, y0));
            pen.segment(pixels, size, (x1, y0), (x1, y1));
            pen.segment(pixels, size, (x1, y1), (x0, y1));
            pen.segment(pixels, size, (x0, y1), (x0, y0));
        }
        ShapeKind::Ellipse => {
            draw_dashed_ellipse(
                pixels,
                size,
                (x + ew * 0.5, y + eh * 0.5),
                (ew.abs() * 0.5, eh.abs() * 0.5),
                color,
            );
        }
    }
}

/// Dashed stroke with phase carried across consecutive segments so the
/// pattern flows around rectangle corners.
struct DashPen {
    color: Color,
    distance: f32,
}

impl DashPen {
    fn new(color: Color) -> Self {
        Self {
            color,
            distance: 0.0,
        }
    }

    fn segment(&mut self, pixels: &mut [u8], size: (u32, u32), start: (f32, f32), end: (f32, f32)) {
        let dx = end.0 - start.0;
        let dy = end.1 - start.1;
        let length = (dx * dx + dy * dy).sqrt();
        if length < f32::EPSILON {
            return;
        }
        let steps = length.ceil() as i32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            if dash_pen_down(self.distance + length * t) {
                stamp(
                    pixels,
                    size,
                    (start.0 + dx * t).round() as i32,
                    (start.1 + dy * t).round() as i32,
                    self.color,
                );
            }
        }
        self.distance += length;
    }
}

fn dash_pen_down(distance: f32) -> bool {
    distance.rem_euclid(DASH_ON + DASH_OFF) < DASH_ON
}

fn draw_dashed_ellipse(
    pixels: &mut [u8],
    size: (u32, u32),
    center: (f32, f32),
    radii: (f32, f32),
    color: Color,
) {
    let (rx, ry) = radii;
    if rx < 0.5 || ry < 0.5 {
        return;
    }
    let circumference = std::f32::consts::TAU * rx.max(ry);
    let steps = circumference.max(12.0).ceil() as usize;
    let mut travelled = 0.0f32;
    let mut last = (center.0 + rx, center.1);
    for step in 0..=steps {
        let t = (step as f32 / steps as f32) * std::f32::consts::TAU;
        let point = (center.0 + rx * t.cos(), center.1 + ry * t.sin());
        let dx = point.0 - last.0;
        let dy = point.1 - last.1;
        travelled += (dx * dx + dy * dy).sqrt();
        last = point;
        if dash_pen_down(travelled) {
            stamp(
                pixels,
                size,
                point.0.round() as i32,
                point.1.round() as i32,
                color,
            );
        }
    }
}

/// Filled marker at the shape's top-right corner flagging an attached
/// comment: accent disc with a white "i" tick.
fn draw_comment_marker(pixels: &mut [u8], size: (u32, u32), origin: (f32, f32), extent: (f32, f32)) {
    let cx = ((origin.0 + extent.0) * size.0 as f32).round() as i32;
    let cy = (origin.1 * size.1 as f32).round() as i32;

    for dy in -MARKER_RADIUS..=MARKER_RADIUS {
        for dx in -MARKER_RADIUS..=MARKER_RADIUS {
            if dx * dx + dy * dy <= MARKER_RADIUS * MARKER_RADIUS {
                set_pixel(pixels, size, cx + dx, cy + dy, MARKER_FILL);
            }
        }
    }
    set_pixel(pixels, size, cx, cy - 4, MARKER_INK);
    for dy in -1..=4 {
        set_pixel(pixels, size, cx, cy + dy, MARKER_INK);
    }
}

fn stamp(pixels: &mut [u8], size: (u32, u32), x: i32, y: i32, color: Color) {
    let reach = STROKE_WIDTH as i32 - 1;
    for dy in 0..=reach {
        for dx in 0..=reach {
            set_pixel(pixels, size, x + dx, y + dy, color);
        }
    }
}

fn set_pixel(pixels: &mut [u8], size: (u32, u32), x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= size.0 as i32 || y >= size.1 as i32 {
        return;
    }
    let idx = ((y as u32 * size.0 + x as u32) * 4) as usize;
    if idx + 3 >= pixels.len() {
        return;
    }
    pixels[idx] = color.r;
    pixels[idx + 1] = color.g;
    pixels[idx + 2] = color.b;
    pixels[idx + 3] = color.a;
}
