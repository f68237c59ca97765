use crate::viewer::model::Color;

/// Confidence below this produces no visible region at all, so the overlay
/// never implies a finding the model is not confident about.
pub const VISIBILITY_THRESHOLD: f32 = 0.3;
/// Above this the synthesizer reports a second region of interest.
const TWO_REGION_THRESHOLD: f32 = 0.7;

const BASE_CENTER: (f32, f32) = (0.35, 0.40);
const CENTER_STEP: (f32, f32) = (0.25, 0.20);

const BOX_SCALE: f32 = 1.5;
const BOX_STROKE_WIDTH: i32 = 3;
const BOX_DASH_ON: f32 = 5.0;
const BOX_DASH_OFF: f32 = 5.0;

/// Derived visualization unit. Never persisted; recomputed from scratch on
/// every confidence or visibility change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapRegion {
    pub center: (f32, f32),
    pub radius: f32,
    pub intensity: f32,
}

/// Deterministic, side-effect-free synthesis of highlight regions from a
/// scalar confidence value. Out-of-range inputs are clamped to [0, 1]
/// before thresholding (NaN counts as 0.0) so downstream alpha math stays
/// in range.
pub fn synthesize_regions(intensity: f32) -> Vec<HeatmapRegion> {
    let intensity = if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    };
    if intensity < VISIBILITY_THRESHOLD {
        return Vec::new();
    }

    let count = if intensity > TWO_REGION_THRESHOLD { 2 } else { 1 };
    (0..count)
        .map(|i| HeatmapRegion {
            center: (
                BASE_CENTER.0 + i as f32 * CENTER_STEP.0,
                BASE_CENTER.1 + i as f32 * CENTER_STEP.1,
            ),
            radius: 0.2 + 0.1 * intensity,
            intensity,
        })
        .collect()
}

/// Stateless raster layer for the synthesized regions: a radial gradient
/// per region plus a dashed bounding box, accumulated with plain "over"
/// compositing.
#[derive(Debug, Default)]
pub struct HeatmapFrameBuffer {
    rgba: Vec<u8>,
    size: (u32, u32),
}

impl HeatmapFrameBuffer {
    fn ensure_size(&mut self, size: (u32, u32)) {
        let target_len = (size.0 as usize)
            .saturating_mul(size.1 as usize)
            .saturating_mul(4);
        if self.size != size || self.rgba.len() != target_len {
            self.rgba = vec![0; target_len];
            self.size = size;
        }
    }

    pub fn render(&mut self, regions: &[HeatmapRegion], size: (u32, u32)) {
        self.ensure_size(size);
        self.rgba.fill(0);

        for region in regions {
            paint_radial_gradient(&mut self.rgba, size, region);
        }
        for region in regions {
            stroke_bounding_box(&mut self.rgba, size, region);
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

/// Gradient stops matching the source visualization: red at half the
/// region intensity in the center, fading through orange to transparent at
/// the outer radius.
fn gradient_sample(t: f32, intensity: f32) -> Color {
    let center_alpha = 0.5 * intensity;
    let (r, g, b, alpha) = if t < 0.5 {
        let k = t / 0.5;
        (
            lerp(255.0, 255.0, k),
            lerp(0.0, 165.0, k),
            0.0,
            lerp(center_alpha, center_alpha * 0.6, k),
        )
    } else {
        let k = (t - 0.5) / 0.5;
        (255.0, 165.0, 0.0, lerp(center_alpha * 0.6, 0.0, k))
    };
    Color::rgba(r as u8, g as u8, b as u8, (alpha * 255.0).round() as u8)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn paint_radial_gradient(pixels: &mut [u8], size: (u32, u32), region: &HeatmapRegion) {
    let cx = region.center.0 * size.0 as f32;
    let cy = region.center.1 * size.1 as f32;
    let radius = region.radius * size.0.min(size.1) as f32;
    if radius < 0.5 {
        return;
    }

    let x0 = ((cx - radius).floor() as i32).max(0);
    let x1 = ((cx + radius).ceil() as i32).min(size.0 as i32 - 1);
    let y0 = ((cy - radius).floor() as i32).max(0);
    let y1 = ((cy + radius).ceil() as i32).min(size.1 as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > radius {
                continue;
            }
            let color = gradient_sample(dist / radius, region.intensity);
            blend_over(pixels, size, x, y, color);
        }
    }
}

fn stroke_bounding_box(pixels: &mut [u8], size: (u32, u32), region: &HeatmapRegion) {
    let cx = region.center.0 * size.0 as f32;
    let cy = region.center.1 * size.1 as f32;
    let box_size = region.radius * size.0.min(size.1) as f32 * BOX_SCALE;
    let half = box_size * 0.5;
    let color = Color::rgba(255, 0, 0, (region.intensity * 255.0).round() as u8);

    let corners = [
        (cx - half, cy - half),
        (cx + half, cy - half),
        (cx + half, cy + half),
        (cx - half, cy + half),
    ];
    let mut travelled = 0.0f32;
    for i in 0..4 {
        let start = corners[i];
        let end = corners[(i + 1) % 4];
        travelled = dashed_segment(pixels, size, start, end, color, travelled);
    }
}

fn dashed_segment(
    pixels: &mut [u8],
    size: (u32, u32),
    start: (f32, f32),
    end: (f32, f32),
    color: Color,
    mut travelled: f32,
) -> f32 {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length = (dx * dx + dy * dy).sqrt();
    if length < f32::EPSILON {
        return travelled;
    }
    let steps = length.ceil() as i32;
    let reach = BOX_STROKE_WIDTH / 2;
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        if (travelled + length * t).rem_euclid(BOX_DASH_ON + BOX_DASH_OFF) < BOX_DASH_ON {
            let px = (start.0 + dx * t).round() as i32;
            let py = (start.1 + dy * t).round() as i32;
            for oy in -reach..=reach {
                for ox in -reach..=reach {
                    blend_over(pixels, size, px + ox, py + oy, color);
                }
            }
        }
    }
    travelled += length;
    travelled
}

fn blend_over(pixels: &mut [u8], size: (u32, u32), x: i32, y: i32, top: Color) {
    if x < 0 || y < 0 || x >= size.0 as i32 || y >= size.1 as i32 {
        return;
    }
    let idx = ((y as u32 * size.0 + x as u32) * 4) as usize;
    let ta = top.a as f32 / 255.0;
    let ba = pixels[idx + 3] as f32 / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    if out_a <= f32::EPSILON {
        return;
    }
    for (offset, top_c) in [top.r, top.g, top.b].into_iter().enumerate() {
        let base_c = pixels[idx + offset] as f32;
        let blended = (top_c as f32 * ta + base_c * ba * (1.0 - ta)) / out_a;
        pixels[idx + offset] = blended.round() as u8;
    }
    pixels[idx + 3] = (out_a * 255.0).round() as u8;
}
