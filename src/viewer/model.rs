use serde::{Deserialize, Serialize};

/// Shapes below this normalized size on either axis are treated as
/// accidental clicks and never committed.
pub const MIN_EXTENT: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Ellipse,
    Rectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Default annotation stroke color, rgba(220, 38, 38, 0.8).
pub const ACCENT: Color = Color::rgba(220, 38, 38, 204);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnnotationId(pub u64);

/// A committed user mark. `shape`, `origin` and `extent` are fixed at
/// creation; only the comment may change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub shape: ShapeKind,
    /// Top-left anchor in normalized viewport coordinates, both axes in [0, 1].
    pub origin: (f32, f32),
    /// Signed normalized size; negative components mean the drag grew
    /// left/up from the origin.
    pub extent: (f32, f32),
    pub comment: String,
    pub stroke_color: Color,
}

impl Annotation {
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }
}

/// In-progress shape being dragged out. Every field is always present so
/// the committed set never carries partially-filled records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateShape {
    pub shape: ShapeKind,
    pub origin: (f32, f32),
    pub extent: (f32, f32),
}

impl CandidateShape {
    pub fn meets_min_extent(&self) -> bool {
        self.extent.0.abs() > MIN_EXTENT && self.extent.1.abs() > MIN_EXTENT
    }
}

/// Pixel rectangle of the rendered canvas, used to convert device pixels to
/// normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn normalize(&self, px: f32, py: f32) -> (f32, f32) {
        ((px - self.left) / self.width, (py - self.top) / self.height)
    }

    pub fn denormalize(&self, nx: f32, ny: f32) -> (f32, f32) {
        (self.left + nx * self.width, self.top + ny * self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_denormalize_round_trips_within_rounding() {
        let rect = CanvasRect::new(12.0, 30.0, 640.0, 480.0);
        for &(px, py) in &[(12.0, 30.0), (332.0, 270.5), (651.9, 509.9)] {
            let (nx, ny) = rect.normalize(px, py);
            let (bx, by) = rect.denormalize(nx, ny);
            assert!((bx - px).abs() < 1e-3, "x round trip: {px} -> {bx}");
            assert!((by - py).abs() < 1e-3, "y round trip: {py} -> {by}");
        }
    }

    #[test]
    fn candidate_below_threshold_on_either_axis_is_rejected() {
        let mut candidate = CandidateShape {
            shape: ShapeKind::Rectangle,
            origin: (0.5, 0.5),
            extent: (0.005, 0.005),
        };
        assert!(!candidate.meets_min_extent());

        candidate.extent = (0.3, 0.01);
        assert!(!candidate.meets_min_extent());

        candidate.extent = (-0.3, -0.3);
        assert!(candidate.meets_min_extent());
    }

    #[test]
    fn extent_exactly_at_threshold_is_rejected() {
        let candidate = CandidateShape {
            shape: ShapeKind::Ellipse,
            origin: (0.1, 0.1),
            extent: (MIN_EXTENT, 0.5),
        };
        assert!(!candidate.meets_min_extent());
    }

    #[test]
    fn annotation_change_payload_serializes_with_stable_fields() {
        let annotation = Annotation {
            id: AnnotationId(3),
            shape: ShapeKind::Rectangle,
            origin: (0.1, 0.2),
            extent: (0.3, 0.4),
            comment: "nodule".into(),
            stroke_color: ACCENT,
        };
        let json = serde_json::to_string(&annotation).unwrap();
        assert!(json.contains("\"shape\":\"rectangle\""));
        assert!(json.contains("\"comment\":\"nodule\""));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, annotation);
    }
}
