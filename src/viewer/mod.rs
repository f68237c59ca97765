pub mod backend;
pub mod heatmap;
pub mod model;
pub mod overlay;
pub mod session;
pub mod state;
pub mod viewport;

pub use backend::FileImageBackend;
pub use heatmap::{synthesize_regions, HeatmapFrameBuffer, HeatmapRegion};
pub use model::{Annotation, AnnotationId, CandidateShape, CanvasRect, ShapeKind};
pub use overlay::AnnotationFrameBuffer;
pub use session::{AnnotationSession, RedrawGate, SessionEvent};
pub use state::{DrawPhase, DrawStateMachine};
pub use viewport::{ImagingBackend, PixelRect, ViewportAdapter, ViewportError, ViewportState};
