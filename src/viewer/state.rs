use crate::viewer::model::{
    Annotation, AnnotationId, CandidateShape, CanvasRect, ShapeKind, ACCENT,
};

/// Candidate that passed the size check and is waiting for an optional
/// comment before entering the committed set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingAnnotation {
    pub id: AnnotationId,
    pub shape: ShapeKind,
    pub origin: (f32, f32),
    pub extent: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawPhase {
    Idle,
    ToolArmed(ShapeKind),
    Drawing(CandidateShape),
    PendingComment(PendingAnnotation),
}

/// Pointer-gesture interpreter. Pointer events are racy against UI state,
/// so any event arriving in the wrong phase is a logged no-op rather than
/// an error.
#[derive(Debug)]
pub struct DrawStateMachine {
    phase: DrawPhase,
    next_id: u64,
}

impl Default for DrawStateMachine {
    fn default() -> Self {
        Self {
            phase: DrawPhase::Idle,
            next_id: 1,
        }
    }
}

impl DrawStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn armed_tool(&self) -> Option<ShapeKind> {
        match self.phase {
            DrawPhase::ToolArmed(kind) => Some(kind),
            DrawPhase::Drawing(candidate) => Some(candidate.shape),
            _ => None,
        }
    }

    pub fn candidate(&self) -> Option<&CandidateShape> {
        match &self.phase {
            DrawPhase::Drawing(candidate) => Some(candidate),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingAnnotation> {
        match &self.phase {
            DrawPhase::PendingComment(pending) => Some(pending),
            _ => None,
        }
    }

    /// Selecting the already-armed tool disarms it (toggle semantics).
    pub fn select_tool(&mut self, kind: ShapeKind) {
        self.phase = match self.phase {
            DrawPhase::Idle => DrawPhase::ToolArmed(kind),
            DrawPhase::ToolArmed(armed) if armed == kind => DrawPhase::Idle,
            DrawPhase::ToolArmed(_) => DrawPhase::ToolArmed(kind),
            other => {
                tracing::debug!(?kind, "select_tool ignored mid-gesture");
                other
            }
        };
    }

    pub fn pointer_down(&mut self, px: f32, py: f32, canvas: CanvasRect) {
        let DrawPhase::ToolArmed(kind) = self.phase else {
            tracing::debug!("pointer_down outside ToolArmed ignored");
            return;
        };
        let origin = canvas.normalize(px, py);
        self.phase = DrawPhase::Drawing(CandidateShape {
            shape: kind,
            origin,
            extent: (0.0, 0.0),
        });
    }

    pub fn pointer_move(&mut self, px: f32, py: f32, canvas: CanvasRect) {
        let DrawPhase::Drawing(ref mut candidate) = self.phase else {
            tracing::debug!("pointer_move outside Drawing ignored");
            return;
        };
        let (nx, ny) = canvas.normalize(px, py);
        candidate.extent = (nx - candidate.origin.0, ny - candidate.origin.1);
    }

    pub fn pointer_up(&mut self) {
        let DrawPhase::Drawing(candidate) = self.phase else {
            tracing::debug!("pointer_up outside Drawing ignored");
            return;
        };
        if !candidate.meets_min_extent() {
            self.phase = DrawPhase::ToolArmed(candidate.shape);
            return;
        }
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        self.phase = DrawPhase::PendingComment(PendingAnnotation {
            id,
            shape: candidate.shape,
            origin: candidate.origin,
            extent: candidate.extent,
        });
    }

    /// Implicit pointer-up with the size check suppressed: whatever was in
    /// progress is discarded so the gesture cannot get stuck when the
    /// pointer exits the canvas.
    pub fn pointer_left(&mut self) {
        if let DrawPhase::Drawing(candidate) = self.phase {
            self.phase = DrawPhase::ToolArmed(candidate.shape);
        }
    }

    /// Finish the pending annotation. The machine only proposes; the caller
    /// owns the committed set. Disarms the tool after each successful
    /// annotation.
    pub fn confirm_comment(&mut self, text: impl Into<String>) -> Option<Annotation> {
        let DrawPhase::PendingComment(pending) = self.phase else {
            tracing::debug!("confirm_comment outside PendingComment ignored");
            return None;
        };
        self.phase = DrawPhase::Idle;
        Some(Annotation {
            id: pending.id,
            shape: pending.shape,
            origin: pending.origin,
            extent: pending.extent,
            comment: text.into(),
            stroke_color: ACCENT,
        })
    }

    pub fn cancel_comment(&mut self) {
        match self.phase {
            DrawPhase::PendingComment(_) => self.phase = DrawPhase::Idle,
            _ => tracing::debug!("cancel_comment outside PendingComment ignored"),
        }
    }
}
