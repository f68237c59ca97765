use crate::viewer::model::{Annotation, AnnotationId, CanvasRect, ShapeKind};
use crate::viewer::state::{DrawPhase, DrawStateMachine, PendingAnnotation};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

/// Ceiling on the redraw debounce; anything longer makes interactive
/// drawing feel laggy.
pub const MAX_DEBOUNCE: Duration = Duration::from_millis(100);

/// Outward notification carrying the full committed list, emitted on every
/// add or delete. This is the sole data contract exposed to the hosting
/// application.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AnnotationsChanged { annotations: Vec<Annotation> },
}

/// Dirty flag with a deadline, checked on the next paint pass instead of a
/// timer. Marking while already dirty extends the deadline so a burst of
/// changes produces one redraw after the viewport settles.
#[derive(Debug)]
pub struct RedrawGate {
    debounce: Duration,
    deadline: Option<Instant>,
}

impl RedrawGate {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce: debounce.min(MAX_DEBOUNCE),
            deadline: None,
        }
    }

    pub fn mark(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    pub fn is_dirty(&self) -> bool {
        self.deadline.is_some()
    }

    /// True at most once per mark, and never before the deadline.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Owner of the committed annotation set. The drawing state machine only
/// proposes; every mutation of the set goes through this session, which
/// emits change notifications and marks the overlay dirty.
pub struct AnnotationSession {
    machine: DrawStateMachine,
    annotations: Vec<Annotation>,
    events: Option<Sender<SessionEvent>>,
    overlay_gate: RedrawGate,
}

impl AnnotationSession {
    pub fn new(debounce: Duration) -> Self {
        Self {
            machine: DrawStateMachine::new(),
            annotations: Vec::new(),
            events: None,
            overlay_gate: RedrawGate::new(debounce),
        }
    }

    pub fn subscribe(&mut self, sender: Sender<SessionEvent>) {
        self.events = Some(sender);
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn phase(&self) -> &DrawPhase {
        self.machine.phase()
    }

    pub fn armed_tool(&self) -> Option<ShapeKind> {
        self.machine.armed_tool()
    }

    pub fn candidate(&self) -> Option<&crate::viewer::model::CandidateShape> {
        self.machine.candidate()
    }

    pub fn pending(&self) -> Option<&PendingAnnotation> {
        self.machine.pending()
    }

    pub fn overlay_gate(&mut self) -> &mut RedrawGate {
        &mut self.overlay_gate
    }

    pub fn select_tool(&mut self, kind: ShapeKind, now: Instant) {
        self.machine.select_tool(kind);
        self.overlay_gate.mark(now);
    }

    pub fn pointer_down(&mut self, px: f32, py: f32, canvas: CanvasRect, now: Instant) {
        self.machine.pointer_down(px, py, canvas);
        self.overlay_gate.mark(now);
    }

    pub fn pointer_move(&mut self, px: f32, py: f32, canvas: CanvasRect, now: Instant) {
        self.machine.pointer_move(px, py, canvas);
        self.overlay_gate.mark(now);
    }

    pub fn pointer_up(&mut self, now: Instant) {
        self.machine.pointer_up();
        self.overlay_gate.mark(now);
    }

    pub fn pointer_left(&mut self, now: Instant) {
        self.machine.pointer_left();
        self.overlay_gate.mark(now);
    }

    /// Commit the pending annotation with the given comment. Append-only;
    /// insertion order is display order.
    pub fn confirm_comment(&mut self, text: impl Into<String>, now: Instant) {
        if let Some(annotation) = self.machine.confirm_comment(text) {
            self.annotations.push(annotation);
            self.notify_changed();
            self.overlay_gate.mark(now);
        }
    }

    pub fn cancel_comment(&mut self, now: Instant) {
        self.machine.cancel_comment();
        self.overlay_gate.mark(now);
    }

    /// Remove by id. Always succeeds; removing an absent id changes
    /// nothing and emits nothing.
    pub fn remove(&mut self, id: AnnotationId, now: Instant) {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        if self.annotations.len() != before {
            self.notify_changed();
            self.overlay_gate.mark(now);
        }
    }

    fn notify_changed(&self) {
        if let Some(sender) = &self.events {
            let event = SessionEvent::AnnotationsChanged {
                annotations: self.annotations.clone(),
            };
            if sender.send(event).is_err() {
                tracing::debug!("annotation change listener disconnected");
            }
        }
    }
}
