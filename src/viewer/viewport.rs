use thiserror::Error;

/// Failures surfaced by the viewport. `Init` means the surface could not
/// bind at all and the mount is unusable; `Load` means this particular
/// image reference failed and a new reference is needed to retry.
#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("failed to initialize viewer: {0}")]
    Init(String),
    #[error("failed to load image: {0}")]
    Load(String),
}

/// Pixel rectangle of a successfully rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub width: u32,
    pub height: u32,
}

/// Read-only facts about the image surface. Owned and mutated exclusively
/// by the adapter; everything else treats it as immutable input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportState {
    pub ready: bool,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub error: Option<String>,
}

/// Imaging collaborator, injected at construction so no shared process
/// state is configured behind the adapter's back.
pub trait ImagingBackend {
    fn bind(&mut self) -> Result<(), ViewportError>;
    fn load(&mut self, image_ref: &str) -> Result<PixelRect, ViewportError>;
    fn release(&mut self) -> Result<(), ViewportError>;
}

/// Ticket handed out by [`ViewportAdapter::begin_show`]. A load whose
/// ticket is no longer current is ignored at resolution time, which is the
/// whole guard against stale-callback writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

pub struct ViewportAdapter<B: ImagingBackend> {
    backend: B,
    state: ViewportState,
    attached: bool,
    loading: bool,
    generation: u64,
}

impl<B: ImagingBackend> ViewportAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ViewportState::default(),
            attached: false,
            loading: false,
            generation: 0,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Bind the rendering surface. Idempotent; a bind failure marks the
    /// mount unusable and is not retried.
    pub fn attach(&mut self) -> Result<(), ViewportError> {
        if self.attached {
            return Ok(());
        }
        match self.backend.bind() {
            Ok(()) => {
                self.attached = true;
                Ok(())
            }
            Err(err) => {
                self.state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Start showing an image reference. Passing `None` is not an error:
    /// the adapter stays quiescent, neither loading nor ready.
    pub fn begin_show(&mut self, image_ref: Option<&str>) -> Option<LoadTicket> {
        self.generation += 1;
        self.state.ready = false;
        self.state.error = None;
        match image_ref {
            Some(_) => {
                self.loading = true;
                Some(LoadTicket {
                    generation: self.generation,
                })
            }
            None => {
                self.loading = false;
                None
            }
        }
    }

    /// Run the backend load for a ticket and resolve it in one step.
    pub fn show(&mut self, image_ref: &str) {
        if let Some(ticket) = self.begin_show(Some(image_ref)) {
            let result = self.backend.load(image_ref);
            self.resolve_load(ticket, result);
        }
    }

    /// Apply a load outcome. Stale tickets (superseded by a newer
    /// `begin_show` or a `detach`) are dropped without touching state.
    pub fn resolve_load(&mut self, ticket: LoadTicket, result: Result<PixelRect, ViewportError>) {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale load resolution"
            );
            return;
        }
        self.loading = false;
        match result {
            Ok(rect) => {
                self.state.ready = true;
                self.state.pixel_width = rect.width;
                self.state.pixel_height = rect.height;
                self.state.error = None;
            }
            Err(err) => {
                self.state.ready = false;
                self.state.error = Some(err.to_string());
            }
        }
    }

    /// Scoped teardown. Runs on every exit path; release failures are
    /// logged and swallowed so cleanup of dependents is never blocked.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        if let Err(err) = self.backend.release() {
            tracing::warn!(error = %err, "viewport release failed during teardown");
        }
        self.attached = false;
        self.loading = false;
        self.generation += 1;
        self.state = ViewportState::default();
    }
}

impl<B: ImagingBackend> Drop for ViewportAdapter<B> {
    fn drop(&mut self) {
        self.detach();
    }
}
