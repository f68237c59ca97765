use scan_annotator::viewer::viewport::{
    ImagingBackend, PixelRect, ViewportAdapter, ViewportError,
};

/// Backend that defers load results so tests can interleave resolutions,
/// mimicking an image loader that completes after newer requests started.
#[derive(Default)]
struct DeferredBackend {
    released: bool,
}

impl ImagingBackend for DeferredBackend {
    fn bind(&mut self) -> Result<(), ViewportError> {
        Ok(())
    }

    fn load(&mut self, _image_ref: &str) -> Result<PixelRect, ViewportError> {
        unreachable!("tests resolve loads explicitly");
    }

    fn release(&mut self) -> Result<(), ViewportError> {
        self.released = true;
        Ok(())
    }
}

#[test]
fn superseded_load_cannot_overwrite_the_newer_image() {
    let mut adapter = ViewportAdapter::new(DeferredBackend::default());
    adapter.attach().unwrap();

    let first = adapter.begin_show(Some("slow.dcm")).unwrap();
    let second = adapter.begin_show(Some("fast.dcm")).unwrap();

    adapter.resolve_load(
        second,
        Ok(PixelRect {
            width: 800,
            height: 600,
        }),
    );
    assert!(adapter.state().ready);

    // The slow load finally finishes with different dimensions; it must be
    // dropped on the floor.
    adapter.resolve_load(
        first,
        Ok(PixelRect {
            width: 16,
            height: 16,
        }),
    );
    assert_eq!(adapter.state().pixel_width, 800);
    assert_eq!(adapter.state().pixel_height, 600);
}

#[test]
fn superseded_failure_does_not_surface_an_error() {
    let mut adapter = ViewportAdapter::new(DeferredBackend::default());
    adapter.attach().unwrap();

    let stale = adapter.begin_show(Some("a.dcm")).unwrap();
    let current = adapter.begin_show(Some("b.dcm")).unwrap();
    adapter.resolve_load(stale, Err(ViewportError::Load("late corrupt".into())));
    assert!(adapter.state().error.is_none());
    assert!(adapter.is_loading());

    adapter.resolve_load(
        current,
        Ok(PixelRect {
            width: 10,
            height: 10,
        }),
    );
    assert!(adapter.state().ready);
}

#[test]
fn load_failure_requires_a_new_reference_to_recover() {
    let mut adapter = ViewportAdapter::new(DeferredBackend::default());
    adapter.attach().unwrap();

    let ticket = adapter.begin_show(Some("broken.dcm")).unwrap();
    adapter.resolve_load(ticket, Err(ViewportError::Load("unsupported encoding".into())));
    assert!(!adapter.state().ready);
    assert!(adapter
        .state()
        .error
        .as_deref()
        .unwrap()
        .contains("unsupported encoding"));

    let retry = adapter.begin_show(Some("fixed.dcm")).unwrap();
    assert!(adapter.state().error.is_none(), "new load clears the error");
    adapter.resolve_load(
        retry,
        Ok(PixelRect {
            width: 32,
            height: 32,
        }),
    );
    assert!(adapter.state().ready);
}

#[test]
fn detach_releases_surface_and_invalidates_inflight_loads() {
    let mut adapter = ViewportAdapter::new(DeferredBackend::default());
    adapter.attach().unwrap();
    let ticket = adapter.begin_show(Some("scan.dcm")).unwrap();

    adapter.detach();
    assert!(adapter.backend().released);

    adapter.resolve_load(
        ticket,
        Ok(PixelRect {
            width: 64,
            height: 64,
        }),
    );
    assert!(!adapter.state().ready);
    assert!(adapter.state().error.is_none());
}
