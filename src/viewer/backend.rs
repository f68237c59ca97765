use crate::viewer::viewport::{ImagingBackend, PixelRect, ViewportError};

/// Image decoded and ready for texture upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Imaging backend that treats the opaque locator as a filesystem path and
/// decodes it with the `image` crate. The locator's internal structure is
/// otherwise not interpreted.
#[derive(Debug, Default)]
pub struct FileImageBackend {
    bound: bool,
    decoded: Option<DecodedImage>,
}

impl FileImageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decoded(&self) -> Option<&DecodedImage> {
        self.decoded.as_ref()
    }

    pub fn take_decoded(&mut self) -> Option<DecodedImage> {
        self.decoded.take()
    }
}

impl ImagingBackend for FileImageBackend {
    fn bind(&mut self) -> Result<(), ViewportError> {
        if self.bound {
            return Err(ViewportError::Init("surface already bound".into()));
        }
        self.bound = true;
        Ok(())
    }

    fn load(&mut self, image_ref: &str) -> Result<PixelRect, ViewportError> {
        if !self.bound {
            return Err(ViewportError::Init("surface not bound".into()));
        }
        let img = image::open(image_ref)
            .map_err(|err| ViewportError::Load(err.to_string()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        self.decoded = Some(DecodedImage {
            width,
            height,
            rgba: img.into_raw(),
        });
        Ok(PixelRect { width, height })
    }

    fn release(&mut self) -> Result<(), ViewportError> {
        self.bound = false;
        self.decoded = None;
        Ok(())
    }
}
