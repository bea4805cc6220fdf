//! Document rendering service interface and the shared drawing surface

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::scheduler::RenderRequest;

/// Metadata returned when a document is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub total_pages: u32,
    pub title: Option<String>,
}

/// Asynchronous, single-document page renderer.
///
/// Implementations draw onto a [`Surface`] as a side effect of
/// [`render_page`](RenderService::render_page). Callers must not overlap
/// render calls; [`RenderScheduler`](crate::scheduler::RenderScheduler)
/// exists to guarantee that.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn open_document(&self, source: &str) -> Result<DocumentInfo>;

    async fn render_page(&self, request: RenderRequest) -> Result<()>;
}

/// A rendered page in RGBA8
#[derive(Clone)]
pub struct PageBitmap {
    pub page: u32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PageBitmap {
    pub fn from_rgba(request: RenderRequest, rgba: image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        Self {
            page: request.page,
            width,
            height,
            pixels: rgba.into_raw(),
        }
    }
}

impl std::fmt::Debug for PageBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBitmap")
            .field("page", &self.page)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Handle to the one drawing surface every render writes to.
///
/// Clones share the same surface. Whatever finished drawing last wins,
/// including a render for a page the user has since left.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    inner: Arc<Mutex<Option<PageBitmap>>>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&self, bitmap: PageBitmap) {
        *self.inner.lock() = Some(bitmap);
    }

    pub fn snapshot(&self) -> Option<PageBitmap> {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_keeps_request_and_dimensions() {
        let rgba = image::RgbaImage::from_pixel(4, 2, image::Rgba([1, 2, 3, 255]));
        let bitmap = PageBitmap::from_rgba(RenderRequest::new(3, 1.5), rgba);

        assert_eq!(bitmap.page, 3);
        assert_eq!((bitmap.width, bitmap.height), (4, 2));
        assert_eq!(bitmap.pixels.len(), 4 * 2 * 4);
        assert_eq!(&bitmap.pixels[..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn surface_clones_share_the_last_drawing() {
        let surface = Surface::new();
        let other = surface.clone();
        assert!(surface.snapshot().is_none());

        let rgba = image::RgbaImage::new(1, 1);
        other.draw(PageBitmap::from_rgba(RenderRequest::new(1, 1.0), rgba.clone()));
        other.draw(PageBitmap::from_rgba(RenderRequest::new(2, 1.0), rgba));

        assert_eq!(surface.snapshot().map(|b| b.page), Some(2));
    }
}
