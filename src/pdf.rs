//! PDFium-backed rendering service
//!
//! PDFium handles are not `Send`, so a single render thread owns the library
//! binding and the open document. The async [`RenderService`] methods send a
//! command to that thread and await the reply on a oneshot channel.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use async_trait::async_trait;
use pdfium_render::prelude::*;
use tokio::sync::oneshot;

use crate::error::{Result, ViewerError};
use crate::scheduler::RenderRequest;
use crate::service::{DocumentInfo, PageBitmap, RenderService, Surface};

/// Initialize the PDFium library
pub fn init_pdfium() -> Result<Pdfium> {
    let lib_name = if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else {
        "libpdfium.so"
    };

    let bindings = Pdfium::bind_to_library(format!("./{}", lib_name))
        .or_else(|_| Pdfium::bind_to_library(format!("/usr/lib/{}", lib_name)))
        .map_err(|e| ViewerError::Engine(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

enum RenderCommand {
    Open {
        path: PathBuf,
        reply: oneshot::Sender<Result<DocumentInfo>>,
    },
    Render {
        request: RenderRequest,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Renders pages of one PDF onto a shared [`Surface`]
pub struct PdfiumService {
    command_tx: mpsc::Sender<RenderCommand>,
}

impl PdfiumService {
    /// Start the render thread. Pages are rasterized at
    /// `base_render_scale * request.scale`.
    pub fn spawn(surface: Surface, base_render_scale: f32) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<RenderCommand>();

        let spawned = thread::Builder::new()
            .name("pdf-render".into())
            .spawn(move || render_thread(command_rx, surface, base_render_scale));
        if let Err(e) = spawned {
            // Commands will fail with ServiceUnavailable once the receiver is gone.
            tracing::error!(error = %e, "failed to spawn render thread");
        }

        Self { command_tx }
    }

    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> RenderCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(make(reply))
            .map_err(|_| ViewerError::ServiceUnavailable)?;
        response.await.map_err(|_| ViewerError::ServiceUnavailable)?
    }
}

#[async_trait]
impl RenderService for PdfiumService {
    async fn open_document(&self, source: &str) -> Result<DocumentInfo> {
        let path = PathBuf::from(source);
        self.call(|reply| RenderCommand::Open { path, reply }).await
    }

    async fn render_page(&self, request: RenderRequest) -> Result<()> {
        self.call(|reply| RenderCommand::Render { request, reply }).await
    }
}

fn render_thread(commands: mpsc::Receiver<RenderCommand>, surface: Surface, base_scale: f32) {
    let pdfium = match init_pdfium() {
        Ok(pdfium) => Some(pdfium),
        Err(e) => {
            tracing::error!(error = %e, "renderer: failed to init pdfium");
            None
        }
    };
    let mut document: Option<PdfDocument<'_>> = None;

    while let Ok(command) = commands.recv() {
        match command {
            RenderCommand::Open { path, reply } => {
                let result = match pdfium.as_ref() {
                    Some(pdfium) => open_document(pdfium, &path).map(|(doc, info)| {
                        document = Some(doc);
                        info
                    }),
                    None => Err(ViewerError::Engine("PDFium library is not loaded".into())),
                };
                let _ = reply.send(result);
            }
            RenderCommand::Render { request, reply } => {
                let result = match document.as_ref() {
                    Some(doc) => render_page(doc, request, base_scale)
                        .map(|bitmap| surface.draw(bitmap)),
                    None => Err(ViewerError::NoDocument),
                };
                let _ = reply.send(result);
            }
        }
    }

    tracing::debug!("render thread exiting");
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &std::path::Path,
) -> Result<(PdfDocument<'a>, DocumentInfo)> {
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ViewerError::Open {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

    let total_pages = u32::from(document.pages().len());
    if total_pages == 0 {
        return Err(ViewerError::EmptyDocument);
    }

    let title = document
        .metadata()
        .get(PdfDocumentMetadataTagType::Title)
        .map(|tag| tag.value().to_string())
        .filter(|title| !title.is_empty());

    tracing::info!(path = %path.display(), total_pages, "opened document");
    Ok((document, DocumentInfo { total_pages, title }))
}

fn render_page(
    document: &PdfDocument,
    request: RenderRequest,
    base_scale: f32,
) -> Result<PageBitmap> {
    let total = u32::from(document.pages().len());
    let index = request
        .page
        .checked_sub(1)
        .filter(|index| *index < total)
        .ok_or_else(|| ViewerError::PageOutOfRange {
            page: request.page,
            total,
        })?;

    let render_error = |e: PdfiumError| ViewerError::Render {
        page: request.page,
        detail: e.to_string(),
    };

    // index < total <= u16::MAX
    let page = document.pages().get(index as u16).map_err(render_error)?;

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(base_scale * request.scale)
        .rotate_if_landscape(PdfPageRenderRotation::None, true);

    let bitmap = page.render_with_config(&render_config).map_err(render_error)?;
    let rgba = bitmap.as_image().to_rgba8();

    tracing::trace!(
        page = request.page,
        width = rgba.width(),
        height = rgba.height(),
        "rasterized page"
    );
    Ok(PageBitmap::from_rgba(request, rgba))
}
