//! pdfpager - a paged PDF viewer library
//!
//! This library provides page and zoom navigation for a single document, a
//! render scheduler that keeps at most one render in flight and coalesces the
//! rest, a PDFium-backed rendering service and the iced viewer built on them.

pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod navigation;
pub mod pdf;
pub mod scheduler;
pub mod service;
pub mod ui;

pub use config::{ViewerConfig, ZoomSettings};
pub use error::{Result, ViewerError};
pub use input::KeyHandler;
pub use navigation::{NavigationController, ViewState};
pub use pdf::PdfiumService;
pub use scheduler::{RenderRequest, RenderScheduler};
pub use service::{DocumentInfo, RenderService, Surface};
pub use ui::ViewerApp;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ViewerConfig, ZoomSettings};
    pub use crate::navigation::NavigationController;
    pub use crate::scheduler::RenderRequest;
    pub use crate::service::{DocumentInfo, RenderService, Surface};
    pub use crate::ui::ViewerApp;
}
