//! Error types shared by the viewer

/// Errors raised while opening, rendering or configuring the viewer.
///
/// Variants carry rendered strings rather than source errors so the type can
/// travel inside UI messages, which must be `Clone`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to load PDFium: {0}")]
    Engine(String),

    #[error("could not open {path}: {detail}")]
    Open { path: String, detail: String },

    #[error("document has no pages")]
    EmptyDocument,

    #[error("no document is open")]
    NoDocument,

    #[error("page {page} is out of range (1..={total})")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("failed to render page {page}: {detail}")]
    Render { page: u32, detail: String },

    #[error("render service is not running")]
    ServiceUnavailable,

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
