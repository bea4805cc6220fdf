//! Render scheduling with a single in-flight render and a single pending slot
//!
//! The scheduler never talks to the rendering service itself. Every operation
//! returns the request that has to be started right now (if any), and the
//! event loop hosting the viewer reports back through [`RenderScheduler::finish`]
//! once the service resolves. Requests arriving while a render is in flight
//! are coalesced: only the most recent one is kept.

use crate::error::ViewerError;

/// What should currently be on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    /// 1-based page number
    pub page: u32,
    /// Zoom factor (1.0 = 100%)
    pub scale: f32,
}

impl RenderRequest {
    pub fn new(page: u32, scale: f32) -> Self {
        Self { page, scale }
    }
}

/// Counters describing what the scheduler has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Renders handed out for dispatch
    pub started: u64,
    /// Renders that resolved successfully
    pub completed: u64,
    /// Renders the service rejected
    pub failed: u64,
    /// Pending requests replaced by a newer one before they started
    pub superseded: u64,
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    in_flight: Option<RenderRequest>,
    pending: Option<RenderRequest>,
    displayed: Option<RenderRequest>,
    page_label: u32,
    last_error: Option<ViewerError>,
    stats: RenderStats,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `request` to be drawn.
    ///
    /// Returns `Some(request)` when the caller must start the render now, or
    /// `None` when a render is already in flight and the request was parked in
    /// the pending slot (replacing whatever was there). The page label follows
    /// the request immediately, even before anything is drawn.
    pub fn request_render(&mut self, request: RenderRequest) -> Option<RenderRequest> {
        self.page_label = request.page;

        if self.in_flight.is_some() {
            if let Some(stale) = self.pending.replace(request) {
                self.stats.superseded += 1;
                tracing::trace!(
                    stale_page = stale.page,
                    stale_scale = stale.scale,
                    "dropping superseded render request"
                );
            }
            tracing::debug!(page = request.page, scale = request.scale, "render queued");
            return None;
        }

        self.start(request)
    }

    /// Report that the in-flight render resolved.
    ///
    /// Returns the pending request that must be started next, if one arrived
    /// while the previous render was running. Failed renders are not retried.
    pub fn finish(&mut self, outcome: Result<(), ViewerError>) -> Option<RenderRequest> {
        let Some(finished) = self.in_flight.take() else {
            tracing::warn!("render completion reported while no render was in flight");
            return None;
        };

        match outcome {
            Ok(()) => {
                self.stats.completed += 1;
                self.displayed = Some(finished);
                self.last_error = None;
                tracing::debug!(page = finished.page, scale = finished.scale, "render completed");
            }
            Err(err) => {
                self.stats.failed += 1;
                tracing::warn!(page = finished.page, error = %err, "render failed");
                self.last_error = Some(err);
            }
        }

        let next = self.pending.take()?;
        self.request_render(next)
    }

    fn start(&mut self, request: RenderRequest) -> Option<RenderRequest> {
        self.in_flight = Some(request);
        self.stats.started += 1;
        tracing::debug!(page = request.page, scale = request.scale, "render started");
        Some(request)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RenderRequest> {
        self.in_flight
    }

    pub fn pending(&self) -> Option<RenderRequest> {
        self.pending
    }

    /// The most recently completed render
    pub fn displayed(&self) -> Option<RenderRequest> {
        self.displayed
    }

    /// Page number shown in the page counter
    pub fn page_label(&self) -> u32 {
        self.page_label
    }

    /// Error from the last render, cleared by the next successful one
    pub fn last_error(&self) -> Option<&ViewerError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }
}
