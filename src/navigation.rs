//! Page and zoom navigation
//!
//! [`NavigationController`] owns the view state and the render scheduler.
//! Every operation that changes what should be on screen returns the render
//! the caller has to dispatch, if any.

use crate::config::ZoomSettings;
use crate::error::{Result, ViewerError};
use crate::scheduler::{RenderRequest, RenderScheduler};
use crate::service::DocumentInfo;

/// Current page and zoom of the open document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// 1-based, always within `1..=total_pages`
    pub current_page: u32,
    /// Always within the configured zoom bounds
    pub scale: f32,
    pub total_pages: u32,
}

impl ViewState {
    pub fn request(&self) -> RenderRequest {
        RenderRequest::new(self.current_page, self.scale)
    }
}

#[derive(Debug)]
pub struct NavigationController {
    state: ViewState,
    zoom: ZoomSettings,
    scheduler: RenderScheduler,
}

impl NavigationController {
    /// Set up the view for a freshly opened document.
    ///
    /// Returns the controller together with the first render to dispatch.
    /// Fails when `zoom` is not a valid set of bounds.
    pub fn open(info: &DocumentInfo, zoom: ZoomSettings) -> Result<(Self, RenderRequest)> {
        zoom.validate()?;

        let state = ViewState {
            current_page: 1,
            scale: zoom.initial_scale,
            total_pages: info.total_pages.max(1),
        };
        let mut scheduler = RenderScheduler::new();
        let first = state.request();
        // A fresh scheduler is idle, so the first request always starts.
        let _ = scheduler.request_render(first);

        tracing::info!(
            total_pages = state.total_pages,
            scale = state.scale,
            "document opened"
        );

        Ok((
            Self {
                state,
                zoom,
                scheduler,
            },
            first,
        ))
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn page_label(&self) -> u32 {
        self.scheduler.page_label()
    }

    pub fn is_busy(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn last_error(&self) -> Option<&ViewerError> {
        self.scheduler.last_error()
    }

    /// Single-page documents get no pagination controls
    pub fn shows_pagination(&self) -> bool {
        self.state.total_pages >= 2
    }

    /// Jump to page `page`, clamped into the document
    pub fn go_to_page(&mut self, page: i64) -> Option<RenderRequest> {
        let target = page.clamp(1, i64::from(self.state.total_pages)) as u32;
        if target == self.state.current_page {
            return None;
        }
        self.state.current_page = target;
        self.scheduler.request_render(self.state.request())
    }

    pub fn next_page(&mut self) -> Option<RenderRequest> {
        if self.state.current_page >= self.state.total_pages {
            return None;
        }
        self.go_to_page(i64::from(self.state.current_page) + 1)
    }

    pub fn prev_page(&mut self) -> Option<RenderRequest> {
        if self.state.current_page <= 1 {
            return None;
        }
        self.go_to_page(i64::from(self.state.current_page) - 1)
    }

    pub fn first_page(&mut self) -> Option<RenderRequest> {
        self.go_to_page(1)
    }

    pub fn last_page(&mut self) -> Option<RenderRequest> {
        self.go_to_page(i64::from(self.state.total_pages))
    }

    /// Jump to the page typed by the user. The leading integer is used and
    /// trailing text dropped, so `"4x"` is page 4 and `"3.5"` is page 3.
    /// Input without leading digits is ignored.
    pub fn prompt_go_to_page(&mut self, input: &str) -> Option<RenderRequest> {
        match parse_leading_int(input) {
            Some(page) => self.go_to_page(page),
            None => {
                tracing::debug!(input, "ignoring page jump input");
                None
            }
        }
    }

    /// Grow the zoom by `ticks` steps, stopping at the maximum
    pub fn zoom_in(&mut self, ticks: u32) -> Option<RenderRequest> {
        let max = self.zoom.max_scale;
        let mut scale = self.state.scale;
        for _ in 0..ticks.max(1) {
            scale = round_scale(scale * self.zoom.step).min(max);
            if scale >= max {
                break;
            }
        }
        self.apply_scale(scale)
    }

    /// Shrink the zoom by `ticks` steps, stopping at the minimum
    pub fn zoom_out(&mut self, ticks: u32) -> Option<RenderRequest> {
        let min = self.zoom.min_scale;
        let mut scale = self.state.scale;
        for _ in 0..ticks.max(1) {
            scale = round_scale(scale / self.zoom.step).max(min);
            if scale <= min {
                break;
            }
        }
        self.apply_scale(scale)
    }

    fn apply_scale(&mut self, scale: f32) -> Option<RenderRequest> {
        self.state.scale = scale;
        tracing::debug!(scale, "zoom changed");
        self.scheduler.request_render(self.state.request())
    }

    /// Feed back the result of the render that was in flight
    pub fn on_render_finished(&mut self, outcome: Result<()>) -> Option<RenderRequest> {
        self.scheduler.finish(outcome)
    }
}

/// Round to two decimal places
pub(crate) fn round_scale(scale: f32) -> f32 {
    (scale * 100.0).round() / 100.0
}

/// Optional sign followed by at least one ASCII digit, after leading
/// whitespace. Anything after the digits is dropped. Values too large for
/// `i64` saturate, which the page clamp absorbs.
fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
