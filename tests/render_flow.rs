use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pdfpager::prelude::*;
use pdfpager::service::PageBitmap;
use pdfpager::{Result, ViewerError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Renders only when the test releases a permit, so renders can be held
/// in flight while the user keeps navigating.
struct GatedService {
    total_pages: u32,
    failing_page: Option<u32>,
    gate: Semaphore,
    calls: Mutex<Vec<RenderRequest>>,
    surface: Surface,
}

impl GatedService {
    fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            failing_page: None,
            gate: Semaphore::new(0),
            calls: Mutex::new(Vec::new()),
            surface: Surface::new(),
        }
    }

    fn failing_on(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    fn release(&self) {
        self.gate.add_permits(1);
    }

    fn calls(&self) -> Vec<RenderRequest> {
        self.calls.lock().clone()
    }

    fn drawn_page(&self) -> Option<u32> {
        self.surface.snapshot().map(|bitmap| bitmap.page)
    }
}

#[async_trait]
impl RenderService for GatedService {
    async fn open_document(&self, _source: &str) -> Result<DocumentInfo> {
        Ok(DocumentInfo {
            total_pages: self.total_pages,
            title: Some("fixture".into()),
        })
    }

    async fn render_page(&self, request: RenderRequest) -> Result<()> {
        self.calls.lock().push(request);
        self.gate
            .acquire()
            .await
            .map_err(|_| ViewerError::ServiceUnavailable)?
            .forget();

        if self.failing_page == Some(request.page) {
            return Err(ViewerError::Render {
                page: request.page,
                detail: "corrupt page".into(),
            });
        }

        let rgba = image::RgbaImage::new(2, 2);
        self.surface.draw(PageBitmap::from_rgba(request, rgba));
        Ok(())
    }
}

fn start(service: &Arc<GatedService>, request: RenderRequest) -> JoinHandle<Result<()>> {
    let service = service.clone();
    tokio::spawn(async move { service.render_page(request).await })
}

async fn open(service: &Arc<GatedService>) -> (NavigationController, JoinHandle<Result<()>>) {
    let info = service.open_document("fixture.pdf").await.unwrap();
    let (nav, first) = NavigationController::open(&info, ZoomSettings::default()).unwrap();
    (nav, start(service, first))
}

/// Let the in-flight render finish and start whatever the controller wants next
async fn complete(
    service: &Arc<GatedService>,
    nav: &mut NavigationController,
    in_flight: JoinHandle<Result<()>>,
) -> Option<JoinHandle<Result<()>>> {
    service.release();
    let outcome = in_flight.await.unwrap();
    nav.on_render_finished(outcome)
        .map(|next| start(service, next))
}

#[tokio::test]
async fn requests_during_a_render_collapse_into_one_follow_up() {
    let service = Arc::new(GatedService::new(10));
    let (mut nav, in_flight) = open(&service).await;

    assert_eq!(nav.next_page(), None);
    assert_eq!(nav.next_page(), None);
    assert_eq!(nav.next_page(), None);
    assert_eq!(nav.page_label(), 4);

    let follow_up = complete(&service, &mut nav, in_flight).await.unwrap();
    // The first render drew page 1 even though page 4 is now current.
    assert_eq!(service.drawn_page(), Some(1));

    assert!(complete(&service, &mut nav, follow_up).await.is_none());
    assert_eq!(service.drawn_page(), Some(4));
    assert!(!nav.is_busy());

    let pages: Vec<u32> = service.calls().iter().map(|r| r.page).collect();
    assert_eq!(pages, vec![1, 4]);
}

#[tokio::test]
async fn view_converges_to_latest_page_and_zoom() {
    let service = Arc::new(GatedService::new(5));
    let (mut nav, in_flight) = open(&service).await;

    nav.go_to_page(3);
    nav.zoom_in(1);
    nav.prompt_go_to_page("nope");
    nav.go_to_page(2);

    let mut next = complete(&service, &mut nav, in_flight).await;
    while let Some(handle) = next {
        next = complete(&service, &mut nav, handle).await;
    }

    let calls = service.calls();
    assert_eq!(calls.len(), 2);
    let last = calls[1];
    assert_eq!(last.page, 2);
    assert!((last.scale - 1.1).abs() < 1e-4);
    assert_eq!(nav.scheduler().displayed(), Some(last));
}

#[tokio::test]
async fn failed_render_does_not_stall_navigation() {
    let service = Arc::new(GatedService::new(5).failing_on(2));
    let (mut nav, in_flight) = open(&service).await;
    assert!(complete(&service, &mut nav, in_flight).await.is_none());

    let handle = start(&service, nav.next_page().unwrap());
    assert_eq!(nav.next_page(), None);

    let follow_up = complete(&service, &mut nav, handle).await.unwrap();
    assert!(matches!(
        nav.last_error(),
        Some(ViewerError::Render { page: 2, .. })
    ));

    assert!(complete(&service, &mut nav, follow_up).await.is_none());
    assert_eq!(nav.last_error(), None);
    assert_eq!(service.drawn_page(), Some(3));

    let stats = nav.scheduler().stats();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.completed, 2);
    // No retry of page 2
    let pages: Vec<u32> = service.calls().iter().map(|r| r.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[tokio::test]
async fn last_page_ignores_further_next() {
    let service = Arc::new(GatedService::new(3));
    let (mut nav, in_flight) = open(&service).await;
    assert!(complete(&service, &mut nav, in_flight).await.is_none());

    let handle = start(&service, nav.last_page().unwrap());
    assert!(complete(&service, &mut nav, handle).await.is_none());

    assert_eq!(nav.next_page(), None);
    assert_eq!(nav.state().current_page, 3);
    assert_eq!(service.calls().len(), 2);
}
