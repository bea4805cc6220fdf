//! UI components and viewer application

use std::sync::Arc;

use iced::keyboard::{self, Modifiers};
use iced::mouse::{self, ScrollDelta};
use iced::widget::{Row, button, column, container, image, scrollable, text};
use iced::{Element, Event, Length, Subscription, Task, event, window};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::input::{InputMode, KeyHandler, NavigationAction};
use crate::navigation::NavigationController;
use crate::pdf::PdfiumService;
use crate::scheduler::RenderRequest;
use crate::service::{DocumentInfo, RenderService, Surface};

/// Wheel distance in pixels that counts as one zoom tick
const PIXELS_PER_ZOOM_TICK: f32 = 50.0;

#[derive(Debug, Clone)]
pub enum Message {
    DocumentOpened(Result<DocumentInfo, ViewerError>),
    RenderFinished(RenderRequest, Result<(), ViewerError>),
    EventOccurred(Event),
    PrevPage,
    NextPage,
    OpenPrompt,
    ZoomIn,
    ZoomOut,
}

/// Main viewer application
pub struct ViewerApp {
    source: String,
    title: Option<String>,
    service: Arc<dyn RenderService>,
    surface: Surface,
    navigation: Option<NavigationController>,
    current_image: Option<image::Handle>,
    load_error: Option<ViewerError>,
    key_handler: KeyHandler,
    modifiers: Modifiers,
    config: ViewerConfig,
}

impl ViewerApp {
    /// Create a new viewer application for the given PDF file
    pub fn new(file_name: String) -> (Self, Task<Message>) {
        Self::with_config(file_name, ViewerConfig::default())
    }

    /// Create a new viewer with custom configuration
    pub fn with_config(file_name: String, config: ViewerConfig) -> (Self, Task<Message>) {
        let surface = Surface::new();
        let service = Arc::new(PdfiumService::spawn(
            surface.clone(),
            config.base_render_scale,
        ));
        Self::with_service(file_name, config, service, surface)
    }

    /// Create a viewer around any rendering service drawing to `surface`
    pub fn with_service(
        source: String,
        config: ViewerConfig,
        service: Arc<dyn RenderService>,
        surface: Surface,
    ) -> (Self, Task<Message>) {
        let open = {
            let service = service.clone();
            let source = source.clone();
            Task::perform(
                async move { service.open_document(&source).await },
                Message::DocumentOpened,
            )
        };

        (
            Self {
                source,
                title: None,
                service,
                surface,
                navigation: None,
                current_image: None,
                load_error: None,
                key_handler: KeyHandler::new(),
                modifiers: Modifiers::default(),
                config,
            },
            open,
        )
    }

    pub fn title(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} - pdfpager"),
            None => format!("{} - pdfpager", self.source),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::DocumentOpened(Ok(info)) => {
                match NavigationController::open(&info, self.config.zoom) {
                    Ok((navigation, first)) => {
                        self.title = info.title;
                        self.navigation = Some(navigation);
                        self.dispatch(Some(first))
                    }
                    Err(err) => self.fail_open(err),
                }
            }
            Message::DocumentOpened(Err(err)) => self.fail_open(err),
            Message::RenderFinished(request, outcome) => self.handle_render_finished(request, outcome),
            Message::EventOccurred(event) => self.handle_event(event),
            Message::PrevPage => self.apply(NavigationAction::PrevPage),
            Message::NextPage => self.apply(NavigationAction::NextPage),
            Message::OpenPrompt => {
                let action = self.key_handler.open_prompt();
                self.apply(action)
            }
            Message::ZoomIn => self.apply(NavigationAction::ZoomIn(1)),
            Message::ZoomOut => self.apply(NavigationAction::ZoomOut(1)),
        }
    }

    fn fail_open(&mut self, err: ViewerError) -> Task<Message> {
        tracing::error!(source = %self.source, error = %err, "could not open document");
        self.load_error = Some(err);
        Task::none()
    }

    fn handle_render_finished(
        &mut self,
        request: RenderRequest,
        outcome: Result<(), ViewerError>,
    ) -> Task<Message> {
        let Some(navigation) = self.navigation.as_mut() else {
            return Task::none();
        };

        if outcome.is_ok() {
            // Whatever the surface holds now is what gets shown, even if the
            // user has moved on since this render was started.
            if let Some(bitmap) = self.surface.snapshot() {
                self.current_image = Some(image::Handle::from_rgba(
                    bitmap.width,
                    bitmap.height,
                    bitmap.pixels,
                ));
            }
        }
        tracing::trace!(page = request.page, ok = outcome.is_ok(), "render finished");

        let next = navigation.on_render_finished(outcome);
        self.dispatch(next)
    }

    fn handle_event(&mut self, event: Event) -> Task<Message> {
        match event {
            Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => {
                let action = self.key_handler.handle_key(&key);
                self.apply(action)
            }
            Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                self.modifiers = modifiers;
                Task::none()
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) if self.modifiers.control() => {
                let y = match delta {
                    ScrollDelta::Lines { y, .. } => y,
                    ScrollDelta::Pixels { y, .. } => y / PIXELS_PER_ZOOM_TICK,
                };
                let ticks = y.abs().ceil().max(1.0) as u32;
                if y > 0.0 {
                    self.apply(NavigationAction::ZoomIn(ticks))
                } else if y < 0.0 {
                    self.apply(NavigationAction::ZoomOut(ticks))
                } else {
                    Task::none()
                }
            }
            _ => Task::none(),
        }
    }

    fn apply(&mut self, action: NavigationAction) -> Task<Message> {
        if action == NavigationAction::Quit {
            return iced::exit();
        }

        let Some(navigation) = self.navigation.as_mut() else {
            return Task::none();
        };

        let next = match action {
            NavigationAction::NextPage => navigation.next_page(),
            NavigationAction::PrevPage => navigation.prev_page(),
            NavigationAction::FirstPage => navigation.first_page(),
            NavigationAction::LastPage => navigation.last_page(),
            NavigationAction::ZoomIn(ticks) => navigation.zoom_in(ticks),
            NavigationAction::ZoomOut(ticks) => navigation.zoom_out(ticks),
            NavigationAction::SubmitPrompt(input) => navigation.prompt_go_to_page(&input),
            NavigationAction::OpenPrompt | NavigationAction::Quit | NavigationAction::None => None,
        };
        self.dispatch(next)
    }

    /// Start `next` on the rendering service, if there is one to start
    fn dispatch(&self, next: Option<RenderRequest>) -> Task<Message> {
        let Some(request) = next else {
            return Task::none();
        };

        let service = self.service.clone();
        Task::perform(
            async move { service.render_page(request).await },
            move |outcome| Message::RenderFinished(request, outcome),
        )
    }

    pub fn view(&self) -> Element<'_, Message> {
        let image_area: Element<'_, Message> = match (&self.current_image, &self.load_error) {
            (_, Some(err)) => centered(text(format!("Could not load PDF: {err}")).size(20)),
            (Some(handle), None) => scrollable(image(handle.clone()))
                .direction(scrollable::Direction::Both {
                    vertical: scrollable::Scrollbar::new(),
                    horizontal: scrollable::Scrollbar::new(),
                })
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            (None, None) => centered(text("Loading...").size(20).color(iced::Color::WHITE)),
        };

        let mut controls = Row::new().spacing(8);
        if let Some(navigation) = &self.navigation {
            if navigation.shows_pagination() {
                controls = controls
                    .push(button(text("Prev")).on_press(Message::PrevPage))
                    .push(button(text("Next")).on_press(Message::NextPage))
                    .push(button(text("Go")).on_press(Message::OpenPrompt));
            }
            controls = controls
                .push(button(text("-")).on_press(Message::ZoomOut))
                .push(button(text("+")).on_press(Message::ZoomIn));
        }

        let mode_indicator = match self.key_handler.mode() {
            InputMode::Normal => "-- NORMAL --",
            InputMode::Prompt => "-- GO TO PAGE --",
        };

        let status_text = match (self.key_handler.mode(), &self.navigation) {
            (InputMode::Prompt, _) => format!(":{}", self.key_handler.buffer()),
            (InputMode::Normal, Some(navigation)) => {
                let mut status = format!(
                    "Page {} / {} | {:.0}%",
                    navigation.page_label(),
                    navigation.state().total_pages,
                    navigation.state().scale * 100.0
                );
                if !self.key_handler.buffer().is_empty() {
                    status.push_str(&format!(" | {}", self.key_handler.buffer()));
                }
                if let Some(err) = navigation.last_error() {
                    status.push_str(&format!(" | {err}"));
                }
                status
            }
            (InputMode::Normal, None) => String::new(),
        };

        let status_bar = container(
            column![
                text(mode_indicator).size(12).color(iced::Color::from_rgb8(100, 200, 100)),
                text(status_text).size(14).color(iced::Color::WHITE),
                controls,
            ]
            .spacing(4),
        )
        .width(Length::Fill)
        .padding(5)
        .style(|_theme| container::Style {
            background: Some(iced::Color::from_rgb8(30, 30, 30).into()),
            ..container::Style::default()
        });

        column![image_area, status_bar].into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(forward_event)
    }
}

/// Forward uncaptured events, plus wheel events even when a widget captured
/// them: the page scrollable consumes the wheel once the page overflows, and
/// Ctrl+wheel zoom must still reach the viewer.
fn forward_event(event: Event, status: event::Status, _window: window::Id) -> Option<Message> {
    match (&event, status) {
        (Event::Mouse(mouse::Event::WheelScrolled { .. }), _) | (_, event::Status::Ignored) => {
            Some(Message::EventOccurred(event))
        }
        _ => None,
    }
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(iced::Color::BLACK.into()),
            ..container::Style::default()
        })
        .into()
}
