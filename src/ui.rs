//! iced host adapter: render thread wiring and the two view modes

use std::collections::HashMap;
use std::process;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use iced::keyboard::{self, Modifiers};
use iced::widget::{column, container, image, scrollable, text};
use iced::{Element, Event, Length, Subscription, Task, time};
use log::{error, warn};

use crate::cache::{Surface, SurfaceCache};
use crate::document::Document;
use crate::error::ViewerError;
use crate::input::{InputMode, KeyHandler, NavigationAction};
use crate::nav::NavController;
use crate::render::Transform;

const MIN_ZOOM: f32 = 0.125;
const MAX_ZOOM: f32 = 8.0;
const ZOOM_STEP: f32 = 1.25;

/// How pages are presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// One page at a time, driven by page jumps.
    PageJump,
    /// All pages stacked in index order behind a scrollbar.
    ContinuousScroll,
}

impl ViewMode {
    fn toggled(self) -> Self {
        match self {
            Self::PageJump => Self::ContinuousScroll,
            Self::ContinuousScroll => Self::PageJump,
        }
    }
}

/// Configuration for the viewer window and engine.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub initial_window_width: f32,
    pub initial_window_height: f32,
    pub initial_mode: ViewMode,
    pub initial_zoom: f32,
    pub half_page_step: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_window_width: 800.0,
            initial_window_height: 700.0,
            initial_mode: ViewMode::PageJump,
            initial_zoom: 1.0,
            half_page_step: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    EventOccurred(Event),
    Scrolled(f32),
}

enum EngineCommand {
    GoTo(usize),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    Step(isize),
    JumpEntry(String),
    SetZoom(f32),
    RenderAll,
    NoteScroll(f32),
}

enum EngineEvent {
    Opened {
        page_count: usize,
    },
    Frame {
        index: usize,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
    Current {
        index: usize,
    },
    Notice(String),
    Fatal(String),
}

/// Main viewer application
pub struct ViewerApp {
    _file_name: String,
    page_count: usize,
    current_index: Option<usize>,
    mode: ViewMode,
    zoom: f32,
    frames: HashMap<usize, image::Handle>,
    notice: Option<String>,
    fatal: Option<String>,
    command_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    key_handler: KeyHandler,
    config: ViewerConfig,
}

impl ViewerApp {
    /// Create a viewer for the given PDF file with default configuration.
    pub fn new(file_name: String) -> (Self, Task<Message>) {
        Self::with_config(file_name, ViewerConfig::default())
    }

    /// Create a viewer with custom configuration.
    pub fn with_config(file_name: String, config: ViewerConfig) -> (Self, Task<Message>) {
        let (command_tx, command_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();

        // The engine thread owns the document, cache, and controller; the
        // UI only mirrors what the controller reports.
        let thread_file = file_name.clone();
        let zoom = config.initial_zoom;
        thread::spawn(move || {
            engine_thread(&thread_file, zoom, &command_rx, &event_tx);
        });

        let initial = match config.initial_mode {
            ViewMode::PageJump => EngineCommand::GoTo(0),
            ViewMode::ContinuousScroll => EngineCommand::RenderAll,
        };
        let _ = command_tx.send(initial);

        let mode = config.initial_mode;
        (
            Self {
                _file_name: file_name,
                page_count: 0,
                current_index: None,
                mode,
                zoom,
                frames: HashMap::new(),
                notice: None,
                fatal: None,
                command_tx,
                event_rx: Arc::new(Mutex::new(event_rx)),
                key_handler: KeyHandler::new(),
                config,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => self.handle_tick(),
            Message::EventOccurred(event) => {
                if let Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) = event {
                    self.handle_key_press(&key, modifiers);
                }
                Task::none()
            }
            Message::Scrolled(fraction) => {
                let _ = self.command_tx.send(EngineCommand::NoteScroll(fraction));
                Task::none()
            }
        }
    }

    fn handle_tick(&mut self) -> Task<Message> {
        let Ok(rx) = self.event_rx.lock() else {
            return Task::none();
        };
        while let Ok(event) = rx.try_recv() {
            match event {
                EngineEvent::Opened { page_count } => {
                    self.page_count = page_count;
                }
                EngineEvent::Frame {
                    index,
                    width,
                    height,
                    rgba,
                } => {
                    self.frames
                        .insert(index, image::Handle::from_rgba(width, height, rgba));
                }
                EngineEvent::Current { index } => {
                    self.current_index = Some(index);
                    self.notice = None;
                }
                EngineEvent::Notice(notice) => {
                    self.notice = Some(notice);
                }
                EngineEvent::Fatal(detail) => {
                    self.fatal = Some(detail);
                }
            }
        }
        Task::none()
    }

    fn handle_key_press(&mut self, key: &iced::keyboard::Key, _modifiers: Modifiers) {
        let action = self.key_handler.handle_key(key);
        let step = self.config.half_page_step as isize;

        let command = match action {
            NavigationAction::NextPage => Some(EngineCommand::NextPage),
            NavigationAction::PrevPage => Some(EngineCommand::PrevPage),
            NavigationAction::FirstPage => Some(EngineCommand::FirstPage),
            NavigationAction::LastPage => Some(EngineCommand::LastPage),
            NavigationAction::HalfPageDown => Some(EngineCommand::Step(step)),
            NavigationAction::HalfPageUp => Some(EngineCommand::Step(-step)),
            NavigationAction::JumpToEntry(entry) => Some(EngineCommand::JumpEntry(entry)),
            NavigationAction::ToggleViewMode => {
                self.toggle_view_mode();
                None
            }
            NavigationAction::ZoomIn => {
                self.set_zoom((self.zoom * ZOOM_STEP).min(MAX_ZOOM));
                None
            }
            NavigationAction::ZoomOut => {
                self.set_zoom((self.zoom / ZOOM_STEP).max(MIN_ZOOM));
                None
            }
            NavigationAction::Quit => {
                process::exit(0);
            }
            NavigationAction::EnterCommandMode | NavigationAction::None => None,
        };

        if let Some(command) = command {
            let _ = self.command_tx.send(command);
        }
    }

    fn toggle_view_mode(&mut self) {
        self.mode = self.mode.toggled();
        match self.mode {
            ViewMode::ContinuousScroll => {
                let _ = self.command_tx.send(EngineCommand::RenderAll);
            }
            ViewMode::PageJump => {
                let index = self.current_index.unwrap_or(0);
                let _ = self.command_tx.send(EngineCommand::GoTo(index));
            }
        }
    }

    fn set_zoom(&mut self, zoom: f32) {
        if (zoom - self.zoom).abs() < f32::EPSILON {
            return;
        }
        self.zoom = zoom;
        // Every cached frame is stale at the new scale.
        self.frames.clear();
        let _ = self.command_tx.send(EngineCommand::SetZoom(zoom));
        if self.mode == ViewMode::ContinuousScroll {
            let _ = self.command_tx.send(EngineCommand::RenderAll);
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        if let Some(detail) = &self.fatal {
            return container(text(detail.clone()).size(20).color(iced::Color::WHITE))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Color::BLACK.into()),
                ..container::Style::default()
            })
            .into();
        }

        let page_area = match self.mode {
            ViewMode::PageJump => self.view_single_page(),
            ViewMode::ContinuousScroll => self.view_page_column(),
        };

        column![page_area, self.view_status_bar()].into()
    }

    fn view_single_page(&self) -> Element<'_, Message> {
        let current = self.current_index.and_then(|index| self.frames.get(&index));

        let content: Element<'_, Message> = if let Some(handle) = current {
            image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(iced::ContentFit::Contain)
                .into()
        } else {
            text("Loading...").size(20).color(iced::Color::WHITE).into()
        };

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

    fn view_page_column(&self) -> Element<'_, Message> {
        let mut pages = column![].spacing(4);
        for index in 0..self.page_count {
            let page: Element<'_, Message> = if let Some(handle) = self.frames.get(&index) {
                image(handle.clone())
                    .width(Length::Fill)
                    .content_fit(iced::ContentFit::Contain)
                    .into()
            } else {
                text(format!("Rendering page {}...", index + 1))
                    .size(16)
                    .color(iced::Color::WHITE)
                    .into()
            };
            pages = pages.push(page);
        }

        container(
            scrollable(pages)
                .width(Length::Fill)
                .height(Length::Fill)
                .on_scroll(|viewport| Message::Scrolled(viewport.relative_offset().y)),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(iced::Color::BLACK.into()),
            ..container::Style::default()
        })
        .into()
    }

    fn view_status_bar(&self) -> Element<'_, Message> {
        let position = match self.current_index {
            Some(index) => format!("Page {} / {}", index + 1, self.page_count),
            None => format!("{} pages", self.page_count),
        };

        let status_text = match self.key_handler.mode() {
            InputMode::Command => format!(":{}", self.key_handler.command_buffer()),
            InputMode::Normal => {
                let buffer = self.key_handler.command_buffer();
                let mut line = position;
                if !buffer.is_empty() {
                    line = format!("{line} | {buffer}");
                }
                if let Some(notice) = &self.notice {
                    line = format!("{line} | {notice}");
                }
                line
            }
        };

        let mode_indicator = match (self.key_handler.mode(), self.mode) {
            (InputMode::Command, _) => "-- COMMAND --",
            (InputMode::Normal, ViewMode::PageJump) => "-- PAGE --",
            (InputMode::Normal, ViewMode::ContinuousScroll) => "-- SCROLL --",
        };

        container(
            column![
                text(mode_indicator)
                    .size(12)
                    .color(iced::Color::from_rgb8(100, 200, 100)),
                text(status_text).size(14).color(iced::Color::WHITE),
            ],
        )
        .width(Length::Fill)
        .padding(5)
        .style(|_theme| container::Style {
            background: Some(iced::Color::from_rgb8(30, 30, 30).into()),
            ..container::Style::default()
        })
        .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let keyboard_sub =
            keyboard::listen().map(|event| Message::EventOccurred(Event::Keyboard(event)));

        let ticker = time::every(Duration::from_millis(50)).map(|_| Message::Tick);

        Subscription::batch(vec![keyboard_sub, ticker])
    }
}

/// Runs on a dedicated thread; owns the document, cache, and controller and
/// services navigation commands one at a time.
fn engine_thread(
    file_name: &str,
    initial_zoom: f32,
    commands: &mpsc::Receiver<EngineCommand>,
    events: &mpsc::Sender<EngineEvent>,
) {
    let document = match Document::open(file_name) {
        Ok(document) => document,
        Err(err) => {
            error!("{err}");
            let _ = events.send(EngineEvent::Fatal(err.to_string()));
            return;
        }
    };

    let cache = match Transform::uniform(initial_zoom)
        .and_then(|transform| SurfaceCache::with_transform(document, transform))
    {
        Ok(cache) => Arc::new(cache),
        Err(err) => {
            error!("{err}");
            let _ = events.send(EngineEvent::Fatal(err.to_string()));
            return;
        }
    };

    let mut nav = NavController::new(cache);
    let _ = events.send(EngineEvent::Opened {
        page_count: nav.page_count(),
    });

    while let Ok(command) = commands.recv() {
        match command {
            EngineCommand::GoTo(index) => deliver(events, nav.go_to(index).map(Some)),
            EngineCommand::NextPage => deliver(events, nav.next_page().map(Some)),
            EngineCommand::PrevPage => deliver(events, nav.previous_page().map(Some)),
            EngineCommand::FirstPage => deliver(events, nav.first_page().map(Some)),
            EngineCommand::LastPage => deliver(events, nav.last_page().map(Some)),
            EngineCommand::Step(delta) => {
                let current = nav.current_index().unwrap_or(0);
                let last = nav.page_count().saturating_sub(1);
                let target = current.saturating_add_signed(delta).min(last);
                deliver(events, nav.go_to(target).map(Some));
            }
            EngineCommand::JumpEntry(entry) => deliver(events, nav.jump_to_entry(&entry).map(Some)),
            EngineCommand::SetZoom(zoom) => {
                let result =
                    Transform::uniform(zoom).and_then(|transform| nav.set_transform(transform));
                deliver(events, result);
            }
            EngineCommand::RenderAll => match nav.surfaces_in_order() {
                Ok(surfaces) => {
                    for surface in &surfaces {
                        send_frame(events, surface);
                    }
                    if let Some(index) = nav.current_index() {
                        let _ = events.send(EngineEvent::Current { index });
                    }
                }
                Err(err) => deliver(events, Err(err)),
            },
            EngineCommand::NoteScroll(fraction) => {
                nav.note_scroll_offset(fraction);
                if let Some(index) = nav.current_index() {
                    let _ = events.send(EngineEvent::Current { index });
                }
            }
        }
    }

    // The UI dropped its sender; the session is over, release the document.
    nav.cache().source().close();
}

fn deliver(
    events: &mpsc::Sender<EngineEvent>,
    result: Result<Option<Arc<Surface>>, ViewerError>,
) {
    match result {
        Ok(Some(surface)) => {
            send_frame(events, &surface);
            let _ = events.send(EngineEvent::Current {
                index: surface.index(),
            });
        }
        Ok(None) => {}
        // Page-local rejections show as a status-bar notice; anything else
        // ends the session for this document.
        Err(err) if err.is_page_local() => {
            warn!("navigation rejected: {err}");
            let _ = events.send(EngineEvent::Notice(err.to_string()));
        }
        Err(err) => {
            error!("session failed: {err}");
            let _ = events.send(EngineEvent::Fatal(err.to_string()));
        }
    }
}

fn send_frame(events: &mpsc::Sender<EngineEvent>, surface: &Surface) {
    let _ = events.send(EngineEvent::Frame {
        index: surface.index(),
        width: surface.width(),
        height: surface.height(),
        rgba: surface.rgba_pixels(),
    });
}
