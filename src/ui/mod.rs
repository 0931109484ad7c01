pub mod resolution_selector;
pub mod selector_view;

use iced::{
    widget::{button, column, image, progress_bar, row, scrollable, stack, text, text_input, Space},
    Element, Length, Rectangle, Size,
};

use crate::{
    application::DownloadEvent,
    domain::{AppError, DownloadPhase, VideoMetadata},
};
use resolution_selector::{ResolutionSelector, SelectorEvent};
use selector_view::SelectorView;

pub const FETCH_LABEL: &str = "Get Resolutions";
pub const FETCH_BUSY_LABEL: &str = "Loading...";
pub const DOWNLOAD_LABEL: &str = "Download";
pub const DOWNLOAD_BUSY_LABEL: &str = "Downloading...";

const PAGE_PADDING: f32 = 20.0;
const SPACING: f32 = 10.0;
const TRIGGER_WIDTH: f32 = 280.0;

/// First guess at the trigger's bounds, used until the laid-out bounds come back
/// from [`selector_view::measure_trigger`].
const TRIGGER_ANCHOR: Rectangle = Rectangle {
    x: PAGE_PADDING,
    y: PAGE_PADDING + 36.0 + SPACING + 40.0 + SPACING,
    width: TRIGGER_WIDTH,
    height: 40.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub label: &'static str,
    pub enabled: bool,
}

impl ButtonState {
    fn new(label: &'static str, enabled: bool) -> Self {
        Self { label, enabled }
    }

    fn busy(label: &'static str) -> Self {
        Self {
            label,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressView {
    pub visible: bool,
    pub percent: i64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum PageMessage {
    UrlChanged(String),
    FetchPressed,
    DownloadPressed,
    TriggerPressed,
    OptionPicked(usize),
    /// Press inside the open list that hit no option row.
    DropdownPressed,
    PageScrolled(f32),
}

/// Page-level state: URL input, the two buttons, status line, metadata card,
/// resolution dropdown and progress view.
pub struct PageController {
    pub url_input: String,
    pub fetch_button: ButtonState,
    pub download_button: ButtonState,
    pub status: String,
    pub metadata: Option<VideoMetadata>,
    pub thumbnail: Option<image::Handle>,
    pub progress: ProgressView,
    pub phase: DownloadPhase,
    selector: ResolutionSelector<SelectorView>,
    viewport: Size,
    scroll_offset: f32,
    /// Last measured trigger bounds and the scroll offset they were taken at.
    measured_trigger: Option<(Rectangle, f32)>,
}

impl PageController {
    pub fn new(viewport: Size) -> Self {
        Self {
            url_input: String::new(),
            fetch_button: ButtonState::new(FETCH_LABEL, true),
            download_button: ButtonState::new(DOWNLOAD_LABEL, false),
            status: String::new(),
            metadata: None,
            thumbnail: None,
            progress: ProgressView::default(),
            phase: DownloadPhase::Idle,
            selector: ResolutionSelector::new(SelectorView::default(), TRIGGER_ANCHOR, viewport),
            viewport,
            scroll_offset: 0.0,
            measured_trigger: None,
        }
    }

    pub fn selector(&self) -> &ResolutionSelector<SelectorView> {
        &self.selector
    }

    /// Local state changes for every page message. Fetch and download requests
    /// are started by the caller afterwards.
    pub fn update(&mut self, message: PageMessage) {
        match message {
            PageMessage::UrlChanged(url) => {
                self.outside_click();
                self.url_input = url;
            }
            PageMessage::FetchPressed | PageMessage::DownloadPressed => self.outside_click(),
            PageMessage::TriggerPressed => self.selector.toggle(),
            PageMessage::OptionPicked(index) => {
                self.selector.dispatch(SelectorEvent::OptionClicked(index))
            }
            PageMessage::DropdownPressed => {}
            PageMessage::PageScrolled(offset) => {
                self.scroll_offset = offset;
                let trigger = self.trigger_bounds();
                self.selector.dispatch(SelectorEvent::Scrolled { trigger });
            }
        }
    }

    /// The open list needs fresh trigger bounds after opening, resizing or scrolling.
    pub fn wants_trigger_bounds(&self) -> bool {
        self.selector.is_open()
    }

    pub fn set_trigger_bounds(&mut self, bounds: Rectangle) {
        self.measured_trigger = Some((bounds, self.scroll_offset));
        self.selector.dispatch(SelectorEvent::TriggerMoved(bounds));
    }

    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        let trigger = self.trigger_bounds();
        self.selector
            .dispatch(SelectorEvent::Resized { viewport, trigger });
    }

    pub fn outside_click(&mut self) {
        if self.selector.is_open() {
            self.selector.dispatch(SelectorEvent::OutsideClicked);
        }
    }

    fn trigger_bounds(&self) -> Rectangle {
        let (bounds, taken_at) = self.measured_trigger.unwrap_or((TRIGGER_ANCHOR, 0.0));
        Rectangle {
            y: bounds.y + taken_at - self.scroll_offset,
            ..bounds
        }
    }

    /// Returns the trimmed URL to look up, or `None` when there is nothing to do.
    pub fn begin_fetch(&mut self) -> Option<String> {
        let url = self.url_input.trim();
        if url.is_empty() || !self.fetch_button.enabled {
            return None;
        }
        let url = url.to_string();

        self.fetch_button = ButtonState::busy(FETCH_BUSY_LABEL);
        self.status.clear();
        Some(url)
    }

    pub fn finish_fetch(&mut self, result: Result<VideoMetadata, AppError>) {
        match result {
            Ok(metadata) => {
                self.selector.populate(metadata.resolutions.clone());
                self.metadata = Some(metadata);
                self.thumbnail = None;
                if !self.phase.is_active() {
                    self.download_button = ButtonState::new(DOWNLOAD_LABEL, true);
                }
            }
            Err(e) => self.status = format!("Error: {}", e),
        }
        self.fetch_button = ButtonState::new(FETCH_LABEL, true);
    }

    pub fn set_thumbnail(&mut self, handle: image::Handle) {
        self.thumbnail = Some(handle);
    }

    /// Returns the URL and resolution to hand to the orchestrator, or `None` while an
    /// attempt is already in flight.
    pub fn begin_download(&mut self) -> Option<(String, Option<String>)> {
        if self.phase.is_active() {
            return None;
        }

        self.phase = DownloadPhase::Starting;
        self.download_button = ButtonState::busy(DOWNLOAD_BUSY_LABEL);
        self.status.clear();

        Some((
            self.url_input.trim().to_string(),
            self.selector.selected_value().map(str::to_string),
        ))
    }

    pub fn apply_download_event(&mut self, event: &DownloadEvent) {
        self.phase = event.phase();

        match event {
            DownloadEvent::Started { .. } => self.progress.visible = true,
            DownloadEvent::Progress(job) => {
                self.progress.percent = job.percent;
                self.progress.message = job.message.clone().unwrap_or_default();
            }
            DownloadEvent::Finished { file } => {
                self.status = format!("Done: {}", file);
                self.download_button = ButtonState::new(DOWNLOAD_LABEL, true);
            }
            DownloadEvent::Failed(e) => {
                self.status = format!("Error: {}", e);
                self.download_button = ButtonState::new(DOWNLOAD_LABEL, true);
            }
        }
    }

    pub fn view(&self) -> Element<'_, PageMessage> {
        let fetch = button(text(self.fetch_button.label))
            .on_press_maybe(self.fetch_button.enabled.then_some(PageMessage::FetchPressed))
            .padding(10);

        let download = button(text(self.download_button.label))
            .on_press_maybe(
                self.download_button
                    .enabled
                    .then_some(PageMessage::DownloadPressed),
            )
            .padding(10);

        let mut controls = row![].spacing(SPACING);
        if self.selector.surface().is_visible() {
            controls = controls.push(
                self.selector
                    .surface()
                    .trigger(PageMessage::TriggerPressed, TRIGGER_WIDTH),
            );
        }
        controls = controls.push(download);

        let mut page = column![
            text("Video Downloader").size(28),
            row![
                text_input("Paste a video URL...", &self.url_input)
                    .on_input(PageMessage::UrlChanged)
                    .on_submit(PageMessage::FetchPressed)
                    .padding(10),
                fetch,
            ]
            .spacing(SPACING),
            controls,
        ]
        .spacing(SPACING)
        .padding(PAGE_PADDING);

        if let Some(metadata) = &self.metadata {
            page = page.push(self.metadata_card(metadata));
        }
        if self.progress.visible {
            page = page.push(self.progress_view());
        }
        page = page.push(text(&self.status).size(14));

        let page = scrollable(page)
            .on_scroll(|viewport| PageMessage::PageScrolled(viewport.absolute_offset().y))
            .width(Length::Fill)
            .height(Length::Fill);

        match self
            .selector
            .surface()
            .dropdown(PageMessage::OptionPicked, PageMessage::DropdownPressed)
        {
            Some(dropdown) => stack![page, dropdown].into(),
            None => page.into(),
        }
    }

    fn metadata_card<'a>(&'a self, metadata: &'a VideoMetadata) -> Element<'a, PageMessage> {
        let mut details = column![text(&metadata.title).size(18)].spacing(4);
        if let Some(author) = &metadata.author {
            details = details.push(text(format!("Channel: {}", author)).size(14));
        }
        if let Some(duration) = &metadata.duration_text {
            details = details.push(text(format!("Duration: {}", duration)).size(14));
        }

        let mut card = row![].spacing(SPACING);
        if let Some(handle) = &self.thumbnail {
            card = card.push(image(handle.clone()).width(Length::Fixed(160.0)));
        }
        card.push(details).into()
    }

    fn progress_view(&self) -> Element<'_, PageMessage> {
        column![
            progress_bar(0.0..=100.0, self.progress.percent as f32),
            row![
                text(format!("{}%", self.progress.percent)).size(14),
                Space::new().width(Length::Fixed(SPACING)),
                text(&self.progress.message).size(14),
            ],
        ]
        .spacing(4)
        .into()
    }
}
