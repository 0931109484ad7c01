use bytes::Bytes;
use futures::StreamExt;
use iced::{event, mouse, widget::image, window, Event, Rectangle, Size, Subscription, Task};

use crate::api::{ApiClient, ApiConfig};
use crate::application::{DownloadEvent, DownloadOrchestrator, MetadataFetcher};
use crate::domain::{AppError, VideoMetadata};
use crate::ui::{selector_view, PageController, PageMessage};

pub const WINDOW_SIZE: Size = Size {
    width: 760.0,
    height: 640.0,
};

pub struct DownloadApp {
    page: PageController,
    fetcher: MetadataFetcher,
    orchestrator: DownloadOrchestrator<ApiClient>,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new(ApiConfig::from_env())
    }
}

impl DownloadApp {
    pub fn new(config: ApiConfig) -> Self {
        tracing::info!(
            base_url = %config.base_url,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "backend configured"
        );

        let poll_interval = config.poll_interval;
        let api_client = ApiClient::new(config);

        Self {
            page: PageController::new(WINDOW_SIZE),
            fetcher: MetadataFetcher::new(api_client.clone()),
            orchestrator: DownloadOrchestrator::new(api_client, poll_interval),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(PageMessage),
    MetadataLoaded(Result<VideoMetadata, AppError>),
    ThumbnailLoaded(Result<Bytes, AppError>),
    /// One step of the running download attempt
    Download(DownloadEvent),
    WindowResized(Size),
    TriggerMeasured(Option<Rectangle>),
    /// Left click that no widget captured
    OutsideClicked,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            let follow_up = ui_msg.clone();
            app.page.update(ui_msg);

            match follow_up {
                PageMessage::FetchPressed => {
                    if let Some(url) = app.page.begin_fetch() {
                        let fetcher = app.fetcher.clone();
                        return Task::perform(
                            async move { fetcher.fetch_metadata(url).await },
                            Message::MetadataLoaded,
                        );
                    }
                }
                PageMessage::DownloadPressed => {
                    if let Some((url, resolution)) = app.page.begin_download() {
                        let events = app.orchestrator.run(url, resolution);
                        return Task::stream(events.map(Message::Download));
                    }
                }
                PageMessage::TriggerPressed | PageMessage::PageScrolled(_) => {
                    return measure_trigger(app);
                }
                _ => {}
            }
        }
        Message::MetadataLoaded(result) => {
            let thumbnail_url = result
                .as_ref()
                .ok()
                .and_then(|metadata| metadata.thumbnail_url.clone());
            app.page.finish_fetch(result);

            if let Some(thumbnail_url) = thumbnail_url {
                let fetcher = app.fetcher.clone();
                return Task::perform(
                    async move { fetcher.fetch_thumbnail(thumbnail_url).await },
                    Message::ThumbnailLoaded,
                );
            }
        }
        Message::ThumbnailLoaded(Ok(bytes)) => {
            app.page.set_thumbnail(image::Handle::from_bytes(bytes));
        }
        Message::ThumbnailLoaded(Err(e)) => {
            // the card renders fine without it
            tracing::warn!(error = %e, "thumbnail could not be loaded");
        }
        Message::Download(event) => app.page.apply_download_event(&event),
        Message::WindowResized(size) => {
            app.page.resize(size);
            return measure_trigger(app);
        }
        Message::TriggerMeasured(Some(bounds)) => app.page.set_trigger_bounds(bounds),
        Message::TriggerMeasured(None) => {}
        Message::OutsideClicked => app.page.outside_click(),
    }
    Task::none()
}

fn measure_trigger(app: &DownloadApp) -> Task<Message> {
    if app.page.wants_trigger_bounds() {
        selector_view::measure_trigger().map(Message::TriggerMeasured)
    } else {
        Task::none()
    }
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.page.view().map(Message::UiMessage)
}

pub fn subscription(_app: &DownloadApp) -> Subscription<Message> {
    event::listen_with(runtime_event)
}

fn runtime_event(event: Event, status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
        Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))
            if status == event::Status::Ignored =>
        {
            Some(Message::OutsideClicked)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResolutionOption;

    fn loaded_app() -> DownloadApp {
        let mut app = DownloadApp::new(ApiConfig::default());
        let metadata = VideoMetadata {
            title: "Clip".to_string(),
            author: None,
            thumbnail_url: None,
            duration_text: None,
            resolutions: ["480p", "720p"]
                .iter()
                .map(|l| ResolutionOption {
                    label: l.to_string(),
                    is_progressive: true,
                    is_video_only: false,
                })
                .collect(),
        };
        let _ = update(&mut app, Message::MetadataLoaded(Ok(metadata)));
        let _ = update(&mut app, Message::UiMessage(PageMessage::TriggerPressed));
        assert!(app.page.selector().is_open());
        app
    }

    fn left_press() -> Event {
        Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))
    }

    #[test]
    fn test_uncaptured_click_closes_list() {
        let mut app = loaded_app();
        let message = runtime_event(left_press(), event::Status::Ignored, window::Id::unique());
        assert!(matches!(message, Some(Message::OutsideClicked)));

        let _ = update(&mut app, message.unwrap());
        assert!(!app.page.selector().is_open());
    }

    #[test]
    fn test_clicking_page_controls_closes_list() {
        let mut app = loaded_app();
        let _ = update(
            &mut app,
            Message::UiMessage(PageMessage::UrlChanged("https://example.com/v".to_string())),
        );
        assert!(!app.page.selector().is_open());

        let _ = update(&mut app, Message::UiMessage(PageMessage::TriggerPressed));
        let _ = update(&mut app, Message::UiMessage(PageMessage::DownloadPressed));
        assert!(!app.page.selector().is_open());
        assert_eq!(app.page.download_button.label, crate::ui::DOWNLOAD_BUSY_LABEL);
    }

    #[test]
    fn test_press_on_list_panel_keeps_it_open() {
        let mut app = loaded_app();
        let _ = update(&mut app, Message::UiMessage(PageMessage::DropdownPressed));
        assert!(app.page.selector().is_open());

        let _ = update(&mut app, Message::UiMessage(PageMessage::OptionPicked(0)));
        assert!(!app.page.selector().is_open());
        assert_eq!(app.page.selector().selected_value(), Some("480p"));
    }

    #[test]
    fn test_measured_bounds_reach_selector() {
        let mut app = loaded_app();
        let bounds = Rectangle {
            x: 20.0,
            y: 120.0,
            width: 280.0,
            height: 41.0,
        };
        let _ = update(&mut app, Message::TriggerMeasured(Some(bounds)));
        let placement = app.page.selector().surface().placement().unwrap();
        assert_eq!(placement.top, 169.0);

        let _ = update(&mut app, Message::TriggerMeasured(None));
        assert_eq!(app.page.selector().surface().placement().unwrap().top, 169.0);
    }
}
