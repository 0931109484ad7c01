mod api;
mod app;
mod application;
mod domain;
mod logging;
mod ui;

use iced::window;

fn main() -> iced::Result {
    logging::init_logging();

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("Simple Video Downloader")
        .subscription(app::subscription)
        .window(window::Settings {
            size: app::WINDOW_SIZE,
            ..Default::default()
        })
        .run()
}
