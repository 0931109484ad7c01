pub mod download_orchestrator;
pub mod metadata_fetcher;

pub use download_orchestrator::{DownloadEvent, DownloadOrchestrator};
pub use metadata_fetcher::MetadataFetcher;
