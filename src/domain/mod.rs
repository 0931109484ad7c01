pub mod error;
pub mod model;

pub use error::{AppError, ValidationError};
pub use model::{DownloadJob, DownloadPhase, JobStatus, ResolutionOption, VideoMetadata};
