/// What the info endpoint told us about a video. Replaced wholesale on the next fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration_text: Option<String>,
    pub resolutions: Vec<ResolutionOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOption {
    /// Sent verbatim to the backend as the chosen resolution.
    pub label: String,
    pub is_progressive: bool,
    pub is_video_only: bool,
}

impl ResolutionOption {
    pub fn value(&self) -> &str {
        &self.label
    }

    /// Text shown in the dropdown and on its trigger.
    pub fn display_label(&self) -> String {
        if self.is_progressive {
            format!("{} (progressive)", self.label)
        } else if self.is_video_only {
            format!("{} (video-only)", self.label)
        } else {
            self.label.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Finished,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Error)
    }
}

/// Snapshot of a backend download job as of the latest poll.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    pub id: String,
    pub status: JobStatus,
    pub percent: i64,
    pub message: Option<String>,
    pub result_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadPhase {
    #[default]
    Idle,
    Starting,
    Polling,
    Finished,
    Failed,
}

impl DownloadPhase {
    /// A download attempt is in flight and another must not be started.
    pub fn is_active(self) -> bool {
        matches!(self, DownloadPhase::Starting | DownloadPhase::Polling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(label: &str, progressive: bool, video_only: bool) -> ResolutionOption {
        ResolutionOption {
            label: label.to_string(),
            is_progressive: progressive,
            is_video_only: video_only,
        }
    }

    #[test]
    fn test_display_label() {
        assert_eq!(option("720p", true, false).display_label(), "720p (progressive)");
        assert_eq!(option("1080p", false, true).display_label(), "1080p (video-only)");
        assert_eq!(option("144p", false, false).display_label(), "144p");
    }

    #[test]
    fn test_terminal_status() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(JobStatus::Finished.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn test_active_phases() {
        assert!(DownloadPhase::Starting.is_active());
        assert!(DownloadPhase::Polling.is_active());
        assert!(!DownloadPhase::Idle.is_active());
        assert!(!DownloadPhase::Finished.is_active());
        assert!(!DownloadPhase::Failed.is_active());
    }
}
