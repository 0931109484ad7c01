use std::{future::Future, time::Duration};

use futures::{stream::BoxStream, StreamExt};

use crate::{
    api::ApiClient,
    domain::{AppError, DownloadJob, DownloadPhase, JobStatus, ValidationError},
};

/// The two calls a download attempt needs from the backend.
pub trait DownloadBackend: Clone + Send + Sync + 'static {
    fn start_download(
        &self,
        video_url: &str,
        resolution: &str,
    ) -> impl Future<Output = Result<String, AppError>> + Send;

    fn poll_once(&self, job_id: &str) -> impl Future<Output = Result<DownloadJob, AppError>> + Send;
}

impl DownloadBackend for ApiClient {
    async fn start_download(&self, video_url: &str, resolution: &str) -> Result<String, AppError> {
        ApiClient::start_download(self, video_url, resolution)
            .await
            .map_err(AppError::from)
    }

    async fn poll_once(&self, job_id: &str) -> Result<DownloadJob, AppError> {
        let status = self.status(job_id).await?;
        Ok(status.into_job(job_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// The backend accepted the job; polling begins.
    Started { job_id: String },
    /// One poll tick, emitted whether or not anything changed.
    Progress(DownloadJob),
    Finished { file: String },
    Failed(AppError),
}

impl DownloadEvent {
    /// Phase the attempt is in once this event has been observed.
    pub fn phase(&self) -> DownloadPhase {
        match self {
            DownloadEvent::Started { .. } | DownloadEvent::Progress(_) => DownloadPhase::Polling,
            DownloadEvent::Finished { .. } => DownloadPhase::Finished,
            DownloadEvent::Failed(_) => DownloadPhase::Failed,
        }
    }
}

#[derive(Clone)]
pub struct DownloadOrchestrator<B> {
    backend: B,
    poll_interval: Duration,
}

impl<B: DownloadBackend> DownloadOrchestrator<B> {
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
        }
    }

    pub fn validate(video_url: &str, resolution: Option<&str>) -> Result<(), ValidationError> {
        if video_url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        match resolution {
            Some(res) if !res.is_empty() => Ok(()),
            _ => Err(ValidationError::NoResolution),
        }
    }

    /// Drives one attempt: validate, start the job, then poll every `poll_interval`
    /// until the job reports `finished`/`error` or a status call fails.
    ///
    /// The stream ends after exactly one `Finished` or `Failed` event. Dropping it
    /// stops polling at the next suspension point.
    pub fn run(&self, video_url: String, resolution: Option<String>) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            RunState::Starting {
                backend: self.backend.clone(),
                interval: self.poll_interval,
                video_url,
                resolution,
            },
            |state| async move {
                match state {
                    RunState::Starting {
                        backend,
                        interval,
                        video_url,
                        resolution,
                    } => {
                        if let Err(e) = Self::validate(&video_url, resolution.as_deref()) {
                            tracing::debug!(error = %e, "download rejected before contacting backend");
                            return Some((DownloadEvent::Failed(e.into()), RunState::Done));
                        }
                        let resolution = resolution.unwrap_or_default();

                        tracing::info!(url = %video_url, %resolution, "starting download");
                        match backend.start_download(&video_url, &resolution).await {
                            Ok(job_id) => {
                                tracing::info!(%job_id, "download job started");
                                Some((
                                    DownloadEvent::Started {
                                        job_id: job_id.clone(),
                                    },
                                    RunState::Polling {
                                        backend,
                                        interval,
                                        job_id,
                                    },
                                ))
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "download start failed");
                                Some((DownloadEvent::Failed(e), RunState::Done))
                            }
                        }
                    }
                    RunState::Polling {
                        backend,
                        interval,
                        job_id,
                    } => {
                        tokio::time::sleep(interval).await;

                        match backend.poll_once(&job_id).await {
                            Ok(job) => {
                                tracing::debug!(
                                    %job_id,
                                    status = ?job.status,
                                    percent = job.percent,
                                    "poll tick"
                                );
                                let next = match terminal_event(&job) {
                                    Some(event) => RunState::Reporting(event),
                                    None => RunState::Polling {
                                        backend,
                                        interval,
                                        job_id,
                                    },
                                };
                                Some((DownloadEvent::Progress(job), next))
                            }
                            Err(e) => {
                                tracing::warn!(%job_id, error = %e, "status request failed");
                                Some((DownloadEvent::Failed(e), RunState::Done))
                            }
                        }
                    }
                    RunState::Reporting(event) => {
                        match &event {
                            DownloadEvent::Finished { file } => {
                                tracing::info!(%file, "download finished")
                            }
                            DownloadEvent::Failed(e) => tracing::warn!(error = %e, "download job failed"),
                            _ => {}
                        }
                        Some((event, RunState::Done))
                    }
                    RunState::Done => None,
                }
            },
        )
        .boxed()
    }
}

fn terminal_event(job: &DownloadJob) -> Option<DownloadEvent> {
    match job.status {
        JobStatus::Pending => None,
        JobStatus::Finished => Some(DownloadEvent::Finished {
            file: job.result_file.clone().unwrap_or_default(),
        }),
        JobStatus::Error => Some(DownloadEvent::Failed(AppError::Job(
            job.message.clone().unwrap_or_default(),
        ))),
    }
}

enum RunState<B> {
    Starting {
        backend: B,
        interval: Duration,
        video_url: String,
        resolution: Option<String>,
    },
    Polling {
        backend: B,
        interval: Duration,
        job_id: String,
    },
    Reporting(DownloadEvent),
    Done,
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        collections::VecDeque,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };

    use super::*;

    /// Replays canned responses and counts calls.
    #[derive(Clone, Default)]
    pub struct ScriptedBackend {
        start: Arc<Mutex<Option<Result<String, AppError>>>>,
        polls: Arc<Mutex<VecDeque<Result<DownloadJob, AppError>>>>,
        pub start_calls: Arc<AtomicUsize>,
        pub poll_calls: Arc<AtomicUsize>,
        pub last_request: Arc<Mutex<Option<(String, String)>>>,
    }

    impl ScriptedBackend {
        pub fn new(start: Result<String, AppError>) -> Self {
            let backend = Self::default();
            *backend.start.lock().unwrap() = Some(start);
            backend
        }

        pub fn then_poll(self, response: Result<DownloadJob, AppError>) -> Self {
            self.polls.lock().unwrap().push_back(response);
            self
        }

        pub fn starts(&self) -> usize {
            self.start_calls.load(Ordering::SeqCst)
        }

        pub fn polls(&self) -> usize {
            self.poll_calls.load(Ordering::SeqCst)
        }
    }

    pub fn job(id: &str, status: JobStatus, percent: i64, message: Option<&str>, file: Option<&str>) -> DownloadJob {
        DownloadJob {
            id: id.to_string(),
            status,
            percent,
            message: message.map(str::to_string),
            result_file: file.map(str::to_string),
        }
    }

    impl DownloadBackend for ScriptedBackend {
        async fn start_download(&self, video_url: &str, resolution: &str) -> Result<String, AppError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((video_url.to_string(), resolution.to_string()));
            self.start
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(AppError::Request("unexpected start".to_string())))
        }

        async fn poll_once(&self, _job_id: &str) -> Result<DownloadJob, AppError> {
            self.poll_calls.fetch_add(1, Ordering::SeqCst);
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Request("script exhausted".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{job, ScriptedBackend};
    use super::*;

    fn orchestrator(backend: &ScriptedBackend) -> DownloadOrchestrator<ScriptedBackend> {
        DownloadOrchestrator::new(backend.clone(), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_missing_resolution_never_hits_backend() {
        let backend = ScriptedBackend::new(Ok("abc".to_string()));
        let events: Vec<_> = orchestrator(&backend)
            .run("https://example.com/v".to_string(), None)
            .collect()
            .await;

        assert_eq!(
            events,
            vec![DownloadEvent::Failed(AppError::Validation(ValidationError::NoResolution))]
        );
        assert_eq!(backend.starts(), 0);
        assert_eq!(backend.polls(), 0);
    }

    #[tokio::test]
    async fn test_blank_url_never_hits_backend() {
        let backend = ScriptedBackend::new(Ok("abc".to_string()));
        let events: Vec<_> = orchestrator(&backend)
            .run("   ".to_string(), Some("720p".to_string()))
            .collect()
            .await;

        assert_eq!(
            events,
            vec![DownloadEvent::Failed(AppError::Validation(ValidationError::EmptyUrl))]
        );
        assert_eq!(backend.starts(), 0);
    }

    #[tokio::test]
    async fn test_polls_until_finished() {
        let backend = ScriptedBackend::new(Ok("abc".to_string()))
            .then_poll(Ok(job("abc", JobStatus::Pending, 40, Some("Downloading video..."), None)))
            .then_poll(Ok(job("abc", JobStatus::Finished, 100, None, Some("x.mp4"))))
            .then_poll(Ok(job("abc", JobStatus::Pending, 0, None, None)));

        let events: Vec<_> = orchestrator(&backend)
            .run("https://example.com/v".to_string(), Some("1080p".to_string()))
            .collect()
            .await;

        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            DownloadEvent::Started {
                job_id: "abc".to_string()
            }
        );
        assert!(matches!(&events[1], DownloadEvent::Progress(j) if j.percent == 40));
        assert!(matches!(&events[2], DownloadEvent::Progress(j) if j.status == JobStatus::Finished));
        assert_eq!(
            events[3],
            DownloadEvent::Finished {
                file: "x.mp4".to_string()
            }
        );
        // terminal state stops polling; the third scripted response is never read
        assert_eq!(backend.polls(), 2);
        assert_eq!(
            backend.last_request.lock().unwrap().clone(),
            Some(("https://example.com/v".to_string(), "1080p".to_string()))
        );
    }

    #[tokio::test]
    async fn test_job_error_carries_message() {
        let backend = ScriptedBackend::new(Ok("abc".to_string()))
            .then_poll(Ok(job("abc", JobStatus::Error, 10, Some("boom"), None)));

        let events: Vec<_> = orchestrator(&backend)
            .run("https://example.com/v".to_string(), Some("720p".to_string()))
            .collect()
            .await;

        let last = events.last().unwrap();
        assert_eq!(last, &DownloadEvent::Failed(AppError::Job("boom".to_string())));
        assert_eq!(last.phase(), DownloadPhase::Failed);
    }

    #[tokio::test]
    async fn test_start_failure_skips_polling() {
        let backend = ScriptedBackend::new(Err(AppError::Request("missing url or resolution".to_string())));

        let events: Vec<_> = orchestrator(&backend)
            .run("https://example.com/v".to_string(), Some("720p".to_string()))
            .collect()
            .await;

        assert_eq!(
            events,
            vec![DownloadEvent::Failed(AppError::Request(
                "missing url or resolution".to_string()
            ))]
        );
        assert_eq!(backend.polls(), 0);
    }

    #[tokio::test]
    async fn test_status_failure_ends_loop() {
        let backend = ScriptedBackend::new(Ok("abc".to_string()))
            .then_poll(Ok(job("abc", JobStatus::Pending, 5, None, None)))
            .then_poll(Err(AppError::Request("not found".to_string())))
            .then_poll(Ok(job("abc", JobStatus::Finished, 100, None, Some("late.mp4"))));

        let events: Vec<_> = orchestrator(&backend)
            .run("https://example.com/v".to_string(), Some("720p".to_string()))
            .collect()
            .await;

        assert_eq!(
            events.last(),
            Some(&DownloadEvent::Failed(AppError::Request("not found".to_string())))
        );
        assert_eq!(backend.polls(), 2);
    }
}
