use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use tokio::{
    sync::{mpsc, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

use shared::{
    domain::{FactPayload, ImagePayload},
    error::ApiError,
};

pub mod bus;
pub mod http;
pub mod outcome;
mod state;

use bus::SignalBus;
use outcome::{FetchFault, Outcome};
use state::StateCells;
pub use state::CatSnapshot;

/// Remote source of cat facts.
#[async_trait]
pub trait FactSource: Send + Sync {
    async fn fetch_fact(&self) -> Outcome<FactPayload>;
}

/// Remote source of random cat images. The viewer consumes only the first
/// element of the returned sequence.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_random_images(&self) -> Outcome<Vec<ImagePayload>>;
}

pub struct MissingFactSource;

#[async_trait]
impl FactSource for MissingFactSource {
    async fn fetch_fact(&self) -> Outcome<FactPayload> {
        Outcome::TransportFault(FetchFault::Other {
            detail: "fact source is unavailable".to_string(),
        })
    }
}

pub struct MissingImageSource;

#[async_trait]
impl ImageSource for MissingImageSource {
    async fn fetch_random_images(&self) -> Outcome<Vec<ImagePayload>> {
        Outcome::TransportFault(FetchFault::Other {
            detail: "image source is unavailable".to_string(),
        })
    }
}

/// Crash-monitoring collaborator. Both calls are fire-and-forget: they must
/// return promptly and must not fail.
pub trait MonitoringSink: Send + Sync {
    fn report_domain_error(&self, error: &ApiError);
    fn report_warning(&self, fault: &FetchFault);
}

/// Default monitoring sink: records through `tracing`.
pub struct LogMonitor;

impl MonitoringSink for LogMonitor {
    fn report_domain_error(&self, error: &ApiError) {
        warn!(code = ?error.code, message = %error.message, "remote call returned an error payload");
    }

    fn report_warning(&self, fault: &FetchFault) {
        warn!(%fault, "fetch job aborted by transport fault");
    }
}

/// Lifecycle of one fetch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Running,
    Completed,
    Cancelled,
    Faulted,
}

/// Presentation orchestrator for the cat viewer.
///
/// Owns at most one fetch job at a time, the two state cells behind the
/// combined snapshot stream, and the two error-signal buses. The fetch
/// sequence is fact first, then image: a transport fault in the fact step
/// suppresses the image fetch entirely.
pub struct CatViewer {
    fact_source: Arc<dyn FactSource>,
    image_source: Arc<dyn ImageSource>,
    monitor: Arc<dyn MonitoringSink>,
    cells: StateCells,
    connectivity_errors: SignalBus<()>,
    error_messages: SignalBus<String>,
    job: Mutex<Option<JoinHandle<()>>>,
    phase: watch::Sender<Option<JobPhase>>,
    closed: AtomicBool,
}

impl CatViewer {
    pub fn new(
        fact_source: Arc<dyn FactSource>,
        image_source: Arc<dyn ImageSource>,
        monitor: Arc<dyn MonitoringSink>,
    ) -> Arc<Self> {
        let (phase, _) = watch::channel(None);
        Arc::new(Self {
            fact_source,
            image_source,
            monitor,
            cells: StateCells::new(),
            connectivity_errors: SignalBus::new(),
            error_messages: SignalBus::new(),
            job: Mutex::new(None),
            phase,
            closed: AtomicBool::new(false),
        })
    }

    /// Viewer with no remote sources attached; every fetch job faults with a
    /// descriptive message. Lets a host wire up observers before real
    /// sources exist.
    pub fn detached(monitor: Arc<dyn MonitoringSink>) -> Arc<Self> {
        Self::new(
            Arc::new(MissingFactSource),
            Arc::new(MissingImageSource),
            monitor,
        )
    }

    /// Starts a fresh fetch job, superseding any job still running. The
    /// superseded job is aborted and awaited before the new one spawns, so
    /// its writes can never interleave with the successor's. No-op once the
    /// viewer is shut down.
    pub async fn start_fetch(self: &Arc<Self>) {
        if self.closed.load(Ordering::SeqCst) {
            debug!("start_fetch ignored after shutdown");
            return;
        }

        let mut slot = self.job.lock().await;
        if let Some(previous) = slot.take() {
            Self::stop_job(previous, &self.phase).await;
        }

        self.phase.send_replace(Some(JobPhase::Running));
        debug!("fetch job started");
        let viewer = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            viewer.run_job().await;
        }));
    }

    /// Cancels the active job if any; without one this has no side effects.
    pub async fn cancel(&self) {
        let mut slot = self.job.lock().await;
        if let Some(job) = slot.take() {
            Self::stop_job(job, &self.phase).await;
        }
    }

    /// Cancels the active job and silences the event buses for good.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.cancel().await;
    }

    async fn stop_job(job: JoinHandle<()>, phase: &watch::Sender<Option<JobPhase>>) {
        job.abort();
        let _ = job.await;
        phase.send_if_modified(|current| {
            if *current == Some(JobPhase::Running) {
                *current = Some(JobPhase::Cancelled);
                true
            } else {
                false
            }
        });
    }

    async fn run_job(self: Arc<Self>) {
        match self.run_fetch_steps().await {
            Ok(()) => {
                self.phase.send_replace(Some(JobPhase::Completed));
                debug!("fetch job completed");
            }
            Err(fault) => {
                self.phase.send_replace(Some(JobPhase::Faulted));
                // Emission suspends to hand signals to observers, so routing
                // runs as its own task rather than inline here.
                let viewer = Arc::clone(&self);
                tokio::spawn(async move {
                    viewer.route_fault(fault).await;
                });
            }
        }
    }

    async fn run_fetch_steps(&self) -> Result<(), FetchFault> {
        self.fetch_fact_step().await?;
        self.fetch_image_step().await?;
        Ok(())
    }

    async fn fetch_fact_step(&self) -> Result<(), FetchFault> {
        match self.fact_source.fetch_fact().await {
            Outcome::Success(fact) => self.cells.set_fact(fact),
            Outcome::DomainError(error) => self.monitor.report_domain_error(&error),
            Outcome::TransportFault(fault) => return Err(fault),
        }
        Ok(())
    }

    async fn fetch_image_step(&self) -> Result<(), FetchFault> {
        match self.image_source.fetch_random_images().await {
            Outcome::Success(images) => match images.into_iter().next() {
                Some(first) => self.cells.set_image(first),
                None => return Err(FetchFault::EmptyImageSet),
            },
            Outcome::DomainError(error) => self.monitor.report_domain_error(&error),
            Outcome::TransportFault(fault) => return Err(fault),
        }
        Ok(())
    }

    async fn route_fault(&self, fault: FetchFault) {
        if self.closed.load(Ordering::SeqCst) {
            debug!(%fault, "fault discarded after shutdown");
            return;
        }

        if fault.is_timeout() {
            self.connectivity_errors.emit(()).await;
            return;
        }

        self.monitor.report_warning(&fault);
        if let Some(text) = fault.user_message() {
            self.error_messages.emit(text).await;
        }
    }

    /// Combined fact/image stream; a fresh receiver immediately holds the
    /// current snapshot, empty sides included.
    pub fn subscribe_state(&self) -> watch::Receiver<CatSnapshot> {
        self.cells.subscribe()
    }

    pub fn snapshot(&self) -> CatSnapshot {
        self.cells.snapshot()
    }

    /// Connectivity-failure notifications (timeout-class faults).
    pub async fn subscribe_connectivity_errors(&self) -> mpsc::Receiver<()> {
        self.connectivity_errors.subscribe().await
    }

    /// Human-readable notifications for other transport faults.
    pub async fn subscribe_error_messages(&self) -> mpsc::Receiver<String> {
        self.error_messages.subscribe().await
    }

    /// Phase of the most recent fetch job; `None` until the first fetch.
    pub fn subscribe_phase(&self) -> watch::Receiver<Option<JobPhase>> {
        self.phase.subscribe()
    }

    pub fn job_phase(&self) -> Option<JobPhase> {
        *self.phase.borrow()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
