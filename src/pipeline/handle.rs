use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::PipelineMode;
use crate::device::{ConnectionManager, ConnectionState, DeviceError};
use crate::pipeline::{
    dependencies::PipelineDependencies,
    orchestrator::Orchestrator,
    types::{PipelineConfig, PipelineError, PipelineEvent, PipelinePhase},
};
use crate::remote::HandwritingSample;

/// Cloneable front door to a running pipeline.
///
/// Triggers are queued to the orchestrator task and return immediately; phase
/// changes are observed through [`PipelineHandle::subscribe`].
#[derive(Clone)]
pub struct PipelineHandle {
    event_tx: mpsc::UnboundedSender<PipelineEvent>,
    phase_rx: watch::Receiver<PipelinePhase>,
    deps: Arc<PipelineDependencies>,
}

impl PipelineHandle {
    /// Start a session.
    ///
    /// Any connection left over from an earlier session is closed first, so the
    /// session always starts `Disconnected`. The orchestrator runs until every
    /// handle is dropped.
    pub async fn start(deps: PipelineDependencies, config: PipelineConfig) -> Self {
        deps.connection.disconnect().await;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(PipelinePhase::Idle);
        let deps = Arc::new(deps);

        log::info!(
            "Pipeline session started (mode {}, countdown {})",
            config.mode.label(),
            if config.has_countdown {
                format!("{}s", config.countdown_from)
            } else {
                "off".to_string()
            }
        );

        let orchestrator = Orchestrator::new(Arc::clone(&deps), config, phase_tx, signal_tx);
        tokio::spawn(orchestrator.run(event_rx, signal_rx));

        Self {
            event_tx,
            phase_rx,
            deps,
        }
    }

    pub fn send(&self, event: PipelineEvent) -> Result<(), PipelineError> {
        self.event_tx
            .send(event)
            .map_err(|_| PipelineError::NotRunning)
    }

    pub fn begin_capture(&self) -> Result<(), PipelineError> {
        self.send(PipelineEvent::BeginCapture)
    }

    pub fn cancel(&self) -> Result<(), PipelineError> {
        self.send(PipelineEvent::Cancel)
    }

    pub fn submit_text(&self, text: impl Into<String>) -> Result<(), PipelineError> {
        self.send(PipelineEvent::SubmitText(text.into()))
    }

    pub fn commit(&self, text: impl Into<String>) -> Result<(), PipelineError> {
        self.send(PipelineEvent::Commit(text.into()))
    }

    pub fn dismiss(&self) -> Result<(), PipelineError> {
        self.send(PipelineEvent::Dismiss)
    }

    pub fn set_mode(&self, mode: PipelineMode) -> Result<(), PipelineError> {
        self.send(PipelineEvent::SetMode(mode))
    }

    pub fn leave_session(&self) -> Result<(), PipelineError> {
        self.send(PipelineEvent::LeaveSession)
    }

    /// Latest published phase.
    pub fn phase(&self) -> PipelinePhase {
        self.phase_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelinePhase> {
        self.phase_rx.clone()
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.deps.connection
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.deps.connection.state()
    }

    pub async fn connect(&self) -> Result<(), DeviceError> {
        self.deps.connection.connect().await
    }

    pub async fn disconnect(&self) {
        self.deps.connection.disconnect().await
    }

    /// Upload a handwriting sample without touching the pipeline phase.
    ///
    /// The result is only logged; the returned handle may be awaited or dropped.
    pub fn submit_sample(&self, sample: HandwritingSample) -> JoinHandle<()> {
        let remote = Arc::clone(&self.deps.remote);
        tokio::spawn(async move {
            match remote.upload_sample(&sample).await {
                Ok(()) => log::info!("Handwriting sample '{}' saved", sample.transcription),
                Err(err) => log::error!("Failed to save handwriting sample: {}", err),
            }
        })
    }
}

#[cfg(test)]
impl PipelineHandle {
    pub(crate) fn with_closed_channel_for_test(deps: PipelineDependencies) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        drop(event_rx);
        let (_phase_tx, phase_rx) = watch::channel(PipelinePhase::Idle);
        Self {
            event_tx,
            phase_rx,
            deps: Arc::new(deps),
        }
    }
}
