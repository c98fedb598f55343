use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::capture::{CaptureError, Snapshot};
use crate::config::PipelineMode;
use crate::device::{DrawSequencer, DrawSettings};
use crate::pipeline::{
    countdown::Countdown,
    dependencies::PipelineDependencies,
    draw,
    types::{PipelineConfig, PipelineError, PipelineEvent, PipelinePhase},
};
use crate::remote::{RemoteError, normalize_svg};

/// Completions reported back to the orchestrator by its own timer and work tasks.
pub(crate) enum Signal {
    Tick { countdown: u64 },
    Captured(Result<Snapshot, CaptureError>),
    Recognized(Result<String, RemoteError>),
    ArtReady(Result<String, RemoteError>),
    DrawFinished(Result<(), PipelineError>),
}

/// Settings captured when a run starts.
#[derive(Debug, Clone, Copy)]
struct Run {
    mode: PipelineMode,
    draw_flip_y: bool,
}

/// Owns the phase. Every transition happens here, one event at a time; slow
/// work (capture, remote calls, drawing) runs in spawned tasks that report back
/// through [`Signal`]s.
pub(crate) struct Orchestrator {
    deps: Arc<PipelineDependencies>,
    config: PipelineConfig,
    phase: PipelinePhase,
    phase_tx: watch::Sender<PipelinePhase>,
    run: Option<Run>,
    countdown: Option<Countdown>,
    countdown_id: u64,
    signal_tx: mpsc::UnboundedSender<Signal>,
    #[cfg(test)]
    history: Vec<PipelinePhase>,
}

impl Orchestrator {
    pub fn new(
        deps: Arc<PipelineDependencies>,
        config: PipelineConfig,
        phase_tx: watch::Sender<PipelinePhase>,
        signal_tx: mpsc::UnboundedSender<Signal>,
    ) -> Self {
        Self {
            deps,
            config,
            phase: PipelinePhase::Idle,
            phase_tx,
            run: None,
            countdown: None,
            countdown_id: 0,
            signal_tx,
            #[cfg(test)]
            history: Vec::new(),
        }
    }

    /// Process events until every handle is dropped.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<PipelineEvent>,
        mut signals: mpsc::UnboundedReceiver<Signal>,
    ) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(signal) = signals.recv() => self.handle_signal(signal),
            }
        }
        self.countdown = None;
        log::debug!("Pipeline stopped");
    }

    pub(crate) fn handle_event(&mut self, event: PipelineEvent) {
        log::debug!("Pipeline event {:?} in phase {}", event, self.phase);
        let phase = self.phase.clone();
        match (event, &phase) {
            (PipelineEvent::BeginCapture, PipelinePhase::Idle) => self.begin_capture(),
            (PipelineEvent::SubmitText(text), PipelinePhase::Idle) => {
                if text.trim().is_empty() {
                    log::warn!("Ignoring empty text submission");
                    return;
                }
                self.run = Some(self.start_run());
                self.request_art_for_text(text);
            }
            (PipelineEvent::Commit(text), PipelinePhase::AwaitingEdit(_)) => {
                if text.trim().is_empty() {
                    log::warn!("Ignoring empty commit; edit the text or cancel");
                    return;
                }
                self.request_art_for_text(text);
            }
            (PipelineEvent::Cancel, PipelinePhase::CountingDown(_)) => {
                log::info!("Countdown cancelled");
                self.reset();
            }
            (PipelineEvent::Cancel, PipelinePhase::AwaitingEdit(_)) => {
                log::info!("Recognized text abandoned");
                self.reset();
            }
            (
                PipelineEvent::LeaveSession,
                PipelinePhase::CountingDown(_) | PipelinePhase::AwaitingEdit(_),
            ) => {
                log::info!("Leaving session; abandoning current run");
                self.reset();
            }
            (PipelineEvent::LeaveSession, _) => {}
            (PipelineEvent::Dismiss, PipelinePhase::Failed(_)) => self.reset(),
            (PipelineEvent::SetMode(mode), _) => {
                if self.run.is_some() {
                    log::info!("Mode set to {}; takes effect on the next run", mode.label());
                } else {
                    log::info!("Mode set to {}", mode.label());
                }
                self.config.mode = mode;
            }
            (event, phase) => {
                log::warn!("Ignoring {:?} while {}", event, phase);
            }
        }
    }

    pub(crate) fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Tick { countdown } => self.tick(countdown),
            Signal::Captured(result) => {
                if !self.expect_phase(&PipelinePhase::Capturing, "snapshot") {
                    return;
                }
                match result {
                    Ok(snapshot) => self.request_remote_for_snapshot(snapshot),
                    Err(err) => self.fail(err.into()),
                }
            }
            Signal::Recognized(result) => {
                if !self.expect_phase(&PipelinePhase::AwaitingRemote, "recognized text") {
                    return;
                }
                match result {
                    Ok(text) => {
                        log::info!("Recognized text: {:?}", text);
                        self.set_phase(PipelinePhase::AwaitingEdit(text));
                    }
                    Err(err) => self.fail(err.into()),
                }
            }
            Signal::ArtReady(result) => {
                if !self.expect_phase(&PipelinePhase::AwaitingRemote, "artwork") {
                    return;
                }
                // Art is checked for its sizing rect while still AwaitingRemote.
                match result.and_then(|svg| normalize_svg(&svg)) {
                    Ok(svg) => self.start_drawing(svg),
                    Err(err) => self.fail(err.into()),
                }
            }
            Signal::DrawFinished(result) => {
                if !self.expect_phase(&PipelinePhase::Drawing, "draw result") {
                    return;
                }
                match result {
                    Ok(()) => {
                        log::info!("Run complete");
                        self.reset();
                    }
                    Err(err) => self.fail(err),
                }
            }
        }
    }

    fn start_run(&self) -> Run {
        Run {
            mode: self.config.mode,
            draw_flip_y: self.config.draw_flip_y,
        }
    }

    fn begin_capture(&mut self) {
        let run = self.start_run();
        log::info!("Starting {} run", run.mode.label());
        self.run = Some(run);

        if self.config.has_countdown {
            self.countdown_id += 1;
            self.countdown = Some(Countdown::start(
                self.countdown_id,
                self.config.tick,
                self.signal_tx.clone(),
            ));
            self.set_phase(PipelinePhase::CountingDown(self.config.countdown_from));
        } else {
            self.capture();
        }
    }

    fn tick(&mut self, countdown: u64) {
        let PipelinePhase::CountingDown(remaining) = self.phase else {
            log::debug!("Dropping tick outside of a countdown");
            return;
        };
        if countdown != self.countdown_id || self.countdown.is_none() {
            log::debug!("Dropping tick from a finished countdown");
            return;
        }

        if remaining > 1 {
            self.set_phase(PipelinePhase::CountingDown(remaining - 1));
        } else {
            self.countdown = None;
            self.capture();
        }
    }

    fn capture(&mut self) {
        self.set_phase(PipelinePhase::Capturing);
        let camera = self.deps.camera.clone();
        let signals = self.signal_tx.clone();
        tokio::spawn(async move {
            let _ = signals.send(Signal::Captured(camera.snapshot().await));
        });
    }

    fn request_remote_for_snapshot(&mut self, snapshot: Snapshot) {
        if let Some(path) = &snapshot.archived_path {
            log::info!("Snapshot archived at {}", path.display());
        }
        let mode = self.run.map(|run| run.mode).unwrap_or(self.config.mode);
        self.set_phase(PipelinePhase::AwaitingRemote);

        let remote = Arc::clone(&self.deps.remote);
        let signals = self.signal_tx.clone();
        tokio::spawn(async move {
            let signal = match mode {
                PipelineMode::Direct => {
                    Signal::ArtReady(remote.image_to_art(&snapshot.payload).await)
                }
                PipelineMode::TwoStep => {
                    Signal::Recognized(remote.image_to_text(&snapshot.payload).await)
                }
            };
            let _ = signals.send(signal);
        });
    }

    fn request_art_for_text(&mut self, text: String) {
        self.set_phase(PipelinePhase::AwaitingRemote);
        let remote = Arc::clone(&self.deps.remote);
        let params = self.deps.synthesis;
        let signals = self.signal_tx.clone();
        tokio::spawn(async move {
            let _ = signals.send(Signal::ArtReady(remote.text_to_art(&text, params).await));
        });
    }

    /// `svg` has already been normalized.
    fn start_drawing(&mut self, svg: String) {
        self.set_phase(PipelinePhase::Drawing);
        let flip_y = self
            .run
            .map(|run| run.draw_flip_y)
            .unwrap_or(self.config.draw_flip_y);
        let deps = Arc::clone(&self.deps);
        let signals = self.signal_tx.clone();
        tokio::spawn(async move {
            let sequencer = DrawSequencer::new(DrawSettings {
                flip_y,
                ..deps.draw_settings.clone()
            });
            let result = draw::draw_svg(
                deps.geometry.as_ref(),
                deps.target,
                &sequencer,
                &deps.connection,
                &svg,
            )
            .await;
            let _ = signals.send(Signal::DrawFinished(result));
        });
    }

    fn expect_phase(&self, expected: &PipelinePhase, what: &str) -> bool {
        if &self.phase == expected {
            true
        } else {
            log::warn!("Discarding {} received while {}", what, self.phase);
            false
        }
    }

    fn fail(&mut self, err: PipelineError) {
        log::error!("Pipeline run failed: {}", err);
        self.countdown = None;
        self.run = None;
        self.set_phase(PipelinePhase::Failed(err.to_string()));
    }

    fn reset(&mut self) {
        self.countdown = None;
        self.run = None;
        self.set_phase(PipelinePhase::Idle);
    }

    fn set_phase(&mut self, phase: PipelinePhase) {
        log::info!("Pipeline: {} -> {}", self.phase, phase);
        #[cfg(test)]
        self.history.push(phase.clone());
        self.phase = phase.clone();
        self.phase_tx.send_replace(phase);
    }
}

#[cfg(test)]
impl Orchestrator {
    /// Every phase entered so far, including ones the watch channel coalesces.
    pub(crate) fn history(&self) -> &[PipelinePhase] {
        &self.history
    }
}
