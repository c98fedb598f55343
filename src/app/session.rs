use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::app::{
    commands::{HELP, SessionCommand},
    oneshot::load_sample,
    selector::SessionPortSelector,
};
use crate::config::Config;
use crate::device::{ConnectionManager, ConnectionState, SerialSettings, SerialTransport};
use crate::pipeline::{PipelineConfig, PipelineDependencies, PipelineHandle, PipelinePhase};

/// Line-oriented booth session on stdin/stdout.
///
/// SIGINT/SIGTERM leave the session the same way `quit` does: a running
/// countdown is cancelled and the plotter link is closed.
pub async fn run_session(config: Config) -> Result<()> {
    let selector = Arc::new(SessionPortSelector::default());
    let transport = SerialTransport::new(
        SerialSettings::from_config(&config.device),
        selector.clone(),
    );
    let connection = ConnectionManager::new(Arc::new(transport));
    let deps = PipelineDependencies::from_config(&config, connection)
        .context("Failed to set up the capture pipeline")?;
    let pipeline = PipelineHandle::start(deps, PipelineConfig::from_config(&config)).await;

    spawn_status_printer(&pipeline);
    let mut quit_rx = spawn_signal_listener()?;

    println!(
        "plotbooth ready ({} mode). Type `help` for commands.",
        config.pipeline.mode.label()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    log::info!("stdin closed - leaving session");
                    break;
                };
                match SessionCommand::parse(&line) {
                    Ok(Some(SessionCommand::Quit)) => break,
                    Ok(Some(command)) => execute(command, &pipeline, &selector, &config).await,
                    Ok(None) => {}
                    Err(message) => println!("{}", message),
                }
            }
            _ = quit_rx.recv() => break,
        }
    }

    pipeline.leave_session().ok();
    pipeline.disconnect().await;
    println!("Bye.");
    Ok(())
}

async fn execute(
    command: SessionCommand,
    pipeline: &PipelineHandle,
    selector: &SessionPortSelector,
    config: &Config,
) {
    let sent = match command {
        SessionCommand::Help => {
            println!("{}", HELP);
            Ok(())
        }
        SessionCommand::Connect(choice) => {
            selector.choose(choice);
            if let Err(err) = pipeline.connect().await {
                println!("Connection failed: {}", err);
            }
            Ok(())
        }
        SessionCommand::Disconnect => {
            pipeline.disconnect().await;
            Ok(())
        }
        SessionCommand::Status => {
            println!(
                "Pipeline: {} | Plotter: {}",
                pipeline.phase(),
                describe_connection(pipeline.connection_state())
            );
            Ok(())
        }
        SessionCommand::Capture => pipeline.begin_capture(),
        SessionCommand::Cancel => pipeline.cancel(),
        SessionCommand::Text(text) => pipeline.submit_text(text),
        SessionCommand::Commit(Some(text)) => pipeline.commit(text),
        SessionCommand::Commit(None) => match pipeline.phase() {
            PipelinePhase::AwaitingEdit(text) => pipeline.commit(text),
            phase => {
                println!("Nothing to commit while {}", phase);
                Ok(())
            }
        },
        SessionCommand::Dismiss => pipeline.dismiss(),
        SessionCommand::Mode(mode) => pipeline.set_mode(mode),
        SessionCommand::Sample(path) => {
            match load_sample(&path, None, None, config) {
                Ok(sample) => drop(pipeline.submit_sample(sample)),
                Err(err) => println!("{:#}", err),
            }
            Ok(())
        }
        SessionCommand::Quit => Ok(()),
    };

    if let Err(err) = sent {
        log::error!("{}", err);
    }
}

fn spawn_status_printer(pipeline: &PipelineHandle) {
    let mut phases = pipeline.subscribe();
    tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = phases.borrow_and_update().clone();
            println!("{}", describe_phase(&phase));
        }
    });

    let mut states = pipeline.connection().subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            println!("Plotter {}", describe_connection(state));
        }
    });
}

fn spawn_signal_listener() -> Result<mpsc::UnboundedReceiver<()>> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handler")?;
    let (quit_tx, quit_rx) = mpsc::unbounded_channel();

    // Runs until process exit; nothing to clean up.
    thread::spawn(move || {
        for sig in signals.forever() {
            log::info!(
                "Received {} - leaving session",
                if sig == SIGTERM { "SIGTERM" } else { "SIGINT" }
            );
            if quit_tx.send(()).is_err() {
                break;
            }
        }
    });

    Ok(quit_rx)
}

fn describe_phase(phase: &PipelinePhase) -> String {
    match phase {
        PipelinePhase::Idle => "Ready.".to_string(),
        PipelinePhase::CountingDown(remaining) => format!("{}...", remaining),
        PipelinePhase::Capturing => "Smile!".to_string(),
        PipelinePhase::AwaitingRemote => "Working on it...".to_string(),
        PipelinePhase::AwaitingEdit(text) => format!(
            "Recognized: {:?}\n`commit` to draw it, `commit <text>` to change it, `cancel` to drop it",
            text
        ),
        PipelinePhase::Drawing => "Drawing...".to_string(),
        PipelinePhase::Failed(reason) => format!("Failed: {} (`dismiss` to continue)", reason),
    }
}

fn describe_connection(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Disconnected => "disconnected",
        ConnectionState::Connecting => "connecting",
        ConnectionState::Connected => "connected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_prompt_shows_recognized_text() {
        let text = describe_phase(&PipelinePhase::AwaitingEdit("abc".into()));
        assert!(text.starts_with("Recognized: \"abc\""));
        assert_eq!(describe_phase(&PipelinePhase::CountingDown(3)), "3...");
    }
}
