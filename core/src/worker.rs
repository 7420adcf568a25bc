//! Background simulation worker.
//!
//! The engine moves onto a dedicated thread. Drivers send commands and
//! receive events over channels; no state is shared between threads.
//! A day's `DayCompleted` event is sent only after the whole day step
//! has finished, so a consumer never observes a half-computed day.
//!
//! There is no cancellation inside a day step. To stop early, stop
//! sending `Step` commands.

use crate::{
    engine::SimEngine,
    error::{SimError, SimResult},
    event::{EventSink, SimEvent},
    outcome::RunSummary,
};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Advance up to `days` days, stopping early if the run ends.
    Step { days: u64 },
    RunToEnd,
    Reset,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Event(SimEvent),
    /// Sent once, right after the day step that ended the run.
    Finished(RunSummary),
    /// A command was rejected, e.g. `Step` on a finished run.
    Failed(String),
}

struct MessageSink(Sender<WorkerMessage>);

impl EventSink for MessageSink {
    fn emit(&mut self, event: SimEvent) {
        let _ = self.0.send(WorkerMessage::Event(event));
    }
}

pub struct SimWorker {
    commands: Sender<WorkerCommand>,
    messages: Receiver<WorkerMessage>,
    handle:   JoinHandle<SimEngine>,
}

impl SimWorker {
    pub fn spawn(engine: SimEngine) -> SimResult<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (message_tx, message_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(format!("sim-worker-{}", engine.run_id))
            .spawn(move || worker_loop(engine, command_rx, message_tx))?;
        Ok(Self {
            commands: command_tx,
            messages: message_rx,
            handle,
        })
    }

    pub fn send(&self, command: WorkerCommand) -> SimResult<()> {
        self.commands
            .send(command)
            .map_err(|_| SimError::WorkerDisconnected)
    }

    pub fn step(&self, days: u64) -> SimResult<()> {
        self.send(WorkerCommand::Step { days })
    }

    pub fn run_to_end(&self) -> SimResult<()> {
        self.send(WorkerCommand::RunToEnd)
    }

    pub fn reset(&self) -> SimResult<()> {
        self.send(WorkerCommand::Reset)
    }

    /// Blocks until the next message.
    pub fn recv(&self) -> SimResult<WorkerMessage> {
        self.messages.recv().map_err(|_| SimError::WorkerDisconnected)
    }

    /// `Ok(None)` when nothing arrived within `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> SimResult<Option<WorkerMessage>> {
        match self.messages.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(SimError::WorkerDisconnected),
        }
    }

    /// `Ok(None)` when no message is waiting.
    pub fn try_recv(&self) -> SimResult<Option<WorkerMessage>> {
        match self.messages.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SimError::WorkerDisconnected),
        }
    }

    /// Stops the worker after the commands already queued and hands the
    /// engine back.
    pub fn shutdown(self) -> SimResult<SimEngine> {
        // A worker that already exited has dropped its receiver; join anyway.
        let _ = self.commands.send(WorkerCommand::Shutdown);
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("simulation worker panicked").into())
    }
}

fn worker_loop(
    mut engine: SimEngine,
    commands: Receiver<WorkerCommand>,
    messages: Sender<WorkerMessage>,
) -> SimEngine {
    let mut sink = MessageSink(messages.clone());

    for command in commands.iter() {
        log::debug!("run={} worker: {command:?}", engine.run_id);
        match command {
            WorkerCommand::Step { days } => {
                for _ in 0..days {
                    if !advance(&mut engine, &mut sink, &messages) {
                        break;
                    }
                }
            }
            WorkerCommand::RunToEnd => while advance(&mut engine, &mut sink, &messages) {},
            WorkerCommand::Reset => {
                if let Err(e) = engine.reset_with(&mut sink) {
                    let _ = messages.send(WorkerMessage::Failed(e.to_string()));
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }
    engine
}

/// One day step. Returns whether the run can keep going.
fn advance(engine: &mut SimEngine, sink: &mut MessageSink, messages: &Sender<WorkerMessage>) -> bool {
    if let Err(e) = engine.advance_day_with(sink) {
        log::warn!("run={} worker: {e}", engine.run_id);
        let _ = messages.send(WorkerMessage::Failed(e.to_string()));
        return false;
    }
    match engine.summary() {
        Some(summary) => {
            let _ = messages.send(WorkerMessage::Finished(summary));
            false
        }
        None => true,
    }
}
