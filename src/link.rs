//! The duplex controller connection: telemetry frames flow outward, command
//! strings flow inward. Connection loss is observable as a boolean, never an
//! error, and commands sent while disconnected are no-ops.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
#[cfg(test)]
use tokio::sync::mpsc;

use crate::{
    prelude::*,
    telemetry::{Command, Telemetry},
};

/// Outbound half of the connection.
#[async_trait]
pub trait TelemetrySink {
    async fn publish(&mut self, frame: &Telemetry) -> Result;
}

/// Inbound half of the connection.
#[async_trait]
pub trait CommandSource {
    /// Wait for the next command; `None` once the peer is gone.
    async fn next(&mut self) -> Option<Command>;
}

/// Build an in-process duplex pair: the controller end publishes telemetry
/// and receives commands, the panel end mirrors it. This is what the tests
/// drive the loop contract with in place of a real transport.
#[cfg(test)]
#[must_use]
pub fn pair(capacity: usize) -> (ControllerEnd, PanelEnd) {
    let (telemetry_sender, telemetry_receiver) = mpsc::channel(capacity);
    let (command_sender, command_receiver) = mpsc::channel(capacity);
    (
        ControllerEnd { telemetry: telemetry_sender, commands: command_receiver },
        PanelEnd { telemetry: telemetry_receiver, commands: command_sender },
    )
}

#[cfg(test)]
pub struct ControllerEnd {
    telemetry: mpsc::Sender<Telemetry>,
    commands: mpsc::Receiver<Command>,
}

#[cfg(test)]
impl ControllerEnd {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.telemetry.is_closed()
    }
}

#[cfg(test)]
#[async_trait]
impl TelemetrySink for ControllerEnd {
    async fn publish(&mut self, frame: &Telemetry) -> Result {
        // A vanished panel is a connectivity state, not a failure.
        let _ = self.telemetry.send(frame.clone()).await;
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl CommandSource for ControllerEnd {
    async fn next(&mut self) -> Option<Command> {
        self.commands.recv().await
    }
}

#[cfg(test)]
pub struct PanelEnd {
    telemetry: mpsc::Receiver<Telemetry>,
    commands: mpsc::Sender<Command>,
}

#[cfg(test)]
impl PanelEnd {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Send a command; a no-op when the controller is gone.
    pub async fn send(&self, command: Command) {
        let _ = self.commands.send(command).await;
    }

    pub async fn recv(&mut self) -> Option<Telemetry> {
        self.telemetry.recv().await
    }
}

/// Telemetry as JSON lines on the standard output.
pub struct ConsoleSink(Stdout);

impl ConsoleSink {
    #[must_use]
    pub fn new() -> Self {
        Self(tokio::io::stdout())
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetrySink for ConsoleSink {
    async fn publish(&mut self, frame: &Telemetry) -> Result {
        let mut line = serde_json::to_string(frame).context("failed to serialize the frame")?;
        line.push('\n');
        self.0.write_all(line.as_bytes()).await.context("failed to write the frame")?;
        self.0.flush().await.context("failed to flush the frame")?;
        Ok(())
    }
}

/// Commands parsed from standard input lines. Unparseable lines are
/// discarded with a warning and delivery continues.
pub struct ConsoleCommands(Lines<BufReader<Stdin>>);

impl ConsoleCommands {
    #[must_use]
    pub fn new() -> Self {
        Self(BufReader::new(tokio::io::stdin()).lines())
    }
}

impl Default for ConsoleCommands {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandSource for ConsoleCommands {
    async fn next(&mut self) -> Option<Command> {
        loop {
            let line = self.0.next_line().await.ok()??;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse() {
                Ok(command) => break Some(command),
                Err(error) => warn!("discarding inbound garbage: {error:#}"),
            }
        }
    }
}
