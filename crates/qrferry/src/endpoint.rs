//! Endpoint drivers: async loops that pump a session against the channel.
//!
//! A session decides *what* to show and how to react to a scan; an
//! endpoint decides *when* — re-rendering the current frame at a fixed
//! cadence and feeding every decoded scan into the session. Each endpoint
//! is one `run()` future that owns its display, scanner, and session, and
//! resolves with the transfer outcome.
//!
//! The loops never fail on bad input from the channel: an undecodable or
//! foreign frame is traced and dropped, and the session's own gating
//! handles everything that decodes but doesn't fit. The only errors that
//! surface are local ones (display gone, source unreadable, sink I/O is
//! logged but forgiven).

use std::io::Read;

use tokio::sync::mpsc;

use qrferry_channel::{ChannelError, CodeDisplay, CodeScanner};
use qrferry_protocol::{FrameCodec, JsonFrameCodec, Message};
use qrferry_session::{
    ReceiverProgress, ReceiverSession, SenderProgress, SenderSession,
};
use qrferry_transfer::DocumentDescriptor;

use crate::{FileSink, QrferryError};

/// Timing knobs shared by both endpoints.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// How often the current frame is re-rendered to the display.
    pub refresh: std::time::Duration,
    /// How long the receiver keeps `receive_done` on screen after
    /// completion, so the sender has a chance to scan it before the
    /// session tears down.
    pub done_linger: std::time::Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            refresh: std::time::Duration::from_millis(200),
            done_linger: std::time::Duration::from_secs(1),
        }
    }
}

/// Commands a user can issue against a running endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointCommand {
    /// Abandon the transfer. Local only; the peer is never notified and
    /// keeps going until its own user cancels too.
    Cancel,
}

/// Remote control for a running endpoint.
///
/// Dropping the handle does *not* cancel the transfer; the endpoint
/// simply can no longer be commanded.
#[derive(Debug, Clone)]
pub struct TransferHandle {
    commands: mpsc::Sender<EndpointCommand>,
}

impl TransferHandle {
    /// Asks the endpoint to abandon the transfer.
    pub async fn cancel(&self) {
        // The endpoint having already finished is fine.
        let _ = self.commands.send(EndpointCommand::Cancel).await;
    }
}

fn command_channel() -> (TransferHandle, mpsc::Receiver<EndpointCommand>) {
    let (tx, rx) = mpsc::channel(4);
    (TransferHandle { commands: tx }, rx)
}

/// How a send ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The receiver confirmed it has the whole file.
    Completed,
    /// The local user cancelled.
    Cancelled,
}

/// How a receive ended.
#[derive(Debug)]
pub enum ReceiveOutcome {
    /// The whole file arrived and was reassembled.
    Completed(qrferry_session::ReceivedFile),
    /// The local user cancelled; partial data was discarded.
    Cancelled,
}

// -------------------------------------------------------------------------
// Sender
// -------------------------------------------------------------------------

/// Drives a [`SenderSession`] against a display/scanner pair.
pub struct SenderEndpoint<D, S> {
    session: SenderSession,
    display: D,
    scanner: S,
    codec: Box<dyn FrameCodec>,
    config: EndpointConfig,
    commands: mpsc::Receiver<EndpointCommand>,
}

impl<D: CodeDisplay, S: CodeScanner> SenderEndpoint<D, S> {
    /// Encodes `source` and prepares a sending endpoint.
    ///
    /// Nothing is displayed until [`run`](Self::run) is polled.
    ///
    /// # Errors
    /// Fails if the source cannot be read; no frame is ever shown then.
    pub fn start(
        document: DocumentDescriptor,
        source: impl Read,
        display: D,
        scanner: S,
        config: EndpointConfig,
    ) -> Result<(Self, TransferHandle), QrferryError> {
        let session = SenderSession::start(document, source)?;
        let (handle, commands) = command_channel();
        Ok((
            Self {
                session,
                display,
                scanner,
                codec: Box::new(JsonFrameCodec),
                config,
                commands,
            },
            handle,
        ))
    }

    /// Runs the transfer to its end.
    ///
    /// Resolves when the receiver confirms completion or the user
    /// cancels. There is no timeout: an absent receiver leaves the
    /// future pending, displaying the same frame, until cancelled.
    pub async fn run(mut self) -> Result<SendOutcome, QrferryError> {
        let mut refresh = tokio::time::interval(self.config.refresh);
        let mut commands_closed = false;

        loop {
            tokio::select! {
                _ = refresh.tick() => {
                    if let Some(msg) = self.session.current_message() {
                        let frame = self.codec.encode(msg)?;
                        self.display.show(&frame)?;
                    }
                }

                scanned = self.scanner.next_scan() => {
                    let Some(text) = scanned else {
                        return Err(ChannelError::Closed(
                            "scanner feed ended".into(),
                        )
                        .into());
                    };
                    match self.codec.decode(&text) {
                        Ok(msg) => {
                            let progress =
                                self.session.handle_feedback(&msg);
                            if progress == SenderProgress::Completed {
                                let _ = self.display.clear();
                                return Ok(SendOutcome::Completed);
                            }
                        }
                        Err(err) => {
                            tracing::trace!(%err, "scan not for us");
                        }
                    }
                }

                cmd = self.commands.recv(), if !commands_closed => {
                    match cmd {
                        Some(EndpointCommand::Cancel) => {
                            tracing::info!(
                                transfer_id =
                                    %self.session.document().transfer_id,
                                "send cancelled"
                            );
                            let _ = self.display.clear();
                            return Ok(SendOutcome::Cancelled);
                        }
                        None => commands_closed = true,
                    }
                }
            }
        }
    }
}

// -------------------------------------------------------------------------
// Receiver
// -------------------------------------------------------------------------

/// Drives a [`ReceiverSession`] against a display/scanner pair.
pub struct ReceiverEndpoint<D, S> {
    session: ReceiverSession,
    display: D,
    scanner: S,
    codec: Box<dyn FrameCodec>,
    sink: Option<Box<dyn FileSink>>,
    config: EndpointConfig,
    commands: mpsc::Receiver<EndpointCommand>,
}

impl<D: CodeDisplay, S: CodeScanner> ReceiverEndpoint<D, S> {
    /// Prepares a receiving endpoint with no persistence; the caller
    /// gets the file from the [`ReceiveOutcome`].
    pub fn new(
        display: D,
        scanner: S,
        config: EndpointConfig,
    ) -> (Self, TransferHandle) {
        let (handle, commands) = command_channel();
        (
            Self {
                session: ReceiverSession::new(),
                display,
                scanner,
                codec: Box::new(JsonFrameCodec),
                sink: None,
                config,
                commands,
            },
            handle,
        )
    }

    /// Adds a sink the completed file is handed to before `run` returns.
    pub fn with_sink(mut self, sink: impl FileSink) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Runs until a whole file arrives or the user cancels.
    ///
    /// On completion the reassembled file is stored in the sink (a sink
    /// failure is logged, not fatal — the bytes are still returned), the
    /// `receive_done` frame stays on screen for
    /// [`done_linger`](EndpointConfig::done_linger), and then the future
    /// resolves.
    pub async fn run(mut self) -> Result<ReceiveOutcome, QrferryError> {
        let mut refresh = tokio::time::interval(self.config.refresh);
        let mut commands_closed = false;

        loop {
            tokio::select! {
                _ = refresh.tick() => {
                    if let Some(msg) = self.session.feedback_message() {
                        let frame = self.codec.encode(&msg)?;
                        self.display.show(&frame)?;
                    }
                }

                scanned = self.scanner.next_scan() => {
                    let Some(text) = scanned else {
                        return Err(ChannelError::Closed(
                            "scanner feed ended".into(),
                        )
                        .into());
                    };
                    let msg = match self.codec.decode(&text) {
                        Ok(msg) => msg,
                        Err(err) => {
                            tracing::trace!(%err, "scan not for us");
                            continue;
                        }
                    };
                    if self.session.handle_scan(&msg)
                        == ReceiverProgress::Completed
                    {
                        return self.finish().await;
                    }
                }

                cmd = self.commands.recv(), if !commands_closed => {
                    match cmd {
                        Some(EndpointCommand::Cancel) => {
                            tracing::info!("receive cancelled");
                            self.session.reset();
                            let _ = self.display.clear();
                            return Ok(ReceiveOutcome::Cancelled);
                        }
                        None => commands_closed = true,
                    }
                }
            }
        }
    }

    async fn finish(mut self) -> Result<ReceiveOutcome, QrferryError> {
        let file = self.session.assemble()?;

        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = sink.store(&file) {
                tracing::error!(
                    %err,
                    name = %file.name,
                    "failed to persist received file"
                );
            }
        }

        // Keep confirming completion long enough for the sender's camera
        // to catch the done frame at least once.
        if let Some(done) = self.session.feedback_message() {
            debug_assert!(matches!(done, Message::ReceiveDone { .. }));
            let frame = self.codec.encode(&done)?;
            self.display.show(&frame)?;
        }
        tokio::time::sleep(self.config.done_linger).await;
        let _ = self.display.clear();

        Ok(ReceiveOutcome::Completed(file))
    }
}
