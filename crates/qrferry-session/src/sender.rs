//! The sender state machine: decides which single message is displayed.
//!
//! The sender is a *passive continuous re-transmitter*. It builds the full
//! message sequence up front, then sits on one message — re-rendered by the
//! display loop at its own cadence — until feedback from the receiver moves
//! the index forward. There are no retries and no timeouts anywhere: a
//! stalled receiver leaves the sender waiting until its user cancels.

use std::io::Read;

use qrferry_protocol::Message;
use qrferry_transfer::{encode_document, DocumentDescriptor};

use crate::SenderError;

/// The sender's lifecycle state.
///
/// ```text
///   start() ──→ Displaying { current } ──(receive_done)──→ Done
///                     │    ▲
///                     └────┘ (received_chunk advances current)
/// ```
///
/// There is no explicit Idle state here — "idle" is simply not having a
/// session. Cancelling is dropping the session; the peer cannot be told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderState {
    /// Offering `messages[current]` for display.
    Displaying {
        /// Index into the message sequence. Monotonically non-decreasing,
        /// always within `0..messages.len()`.
        current: usize,
    },
    /// The receiver reported `receive_done`. Terminal.
    Done,
}

/// What a piece of feedback did to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderProgress {
    /// The displayed message moved forward to `messages[current]`.
    Advanced { current: usize },
    /// The receiver has everything; the session is finished.
    Completed,
    /// Noise, a stale ack, a foreign transfer — nothing changed.
    Ignored,
}

/// An active sending session.
///
/// Owns the document descriptor and the immutable message sequence
/// (index 0 = `send_init`, 1..=M = `send_chunk`). The only mutable part is
/// the lifecycle state, and the only operations that touch it are
/// [`handle_feedback`](Self::handle_feedback) — never ad hoc field writes.
#[derive(Debug)]
pub struct SenderSession {
    document: DocumentDescriptor,
    messages: Vec<Message>,
    state: SenderState,
}

impl SenderSession {
    /// Encodes the source content and starts displaying the init message.
    ///
    /// # Errors
    /// Returns [`SenderError::Encoding`] if the source cannot be read.
    /// No session exists in that case — the failure happens entirely
    /// before the first frame would be shown.
    pub fn start(
        document: DocumentDescriptor,
        source: impl Read,
    ) -> Result<Self, SenderError> {
        let messages = encode_document(&document, source)?;
        tracing::info!(
            transfer_id = %document.transfer_id,
            name = %document.name,
            messages = messages.len(),
            "sender session started"
        );
        Ok(Self {
            document,
            messages,
            state: SenderState::Displaying { current: 0 },
        })
    }

    /// The document this session is sending.
    pub fn document(&self) -> &DocumentDescriptor {
        &self.document
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SenderState {
        &self.state
    }

    /// The message the display loop should currently render.
    ///
    /// `Some` for the whole life of the session, `None` once done —
    /// a finished sender has nothing left to show.
    pub fn current_message(&self) -> Option<&Message> {
        match self.state {
            SenderState::Displaying { current } => {
                self.messages.get(current)
            }
            SenderState::Done => None,
        }
    }

    /// Applies one piece of scanned feedback from the receiver.
    ///
    /// Accepts exactly two things, both gated on the transfer id:
    ///
    /// - `received_chunk` — an acknowledgment in message-slot space
    ///   (slot 0 = init). The index moves to
    ///   `max(current, acked_slot + 1)`, so replayed or out-of-order acks
    ///   are idempotent: forward or stay put, never backward.
    /// - `receive_done` — transitions to [`SenderState::Done`].
    ///
    /// Everything else — wrong message type, mismatched id, an ack for a
    /// slot past the last message — is a no-op.
    pub fn handle_feedback(&mut self, msg: &Message) -> SenderProgress {
        let SenderState::Displaying { current } = self.state else {
            return SenderProgress::Ignored;
        };

        if msg.transfer_id() != &self.document.transfer_id {
            tracing::trace!(
                transfer_id = %self.document.transfer_id,
                scanned_id = %msg.transfer_id(),
                "feedback for a different transfer, ignoring"
            );
            return SenderProgress::Ignored;
        }

        match msg {
            Message::ReceivedChunk { chunk_index, .. } => {
                let slot = *chunk_index as usize;
                if slot >= self.messages.len() - 1 {
                    return SenderProgress::Ignored;
                }
                let next = slot + 1;
                if next <= current {
                    // A frame we already advanced past — duplicate scan.
                    return SenderProgress::Ignored;
                }
                self.state = SenderState::Displaying { current: next };
                tracing::debug!(
                    transfer_id = %self.document.transfer_id,
                    current = next,
                    total = self.messages.len(),
                    "advanced to next message"
                );
                SenderProgress::Advanced { current: next }
            }
            Message::ReceiveDone { .. } => {
                self.state = SenderState::Done;
                tracing::info!(
                    transfer_id = %self.document.transfer_id,
                    "receiver confirmed completion"
                );
                SenderProgress::Completed
            }
            _ => SenderProgress::Ignored,
        }
    }

    /// Whether the receiver has confirmed the full transfer.
    pub fn is_done(&self) -> bool {
        matches!(self.state, SenderState::Done)
    }

    /// Progress as `(slots acknowledged, data chunks total)` for display
    /// ("3/7 chunks sent").
    pub fn progress(&self) -> (usize, usize) {
        let total = self.messages.len() - 1;
        match self.state {
            SenderState::Displaying { current } => {
                (current.min(total), total)
            }
            SenderState::Done => (total, total),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
