//! The receiver state machine: validates ordering, accumulates chunks,
//! and decides the feedback frame shown back to the sender.
//!
//! The receiver enforces lockstep: exactly one message is acceptable at
//! any moment, and everything else that the camera delivers — duplicates,
//! premature chunks, other transfers, plain noise — is silently ignored.
//! That single accept rule is what makes the protocol correct over a
//! channel with no delivery guarantees at all.

use qrferry_protocol::{Message, TransferId};
use qrferry_transfer::reassemble;

use crate::ReceiverError;

/// The receiver's lifecycle state.
///
/// ```text
///   AwaitingInit ──(send_init)──→ Accumulating ──(last chunk)──→ Complete
///        ▲                             │
///        └───────── reset() ───────────┘
/// ```
///
/// `reset` returns to `AwaitingInit` from any state and discards all
/// accumulated data; it is the local, unilateral cancel — the sender
/// cannot be told and keeps displaying until its own user cancels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverState {
    /// No transfer yet; only a `send_init` can move us forward.
    AwaitingInit,

    /// Mid-transfer: chunks are being collected in strict index order.
    Accumulating {
        /// The transfer every accepted message must belong to.
        id: TransferId,
        /// File name from the init message.
        name: String,
        /// MIME type from the init message.
        mime_type: String,
        /// The init's `totalChunks`: data chunk count plus one.
        total: u32,
        /// Next data chunk index we will accept. 0 right after the init.
        /// Increases by exactly 1 per accepted chunk, never decreases,
        /// never skips. Doubles as the ack slot: the last applied message
        /// slot is always `next_chunk` (slot 0 = the init itself).
        next_chunk: u32,
        /// Payloads of accepted chunks, in index order by construction.
        chunks: Vec<String>,
    },

    /// Every chunk arrived exactly once. Terminal until `reset`.
    Complete {
        id: TransferId,
        name: String,
        mime_type: String,
        chunks: Vec<String>,
    },
}

/// What one scanned message did to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverProgress {
    /// A `send_init` was accepted; accumulation begins.
    Started,
    /// The expected chunk arrived and was applied.
    Accepted { chunk_index: u32 },
    /// The final chunk arrived (or an empty transfer's init);
    /// the transfer is complete.
    Completed,
    /// Duplicate, premature, foreign, or out-of-phase — nothing changed.
    Ignored,
}

/// A fully reassembled file, ready for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    /// File name announced by the sender.
    pub name: String,
    /// MIME type announced by the sender.
    pub mime_type: String,
    /// The raw decoded content.
    pub bytes: Vec<u8>,
}

/// An active receiving session.
///
/// State is mutated only through [`handle_scan`](Self::handle_scan) and
/// [`reset`](Self::reset); [`feedback_message`](Self::feedback_message)
/// and [`assemble`](Self::assemble) are pure reads.
#[derive(Debug, Default)]
pub struct ReceiverSession {
    state: ReceiverState,
}

impl Default for ReceiverState {
    fn default() -> Self {
        Self::AwaitingInit
    }
}

impl ReceiverSession {
    /// Creates a session waiting for a transfer to start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &ReceiverState {
        &self.state
    }

    /// Applies one decoded scan.
    ///
    /// The accept rule per state:
    /// - `AwaitingInit`: only `send_init`. Whatever transfer announces
    ///   itself first wins; its id scopes the rest of the session.
    /// - `Accumulating`: only `send_chunk` with the session's id and
    ///   `chunk_index == next_chunk`. A duplicate of an applied index or
    ///   any index beyond the expected one is ignored, which makes
    ///   redelivery idempotent and rejects out-of-order frames.
    /// - `Complete`: everything is ignored.
    pub fn handle_scan(&mut self, msg: &Message) -> ReceiverProgress {
        match &mut self.state {
            ReceiverState::AwaitingInit => match msg {
                Message::SendInit {
                    id,
                    name,
                    mime_type,
                    total_chunks,
                } => {
                    tracing::info!(
                        transfer_id = %id,
                        name = %name,
                        total_chunks,
                        "transfer announced, accumulating"
                    );
                    if *total_chunks <= 1 {
                        // Empty file: the init is the whole transfer.
                        self.state = ReceiverState::Complete {
                            id: id.clone(),
                            name: name.clone(),
                            mime_type: mime_type.clone(),
                            chunks: Vec::new(),
                        };
                        ReceiverProgress::Completed
                    } else {
                        self.state = ReceiverState::Accumulating {
                            id: id.clone(),
                            name: name.clone(),
                            mime_type: mime_type.clone(),
                            total: *total_chunks,
                            next_chunk: 0,
                            chunks: Vec::new(),
                        };
                        ReceiverProgress::Started
                    }
                }
                _ => {
                    tracing::trace!("not an init, ignoring while idle");
                    ReceiverProgress::Ignored
                }
            },

            ReceiverState::Accumulating {
                id,
                name,
                mime_type,
                total,
                next_chunk,
                chunks,
            } => match msg {
                Message::SendChunk {
                    id: msg_id,
                    chunk_index,
                    data,
                } if msg_id == id => {
                    if *chunk_index != *next_chunk {
                        tracing::trace!(
                            transfer_id = %id,
                            expected = *next_chunk,
                            got = *chunk_index,
                            "chunk out of step, ignoring"
                        );
                        return ReceiverProgress::Ignored;
                    }

                    chunks.push(data.clone());
                    let accepted = *next_chunk;
                    *next_chunk += 1;
                    tracing::debug!(
                        transfer_id = %id,
                        chunk = accepted,
                        of = *total - 1,
                        "chunk applied"
                    );

                    if *next_chunk == *total - 1 {
                        let id = id.clone();
                        let name = std::mem::take(name);
                        let mime_type = std::mem::take(mime_type);
                        let chunks = std::mem::take(chunks);
                        tracing::info!(
                            transfer_id = %id,
                            chunks = chunks.len(),
                            "all chunks received"
                        );
                        self.state = ReceiverState::Complete {
                            id,
                            name,
                            mime_type,
                            chunks,
                        };
                        ReceiverProgress::Completed
                    } else {
                        ReceiverProgress::Accepted {
                            chunk_index: accepted,
                        }
                    }
                }
                _ => ReceiverProgress::Ignored,
            },

            ReceiverState::Complete { .. } => ReceiverProgress::Ignored,
        }
    }

    /// The feedback frame to display back toward the sender right now.
    ///
    /// A pure function of state:
    /// - `AwaitingInit` → `None` (nothing to say yet).
    /// - `Accumulating` → `received_chunk` acknowledging the last applied
    ///   message slot. `next_chunk` *is* that slot: 0 acknowledges the
    ///   init, `k + 1` acknowledges data chunk `k`.
    /// - `Complete` → `receive_done`, redisplayed until the user leaves.
    pub fn feedback_message(&self) -> Option<Message> {
        match &self.state {
            ReceiverState::AwaitingInit => None,
            ReceiverState::Accumulating { id, next_chunk, .. } => {
                Some(Message::ReceivedChunk {
                    id: id.clone(),
                    chunk_index: *next_chunk,
                })
            }
            ReceiverState::Complete { id, .. } => {
                Some(Message::ReceiveDone { id: id.clone() })
            }
        }
    }

    /// Whether every chunk has been accepted.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, ReceiverState::Complete { .. })
    }

    /// Progress as `(chunks received, data chunks expected)`, or `None`
    /// before the init arrives ("waiting to receive").
    pub fn progress(&self) -> Option<(u32, u32)> {
        match &self.state {
            ReceiverState::AwaitingInit => None,
            ReceiverState::Accumulating {
                next_chunk, total, ..
            } => Some((*next_chunk, *total - 1)),
            ReceiverState::Complete { chunks, .. } => {
                let n = chunks.len() as u32;
                Some((n, n))
            }
        }
    }

    /// Reassembles the received content into the original bytes.
    ///
    /// # Errors
    /// - [`ReceiverError::Incomplete`] if called before completion.
    /// - [`ReceiverError::Assemble`] if the chunk text fails to decode.
    pub fn assemble(&self) -> Result<ReceivedFile, ReceiverError> {
        match &self.state {
            ReceiverState::Complete {
                name,
                mime_type,
                chunks,
                ..
            } => Ok(ReceivedFile {
                name: name.clone(),
                mime_type: mime_type.clone(),
                bytes: reassemble(chunks)?,
            }),
            _ => Err(ReceiverError::Incomplete),
        }
    }

    /// Discards everything and returns to `AwaitingInit`.
    ///
    /// Used on cancel and after the reassembled file has been handed off.
    pub fn reset(&mut self) {
        if !matches!(self.state, ReceiverState::AwaitingInit) {
            tracing::info!("receiver session reset");
        }
        self.state = ReceiverState::AwaitingInit;
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(s: &str) -> TransferId {
        TransferId(s.to_string())
    }

    fn init(id: &str, total: u32) -> Message {
        Message::SendInit {
            id: tid(id),
            name: "f.txt".into(),
            mime_type: "text/plain".into(),
            total_chunks: total,
        }
    }

    fn chunk(id: &str, index: u32, data: &str) -> Message {
        Message::SendChunk {
            id: tid(id),
            chunk_index: index,
            data: data.into(),
        }
    }

    // =====================================================================
    // AwaitingInit
    // =====================================================================

    #[test]
    fn test_handle_scan_init_starts_accumulating() {
        let mut session = ReceiverSession::new();

        let progress = session.handle_scan(&init("t", 3));

        assert_eq!(progress, ReceiverProgress::Started);
        assert_eq!(session.progress(), Some((0, 2)));
        // First feedback acknowledges the init slot.
        assert_eq!(
            session.feedback_message(),
            Some(Message::ReceivedChunk {
                id: tid("t"),
                chunk_index: 0,
            })
        );
    }

    #[test]
    fn test_handle_scan_non_init_while_idle_is_ignored() {
        let mut session = ReceiverSession::new();

        assert_eq!(
            session.handle_scan(&chunk("t", 0, "QQ==")),
            ReceiverProgress::Ignored
        );
        assert_eq!(
            session.handle_scan(&Message::ReceiveDone { id: tid("t") }),
            ReceiverProgress::Ignored
        );
        assert!(session.feedback_message().is_none());
    }

    #[test]
    fn test_handle_scan_empty_transfer_completes_on_init() {
        // totalChunks = 1 means the init is the whole transfer.
        let mut session = ReceiverSession::new();

        let progress = session.handle_scan(&init("t", 1));

        assert_eq!(progress, ReceiverProgress::Completed);
        assert!(session.is_complete());
        let file = session.assemble().unwrap();
        assert!(file.bytes.is_empty());
    }

    // =====================================================================
    // Accumulating — accept rule
    // =====================================================================

    #[test]
    fn test_handle_scan_in_order_chunks_advance_exactly_by_one() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 4));

        assert_eq!(
            session.handle_scan(&chunk("t", 0, "QUJD")),
            ReceiverProgress::Accepted { chunk_index: 0 }
        );
        assert_eq!(session.progress(), Some((1, 3)));

        assert_eq!(
            session.handle_scan(&chunk("t", 1, "REVG")),
            ReceiverProgress::Accepted { chunk_index: 1 }
        );
        assert_eq!(session.progress(), Some((2, 3)));
    }

    #[test]
    fn test_handle_scan_duplicate_chunk_is_idempotent() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 4));
        session.handle_scan(&chunk("t", 0, "QUJD"));

        // Same frame scanned again before the sender advances.
        let progress = session.handle_scan(&chunk("t", 0, "QUJD"));

        assert_eq!(progress, ReceiverProgress::Ignored);
        assert_eq!(session.progress(), Some((1, 3)));
    }

    #[test]
    fn test_handle_scan_premature_chunk_is_rejected() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 4));

        // Expecting 0, chunk 2 arrives — however far ahead, it's ignored.
        assert_eq!(
            session.handle_scan(&chunk("t", 2, "WFla")),
            ReceiverProgress::Ignored
        );
        assert_eq!(
            session.handle_scan(&chunk("t", 99, "WFla")),
            ReceiverProgress::Ignored
        );
        assert_eq!(session.progress(), Some((0, 3)));
    }

    #[test]
    fn test_handle_scan_mismatched_id_is_ignored() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 4));

        let progress = session.handle_scan(&chunk("other", 0, "QUJD"));

        assert_eq!(progress, ReceiverProgress::Ignored);
        assert_eq!(session.progress(), Some((0, 3)));
    }

    #[test]
    fn test_handle_scan_second_init_while_accumulating_is_ignored() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 4));
        session.handle_scan(&chunk("t", 0, "QUJD"));

        // A competing transfer announces itself mid-flight.
        let progress = session.handle_scan(&init("other", 9));

        assert_eq!(progress, ReceiverProgress::Ignored);
        assert_eq!(session.progress(), Some((1, 3)));
    }

    // =====================================================================
    // Completion
    // =====================================================================

    #[test]
    fn test_handle_scan_last_chunk_completes() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 3));
        session.handle_scan(&chunk("t", 0, "QUJD"));

        let progress = session.handle_scan(&chunk("t", 1, "REVG"));

        assert_eq!(progress, ReceiverProgress::Completed);
        assert!(session.is_complete());
        assert_eq!(
            session.feedback_message(),
            Some(Message::ReceiveDone { id: tid("t") })
        );
    }

    #[test]
    fn test_handle_scan_after_complete_is_ignored() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 2));
        session.handle_scan(&chunk("t", 0, "QUJD"));
        assert!(session.is_complete());

        assert_eq!(
            session.handle_scan(&chunk("t", 1, "REVG")),
            ReceiverProgress::Ignored
        );
        assert_eq!(
            session.handle_scan(&init("t2", 5)),
            ReceiverProgress::Ignored
        );
    }

    #[test]
    fn test_feedback_acks_track_last_applied_slot() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 4));

        // Slot 0 = init, slot k+1 = data chunk k.
        for (i, expected_slot) in [(0u32, 1u32), (1, 2)] {
            session.handle_scan(&chunk("t", i, "QUJD"));
            assert_eq!(
                session.feedback_message(),
                Some(Message::ReceivedChunk {
                    id: tid("t"),
                    chunk_index: expected_slot,
                })
            );
        }
    }

    // =====================================================================
    // assemble() / reset()
    // =====================================================================

    #[test]
    fn test_assemble_before_completion_is_incomplete() {
        let mut session = ReceiverSession::new();
        assert!(matches!(
            session.assemble(),
            Err(ReceiverError::Incomplete)
        ));

        session.handle_scan(&init("t", 3));
        assert!(matches!(
            session.assemble(),
            Err(ReceiverError::Incomplete)
        ));
    }

    #[test]
    fn test_assemble_decodes_chunks_in_order() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 3));
        // "hello world" base64-encoded, split across two chunks.
        session.handle_scan(&chunk("t", 0, "aGVsbG8g"));
        session.handle_scan(&chunk("t", 1, "d29ybGQ="));

        let file = session.assemble().unwrap();

        assert_eq!(file.name, "f.txt");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.bytes, b"hello world");
    }

    #[test]
    fn test_assemble_corrupt_chunk_text_fails() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 2));
        session.handle_scan(&chunk("t", 0, "!!! not base64 !!!"));

        assert!(matches!(
            session.assemble(),
            Err(ReceiverError::Assemble(_))
        ));
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut session = ReceiverSession::new();
        session.handle_scan(&init("t", 4));
        session.handle_scan(&chunk("t", 0, "QUJD"));

        session.reset();

        assert_eq!(session.state(), &ReceiverState::AwaitingInit);
        assert!(session.feedback_message().is_none());
        // A different transfer can now claim the session.
        assert_eq!(
            session.handle_scan(&init("t2", 2)),
            ReceiverProgress::Started
        );
    }
}
