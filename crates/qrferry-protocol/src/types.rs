//! Core protocol types for qrferry's wire format.
//!
//! This module defines every structure that travels "on the wire" — except
//! that here the wire is an optical one: each value is serialized to JSON
//! text, rendered as a QR code on one screen, and decoded by the camera of
//! the other device.
//!
//! Think of this as the "language" that the sender and receiver speak.

use serde::{Deserialize, Serialize};

use std::fmt;

/// The fixed protocol marker carried by every frame.
///
/// Cameras see a lot of QR codes that have nothing to do with us — posters,
/// boarding passes, the other half of a different transfer. Any scanned code
/// whose `qr` field is not exactly this value is rejected before a single
/// payload field is trusted.
pub const PROTOCOL_TAG: &str = "p2pqr";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A random token scoping every message of one file transfer.
///
/// This is a "newtype wrapper" over `String` — the same pattern as an ID
/// type over `u64`, but the token is an opaque 32-character hex string
/// (128 bits of randomness) so two transfers can never collide by accident.
///
/// Every message carries the transfer id, and both state machines compare
/// it against their active session before letting the message affect state.
/// A mismatch is a no-op: stale frames from an earlier transfer, or frames
/// from an unrelated transfer in the same room, simply bounce off.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(pub String);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Message — the closed set of protocol messages
// ---------------------------------------------------------------------------

/// A protocol message: the payload of one optical frame.
///
/// `#[serde(tag = "type", content = "payload")]` produces "adjacently
/// tagged" JSON, which is exactly the wire shape:
///
/// ```json
/// { "type": "send_chunk", "payload": { "id": "…", "chunkIndex": 0, "data": "…" } }
/// ```
///
/// `rename_all = "snake_case"` turns the variant names into the wire tags
/// (`send_init`, `send_chunk`, `received_chunk`, `receive_done`). Field
/// names that are camelCase on the wire carry explicit renames.
///
/// ## Chunk counting
///
/// `total_chunks` counts the init message **plus** the data chunks, while
/// `chunk_index` in [`SendChunk`](Message::SendChunk) counts only data
/// chunks from 0. The `chunk_index` inside
/// [`ReceivedChunk`](Message::ReceivedChunk) is different again: it is a
/// *message-slot* index, where slot 0 is the init message and slot `k + 1`
/// is data chunk `k`. These three schemes are wire-visible and kept as-is
/// for compatibility; see the session crate for how they line up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Sender → Receiver: "a transfer is starting, here is its shape."
    /// Displayed first and redisplayed until the receiver acknowledges it.
    SendInit {
        id: TransferId,
        name: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
        /// Number of data chunks plus one (the init message counts itself).
        #[serde(rename = "totalChunks")]
        total_chunks: u32,
    },

    /// Sender → Receiver: one slice of the base64-encoded file content.
    SendChunk {
        id: TransferId,
        /// 0-based index over data chunks only.
        #[serde(rename = "chunkIndex")]
        chunk_index: u32,
        /// Up to 128 base64 characters of file content.
        data: String,
    },

    /// Receiver → Sender: "I have applied everything up to this slot."
    /// Slot 0 acknowledges the init; slot `k + 1` acknowledges chunk `k`.
    ReceivedChunk {
        id: TransferId,
        #[serde(rename = "chunkIndex")]
        chunk_index: u32,
    },

    /// Receiver → Sender: "every chunk arrived, the transfer is finished."
    ReceiveDone { id: TransferId },
}

impl Message {
    /// The transfer id carried by this message, whichever variant it is.
    pub fn transfer_id(&self) -> &TransferId {
        match self {
            Message::SendInit { id, .. }
            | Message::SendChunk { id, .. }
            | Message::ReceivedChunk { id, .. }
            | Message::ReceiveDone { id } => id,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame — the top-level wire object
// ---------------------------------------------------------------------------

/// The top-level wire object: one frame = one QR code.
///
/// The frame adds the fixed [`PROTOCOL_TAG`] next to the message fields:
///
/// ```json
/// { "qr": "p2pqr", "type": "send_init", "payload": { … } }
/// ```
///
/// `#[serde(flatten)]` merges the message's `type`/`payload` fields into
/// the same JSON object as `qr`, so the wire stays a single flat envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Protocol marker; must equal [`PROTOCOL_TAG`] to be accepted.
    pub qr: String,
    /// The protocol message itself.
    #[serde(flatten)]
    pub message: Message,
}

impl Frame {
    /// Wraps a message in a frame carrying the protocol tag.
    pub fn new(message: Message) -> Self {
        Self {
            qr: PROTOCOL_TAG.to_string(),
            message,
        }
    }

    /// Whether this frame carries our protocol tag (vs. a foreign code).
    pub fn is_ours(&self) -> bool {
        self.qr == PROTOCOL_TAG
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Tests for protocol types and their JSON serialization.
    //!
    //! The wire format is shared with other implementations of this
    //! protocol, so these tests pin the exact JSON shapes — a mismatch
    //! means the peer's scanner can't parse our frames.

    use super::*;

    fn tid(s: &str) -> TransferId {
        TransferId(s.to_string())
    }

    // =====================================================================
    // TransferId
    // =====================================================================

    #[test]
    fn test_transfer_id_serializes_as_plain_string() {
        // `#[serde(transparent)]` means TransferId("abc") → `"abc"`,
        // not `{"0":"abc"}`.
        let json = serde_json::to_string(&tid("abc123")).unwrap();
        assert_eq!(json, "\"abc123\"");
    }

    #[test]
    fn test_transfer_id_deserializes_from_plain_string() {
        let id: TransferId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(id, tid("abc123"));
    }

    #[test]
    fn test_transfer_id_display() {
        assert_eq!(tid("deadbeef").to_string(), "deadbeef");
    }

    // =====================================================================
    // Message — one test per variant to pin the wire shape
    // =====================================================================

    #[test]
    fn test_send_init_json_format() {
        let msg = Message::SendInit {
            id: tid("t-1"),
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            total_chunks: 4,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "send_init");
        assert_eq!(json["payload"]["id"], "t-1");
        assert_eq!(json["payload"]["name"], "notes.txt");
        assert_eq!(json["payload"]["mimeType"], "text/plain");
        assert_eq!(json["payload"]["totalChunks"], 4);
    }

    #[test]
    fn test_send_chunk_json_format() {
        let msg = Message::SendChunk {
            id: tid("t-1"),
            chunk_index: 2,
            data: "aGVsbG8=".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "send_chunk");
        assert_eq!(json["payload"]["chunkIndex"], 2);
        assert_eq!(json["payload"]["data"], "aGVsbG8=");
    }

    #[test]
    fn test_received_chunk_json_format() {
        let msg = Message::ReceivedChunk {
            id: tid("t-1"),
            chunk_index: 0,
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "received_chunk");
        assert_eq!(json["payload"]["id"], "t-1");
        assert_eq!(json["payload"]["chunkIndex"], 0);
    }

    #[test]
    fn test_receive_done_json_format() {
        let msg = Message::ReceiveDone { id: tid("t-1") };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "receive_done");
        assert_eq!(json["payload"]["id"], "t-1");
    }

    #[test]
    fn test_message_round_trips() {
        let msgs = [
            Message::SendInit {
                id: tid("a"),
                name: "f".into(),
                mime_type: "application/octet-stream".into(),
                total_chunks: 1,
            },
            Message::SendChunk {
                id: tid("a"),
                chunk_index: 7,
                data: "QUJD".into(),
            },
            Message::ReceivedChunk {
                id: tid("a"),
                chunk_index: 7,
            },
            Message::ReceiveDone { id: tid("a") },
        ];
        for msg in msgs {
            let text = serde_json::to_string(&msg).unwrap();
            let decoded: Message = serde_json::from_str(&text).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    #[test]
    fn test_message_transfer_id_accessor() {
        let msg = Message::ReceiveDone { id: tid("xyz") };
        assert_eq!(msg.transfer_id(), &tid("xyz"));
    }

    #[test]
    fn test_decode_unknown_message_type_returns_error() {
        // A frame payload with an unknown "type" tag should fail.
        let unknown = r#"{"type": "send_everything", "payload": {}}"#;
        let result: Result<Message, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    // =====================================================================
    // Frame
    // =====================================================================

    #[test]
    fn test_frame_json_is_flat_envelope() {
        // `#[serde(flatten)]` must merge qr/type/payload into one object.
        let frame = Frame::new(Message::ReceiveDone { id: tid("t-9") });
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["qr"], "p2pqr");
        assert_eq!(json["type"], "receive_done");
        assert_eq!(json["payload"]["id"], "t-9");
    }

    #[test]
    fn test_frame_deserializes_from_wire_literal() {
        // Field-for-field wire literal, camelCase names included.
        let text = r#"{
            "qr": "p2pqr",
            "type": "send_chunk",
            "payload": { "id": "t-1", "chunkIndex": 0, "data": "QUJDRA==" }
        }"#;
        let frame: Frame = serde_json::from_str(text).unwrap();

        assert!(frame.is_ours());
        assert_eq!(
            frame.message,
            Message::SendChunk {
                id: tid("t-1"),
                chunk_index: 0,
                data: "QUJDRA==".into(),
            }
        );
    }

    #[test]
    fn test_frame_with_foreign_tag_is_not_ours() {
        let text = r#"{
            "qr": "someone-elses-app",
            "type": "receive_done",
            "payload": { "id": "t-1" }
        }"#;
        let frame: Frame = serde_json::from_str(text).unwrap();
        assert!(!frame.is_ours());
    }
}
