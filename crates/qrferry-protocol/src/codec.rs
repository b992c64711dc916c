//! Codec trait and implementations for frame text.
//!
//! A "codec" (coder/decoder) converts between protocol messages and the
//! text that is actually rendered inside a QR code. The rest of the stack
//! doesn't care HOW frames are serialized — it just needs something that
//! implements the [`FrameCodec`] trait.
//!
//! Currently we provide [`JsonFrameCodec`] (human-readable, matches the
//! reference wire format). A more compact text encoding could be added
//! later without changing any other code.

use crate::{Frame, Message, ProtocolError};

/// A codec that can encode messages to frame text and decode scans back.
///
/// `Send + Sync + 'static` because a codec is shared between the render
/// and scan halves of an endpoint, which may live on different Tokio
/// worker threads.
///
/// # Decode contract
///
/// `decode` must never panic, whatever the camera delivered. Malformed
/// text, a foreign `qr` tag, an unknown `type`, or a bad payload shape all
/// come back as a [`ProtocolError`] — which callers treat as "ignore this
/// scan, change nothing".
pub trait FrameCodec: Send + Sync + 'static {
    /// Serializes a message into the text for one optical frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode(&self, message: &Message) -> Result<String, ProtocolError>;

    /// Parses scanned text back into a message.
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`] — not a well-formed frame.
    /// - [`ProtocolError::ForeignFrame`] — well-formed, but carries
    ///   another application's tag.
    fn decode(&self, text: &str) -> Result<Message, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonFrameCodec
// ---------------------------------------------------------------------------

/// A [`FrameCodec`] that uses JSON (via `serde_json`).
///
/// JSON keeps the frame text easy to eyeball when debugging a transfer
/// with a second QR scanner app. The size overhead is acceptable: a full `send_chunk` frame with a
/// 128-character payload stays comfortably inside the reliable capacity of
/// a QR code at arm's-length scanning distance.
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use qrferry_protocol::{FrameCodec, JsonFrameCodec, Message, TransferId};
///
/// let codec = JsonFrameCodec;
///
/// let msg = Message::ReceiveDone { id: TransferId("t-1".into()) };
/// let text = codec.encode(&msg).unwrap();
/// let decoded = codec.decode(&text).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFrameCodec;

#[cfg(feature = "json")]
impl FrameCodec for JsonFrameCodec {
    fn encode(&self, message: &Message) -> Result<String, ProtocolError> {
        let frame = Frame::new(message.clone());
        serde_json::to_string(&frame).map_err(ProtocolError::Encode)
    }

    fn decode(&self, text: &str) -> Result<Message, ProtocolError> {
        let frame: Frame =
            serde_json::from_str(text).map_err(ProtocolError::Decode)?;
        if !frame.is_ours() {
            return Err(ProtocolError::ForeignFrame(frame.qr));
        }
        Ok(frame.message)
    }
}

// =========================================================================
// Tests
// =========================================================================
