//! Error types for the protocol layer.
//!
//! Each crate in qrferry defines its own error enum. A `ProtocolError`
//! always means "this text could not be turned into a trusted message" —
//! never a chunking or state-machine problem.
//!
//! Callers in the scan path treat every variant the same way: ignore the
//! frame and change no state. A camera pointed at the world produces noise,
//! partial reads, and other people's QR codes as a matter of course.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into frame text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong
    /// field types, or an unrecognized message `type` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The text parsed as a well-formed frame, but its `qr` marker is not
    /// ours. The scanned code belongs to some other application.
    #[error("foreign frame tag: {0:?}")]
    ForeignFrame(String),
}
