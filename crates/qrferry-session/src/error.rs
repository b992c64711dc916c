//! Error types for the session layer.

use qrferry_transfer::TransferError;

/// Errors that can occur while starting a sender session.
///
/// Note how small this is: once a sender session exists, nothing the
/// channel delivers can error it — unusable feedback is ignored, not
/// failed. The only way to not get a session is failing to encode.
#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    /// Encoding the source content failed (unreadable source).
    /// The session is never created; surface this to the user once.
    #[error(transparent)]
    Encoding(#[from] TransferError),
}

/// Errors that can occur while finishing a receiver session.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    /// `assemble` was called before the transfer completed.
    #[error("transfer is not complete")]
    Incomplete,

    /// The accumulated chunk data did not decode back to bytes.
    #[error(transparent)]
    Assemble(#[from] TransferError),
}
