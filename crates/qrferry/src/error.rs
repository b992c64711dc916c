//! Unified error type for the qrferry facade.

use qrferry_channel::ChannelError;
use qrferry_protocol::ProtocolError;
use qrferry_session::{ReceiverError, SenderError};
use qrferry_transfer::TransferError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `qrferry` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
///
/// Note what is *not* in here: anything about bad scans. An undecodable
/// or out-of-phase frame is normal channel behavior and never surfaces
/// as an error — it is logged and dropped inside the endpoint loop.
#[derive(Debug, thiserror::Error)]
pub enum QrferryError {
    /// A protocol-level error (frame encode failed).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A transfer-level error (source read, chunk decode).
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// A sender-session error (encoding at start).
    #[error(transparent)]
    Sender(#[from] SenderError),

    /// A receiver-session error (assembly).
    #[error(transparent)]
    Receiver(#[from] ReceiverError),

    /// A channel-level error (display gone, feed closed).
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_channel_error() {
        let err = ChannelError::Closed("camera off".into());
        let top: QrferryError = err.into();
        assert!(matches!(top, QrferryError::Channel(_)));
        assert!(top.to_string().contains("camera off"));
    }

    #[test]
    fn test_from_receiver_error() {
        let err = ReceiverError::Incomplete;
        let top: QrferryError = err.into();
        assert!(matches!(top, QrferryError::Receiver(_)));
    }
}
