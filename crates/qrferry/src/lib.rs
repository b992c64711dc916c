//! # qrferry
//!
//! Peer-to-peer file transfer over an optical channel: two devices face
//! each other, each displaying QR codes for the other's camera, and a
//! file crosses the air-gap one chunk at a time with no network of any
//! kind.
//!
//! The channel has no delivery, ordering, or uniqueness guarantees — a
//! displayed code may be scanned many times or never. The protocol
//! compensates with strict lockstep: the sender displays exactly one
//! message and only advances when the receiver's on-screen acknowledgment
//! confirms it landed.
//!
//! This meta-crate re-exports the full stack and adds the endpoint layer
//! that drives it:
//!
//! | Layer | Crate | Job |
//! |-------|-------|-----|
//! | Protocol | `qrferry-protocol` | frame types + JSON codec |
//! | Transfer | `qrferry-transfer` | chunk encoding / reassembly |
//! | Session | `qrferry-session` | sender/receiver state machines |
//! | Channel | `qrferry-channel` | display/scanner traits + loopback |
//! | Endpoint | this crate | async loops, cancel, persistence |
//!
//! # Example
//!
//! A complete transfer over the in-memory loopback link:
//!
//! ```rust
//! use std::io::Cursor;
//! use qrferry::{
//!     loopback_pair, DocumentDescriptor, EndpointConfig, LoopbackConfig,
//!     ReceiveOutcome, ReceiverEndpoint, SenderEndpoint,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), qrferry::QrferryError> {
//! let (alice, bob) = loopback_pair(LoopbackConfig {
//!     scan_interval: std::time::Duration::from_millis(1),
//!     drop_rate: 0.0,
//! });
//! let config = EndpointConfig {
//!     refresh: std::time::Duration::from_millis(1),
//!     done_linger: std::time::Duration::from_millis(20),
//! };
//!
//! let content = b"a file, one QR code at a time".to_vec();
//! let doc = DocumentDescriptor::new(
//!     "hello.txt",
//!     "text/plain",
//!     content.len() as u64,
//! );
//!
//! let (a_display, a_scanner) = alice.split();
//! let (b_display, b_scanner) = bob.split();
//!
//! let (sender, _send_handle) = SenderEndpoint::start(
//!     doc,
//!     Cursor::new(content.clone()),
//!     a_display,
//!     a_scanner,
//!     config.clone(),
//! )?;
//! let (receiver, _recv_handle) =
//!     ReceiverEndpoint::new(b_display, b_scanner, config);
//!
//! let (sent, received) =
//!     tokio::try_join!(sender.run(), receiver.run())?;
//! let ReceiveOutcome::Completed(file) = received else {
//!     panic!("receive was cancelled");
//! };
//! assert_eq!(file.bytes, content);
//! # let _ = sent;
//! # Ok(())
//! # }
//! ```

mod endpoint;
mod error;
mod sink;

pub use endpoint::{
    EndpointCommand, EndpointConfig, ReceiveOutcome, ReceiverEndpoint,
    SendOutcome, SenderEndpoint, TransferHandle,
};
pub use error::QrferryError;
pub use sink::{DirectorySink, FileSink};

pub use qrferry_channel::{
    loopback_pair, ChannelError, CodeDisplay, CodeScanner, LoopbackConfig,
    LoopbackDisplay, LoopbackEnd, LoopbackScanner,
};
pub use qrferry_protocol::{
    Frame, FrameCodec, JsonFrameCodec, Message, ProtocolError, TransferId,
    PROTOCOL_TAG,
};
pub use qrferry_session::{
    ReceivedFile, ReceiverError, ReceiverProgress, ReceiverSession,
    ReceiverState, SenderError, SenderProgress, SenderSession, SenderState,
};
pub use qrferry_transfer::{
    encode_document, reassemble, DocumentDescriptor, TransferError,
    CHUNK_PAYLOAD_CHARS,
};
