//! Wire protocol for qrferry.
//!
//! This crate defines the "language" that the two devices speak across the
//! optical channel:
//!
//! - **Types** ([`Frame`], [`Message`], [`TransferId`]) — the structures
//!   that travel inside QR codes.
//! - **Codec** ([`FrameCodec`] trait, [`JsonFrameCodec`]) — how those
//!   structures are converted to/from frame text.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the optical channel (raw scanned text)
//! and the sessions (transfer state). It doesn't know about cameras or
//! chunk ordering — it only knows how to serialize and deserialize frames.
//!
//! ```text
//! Channel (text) → Protocol (Message) → Session (transfer state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::FrameCodec;
#[cfg(feature = "json")]
pub use codec::JsonFrameCodec;
pub use error::ProtocolError;
pub use types::{Frame, Message, TransferId, PROTOCOL_TAG};
