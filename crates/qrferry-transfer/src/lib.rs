//! Content encoding for qrferry transfers.
//!
//! This crate turns files into protocol messages and back:
//!
//! - [`DocumentDescriptor`] — metadata for a file selected for sending,
//!   including the freshly generated [`TransferId`](qrferry_protocol::TransferId).
//! - [`encode_document`] — bytes → base64 → fixed-size chunks → the
//!   ordered `[send_init, send_chunk…]` message sequence.
//! - [`reassemble`] — received chunk payloads → raw bytes.
//!
//! It knows nothing about display order or acknowledgments — that's the
//! session crate's job. Given the same content, the encoder always
//! produces the same chunk sequence (modulo the random transfer id).

mod document;
mod encoder;
mod error;
mod reassemble;

pub use document::DocumentDescriptor;
pub use encoder::{encode_document, CHUNK_PAYLOAD_CHARS};
pub use error::TransferError;
pub use reassemble::reassemble;
