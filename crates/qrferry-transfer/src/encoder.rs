//! The transfer encoder: turns a file into the ordered message sequence
//! that the sender will display.
//!
//! The pipeline is: raw bytes → base64 text → fixed-size text chunks →
//! one `send_chunk` message per chunk, prefixed by a `send_init` message
//! describing the whole transfer.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use qrferry_protocol::Message;

use crate::{DocumentDescriptor, TransferError};

/// Base64 characters of file content per chunk.
///
/// Chosen conservatively so that a full `send_chunk` frame — envelope,
/// transfer id, and payload — stays within the reliable capacity of a QR
/// code at the display/scan distance of two phones held face to face.
pub const CHUNK_PAYLOAD_CHARS: usize = 128;

/// Encodes a document's content into the complete message sequence:
/// `[send_init, send_chunk(0), …, send_chunk(M - 1)]`.
///
/// The init message's `total_chunks` is `M + 1` — it counts itself along
/// with the data chunks. That asymmetry is part of the wire format.
///
/// Empty content is legal and produces just the init (`total_chunks = 1`).
///
/// # Errors
/// Returns [`TransferError::SourceRead`] if the source cannot be read;
/// nothing is emitted and no session should be created in that case.
pub fn encode_document(
    doc: &DocumentDescriptor,
    mut source: impl Read,
) -> Result<Vec<Message>, TransferError> {
    let mut raw = Vec::new();
    source
        .read_to_end(&mut raw)
        .map_err(TransferError::SourceRead)?;

    let encoded = STANDARD.encode(&raw);
    let chunks = split_chunks(&encoded);

    let mut messages = Vec::with_capacity(chunks.len() + 1);
    messages.push(Message::SendInit {
        id: doc.transfer_id.clone(),
        name: doc.name.clone(),
        mime_type: doc.mime_type.clone(),
        total_chunks: chunks.len() as u32 + 1,
    });
    for (i, data) in chunks.into_iter().enumerate() {
        messages.push(Message::SendChunk {
            id: doc.transfer_id.clone(),
            chunk_index: i as u32,
            data,
        });
    }

    tracing::debug!(
        transfer_id = %doc.transfer_id,
        name = %doc.name,
        bytes = raw.len(),
        messages = messages.len(),
        "document encoded"
    );

    Ok(messages)
}

/// Slices base64 text into [`CHUNK_PAYLOAD_CHARS`]-sized pieces.
///
/// Base64 output is pure ASCII, so slicing at any byte offset is safe.
fn split_chunks(encoded: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = encoded;
    while !rest.is_empty() {
        let at = rest.len().min(CHUNK_PAYLOAD_CHARS);
        let (head, tail) = rest.split_at(at);
        chunks.push(head.to_string());
        rest = tail;
    }
    chunks
}

// =========================================================================
// Tests
// =========================================================================
