//! Reassembly: chunk payloads back into the original bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::TransferError;

/// Concatenates chunk payloads strictly in index order and decodes the
/// base64 text back into raw bytes.
///
/// The caller (the receiver session) guarantees the slice is already in
/// index order and gap-free — that's what the lockstep accept rule is for.
/// This function only undoes the text-safe encoding.
///
/// # Errors
/// Returns [`TransferError::ChunkData`] if the concatenation is not valid
/// base64. There is no checksum beyond that: content corrupted in a way
/// that still decodes passes through undetected.
pub fn reassemble(chunks: &[String]) -> Result<Vec<u8>, TransferError> {
    let combined: String =
        chunks.iter().map(String::as_str).collect();
    Ok(STANDARD.decode(combined)?)
}

// =========================================================================
// Tests
// =========================================================================
