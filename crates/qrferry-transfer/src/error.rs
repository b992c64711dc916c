//! Error types for the transfer layer.

/// Errors that can occur while encoding a document into messages or
/// reassembling received chunks back into bytes.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Reading the source content failed before any message was built.
    ///
    /// This aborts the transfer up front: no sender session is created,
    /// and the failure is surfaced to the user exactly once.
    #[error("could not read source content: {0}")]
    SourceRead(#[source] std::io::Error),

    /// A received chunk concatenation is not valid base64.
    ///
    /// Chunks are accepted structurally (valid frame, right index), so a
    /// payload corrupted in a way that still parses as JSON only shows up
    /// here, at reassembly time. There is no per-chunk checksum.
    #[error("chunk data is not valid base64: {0}")]
    ChunkData(#[from] base64::DecodeError),
}
