//! Document metadata: what the sender knows about the file being offered.

use qrferry_protocol::TransferId;
use rand::Rng;

/// Metadata for a file selected for sending.
///
/// Created once when the user picks a file, then immutable for the rest of
/// the session. The sender state machine owns the descriptor for the
/// session's duration; the receiver learns `name` and `mime_type` from the
/// `send_init` message instead.
#[derive(Debug, Clone)]
pub struct DocumentDescriptor {
    /// Random token scoping every message of this transfer.
    pub transfer_id: TransferId,
    /// File name, carried verbatim to the receiver.
    pub name: String,
    /// MIME type, carried verbatim to the receiver.
    pub mime_type: String,
    /// Size of the raw content in bytes (display only; the protocol
    /// tracks progress in chunks, not bytes).
    pub size: u64,
}

impl DocumentDescriptor {
    /// Creates a descriptor for a freshly selected file, generating a new
    /// random transfer id.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            transfer_id: generate_transfer_id(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// The id is the only thing scoping messages to a transfer — there is no
/// peer authentication beyond it — so it must be unguessable enough that
/// two transfers never collide and stale frames from an earlier session
/// can't be mistaken for current ones.
fn generate_transfer_id() -> TransferId {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    TransferId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_32_hex_char_id() {
        let doc = DocumentDescriptor::new("a.txt", "text/plain", 10);
        assert_eq!(doc.transfer_id.0.len(), 32);
        assert!(doc.transfer_id.0.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_new_ids_are_unique_per_document() {
        let a = DocumentDescriptor::new("a.txt", "text/plain", 1);
        let b = DocumentDescriptor::new("a.txt", "text/plain", 1);
        assert_ne!(a.transfer_id, b.transfer_id, "ids must be unique");
    }

    #[test]
    fn test_new_preserves_metadata() {
        let doc = DocumentDescriptor::new("report.pdf", "application/pdf", 4096);
        assert_eq!(doc.name, "report.pdf");
        assert_eq!(doc.mime_type, "application/pdf");
        assert_eq!(doc.size, 4096);
    }
}
