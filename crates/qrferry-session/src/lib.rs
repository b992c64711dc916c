//! Transfer state machines for qrferry.
//!
//! Two cooperating sessions, one per device:
//!
//! - [`SenderSession`] decides which single message is currently displayed
//!   and advances only on acknowledgment (lockstep).
//! - [`ReceiverSession`] consumes decoded scans, validates ordering,
//!   accumulates chunks, and decides the feedback frame shown back.
//!
//! Both are plain synchronous values with no interior locking: each device
//! processes decoded scans strictly one at a time against its session, so
//! mutation is single-threaded by construction. The async endpoint layer
//! (the `qrferry` crate) owns a session and serializes access to it.
//!
//! Neither session trusts the channel with anything. Every transition is
//! gated on the transfer id and the expected index, which is what makes
//! dropped and duplicated frames harmless.

mod error;
mod receiver;
mod sender;

pub use error::{ReceiverError, SenderError};
pub use receiver::{
    ReceivedFile, ReceiverProgress, ReceiverSession, ReceiverState,
};
pub use sender::{SenderProgress, SenderSession, SenderState};
