//! Optical channel abstraction for qrferry.
//!
//! Provides the [`CodeDisplay`] and [`CodeScanner`] traits that abstract
//! over "one screen renders a code, one camera decodes it". A platform
//! app implements these with its QR renderer and camera scanner; this
//! crate ships an in-memory [`loopback`] implementation for tests and
//! demos.
//!
//! # The channel's (non-)guarantees
//!
//! The two loops are fully independent — there is no ordering between a
//! frame being shown and a frame being scanned, no delivery guarantee, no
//! backpressure, and no way to tell the peer anything except by changing
//! what's on screen. Two failure modes are *normal operation*:
//!
//! - **lost frames** — the display moves on before the camera catches it;
//! - **duplicate frames** — the camera decodes the same frame many times
//!   before it changes.
//!
//! Correctness under both is the protocol layer's job (idempotent,
//! index-gated transitions), never this crate's.
//!
//! # Feature Flags
//!
//! - `loopback` (default) — in-memory link via `tokio::sync::watch`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "loopback")]
mod loopback;

pub use error::ChannelError;
#[cfg(feature = "loopback")]
pub use loopback::{
    loopback_pair, LoopbackConfig, LoopbackDisplay, LoopbackEnd,
    LoopbackScanner,
};

/// The render side: whatever can show one optical code at a time.
///
/// `show` *replaces* the displayed code. Endpoints call it repeatedly at
/// their own refresh cadence, usually with the same text — a display may
/// treat a repeated frame as a no-op.
pub trait CodeDisplay: Send + 'static {
    /// Replaces the currently rendered optical code with `text`.
    fn show(&mut self, text: &str) -> Result<(), ChannelError>;

    /// Stops displaying anything (e.g., before the first frame exists).
    ///
    /// Defaults to a no-op; displays with a meaningful blank state
    /// should override.
    fn clear(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// The scan side: whatever can decode optical codes from a live feed.
///
/// Implementations deliver *raw decoded text*, unvalidated — noise,
/// foreign codes, and duplicates included. Filtering is the protocol
/// layer's job.
pub trait CodeScanner: Send + 'static {
    /// Waits for the next decoded scan.
    ///
    /// Returns `None` when the feed is permanently gone (camera closed).
    /// Duplicates of a persisting frame are expected and delivered as-is.
    async fn next_scan(&mut self) -> Option<String>;
}
