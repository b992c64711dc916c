//! In-memory loopback link: two simulated screen/camera pairs.
//!
//! Each end's display writes into a `tokio::sync::watch` slot; the peer's
//! scanner *samples* that slot on a fixed interval, exactly like a camera
//! sampling a screen. The physics fall out for free:
//!
//! - a frame that persists across several sampling ticks is scanned
//!   several times (duplicates);
//! - a frame replaced between two ticks is never seen at all (loss).
//!
//! A configurable drop rate additionally discards sampled frames at
//! random, simulating misreads from glare or motion blur.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::{ChannelError, CodeDisplay, CodeScanner};

/// Tuning for a loopback link.
#[derive(Debug, Clone)]
pub struct LoopbackConfig {
    /// How often each simulated camera samples the peer's screen.
    pub scan_interval: Duration,
    /// Probability in `0.0..=1.0` that a sampled frame is discarded
    /// (simulated misread). 0.0 = perfect camera.
    pub drop_rate: f64,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_millis(5),
            drop_rate: 0.0,
        }
    }
}

/// Creates two connected ends: what A displays, B scans, and vice versa.
pub fn loopback_pair(
    config: LoopbackConfig,
) -> (LoopbackEnd, LoopbackEnd) {
    let (a_tx, a_rx) = watch::channel::<Option<String>>(None);
    let (b_tx, b_rx) = watch::channel::<Option<String>>(None);

    let a = LoopbackEnd {
        display: LoopbackDisplay { shown: a_tx },
        scanner: LoopbackScanner {
            peer: b_rx,
            config: config.clone(),
        },
    };
    let b = LoopbackEnd {
        display: LoopbackDisplay { shown: b_tx },
        scanner: LoopbackScanner {
            peer: a_rx,
            config,
        },
    };
    (a, b)
}

/// One device's half of the link: its screen plus its camera.
#[derive(Debug)]
pub struct LoopbackEnd {
    /// The simulated screen.
    pub display: LoopbackDisplay,
    /// The simulated camera, aimed at the peer's screen.
    pub scanner: LoopbackScanner,
}

impl LoopbackEnd {
    /// Splits the end into its display and scanner halves, so they can
    /// be moved into separate owners.
    pub fn split(self) -> (LoopbackDisplay, LoopbackScanner) {
        (self.display, self.scanner)
    }
}

/// The display half: whatever is `show`n stays visible until replaced.
#[derive(Debug)]
pub struct LoopbackDisplay {
    shown: watch::Sender<Option<String>>,
}

impl CodeDisplay for LoopbackDisplay {
    fn show(&mut self, text: &str) -> Result<(), ChannelError> {
        // send_replace never fails even with no active receivers; a
        // screen doesn't care whether anyone is looking at it.
        self.shown.send_replace(Some(text.to_string()));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ChannelError> {
        self.shown.send_replace(None);
        Ok(())
    }
}

/// The scanner half: samples the peer's screen on a fixed interval.
#[derive(Debug)]
pub struct LoopbackScanner {
    peer: watch::Receiver<Option<String>>,
    config: LoopbackConfig,
}

impl CodeScanner for LoopbackScanner {
    async fn next_scan(&mut self) -> Option<String> {
        loop {
            tokio::time::sleep(self.config.scan_interval).await;

            // A dropped peer display with a blank screen means the feed
            // is gone for good. A frozen non-blank screen keeps being
            // scanned — the code is still physically visible.
            let peer_gone = self.peer.has_changed().is_err();
            let frame = self.peer.borrow_and_update().clone();

            match frame {
                Some(text) => {
                    if self.config.drop_rate > 0.0
                        && rand::rng().random::<f64>()
                            < self.config.drop_rate
                    {
                        tracing::trace!("simulated misread, frame dropped");
                        continue;
                    }
                    return Some(text);
                }
                None if peer_gone => return None,
                None => continue,
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> LoopbackConfig {
        LoopbackConfig {
            scan_interval: Duration::from_millis(1),
            drop_rate: 0.0,
        }
    }

    #[tokio::test]
    async fn test_scanner_sees_what_peer_displays() {
        let (mut a, mut b) = loopback_pair(fast_config());

        a.display.show("frame-1").unwrap();

        let scanned = b.scanner.next_scan().await;
        assert_eq!(scanned.as_deref(), Some("frame-1"));
    }

    #[tokio::test]
    async fn test_persisting_frame_is_scanned_repeatedly() {
        // The defining property of the optical channel: a frame that
        // stays on screen is decoded over and over.
        let (mut a, mut b) = loopback_pair(fast_config());
        a.display.show("steady").unwrap();

        for _ in 0..3 {
            assert_eq!(
                b.scanner.next_scan().await.as_deref(),
                Some("steady")
            );
        }
    }

    #[tokio::test]
    async fn test_replaced_frame_is_what_gets_scanned() {
        let (mut a, mut b) = loopback_pair(fast_config());

        // Both shown before the camera's next sample: the first frame
        // is simply lost.
        a.display.show("blink-and-miss-it").unwrap();
        a.display.show("current").unwrap();

        assert_eq!(
            b.scanner.next_scan().await.as_deref(),
            Some("current")
        );
    }

    #[tokio::test]
    async fn test_both_directions_are_independent() {
        let (mut a, mut b) = loopback_pair(fast_config());

        a.display.show("from-a").unwrap();
        b.display.show("from-b").unwrap();

        assert_eq!(b.scanner.next_scan().await.as_deref(), Some("from-a"));
        assert_eq!(a.scanner.next_scan().await.as_deref(), Some("from-b"));
    }

    #[tokio::test]
    async fn test_scanner_returns_none_when_blank_peer_is_gone() {
        let (a, mut b) = loopback_pair(fast_config());

        drop(a.display); // screen torn down without ever showing a frame

        assert_eq!(b.scanner.next_scan().await, None);
    }

    #[tokio::test]
    async fn test_frozen_frame_outlives_dropped_display() {
        // The code is still on the (frozen) screen; scanning continues.
        let (mut a, mut b) = loopback_pair(fast_config());
        a.display.show("last-words").unwrap();
        drop(a.display);

        assert_eq!(
            b.scanner.next_scan().await.as_deref(),
            Some("last-words")
        );
    }

    #[tokio::test]
    async fn test_clear_blanks_the_screen() {
        let (mut a, mut b) = loopback_pair(fast_config());
        a.display.show("x").unwrap();
        assert_eq!(b.scanner.next_scan().await.as_deref(), Some("x"));

        a.display.clear().unwrap();
        drop(a.display);

        // Blank + gone → feed over.
        assert_eq!(b.scanner.next_scan().await, None);
    }
}
