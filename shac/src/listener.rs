//! Lock-free listener pose transport.
//!
//! One writer (the control thread) publishes a new [`ListenerPose`] at any
//! rate; one reader (the real-time decode thread, inside
//! [`crate::decoder::Decoder::produce_block`]) reads the latest published
//! pose once per block. Neither side ever blocks: the writer bumps a
//! sequence counter around the write, the reader retries if it observes a
//! write in progress. A `Mutex` would be the simpler fix for handing a
//! value across threads without per-call allocation, but a lock is
//! disallowed on the audio thread here.

use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Listener orientation and position. Yaw and pitch are radians in the same
/// convention as [`crate::coord::Spherical`]; position translates source
/// coordinates before [`crate::coord::to_spherical`] is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerPose {
    pub yaw: f32,
    pub pitch: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for ListenerPose {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// A single-slot seqlock for [`ListenerPose`]. `Sync` because every access
/// goes through the sequence-counter protocol below rather than direct
/// aliasing.
pub struct PoseSlot {
    seq: AtomicU64,
    value: UnsafeCell<ListenerPose>,
}

// SAFETY: `value` is only ever written while `seq` is held odd (publish in
// progress) and only read after re-checking `seq` is even and unchanged,
// which is the standard seqlock invariant: a reader that observes a stable
// even sequence number before and after its copy saw a complete write.
unsafe impl Sync for PoseSlot {}

impl fmt::Debug for PoseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoseSlot")
            .field("seq", &self.seq.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl PoseSlot {
    pub fn new(initial: ListenerPose) -> Self {
        Self {
            seq: AtomicU64::new(0),
            value: UnsafeCell::new(initial),
        }
    }

    /// Publishes a new pose. Safe to call from any single writer thread;
    /// never blocks.
    pub fn publish(&self, pose: ListenerPose) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Release);
        // SAFETY: seq is now odd, signaling readers to retry; only this
        // writer touches `value` between the two seq stores.
        unsafe {
            *self.value.get() = pose;
        }
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Reads the most recently published pose. Never blocks; retries in a
    /// spin loop on the rare case a write is caught mid-flight, which on
    /// audio-block-rate call cadence resolves in at most a handful of
    /// iterations.
    pub fn read(&self) -> ListenerPose {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before % 2 != 0 {
                std::hint::spin_loop();
                continue;
            }
            // SAFETY: `before` was even, so no publish was in progress at
            // this instant; the value is consistent until we re-check seq.
            let value = unsafe { *self.value.get() };
            let after = self.seq.load(Ordering::Acquire);
            if before == after {
                return value;
            }
        }
    }
}
