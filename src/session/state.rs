//! Session activity flags

use std::sync::atomic::{AtomicBool, Ordering};

/// `is_active` covers the whole session; `is_recording` only the audio chunk loop
#[derive(Debug, Default)]
pub struct SessionFlags {
    active: AtomicBool,
    recording: AtomicBool,
}

impl SessionFlags {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, value: bool) {
        self.active.store(value, Ordering::SeqCst);
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    pub fn set_recording(&self, value: bool) {
        self.recording.store(value, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.set_active(false);
        self.set_recording(false);
    }
}
