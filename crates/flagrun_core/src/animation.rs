//! Frame-count sprite animation with deterministic tick logic.
//!
//! A clip is a strip of `frames` equally long frames. Every entity keeps one
//! [`AnimationState`] keyed by its own state enum; switching key restarts the
//! strip at frame 0 so each state always plays from its first frame.
//!
//! Timing uses integer microseconds (`u64`) to guarantee deterministic
//! advancement under the fixed-timestep model. The JSON form stores
//! `interval_ms` for readability; it is converted to `interval_us` on load.

use serde::Deserialize;

/// A looping strip of equally timed frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AnimationClipJson")]
pub struct AnimationClip {
    pub frames: u32,
    pub interval_us: u64,
}

impl AnimationClip {
    pub const fn from_ms(frames: u32, interval_ms: u64) -> Self {
        Self {
            frames,
            interval_us: interval_ms * 1000,
        }
    }

    /// Duration of one full pass through the strip.
    pub fn total_duration_us(&self) -> u64 {
        self.frames as u64 * self.interval_us
    }
}

/// Runtime state for one animated entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState<K> {
    pub key: K,
    pub frame_index: u32,
    pub elapsed_us: u64,
}

impl<K: Copy + PartialEq> AnimationState<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            frame_index: 0,
            elapsed_us: 0,
        }
    }

    /// Start part-way through a strip. Used to desynchronise identical entities.
    pub fn with_phase(key: K, frame_index: u32, elapsed_us: u64) -> Self {
        Self {
            key,
            frame_index,
            elapsed_us,
        }
    }

    /// Switch to `key`. Returns true (and rewinds) only when the key changed.
    pub fn play(&mut self, key: K) -> bool {
        if self.key == key {
            return false;
        }
        self.key = key;
        self.rewind();
        true
    }

    pub fn rewind(&mut self) {
        self.frame_index = 0;
        self.elapsed_us = 0;
    }

    /// Advance by `dt_us`. At most one frame is advanced per call; the timer
    /// restarts from zero on each advance so a long tick never skips frames.
    pub fn tick(&mut self, dt_us: u64, clip: &AnimationClip) -> u32 {
        if clip.frames == 0 {
            self.frame_index = 0;
            return 0;
        }

        self.elapsed_us += dt_us;
        if self.elapsed_us > clip.interval_us {
            self.elapsed_us = 0;
            self.frame_index = (self.frame_index + 1) % clip.frames;
        }
        self.frame_index
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct AnimationClipJson {
    frames: u32,
    interval_ms: u64,
}

impl TryFrom<AnimationClipJson> for AnimationClip {
    type Error = String;

    fn try_from(json: AnimationClipJson) -> Result<Self, Self::Error> {
        if json.frames == 0 {
            return Err("Animation validation failed: clip has no frames".to_string());
        }
        if json.interval_ms == 0 {
            return Err("Animation validation failed: clip has zero interval".to_string());
        }
        Ok(AnimationClip::from_ms(json.frames, json.interval_ms))
    }
}
