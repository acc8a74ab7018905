use flagrun_core::input::ActionSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted input: one entry per rendered frame, each held for `repeat`
/// frames. `frame_ms` is the real time each frame reports to the clock,
/// so a replay can also exercise catch-up and the spike cap.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub attack: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    fn actions(&self) -> ActionSet {
        ActionSet {
            move_left: self.left,
            move_right: self.right,
            jump: self.jump,
            attack: self.attack,
        }
    }
}

impl ReplaySequence {
    pub fn frame_us(&self) -> u64 {
        (self.frame_ms * 1000.0).round() as u64
    }

    pub fn expanded_inputs(&self) -> Vec<ActionSet> {
        self.frames
            .iter()
            .flat_map(|frame| std::iter::repeat(frame.actions()).take(frame.repeat.max(1) as usize))
            .collect()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if !(replay.frame_ms > 0.0) {
        return Err("Replay validation failed: frame_ms must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_frame_ms() -> f64 {
    16.667
}

const fn default_repeat() -> u32 {
    1
}
