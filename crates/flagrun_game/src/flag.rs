use flagrun_core::animation::AnimationState;

use crate::collision::{intersects, Rect};
use crate::config::FlagTuning;
use crate::session::SessionSink;

/// A collectible. The whole flag rect is its hitbox.
#[derive(Debug, Clone)]
pub struct Flag {
    pub rect: Rect,
    collected: bool,
    animation: AnimationState<()>,
    tuning: FlagTuning,
}

impl Flag {
    /// A flag standing on `foot_y`.
    pub fn new(x: f32, foot_y: f32, tuning: &FlagTuning) -> Self {
        Self {
            rect: Rect::new(x, foot_y - tuning.height, tuning.width, tuning.height),
            collected: false,
            animation: AnimationState::new(()),
            tuning: *tuning,
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    pub fn current_frame(&self) -> u32 {
        self.animation.frame_index
    }

    pub fn update(&mut self, dt_us: u64, player_hitbox: &Rect, sink: &mut dyn SessionSink) {
        if self.collected {
            return;
        }
        self.animation.tick(dt_us, &self.tuning.animation);
        if intersects(player_hitbox, &self.rect) {
            self.collect(sink);
        }
    }

    fn collect(&mut self, sink: &mut dyn SessionSink) {
        self.collected = true;
        sink.on_flag_collected();
        sink.on_score_delta(self.tuning.score);
    }
}
