use flagrun_core::animation::AnimationState;
use rand::Rng;

use crate::collision::{intersects, Facing, Rect};
use crate::config::EnemyTuning;
use crate::player::Player;
use crate::session::SessionSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Alive,
    /// Out of health; removed from the level at the end of the frame.
    Dying,
}

/// A patroller walking back and forth around its spawn point.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub rect: Rect,
    pub spawn_x: f32,
    pub speed: f32,
    pub direction: Facing,
    /// Half-width of the patrol band.
    pub patrol_distance: f32,
    pub health: i32,
    state: EnemyState,
    animation: AnimationState<EnemyState>,
    tuning: EnemyTuning,
}

impl Enemy {
    pub fn new(
        rect: Rect,
        tuning: &EnemyTuning,
        patrol_distance: f32,
        direction: Facing,
        start_frame: u32,
    ) -> Self {
        Self {
            rect,
            spawn_x: rect.x,
            speed: tuning.speed,
            direction,
            patrol_distance,
            health: tuning.health,
            state: EnemyState::Alive,
            animation: AnimationState::with_phase(
                EnemyState::Alive,
                start_frame % tuning.animation.frames.max(1),
                0,
            ),
            tuning: *tuning,
        }
    }

    /// Place an enemy standing on `foot_y`, with a random patrol band,
    /// starting direction and animation phase so neighbours drift apart.
    pub fn spawn(x: f32, foot_y: f32, tuning: &EnemyTuning, rng: &mut impl Rng) -> Self {
        let jitter = if tuning.patrol_jitter > 0.0 {
            rng.gen_range(0.0..tuning.patrol_jitter)
        } else {
            0.0
        };
        let direction = if rng.gen_bool(0.5) {
            Facing::Right
        } else {
            Facing::Left
        };
        let clip = tuning.animation;
        let start_frame = rng.gen_range(0..clip.frames.max(1));
        let mut enemy = Self::new(
            Rect::new(x, foot_y - tuning.height, tuning.width, tuning.height),
            tuning,
            tuning.patrol_min + jitter,
            direction,
            start_frame,
        );
        enemy.animation.elapsed_us = rng.gen_range(0..clip.interval_us.max(1));
        enemy
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn current_frame(&self) -> u32 {
        self.animation.frame_index
    }

    pub fn hitbox(&self) -> Rect {
        let t = &self.tuning;
        self.rect.sub_rect(
            (t.width - t.hitbox_width) / 2.0,
            t.height - t.hitbox_height,
            t.hitbox_width,
            t.hitbox_height,
        )
    }

    pub fn update(
        &mut self,
        dt_us: u64,
        platforms: &[Rect],
        player: &mut Player,
        sink: &mut dyn SessionSink,
    ) {
        if !self.is_alive() {
            return;
        }
        self.patrol(platforms);
        self.animation.tick(dt_us, &self.tuning.animation);
        self.check_player_contact(player, sink);
    }

    fn patrol(&mut self, platforms: &[Rect]) {
        self.rect.x += self.speed * self.direction.sign();

        if self.rect.x > self.spawn_x + self.patrol_distance {
            self.direction = Facing::Left;
        } else if self.rect.x < self.spawn_x - self.patrol_distance {
            self.direction = Facing::Right;
        }

        // Tiles only turn the enemy around; they never move it. Facing away
        // from the tile holds even when the band edge already turned it.
        let hitbox = self.hitbox();
        if let Some(tile) = platforms.iter().find(|tile| intersects(&hitbox, tile)) {
            let centre = hitbox.x + hitbox.width / 2.0;
            self.direction = if tile.x + tile.width / 2.0 > centre {
                Facing::Left
            } else {
                Facing::Right
            };
        }
    }

    // Contact is one-sided: only the player can die from it.
    fn check_player_contact(&self, player: &mut Player, sink: &mut dyn SessionSink) {
        if player.is_dead() || player.is_attacking() {
            return;
        }
        if intersects(&player.hitbox(), &self.hitbox()) {
            log::debug!("Player touched an enemy at x={:.1}", self.rect.x);
            player.die(sink);
        }
    }

    /// Subtract `amount` health. Crossing zero awards the kill score once.
    pub fn take_damage(&mut self, amount: i32, sink: &mut dyn SessionSink) {
        if !self.is_alive() {
            return;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.state = EnemyState::Dying;
            sink.on_score_delta(self.tuning.score);
        }
    }
}
