use flagrun_core::animation::AnimationState;
use flagrun_core::input::{Action, InputSource};
use flagrun_core::scheduler::{Generation, Scheduler};

use crate::collision::{
    attack_hitbox, intersects, resolve_platforms, Body, ContactState, Facing, Rect,
};
use crate::config::PlayerTuning;
use crate::enemy::Enemy;
use crate::session::SessionSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Running,
    Jumping,
    Attacking,
    Dead,
}

impl PlayerState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Jumping => "jumping",
            Self::Attacking => "attacking",
            Self::Dead => "dead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTimerKind {
    AttackFinished,
    CooldownElapsed,
    GameOver,
}

/// A deferred transition addressed to one player instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTimer {
    pub player: Generation,
    pub kind: PlayerTimerKind,
}

/// What the player collides with during its own update.
pub struct Surroundings<'a> {
    pub platforms: &'a [Rect],
    pub enemies: &'a mut [Enemy],
    pub exit: Rect,
    /// Falling below this y is fatal.
    pub world_bottom: f32,
}

#[derive(Debug, Clone)]
pub struct Player {
    generation: Generation,
    pub body: Body,
    pub facing: Facing,
    pub contacts: ContactState,
    state: PlayerState,
    animation: AnimationState<PlayerState>,
    on_cooldown: bool,
    tuning: PlayerTuning,
}

impl Player {
    pub fn new(generation: Generation, tuning: &PlayerTuning) -> Self {
        let rect = Rect::new(tuning.spawn_x, tuning.spawn_y, tuning.width, tuning.height);
        Self {
            generation,
            body: Body::new(rect),
            facing: Facing::Right,
            contacts: ContactState::default(),
            state: PlayerState::Idle,
            animation: AnimationState::new(PlayerState::Idle),
            on_cooldown: false,
            tuning: tuning.clone(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == PlayerState::Dead
    }

    pub fn is_attacking(&self) -> bool {
        self.state == PlayerState::Attacking
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.on_cooldown
    }

    pub fn current_frame(&self) -> u32 {
        self.animation.frame_index
    }

    /// Gameplay box: narrower than the body and flush with its feet.
    pub fn hitbox(&self) -> Rect {
        let rect = &self.body.rect;
        rect.sub_rect(
            (rect.width - self.tuning.hitbox_width) / 2.0,
            rect.height - self.tuning.hitbox_height,
            self.tuning.hitbox_width,
            self.tuning.hitbox_height,
        )
    }

    pub fn attack_box(&self) -> Rect {
        attack_hitbox(
            &self.body.rect,
            self.facing,
            self.tuning.attack.width,
            self.tuning.attack.height,
        )
    }

    /// True while the strike box deals damage.
    pub fn attack_is_live(&self) -> bool {
        self.is_attacking()
            && self.animation.key == PlayerState::Attacking
            && self.animation.frame_index >= self.tuning.attack.live_frame
    }

    pub fn update(
        &mut self,
        input: &dyn InputSource,
        world: &mut Surroundings<'_>,
        dt_us: u64,
        timers: &mut Scheduler<PlayerTimer>,
        sink: &mut dyn SessionSink,
    ) {
        if self.is_dead() {
            self.animate(dt_us);
            return;
        }

        self.handle_input(input, timers);
        self.apply_physics();
        self.contacts = resolve_platforms(&mut self.body, world.platforms);
        self.animate(dt_us);

        if self.body.rect.y > world.world_bottom {
            log::debug!("Player fell out of the world at y={:.1}", self.body.rect.y);
            self.die(sink);
            return;
        }

        self.strike(world.enemies, sink);

        if intersects(&self.body.rect, &world.exit) {
            sink.on_level_completed();
        }
    }

    fn handle_input(&mut self, input: &dyn InputSource, timers: &mut Scheduler<PlayerTimer>) {
        if self.is_attacking() {
            return;
        }

        let speed = self.tuning.speed;
        if input.is_action_held(Action::MoveLeft) {
            self.body.velocity_x = -speed;
            self.facing = Facing::Left;
            if self.body.grounded {
                self.state = PlayerState::Running;
            }
        } else if input.is_action_held(Action::MoveRight) {
            self.body.velocity_x = speed;
            self.facing = Facing::Right;
            if self.body.grounded {
                self.state = PlayerState::Running;
            }
        } else {
            self.body.velocity_x = 0.0;
            if self.body.grounded {
                self.state = PlayerState::Idle;
            }
        }

        // Jump is only legal from the ground.
        if input.is_action_held(Action::Jump) && self.body.grounded {
            self.body.velocity_y = -self.tuning.jump_force;
            self.body.grounded = false;
            self.state = PlayerState::Jumping;
        }

        if input.is_action_held(Action::Attack) && !self.on_cooldown {
            self.begin_attack(timers);
        }
    }

    fn begin_attack(&mut self, timers: &mut Scheduler<PlayerTimer>) {
        self.state = PlayerState::Attacking;
        self.body.velocity_x = 0.0;
        self.animation.play(PlayerState::Attacking);
        self.animation.rewind();
        self.on_cooldown = true;

        timers.schedule_in(
            self.tuning.attack.cooldown_ms * 1000,
            PlayerTimer {
                player: self.generation,
                kind: PlayerTimerKind::CooldownElapsed,
            },
        );
        timers.schedule_in(
            self.tuning.animations.attacking.total_duration_us(),
            PlayerTimer {
                player: self.generation,
                kind: PlayerTimerKind::AttackFinished,
            },
        );
    }

    /// Gravity pulls every step, grounded or not; `grounded` is re-earned
    /// each step when the landing check snaps the body back onto its tile.
    fn apply_physics(&mut self) {
        self.body.velocity_y += self.tuning.gravity;
        if !self.body.grounded && self.state != PlayerState::Attacking {
            self.state = PlayerState::Jumping;
        }
        self.body.integrate();
    }

    fn animate(&mut self, dt_us: u64) {
        self.animation.play(self.state);
        let clip = *self.tuning.animations.clip(self.state);
        self.animation.tick(dt_us, &clip);
    }

    // Re-entrant: every live frame hits every enemy inside the box again.
    fn strike(&mut self, enemies: &mut [Enemy], sink: &mut dyn SessionSink) {
        if !self.attack_is_live() {
            return;
        }
        let strike = self.attack_box();
        for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
            if intersects(&strike, &enemy.rect) {
                enemy.take_damage(self.tuning.attack.damage, sink);
            }
        }
    }

    /// Kill the player. Repeated calls are no-ops.
    pub fn die(&mut self, sink: &mut dyn SessionSink) {
        if self.is_dead() {
            return;
        }
        self.state = PlayerState::Dead;
        self.body.velocity_x = 0.0;
        self.body.velocity_y = 0.0;
        sink.on_player_died();
    }

    /// Apply a deferred transition. Timers for another player instance, and
    /// any timer once this player is dead, are ignored.
    pub fn on_timer(&mut self, timer: PlayerTimer) -> bool {
        if timer.player != self.generation || self.is_dead() {
            log::trace!("Discarding stale player timer {:?}", timer.kind);
            return false;
        }
        match timer.kind {
            PlayerTimerKind::AttackFinished => {
                if self.is_attacking() {
                    self.state = if self.body.grounded {
                        PlayerState::Idle
                    } else {
                        PlayerState::Jumping
                    };
                }
                true
            }
            PlayerTimerKind::CooldownElapsed => {
                self.on_cooldown = false;
                true
            }
            PlayerTimerKind::GameOver => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemyTuning;
    use crate::session::{EventBuffer, SessionEvent};
    use flagrun_core::input::ActionSet;
    use flagrun_core::time::FIXED_DT_US;

    const FLOOR: Rect = Rect::new(0.0, 700.0, 3000.0, 50.0);
    const NO_EXIT: Rect = Rect::new(-1000.0, -1000.0, 1.0, 1.0);

    struct Harness {
        player: Player,
        platforms: Vec<Rect>,
        enemies: Vec<Enemy>,
        exit: Rect,
        timers: Scheduler<PlayerTimer>,
        events: EventBuffer,
    }

    impl Harness {
        fn new(platforms: Vec<Rect>) -> Self {
            Self {
                player: Player::new(Generation::default(), &PlayerTuning::default()),
                platforms,
                enemies: Vec::new(),
                exit: NO_EXIT,
                timers: Scheduler::new(),
                events: EventBuffer::default(),
            }
        }

        fn standing_on_floor() -> Self {
            let mut harness = Self::new(vec![FLOOR]);
            harness.player.body.rect.y = FLOOR.top() - 90.0;
            harness.step(ActionSet::none());
            assert!(harness.player.body.grounded);
            harness
        }

        fn step(&mut self, input: ActionSet) {
            for timer in self.timers.advance(FIXED_DT_US) {
                self.player.on_timer(timer);
            }
            let mut world = Surroundings {
                platforms: &self.platforms,
                enemies: &mut self.enemies,
                exit: self.exit,
                world_bottom: 800.0,
            };
            self.player
                .update(&input, &mut world, FIXED_DT_US, &mut self.timers, &mut self.events);
        }
    }

    #[test]
    fn falling_body_lands_next_frame() {
        let mut harness = Harness::new(vec![Rect::new(0.0, 500.0, 200.0, 50.0)]);
        harness.player.body.rect.y = 500.0 - 90.0 - 3.0;
        harness.player.body.velocity_y = 5.0;

        harness.step(ActionSet::none());
        assert!(harness.player.body.grounded);
        assert_eq!(harness.player.body.rect.y, 500.0 - 90.0);
    }

    #[test]
    fn resting_player_stays_put_and_idle() {
        let mut harness = Harness::standing_on_floor();
        let start = harness.player.body.rect;
        for _ in 0..120 {
            harness.step(ActionSet::none());
            assert_eq!(harness.player.body.rect, start);
            assert_eq!(harness.player.state(), PlayerState::Idle);
        }
    }

    #[test]
    fn running_and_facing_follow_input() {
        let mut harness = Harness::standing_on_floor();
        let x0 = harness.player.body.rect.x;
        harness.step(ActionSet::none().with(Action::MoveLeft));
        assert_eq!(harness.player.state(), PlayerState::Running);
        assert_eq!(harness.player.facing, Facing::Left);
        assert_eq!(harness.player.body.rect.x, x0 - 3.0);

        // Left wins when both are held.
        harness.step(
            ActionSet::none()
                .with(Action::MoveLeft)
                .with(Action::MoveRight),
        );
        assert_eq!(harness.player.facing, Facing::Left);

        harness.step(ActionSet::none());
        assert_eq!(harness.player.state(), PlayerState::Idle);
    }

    #[test]
    fn jump_leaves_ground_and_lands_again() {
        let mut harness = Harness::standing_on_floor();
        harness.step(ActionSet::none().with(Action::Jump));
        assert_eq!(harness.player.state(), PlayerState::Jumping);
        assert!(!harness.player.body.grounded);
        assert!(harness.player.body.rect.y < FLOOR.top() - 90.0);

        let mut landed = false;
        for _ in 0..120 {
            harness.step(ActionSet::none());
            if harness.player.body.grounded {
                landed = true;
                break;
            }
            assert_eq!(harness.player.state(), PlayerState::Jumping);
        }
        assert!(landed);
        assert_eq!(harness.player.body.rect.bottom(), FLOOR.top());
    }

    #[test]
    fn jump_is_ignored_in_the_air() {
        let mut harness = Harness::new(vec![FLOOR]);
        harness.player.body.velocity_y = 2.0;
        harness.step(ActionSet::none().with(Action::Jump));
        assert!(harness.player.body.velocity_y > 0.0);
        assert_eq!(harness.player.state(), PlayerState::Jumping);
    }

    #[test]
    fn attack_locks_movement_until_the_animation_ends() {
        let mut harness = Harness::standing_on_floor();
        harness.step(ActionSet::none().with(Action::Attack));
        assert!(harness.player.is_attacking());
        assert!(harness.player.is_on_cooldown());

        let x0 = harness.player.body.rect.x;
        // 420ms attack window: 25 more steps keep it running.
        for _ in 0..24 {
            harness.step(ActionSet::none().with(Action::MoveRight));
            assert!(harness.player.is_attacking());
            assert_eq!(harness.player.body.rect.x, x0);
        }
        for _ in 0..2 {
            harness.step(ActionSet::none());
        }
        assert_eq!(harness.player.state(), PlayerState::Idle);
        assert!(!harness.player.is_on_cooldown());
    }

    #[test]
    fn attack_in_progress_ignores_second_press() {
        let mut harness = Harness::standing_on_floor();
        harness.step(ActionSet::none().with(Action::Attack));
        let queued = harness.timers.len();
        harness.step(ActionSet::none().with(Action::Attack));
        assert_eq!(harness.timers.len(), queued);
    }

    fn enemy_in_reach(player: &Player) -> Enemy {
        let strike = player.attack_box();
        let tuning = EnemyTuning::default();
        // Enemy body overlapping the strike box but clear of the player's hitbox.
        Enemy::new(
            Rect::new(strike.left() + 5.0, strike.top() - 30.0, tuning.width, tuning.height),
            &tuning,
            120.0,
            Facing::Right,
            0,
        )
    }

    #[test]
    fn attack_deals_no_damage_before_live_frame() {
        let mut harness = Harness::standing_on_floor();
        harness.enemies.push(enemy_in_reach(&harness.player));
        harness.enemies[0].speed = 0.0;

        harness.step(ActionSet::none().with(Action::Attack));
        assert_eq!(harness.player.current_frame(), 0);
        assert_eq!(harness.enemies[0].health, 3);

        // Frame 2 is reached on the tenth attacking step.
        while harness.player.current_frame() < 2 {
            assert_eq!(harness.enemies[0].health, 3);
            harness.step(ActionSet::none());
        }
        assert_eq!(harness.enemies[0].health, 2);
    }

    #[test]
    fn stationary_enemy_is_hit_on_every_live_frame() {
        let mut harness = Harness::standing_on_floor();
        harness.enemies.push(enemy_in_reach(&harness.player));
        harness.enemies[0].speed = 0.0;

        harness.step(ActionSet::none().with(Action::Attack));
        while harness.player.current_frame() < 2 {
            harness.step(ActionSet::none());
        }
        harness.step(ActionSet::none());
        harness.step(ActionSet::none());
        assert!(!harness.enemies[0].is_alive());
        assert_eq!(harness.events.events, vec![SessionEvent::ScoreDelta(100)]);
    }

    #[test]
    fn falling_out_of_the_world_kills() {
        let mut harness = Harness::new(Vec::new());
        harness.player.body.rect.y = 799.0;
        harness.player.body.velocity_y = 5.0;
        harness.step(ActionSet::none());
        assert!(harness.player.is_dead());
        assert_eq!(harness.events.events, vec![SessionEvent::PlayerDied]);
    }

    #[test]
    fn death_is_terminal_and_idempotent() {
        let mut harness = Harness::new(Vec::new());
        harness.player.body.velocity_x = 3.0;
        harness.player.body.velocity_y = 7.0;
        harness.player.die(&mut harness.events);
        harness.player.die(&mut harness.events);
        assert_eq!(harness.events.events, vec![SessionEvent::PlayerDied]);

        let rect = harness.player.body.rect;
        for _ in 0..30 {
            harness.step(
                ActionSet::none()
                    .with(Action::MoveRight)
                    .with(Action::Jump)
                    .with(Action::Attack),
            );
            assert_eq!(harness.player.body.rect, rect);
            assert_eq!(harness.player.body.velocity_x, 0.0);
            assert_eq!(harness.player.body.velocity_y, 0.0);
            assert_eq!(harness.player.state(), PlayerState::Dead);
        }
    }

    #[test]
    fn timers_for_a_dead_or_replaced_player_are_inert() {
        let mut harness = Harness::standing_on_floor();
        let stale = PlayerTimer {
            player: harness.player.generation().next(),
            kind: PlayerTimerKind::CooldownElapsed,
        };
        harness.step(ActionSet::none().with(Action::Attack));
        assert!(!harness.player.on_timer(stale));
        assert!(harness.player.is_on_cooldown());

        harness.player.die(&mut harness.events);
        let own = PlayerTimer {
            player: harness.player.generation(),
            kind: PlayerTimerKind::AttackFinished,
        };
        assert!(!harness.player.on_timer(own));
        assert_eq!(harness.player.state(), PlayerState::Dead);
    }

    #[test]
    fn touching_the_exit_requests_completion() {
        let mut harness = Harness::standing_on_floor();
        harness.exit = harness.player.body.rect;
        harness.step(ActionSet::none());
        assert_eq!(harness.events.events, vec![SessionEvent::LevelCompleteRequested]);
    }

    #[test]
    fn hitbox_is_centred_and_flush_with_feet() {
        let player = Player::new(Generation::default(), &PlayerTuning::default());
        let hitbox = player.hitbox();
        assert_eq!(hitbox, Rect::new(110.0, 320.0, 50.0, 70.0));
        assert!(player.body.rect.contains_rect(&hitbox));
    }
}
