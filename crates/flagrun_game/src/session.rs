//! The game session: owns the current level and player and drives both.
//!
//! Each display frame hands a wall-clock delta to [`GameSession::frame`],
//! which runs whole fixed steps. One step is:
//!
//!   1. fire due timers (attack end, cooldown, game over)
//!   2. player update against the level's geometry and enemies
//!   3. level update (enemies, flags, slimes, lava, cleanup)
//!   4. apply the notifications entities raised during the step
//!   5. camera follow
//!
//! Entities never touch the session directly. They report through a
//! [`SessionSink`]; the session buffers those reports and applies them at the
//! end of the step, then forwards them to an optional observer (the UI).

use flagrun_core::input::{InputSource, InputState, Key};
use flagrun_core::scheduler::{Generation, Scheduler};
use flagrun_core::time::TimeState;
use flagrun_render::Camera2D;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::GameConfig;
use crate::level::{Level, LevelCatalog};
use crate::player::{Player, PlayerTimer, PlayerTimerKind};

/// Notifications raised by gameplay. Fire-and-forget.
pub trait SessionSink {
    fn on_score_delta(&mut self, points: u32);
    fn on_flag_collected(&mut self);
    fn on_player_died(&mut self);
    /// The player touched the exit. The session decides whether it counts.
    fn on_level_completed(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ScoreDelta(u32),
    FlagCollected,
    PlayerDied,
    LevelCompleteRequested,
}

/// Records notifications in the order they were raised.
#[derive(Debug, Default)]
pub struct EventBuffer {
    pub events: Vec<SessionEvent>,
}

impl SessionSink for EventBuffer {
    fn on_score_delta(&mut self, points: u32) {
        self.events.push(SessionEvent::ScoreDelta(points));
    }

    fn on_flag_collected(&mut self) {
        self.events.push(SessionEvent::FlagCollected);
    }

    fn on_player_died(&mut self) {
        self.events.push(SessionEvent::PlayerDied);
    }

    fn on_level_completed(&mut self) {
        self.events.push(SessionEvent::LevelCompleteRequested);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Menu,
    Playing,
    GameOver,
    LevelComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: usize,
    pub level_id: String,
    pub state: GameState,
    pub score: u32,
    pub seconds: u64,
    pub flags_collected: usize,
    pub total_flags: usize,
    pub steps: u64,
}

pub struct GameSession {
    config: GameConfig,
    catalog: LevelCatalog,
    rng: ChaCha8Rng,
    state: GameState,
    current_level: usize,
    level: Option<Level>,
    player: Option<Player>,
    player_generation: Generation,
    timers: Scheduler<PlayerTimer>,
    time: TimeState,
    camera: Camera2D,
    events: EventBuffer,
    observer: Option<Box<dyn SessionSink>>,
    score: u32,
    flags_collected: usize,
    elapsed_us: u64,
    steps: u64,
    debug: bool,
}

impl GameSession {
    pub fn new(config: GameConfig, catalog: LevelCatalog) -> Self {
        let mut time = TimeState::new();
        time.max_frame_us = config.max_frame_ms * 1000;
        let camera = Camera2D::new(config.viewport.width, config.viewport.height);
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            catalog,
            state: GameState::Menu,
            current_level: 1,
            level: None,
            player: None,
            player_generation: Generation::default(),
            timers: Scheduler::new(),
            time,
            camera,
            events: EventBuffer::default(),
            observer: None,
            score: 0,
            flags_collected: 0,
            elapsed_us: 0,
            steps: 0,
            debug: false,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn SessionSink>) {
        self.observer = Some(observer);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn flags_collected(&self) -> usize {
        self.flags_collected
    }

    pub fn total_flags(&self) -> usize {
        self.level.as_ref().map_or(0, Level::total_flags)
    }

    /// Whole seconds of play in the current level.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_us / 1_000_000
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn level_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn time(&self) -> &TimeState {
        &self.time
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
        log::info!("Debug hitboxes: {}", if self.debug { "ON" } else { "OFF" });
    }

    /// Session keys pressed this frame: Escape returns to the menu, F1
    /// toggles hitboxes, R restarts a running or lost level.
    pub fn handle_host_keys(&mut self, keys: &InputState) -> Result<(), String> {
        if keys.is_just_pressed(Key::F1) {
            self.toggle_debug();
        }
        if keys.is_just_pressed(Key::Escape) && self.state != GameState::Menu {
            self.show_menu();
            return Ok(());
        }
        if keys.is_just_pressed(Key::R)
            && matches!(self.state, GameState::Playing | GameState::GameOver)
        {
            self.restart_level()?;
        }
        Ok(())
    }

    /// Build level `number` and a fresh player, and reset the level stats.
    pub fn start_level(&mut self, number: usize) -> Result<(), String> {
        let file = self.catalog.get(number).ok_or_else(|| {
            format!(
                "Level {number} does not exist ({} levels loaded)",
                self.catalog.len()
            )
        })?;

        let level = Level::new(file, &self.config, &mut self.rng);
        self.player_generation = self.player_generation.next();
        let player = Player::new(self.player_generation, &self.config.player);

        log::info!(
            "Starting level {number} '{}' ({} flags, {} enemies)",
            level.id,
            level.total_flags(),
            level.enemies.len()
        );

        self.current_level = number;
        self.level = Some(level);
        self.player = Some(player);
        self.events.events.clear();
        self.score = 0;
        self.flags_collected = 0;
        self.elapsed_us = 0;
        self.steps = 0;
        self.camera.position = Vec2::ZERO;
        self.state = GameState::Playing;
        Ok(())
    }

    pub fn restart_level(&mut self) -> Result<(), String> {
        self.start_level(self.current_level)
    }

    /// Continue to the following level, or back to the menu after the last one.
    pub fn next_level(&mut self) -> Result<(), String> {
        if self.current_level < self.catalog.len() {
            self.start_level(self.current_level + 1)
        } else {
            log::info!("Last level finished, returning to menu");
            self.show_menu();
            Ok(())
        }
    }

    pub fn show_menu(&mut self) {
        self.state = GameState::Menu;
        self.level = None;
        self.player = None;
    }

    /// Feed one display frame of `real_dt_us` wall-clock time. Returns the
    /// number of fixed steps run.
    pub fn frame(&mut self, real_dt_us: u64, input: &dyn InputSource) -> u32 {
        if self.state != GameState::Playing {
            return 0;
        }
        self.time.begin_frame(real_dt_us);
        while self.state == GameState::Playing && self.time.should_step() {
            self.step(input);
        }
        self.time.end_frame();
        self.time.steps_this_frame
    }

    /// Advance the simulation by exactly one fixed step.
    pub fn step(&mut self, input: &dyn InputSource) {
        let dt_us = self.time.fixed_dt_us;

        for timer in self.timers.advance(dt_us) {
            self.handle_timer(timer);
        }
        if self.state != GameState::Playing {
            return;
        }

        let (Some(level), Some(player)) = (self.level.as_mut(), self.player.as_mut()) else {
            return;
        };
        player.update(
            input,
            &mut level.surroundings(),
            dt_us,
            &mut self.timers,
            &mut self.events,
        );
        level.update(dt_us, player, &mut self.events, &mut self.rng);
        self.elapsed_us += dt_us;
        self.steps += 1;

        self.apply_events();
        self.follow_player();
    }

    fn handle_timer(&mut self, timer: PlayerTimer) {
        if timer.player != self.player_generation {
            log::trace!("Discarding timer {:?} for a replaced player", timer.kind);
            return;
        }
        match timer.kind {
            PlayerTimerKind::GameOver => {
                if self.state == GameState::Playing {
                    self.game_over();
                }
            }
            _ => {
                if let Some(player) = self.player.as_mut() {
                    player.on_timer(timer);
                }
            }
        }
    }

    fn apply_events(&mut self) {
        let events = std::mem::take(&mut self.events.events);
        for event in events {
            match event {
                SessionEvent::ScoreDelta(points) => {
                    self.score += points;
                    if let Some(observer) = self.observer.as_mut() {
                        observer.on_score_delta(points);
                    }
                }
                SessionEvent::FlagCollected => {
                    self.flags_collected += 1;
                    log::debug!(
                        "Flag collected ({}/{})",
                        self.flags_collected,
                        self.total_flags()
                    );
                    if let Some(observer) = self.observer.as_mut() {
                        observer.on_flag_collected();
                    }
                }
                SessionEvent::PlayerDied => {
                    log::info!("Player died on level {}", self.current_level);
                    self.timers.schedule_in(
                        self.config.death_delay_us(),
                        PlayerTimer {
                            player: self.player_generation,
                            kind: PlayerTimerKind::GameOver,
                        },
                    );
                    if let Some(observer) = self.observer.as_mut() {
                        observer.on_player_died();
                    }
                }
                SessionEvent::LevelCompleteRequested => {
                    self.complete_level();
                }
            }
        }
    }

    /// Finish the level if every flag has been collected. Returns whether
    /// the session moved to `LevelComplete`.
    pub fn complete_level(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let total = self.total_flags();
        if self.flags_collected < total {
            log::debug!(
                "Exit reached with {}/{} flags; collect them all first",
                self.flags_collected,
                total
            );
            return false;
        }

        self.state = GameState::LevelComplete;
        log::info!(
            "Level {} complete: score {}, {}s, flags {}/{}",
            self.current_level,
            self.score,
            self.elapsed_seconds(),
            self.flags_collected,
            total
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_level_completed();
        }
        true
    }

    fn game_over(&mut self) {
        self.state = GameState::GameOver;
        log::info!(
            "Game over on level {} with score {}",
            self.current_level,
            self.score
        );
    }

    fn follow_player(&mut self) {
        let (Some(level), Some(player)) = (self.level.as_ref(), self.player.as_ref()) else {
            return;
        };
        self.camera.follow(
            player.body.rect.position(),
            Vec2::new(level.width, level.height),
        );
    }

    pub fn summary(&self) -> LevelSummary {
        LevelSummary {
            level: self.current_level,
            level_id: self
                .level
                .as_ref()
                .map(|level| level.id.clone())
                .unwrap_or_default(),
            state: self.state,
            score: self.score,
            seconds: self.elapsed_seconds(),
            flags_collected: self.flags_collected,
            total_flags: self.total_flags(),
            steps: self.steps,
        }
    }
}
