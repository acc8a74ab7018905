//! Gameplay tuning, loadable from JSON.
//!
//! Every table is `#[serde(default)]`, so a config file only needs the values
//! it changes. Velocities are pixels per fixed step; durations are
//! milliseconds in the file and microseconds once read through the helpers.

use std::fs;
use std::path::{Path, PathBuf};

use flagrun_core::animation::AnimationClip;
use serde::Deserialize;

use crate::player::PlayerState;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: u64,
    pub viewport: ViewportConfig,
    /// Longest wall-clock frame fed to the simulation before capping.
    pub max_frame_ms: u64,
    /// Delay between the player dying and the session reporting game over.
    pub death_delay_ms: u64,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub flag: FlagTuning,
    pub slime: SlimeTuning,
    /// Level files played in order. Empty means the two built-in levels.
    pub levels: Vec<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_f1a6,
            viewport: ViewportConfig::default(),
            max_frame_ms: 250,
            death_delay_ms: 1000,
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            flag: FlagTuning::default(),
            slime: SlimeTuning::default(),
            levels: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn death_delay_us(&self) -> u64 {
        self.death_delay_ms * 1000
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
    pub attack: AttackTuning,
    pub animations: PlayerAnimations,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 70.0,
            height: 90.0,
            spawn_x: 100.0,
            spawn_y: 300.0,
            speed: 3.0,
            jump_force: 18.0,
            gravity: 0.6,
            hitbox_width: 50.0,
            hitbox_height: 70.0,
            attack: AttackTuning::default(),
            animations: PlayerAnimations::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AttackTuning {
    pub width: f32,
    pub height: f32,
    /// First animation frame on which the strike box deals damage.
    pub live_frame: u32,
    pub damage: i32,
    pub cooldown_ms: u64,
}

impl Default for AttackTuning {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 20.0,
            live_frame: 2,
            damage: 1,
            cooldown_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerAnimations {
    pub idle: AnimationClip,
    pub running: AnimationClip,
    pub jumping: AnimationClip,
    pub attacking: AnimationClip,
    pub dead: AnimationClip,
}

impl PlayerAnimations {
    pub fn clip(&self, state: PlayerState) -> &AnimationClip {
        match state {
            PlayerState::Idle => &self.idle,
            PlayerState::Running => &self.running,
            PlayerState::Jumping => &self.jumping,
            PlayerState::Attacking => &self.attacking,
            PlayerState::Dead => &self.dead,
        }
    }
}

impl Default for PlayerAnimations {
    fn default() -> Self {
        Self {
            idle: AnimationClip::from_ms(4, 150),
            running: AnimationClip::from_ms(6, 100),
            jumping: AnimationClip::from_ms(8, 80),
            attacking: AnimationClip::from_ms(6, 70),
            dead: AnimationClip::from_ms(3, 200),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub width: f32,
    pub height: f32,
    pub hitbox_width: f32,
    pub hitbox_height: f32,
    pub speed: f32,
    pub health: i32,
    pub patrol_min: f32,
    /// Random extra patrol distance, drawn from `[0, patrol_jitter)`.
    pub patrol_jitter: f32,
    pub score: u32,
    pub animation: AnimationClip,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            width: 60.0,
            height: 80.0,
            hitbox_width: 40.0,
            hitbox_height: 60.0,
            speed: 1.0,
            health: 3,
            patrol_min: 80.0,
            patrol_jitter: 40.0,
            score: 100,
            animation: AnimationClip::from_ms(18, 100),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FlagTuning {
    pub width: f32,
    pub height: f32,
    pub score: u32,
    pub animation: AnimationClip,
}

impl Default for FlagTuning {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 60.0,
            score: 50,
            animation: AnimationClip::from_ms(4, 200),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SlimeTuning {
    pub width: f32,
    pub height: f32,
    pub hitbox_inset: f32,
    pub fall_speed: f32,
    pub spawn_interval_ms: u64,
    pub spawn_y: f32,
    /// Keeps spawns this far from the level's right edge.
    pub spawn_margin: f32,
}

impl Default for SlimeTuning {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 40.0,
            hitbox_inset: 5.0,
            fall_speed: 4.0,
            spawn_interval_ms: 3000,
            spawn_y: -50.0,
            spawn_margin: 50.0,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config file {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.viewport.width == 0 || config.viewport.height == 0 {
        return Err("Config validation failed: viewport must be non-empty".to_string());
    }

    let player = &config.player;
    if player.width <= 0.0 || player.height <= 0.0 {
        return Err("Config validation failed: player size must be > 0".to_string());
    }
    if player.hitbox_width <= 0.0
        || player.hitbox_height <= 0.0
        || player.hitbox_width > player.width
        || player.hitbox_height > player.height
    {
        return Err(
            "Config validation failed: player hitbox must fit inside the player body".to_string(),
        );
    }
    let attack_window_us = player.animations.attacking.total_duration_us();
    if player.attack.cooldown_ms * 1000 > attack_window_us {
        return Err(format!(
            "Config validation failed: attack cooldown {}ms exceeds attack animation {}ms",
            player.attack.cooldown_ms,
            attack_window_us / 1000
        ));
    }
    if player.attack.live_frame >= player.animations.attacking.frames {
        return Err(
            "Config validation failed: attack live_frame is past the last attack frame"
                .to_string(),
        );
    }

    let enemy = &config.enemy;
    if enemy.health <= 0 {
        return Err("Config validation failed: enemy health must be > 0".to_string());
    }
    if enemy.hitbox_width > enemy.width || enemy.hitbox_height > enemy.height {
        return Err(
            "Config validation failed: enemy hitbox must fit inside the enemy body".to_string(),
        );
    }

    let slime = &config.slime;
    if slime.hitbox_inset < 0.0
        || slime.hitbox_inset * 2.0 >= slime.width
        || slime.hitbox_inset * 2.0 >= slime.height
    {
        return Err("Config validation failed: slime hitbox inset leaves no hitbox".to_string());
    }
    if slime.spawn_interval_ms == 0 {
        return Err("Config validation failed: slime spawn interval must be > 0".to_string());
    }
    Ok(())
}
