//! Level data files and the live level built from them.
//!
//! A level file lists static geometry (tile rows, lava, exit) and spawn points
//! (enemies, flags). Tile rows are expanded into square tiles on load.
//! Enemy and flag `y` values are the line their feet stand on.
//!
//! The live [`Level`] owns every non-player entity. Entities that reach their
//! terminal condition during an update are dropped once, after all of them
//! have run.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;

use crate::collision::{intersects, Rect};
use crate::config::{GameConfig, SlimeTuning};
use crate::enemy::Enemy;
use crate::flag::Flag;
use crate::player::{Player, Surroundings};
use crate::session::SessionSink;
use crate::slime::Slime;

const MIN_TILE_SIZE: f32 = 1.0;
const MAX_TILES: u64 = 100_000;

const BUILTIN_LEVELS: [&str; 2] = [
    include_str!("../../../assets/levels/level1.json"),
    include_str!("../../../assets/levels/level2.json"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    pub width: f32,
    pub height: f32,
    pub tile_size: f32,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub ground: Option<GroundRow>,
    #[serde(default)]
    pub platforms: Vec<TileRow>,
    #[serde(default)]
    pub lava: Vec<Rect>,
    #[serde(default)]
    pub enemies: Vec<SpawnPoint>,
    #[serde(default)]
    pub flags: Vec<SpawnPoint>,
    pub exit: Rect,
    #[serde(default)]
    pub slime_hazard: bool,
}

/// Full-width ground of tile runs separated by holes.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GroundRow {
    pub y: f32,
    pub run_tiles: u32,
    #[serde(default)]
    pub gap_tiles: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TileRow {
    pub x: f32,
    pub y: f32,
    pub segments: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    Ground,
    Tile,
}

impl LevelFile {
    /// Expand ground and tile rows into individual tiles, ground first.
    pub fn tiles(&self) -> Vec<(Rect, PlatformKind)> {
        let size = self.tile_size;
        let mut tiles = Vec::new();

        if let Some(ground) = self.ground {
            let mut x = 0.0;
            while x < self.width {
                for _ in 0..ground.run_tiles {
                    if x >= self.width {
                        break;
                    }
                    tiles.push((Rect::new(x, ground.y, size, size), PlatformKind::Ground));
                    x += size;
                }
                x += ground.gap_tiles as f32 * size;
            }
        }

        for row in &self.platforms {
            for i in 0..row.segments {
                let x = row.x + i as f32 * size;
                tiles.push((Rect::new(x, row.y, size, size), PlatformKind::Tile));
            }
        }
        tiles
    }
}

pub fn parse_level(raw: &str, source: &str) -> Result<LevelFile, String> {
    let level: LevelFile = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse level JSON {source}: {e}"))?;
    validate_level(&level)?;
    Ok(level)
}

pub fn load_level_from_path(path: &Path) -> Result<LevelFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    parse_level(&raw, &path.display().to_string())
}

fn validate_level(level: &LevelFile) -> Result<(), String> {
    if level.level_id.is_empty() {
        return Err("Level validation failed: level_id is empty".to_string());
    }
    if level.width <= 0.0 || level.height <= 0.0 {
        return Err(format!(
            "Level validation failed: '{}' has non-positive size",
            level.level_id
        ));
    }
    if !(level.tile_size >= MIN_TILE_SIZE) {
        return Err(format!(
            "Level validation failed: '{}' tile_size must be >= {MIN_TILE_SIZE}",
            level.level_id
        ));
    }
    let ground_tiles = if level.ground.is_some() {
        (level.width / level.tile_size).ceil() as u64
    } else {
        0
    };
    let tile_count = level
        .platforms
        .iter()
        .fold(ground_tiles, |n, row| n.saturating_add(row.segments as u64));
    if tile_count > MAX_TILES {
        return Err(format!(
            "Level validation failed: '{}' expands to more than {MAX_TILES} tiles",
            level.level_id
        ));
    }
    if let Some(ground) = level.ground {
        if ground.run_tiles == 0 {
            return Err(format!(
                "Level validation failed: '{}' ground run_tiles must be > 0",
                level.level_id
            ));
        }
    }

    let bounds = Rect::new(0.0, 0.0, level.width, level.height);
    if !bounds.contains_rect(&level.exit) || level.exit.width <= 0.0 || level.exit.height <= 0.0 {
        return Err(format!(
            "Level validation failed: '{}' exit lies outside the level",
            level.level_id
        ));
    }
    for zone in &level.lava {
        if zone.width <= 0.0 || zone.height <= 0.0 {
            return Err(format!(
                "Level validation failed: '{}' has an empty lava zone at ({}, {})",
                level.level_id, zone.x, zone.y
            ));
        }
    }
    for (kind, points) in [("enemy", &level.enemies), ("flag", &level.flags)] {
        for point in points {
            if point.x < 0.0 || point.x > level.width || point.y < 0.0 || point.y > level.height {
                return Err(format!(
                    "Level validation failed: '{}' {kind} spawn ({}, {}) is outside the level",
                    level.level_id, point.x, point.y
                ));
            }
        }
    }
    if level.flags.is_empty() {
        log::warn!(
            "Level '{}' has no flags. The exit opens immediately.",
            level.level_id
        );
    }
    Ok(())
}

fn default_background() -> String {
    "#0f3460".to_string()
}

/// The ordered list of playable levels, numbered from 1.
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelFile>,
}

impl LevelCatalog {
    pub fn builtin() -> Result<Self, String> {
        let levels = BUILTIN_LEVELS
            .iter()
            .enumerate()
            .map(|(i, raw)| parse_level(raw, &format!("<builtin level {}>", i + 1)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    pub fn from_files(levels: Vec<LevelFile>) -> Self {
        Self { levels }
    }

    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, String> {
        if paths.is_empty() {
            return Err("Level catalog is empty".to_string());
        }
        let levels = paths
            .iter()
            .map(|path| load_level_from_path(path))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    /// Levels named in the config, or the built-in pair when none are.
    pub fn from_config(config: &GameConfig) -> Result<Self, String> {
        if config.levels.is_empty() {
            Self::builtin()
        } else {
            Self::from_paths(&config.levels)
        }
    }

    pub fn get(&self, number: usize) -> Option<&LevelFile> {
        number.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

pub struct Level {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub background: String,
    platforms: Vec<Rect>,
    platform_kinds: Vec<PlatformKind>,
    lava: Vec<Rect>,
    exit: Rect,
    pub enemies: Vec<Enemy>,
    pub flags: Vec<Flag>,
    pub slimes: Vec<Slime>,
    total_flags: usize,
    slime_hazard: bool,
    slime_timer_us: u64,
    slime_tuning: SlimeTuning,
}

impl Level {
    pub fn new(file: &LevelFile, config: &GameConfig, rng: &mut impl Rng) -> Self {
        let (platforms, platform_kinds): (Vec<Rect>, Vec<PlatformKind>) =
            file.tiles().into_iter().unzip();
        let enemies = file
            .enemies
            .iter()
            .map(|p| Enemy::spawn(p.x, p.y, &config.enemy, &mut *rng))
            .collect();
        let flags: Vec<Flag> = file
            .flags
            .iter()
            .map(|p| Flag::new(p.x, p.y, &config.flag))
            .collect();

        Self {
            id: file.level_id.clone(),
            width: file.width,
            height: file.height,
            background: file.background.clone(),
            platforms,
            platform_kinds,
            lava: file.lava.clone(),
            exit: file.exit,
            enemies,
            total_flags: flags.len(),
            flags,
            slimes: Vec::new(),
            slime_hazard: file.slime_hazard,
            slime_timer_us: 0,
            slime_tuning: config.slime,
        }
    }

    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    pub fn platforms_with_kind(&self) -> impl Iterator<Item = (&Rect, PlatformKind)> {
        self.platforms.iter().zip(self.platform_kinds.iter().copied())
    }

    pub fn lava(&self) -> &[Rect] {
        &self.lava
    }

    pub fn exit(&self) -> Rect {
        self.exit
    }

    pub fn total_flags(&self) -> usize {
        self.total_flags
    }

    pub fn has_slime_hazard(&self) -> bool {
        self.slime_hazard
    }

    /// Borrow what the player collides with during its own update.
    pub fn surroundings(&mut self) -> Surroundings<'_> {
        Surroundings {
            platforms: &self.platforms,
            enemies: &mut self.enemies,
            exit: self.exit,
            world_bottom: self.height,
        }
    }

    pub fn update(
        &mut self,
        dt_us: u64,
        player: &mut Player,
        sink: &mut dyn SessionSink,
        rng: &mut impl Rng,
    ) {
        for enemy in &mut self.enemies {
            enemy.update(dt_us, &self.platforms, player, sink);
        }

        if !player.is_dead() {
            let hitbox = player.hitbox();
            for flag in &mut self.flags {
                flag.update(dt_us, &hitbox, sink);
            }
        }

        for slime in &mut self.slimes {
            slime.update(self.height, player, sink);
        }

        if self.slime_hazard {
            self.slime_timer_us += dt_us;
            if self.slime_timer_us > self.slime_tuning.spawn_interval_ms * 1000 {
                self.spawn_slime(rng);
                self.slime_timer_us = 0;
            }
        }

        self.check_lava(player, sink);

        self.enemies.retain(Enemy::is_alive);
        self.flags.retain(|flag| !flag.is_collected());
        self.slimes.retain(Slime::is_active);
    }

    fn spawn_slime(&mut self, rng: &mut impl Rng) {
        let span = self.width - self.slime_tuning.spawn_margin;
        let x = if span > 0.0 {
            rng.gen_range(0.0..span)
        } else {
            0.0
        };
        log::trace!("Slime spawned at x={x:.1}");
        self.slimes.push(Slime::new(x, &self.slime_tuning));
    }

    fn check_lava(&self, player: &mut Player, sink: &mut dyn SessionSink) {
        if player.is_dead() {
            return;
        }
        let hitbox = player.hitbox();
        if self.lava.iter().any(|zone| intersects(&hitbox, zone)) {
            log::debug!("Player touched lava at x={:.1}", hitbox.x);
            player.die(sink);
        }
    }
}
