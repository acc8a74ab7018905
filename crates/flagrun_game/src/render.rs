//! Draws the session onto a [`RenderTarget`].
//!
//! Read-only over the session: nothing here feeds back into simulation.
//! Every visual is looked up by key in the [`AssetRegistry`]; anything not
//! `Ready` is drawn as a flat rectangle in its placeholder colour, so a run
//! with no art on disk plays and scores exactly like one with full art.

use flagrun_render::{hex_color, AssetRegistry, Camera2D, Color, RenderTarget};

use crate::collision::{Facing, Rect};
use crate::config::GameConfig;
use crate::level::{Level, PlatformKind};
use crate::player::PlayerState;
use crate::session::{GameSession, GameState};

const CLEAR: Color = [0.0, 0.0, 0.0, 1.0];
const LAVA: Color = [1.0, 100.0 / 255.0, 0.0, 0.7];
const LAVA_GLOW: Color = [1.0, 200.0 / 255.0, 0.0, 0.4];
const DEBUG_BODY: Color = [0.0, 0.0, 1.0, 1.0];
const DEBUG_PLAYER_HITBOX: Color = [0.0, 1.0, 1.0, 1.0];
const DEBUG_ENEMY_HITBOX: Color = [1.0, 0.0, 0.0, 1.0];
const DEBUG_FLAG: Color = [0.0, 0.5, 0.0, 1.0];
const DEBUG_STRIKE: Color = [1.0, 0.0, 0.0, 0.3];

const PLAYER_STATES: [PlayerState; 5] = [
    PlayerState::Idle,
    PlayerState::Running,
    PlayerState::Jumping,
    PlayerState::Attacking,
    PlayerState::Dead,
];

fn player_key(state: PlayerState) -> String {
    format!("player/{}", state.name())
}

fn player_placeholder(state: PlayerState) -> Color {
    hex_color(match state {
        PlayerState::Idle => "#add8e6",
        PlayerState::Running => "#0000ff",
        PlayerState::Jumping => "#008000",
        PlayerState::Attacking => "#ff0000",
        PlayerState::Dead => "#808080",
    })
}

fn platform_visual(kind: PlatformKind) -> (&'static str, &'static str) {
    match kind {
        PlatformKind::Ground => ("tiles/ground", "#654321"),
        PlatformKind::Tile => ("tiles/platform", "#4a6572"),
    }
}

fn background_key(level: &Level) -> String {
    format!("backgrounds/{}", level.id)
}

/// Queue every visual the level and player can show.
pub fn request_level_assets(assets: &mut AssetRegistry, config: &GameConfig, level: &Level) {
    let animations = &config.player.animations;
    for state in PLAYER_STATES {
        assets.request(
            &player_key(state),
            animations.clip(state).frames,
            player_placeholder(state),
        );
    }
    assets.request(
        "enemy/idle",
        config.enemy.animation.frames,
        hex_color("#8b0000"),
    );
    assets.request("flag", config.flag.animation.frames, hex_color("#ffd700"));
    assets.request("exit", 1, hex_color("#00ff00"));
    if level.has_slime_hazard() {
        assets.request("slime", 1, hex_color("#00ff00"));
    }
    for kind in [PlatformKind::Ground, PlatformKind::Tile] {
        let (key, color) = platform_visual(kind);
        assets.request(key, 1, hex_color(color));
    }
    assets.request(&background_key(level), 1, hex_color(&level.background));
}

struct Painter<'a> {
    target: &'a mut dyn RenderTarget,
    assets: &'a AssetRegistry,
    camera: &'a Camera2D,
}

impl Painter<'_> {
    fn visual(&mut self, key: &str, frame: u32, rect: &Rect, flip_x: bool, fallback: Color) {
        if !self.camera.is_visible(rect.position(), rect.size()) {
            return;
        }
        let pos = self.camera.world_to_screen(rect.position());
        let handle = self.assets.get(key);
        match handle.and_then(|h| h.sprite()) {
            Some(sprite) => self.target.draw_sprite(sprite, frame, pos, rect.size(), flip_x),
            None => {
                let color = handle.and_then(|h| h.placeholder()).unwrap_or(fallback);
                self.target.fill_rect(pos, rect.size(), color);
            }
        }
    }

    fn fill(&mut self, rect: &Rect, color: Color) {
        if self.camera.is_visible(rect.position(), rect.size()) {
            let pos = self.camera.world_to_screen(rect.position());
            self.target.fill_rect(pos, rect.size(), color);
        }
    }

    fn outline(&mut self, rect: &Rect, color: Color) {
        if self.camera.is_visible(rect.position(), rect.size()) {
            let pos = self.camera.world_to_screen(rect.position());
            self.target.stroke_rect(pos, rect.size(), color);
        }
    }
}

/// Draw one frame. Only a session in `Playing` shows the world.
pub fn draw_frame(session: &GameSession, assets: &AssetRegistry, target: &mut dyn RenderTarget) {
    target.clear(CLEAR);
    if session.state() != GameState::Playing {
        return;
    }
    let (Some(level), Some(player)) = (session.level(), session.player()) else {
        return;
    };
    let debug = session.debug();
    let mut painter = Painter {
        target,
        assets,
        camera: session.camera(),
    };

    let bounds = Rect::new(0.0, 0.0, level.width, level.height);
    painter.visual(
        &background_key(level),
        0,
        &bounds,
        false,
        hex_color(&level.background),
    );

    for zone in level.lava() {
        painter.fill(zone, LAVA);
        painter.fill(
            &Rect::new(zone.x, zone.y, zone.width, zone.height / 2.0),
            LAVA_GLOW,
        );
    }

    for (tile, kind) in level.platforms_with_kind() {
        let (key, color) = platform_visual(kind);
        painter.visual(key, 0, tile, false, hex_color(color));
    }

    for enemy in &level.enemies {
        painter.visual(
            "enemy/idle",
            enemy.current_frame(),
            &enemy.rect,
            enemy.direction == Facing::Left,
            hex_color("#8b0000"),
        );
        if debug {
            painter.outline(&enemy.hitbox(), DEBUG_ENEMY_HITBOX);
        }
    }

    for flag in &level.flags {
        painter.visual(
            "flag",
            flag.current_frame(),
            &flag.rect,
            false,
            hex_color("#ffd700"),
        );
        if debug {
            painter.outline(&flag.rect, DEBUG_FLAG);
        }
    }

    for slime in &level.slimes {
        painter.visual("slime", 0, &slime.rect, false, hex_color("#00ff00"));
    }

    painter.visual("exit", 0, &level.exit(), false, hex_color("#00ff00"));

    let state = player.state();
    painter.visual(
        &player_key(state),
        player.current_frame(),
        &player.body.rect,
        player.facing == Facing::Left,
        player_placeholder(state),
    );
    if debug {
        painter.outline(&player.body.rect, DEBUG_BODY);
        painter.outline(&player.hitbox(), DEBUG_PLAYER_HITBOX);
        if player.attack_is_live() {
            painter.fill(&player.attack_box(), DEBUG_STRIKE);
        }
    }
}
