use std::sync::Arc;

use glam::Vec2;

use crate::texture::SpriteImage;

/// Linear RGBA, each channel 0..=1.
pub type Color = [f32; 4];

/// Screen-space drawing surface. Positions are top-left corners in pixels.
pub trait RenderTarget {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn stroke_rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn draw_sprite(
        &mut self,
        sprite: &Arc<SpriteImage>,
        frame: u32,
        pos: Vec2,
        size: Vec2,
        flip_x: bool,
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Fill {
        pos: Vec2,
        size: Vec2,
        color: Color,
    },
    Stroke {
        pos: Vec2,
        size: Vec2,
        color: Color,
    },
    Sprite {
        key: Arc<str>,
        frame: u32,
        pos: Vec2,
        size: Vec2,
        flip_x: bool,
    },
}

/// Records every call. Used by the headless runner and by draw-pass tests.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    pub commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprite_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { .. }))
            .count()
    }

    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill { .. }))
            .count()
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl RenderTarget for CommandRecorder {
    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Fill { pos, size, color });
    }

    fn stroke_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Stroke { pos, size, color });
    }

    fn draw_sprite(
        &mut self,
        sprite: &Arc<SpriteImage>,
        frame: u32,
        pos: Vec2,
        size: Vec2,
        flip_x: bool,
    ) {
        self.commands.push(DrawCommand::Sprite {
            key: sprite.key.clone(),
            frame: frame % sprite.frames.max(1),
            pos,
            size,
            flip_x,
        });
    }
}

/// Parse `#rrggbb` into an opaque colour. Malformed input yields magenta.
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .map(|v| v as f32 / 255.0)
    };
    match (digits.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => [r, g, b, 1.0],
        _ => [1.0, 0.0, 1.0, 1.0],
    }
}
