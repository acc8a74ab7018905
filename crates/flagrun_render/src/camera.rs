use glam::Vec2;

/// Viewport into level space. `position` is the top-left corner of the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn view_size(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32)
    }

    /// Centre the view on `target`, then clamp so nothing outside
    /// `[0, world.x] x [0, world.y]` is shown. A world smaller than the view
    /// pins that axis to 0.
    pub fn follow(&mut self, target: Vec2, world: Vec2) {
        self.position = clamped_origin(target, self.view_size(), world);
    }

    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        point - self.position
    }

    /// True when a box at `pos` with `size` overlaps the view at all.
    pub fn is_visible(&self, pos: Vec2, size: Vec2) -> bool {
        let view = self.view_size();
        pos.x < self.position.x + view.x
            && pos.x + size.x > self.position.x
            && pos.y < self.position.y + view.y
            && pos.y + size.y > self.position.y
    }
}

pub fn clamped_origin(target: Vec2, view: Vec2, world: Vec2) -> Vec2 {
    let centred = target - view / 2.0;
    Vec2::new(
        centred.x.min(world.x - view.x).max(0.0),
        centred.y.min(world.y - view.y).max(0.0),
    )
}
