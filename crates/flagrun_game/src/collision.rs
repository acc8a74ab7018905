//! Axis-aligned box geometry shared by every gameplay check.
//!
//! Gameplay truth is a handful of rectangles per entity, independent of the
//! drawn sprites. Two queries matter:
//!
//!  1. **Overlap** (`intersects`) -- strict on all four edges, so boxes that only
//!     share an edge never count. Used for hazards, pickups, attacks and exits.
//!  2. **Platform contact** (`resolve_platform_contact`) -- a directional check
//!     of a moving body against one static tile, evaluated in a fixed order:
//!     landing, then head bump, then sideways. The first match snaps the body
//!     and wins, so a body can never land and bump on the same tile in one call.
//!
//! The landing and head-bump tests accept a body that has already moved up to
//! `CONTACT_TOLERANCE` pixels into the tile this frame, which keeps moderate
//! fall speeds from tunnelling through 50px tiles.

use serde::Deserialize;

/// How far past a tile edge a body may be this frame and still be snapped back.
pub const CONTACT_TOLERANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn position(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width, self.height)
    }

    /// A box inside `self`, `offset` from its top-left corner.
    pub fn sub_rect(&self, offset_x: f32, offset_y: f32, width: f32, height: f32) -> Rect {
        Rect::new(self.x + offset_x, self.y + offset_y, width, height)
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Which side of the moving body touched the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactSide {
    /// Feet on the tile's top edge.
    Bottom,
    /// Head against the tile's bottom edge.
    Top,
    /// Moving right into the tile's left edge.
    Right,
    /// Moving left into the tile's right edge.
    Left,
}

/// A moving box with per-frame velocity (pixels per step, +y is down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub rect: Rect,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub grounded: bool,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }

    pub fn integrate(&mut self) {
        self.rect.x += self.velocity_x;
        self.rect.y += self.velocity_y;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
}

impl ContactState {
    pub fn record(&mut self, side: ContactSide) {
        match side {
            ContactSide::Bottom => self.down = true,
            ContactSide::Top => self.up = true,
            ContactSide::Left => self.left = true,
            ContactSide::Right => self.right = true,
        }
    }
}

pub fn resolve_platform_contact(body: &mut Body, platform: &Rect) -> Option<ContactSide> {
    resolve_vertical_contact(body, platform).or_else(|| resolve_sideways_contact(body, platform))
}

fn resolve_vertical_contact(body: &mut Body, platform: &Rect) -> Option<ContactSide> {
    let rect = body.rect;
    let overlaps_x = rect.right() > platform.left() && rect.left() < platform.right();
    if !overlaps_x {
        return None;
    }

    // Landing
    if body.velocity_y > 0.0
        && rect.bottom() <= platform.top() + CONTACT_TOLERANCE
        && rect.bottom() + body.velocity_y >= platform.top()
    {
        body.rect.y = platform.top() - rect.height;
        body.velocity_y = 0.0;
        body.grounded = true;
        return Some(ContactSide::Bottom);
    }

    // Head bump
    if body.velocity_y < 0.0
        && rect.top() >= platform.bottom() - CONTACT_TOLERANCE
        && rect.top() + body.velocity_y <= platform.bottom()
    {
        body.rect.y = platform.bottom();
        body.velocity_y = 0.0;
        return Some(ContactSide::Top);
    }

    None
}

fn resolve_sideways_contact(body: &mut Body, platform: &Rect) -> Option<ContactSide> {
    let rect = body.rect;
    // Sideways contact only counts while the boxes share vertical extent.
    let overlaps_y = rect.bottom() > platform.top() && rect.top() < platform.bottom();
    if body.velocity_x == 0.0 || !overlaps_y {
        return None;
    }

    if body.velocity_x > 0.0
        && rect.right() <= platform.left()
        && rect.right() + body.velocity_x >= platform.left()
    {
        body.rect.x = platform.left() - rect.width;
        return Some(ContactSide::Right);
    }

    if body.velocity_x < 0.0
        && rect.left() >= platform.right()
        && rect.left() + body.velocity_x <= platform.right()
    {
        body.rect.x = platform.right();
        return Some(ContactSide::Left);
    }

    None
}

/// Resolve `body` against every tile. `grounded` is cleared first and only a
/// landing sets it again.
///
/// Vertical contacts settle against all tiles before any sideways test runs,
/// so a body standing on a row of tiles never snags on the seam between two
/// of them. A tile that produced a vertical contact is skipped in the
/// sideways pass.
pub fn resolve_platforms(body: &mut Body, platforms: &[Rect]) -> ContactState {
    body.grounded = false;
    let mut contacts = ContactState::default();
    let mut settled = vec![false; platforms.len()];
    for (platform, settled) in platforms.iter().zip(settled.iter_mut()) {
        if let Some(side) = resolve_vertical_contact(body, platform) {
            contacts.record(side);
            *settled = true;
        }
    }
    for (platform, settled) in platforms.iter().zip(settled) {
        if settled {
            continue;
        }
        if let Some(side) = resolve_sideways_contact(body, platform) {
            contacts.record(side);
        }
    }
    contacts
}

/// Strike box of `size` placed flush against the facing side of `body`, a
/// third of the way down.
pub fn attack_hitbox(body: &Rect, facing: Facing, width: f32, height: f32) -> Rect {
    let y = body.y + body.height / 3.0;
    match facing {
        Facing::Right => Rect::new(body.right(), y, width, height),
        Facing::Left => Rect::new(body.left() - width, y, width, height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: Rect = Rect::new(100.0, 500.0, 50.0, 50.0);

    fn body_at(x: f32, y: f32, vx: f32, vy: f32) -> Body {
        Body {
            rect: Rect::new(x, y, 70.0, 90.0),
            velocity_x: vx,
            velocity_y: vy,
            grounded: false,
        }
    }

    #[test]
    fn intersects_is_symmetric() {
        let cases = [
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(5.0, 5.0, 10.0, 10.0)),
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(20.0, 0.0, 10.0, 10.0)),
            (Rect::new(0.0, 0.0, 100.0, 100.0), Rect::new(40.0, 40.0, 5.0, 5.0)),
            (Rect::new(-5.0, 3.0, 2.0, 8.0), Rect::new(-4.0, 10.0, 1.0, 1.0)),
        ];
        for (a, b) in cases {
            assert_eq!(intersects(&a, &b), intersects(&b, &a), "{a:?} / {b:?}");
        }
    }

    #[test]
    fn edge_touching_boxes_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
        assert!(!intersects(&a, &c));
        assert!(intersects(&a, &Rect::new(9.9, 9.9, 1.0, 1.0)));
    }

    #[test]
    fn landing_snaps_to_top_and_grounds() {
        // Already 2px into the tile after this frame's move.
        let mut body = body_at(90.0, 500.0 - 90.0 + 2.0, 0.0, 5.0);
        let side = resolve_platform_contact(&mut body, &TILE);
        assert_eq!(side, Some(ContactSide::Bottom));
        assert_eq!(body.rect.bottom(), TILE.top());
        assert_eq!(body.velocity_y, 0.0);
        assert!(body.grounded);
    }

    #[test]
    fn landing_ignores_bodies_deep_inside_the_tile() {
        let mut body = body_at(90.0, 500.0 - 90.0 + 11.0, 0.0, 5.0);
        assert_eq!(resolve_platform_contact(&mut body, &TILE), None);
        assert!(!body.grounded);
    }

    #[test]
    fn resting_body_with_zero_velocity_never_moves() {
        let mut body = body_at(90.0, TILE.top() - 90.0, 0.0, 0.0);
        let start = body;
        for _ in 0..120 {
            resolve_platform_contact(&mut body, &TILE);
            assert_eq!(body.rect, start.rect);
        }
    }

    #[test]
    fn head_bump_snaps_below_and_keeps_airborne() {
        let mut body = body_at(90.0, TILE.bottom() - 4.0, 0.0, -8.0);
        let side = resolve_platform_contact(&mut body, &TILE);
        assert_eq!(side, Some(ContactSide::Top));
        assert_eq!(body.rect.top(), TILE.bottom());
        assert_eq!(body.velocity_y, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn landing_wins_over_sideways_contact() {
        // Falling and moving right, overlapping the tile on both axes.
        let mut body = body_at(35.0, 500.0 - 90.0 + 3.0, 3.0, 4.0);
        assert_eq!(resolve_platform_contact(&mut body, &TILE), Some(ContactSide::Bottom));
        assert_eq!(body.rect.x, 35.0);
    }

    #[test]
    fn moving_right_stops_at_left_edge() {
        let mut body = body_at(28.0, 480.0, 3.0, 0.0);
        assert_eq!(resolve_platform_contact(&mut body, &TILE), Some(ContactSide::Right));
        assert_eq!(body.rect.right(), TILE.left());
        assert!(!body.grounded);
    }

    #[test]
    fn moving_left_stops_at_right_edge() {
        let mut body = body_at(152.0, 480.0, -3.0, 0.0);
        assert_eq!(resolve_platform_contact(&mut body, &TILE), Some(ContactSide::Left));
        assert_eq!(body.rect.left(), TILE.right());
    }

    #[test]
    fn sideways_contact_needs_vertical_overlap() {
        // Standing exactly on the row above: bottom == tile top.
        let mut body = body_at(28.0, TILE.top() - 90.0, 3.0, 0.0);
        assert_eq!(resolve_platform_contact(&mut body, &TILE), None);
        assert_eq!(body.rect.x, 28.0);
    }

    #[test]
    fn resolve_platforms_clears_grounded_without_support() {
        let mut body = body_at(500.0, 0.0, 0.0, 1.0);
        body.grounded = true;
        let contacts = resolve_platforms(&mut body, &[TILE]);
        assert!(!body.grounded);
        assert_eq!(contacts, ContactState::default());
    }

    #[test]
    fn walking_left_across_a_tile_seam_does_not_snag() {
        let row = [
            Rect::new(0.0, 700.0, 50.0, 50.0),
            Rect::new(50.0, 700.0, 50.0, 50.0),
            Rect::new(100.0, 700.0, 50.0, 50.0),
        ];
        // Left edge exactly on the seam, pulled 0.6px into the row by gravity.
        let mut body = body_at(50.0, 700.0 - 90.0 + 0.6, -3.0, 0.6);
        let contacts = resolve_platforms(&mut body, &row);
        assert!(body.grounded);
        assert!(contacts.down);
        assert!(!contacts.left);
        assert_eq!(body.rect.x, 50.0);
        assert_eq!(body.rect.bottom(), 700.0);
    }

    #[test]
    fn attack_hitbox_sits_on_facing_side() {
        let body = Rect::new(100.0, 300.0, 70.0, 90.0);
        let right = attack_hitbox(&body, Facing::Right, 30.0, 20.0);
        assert_eq!(right, Rect::new(170.0, 330.0, 30.0, 20.0));
        let left = attack_hitbox(&body, Facing::Left, 30.0, 20.0);
        assert_eq!(left, Rect::new(70.0, 330.0, 30.0, 20.0));
    }
}
