use crate::collision::{intersects, Rect};
use crate::config::SlimeTuning;
use crate::player::Player;
use crate::session::SessionSink;

/// A falling hazard. Touching it is fatal no matter what the player is doing.
#[derive(Debug, Clone)]
pub struct Slime {
    pub rect: Rect,
    active: bool,
    tuning: SlimeTuning,
}

impl Slime {
    pub fn new(x: f32, tuning: &SlimeTuning) -> Self {
        Self {
            rect: Rect::new(x, tuning.spawn_y, tuning.width, tuning.height),
            active: true,
            tuning: *tuning,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn hitbox(&self) -> Rect {
        let inset = self.tuning.hitbox_inset;
        self.rect.sub_rect(
            inset,
            inset,
            self.rect.width - inset * 2.0,
            self.rect.height - inset * 2.0,
        )
    }

    pub fn update(&mut self, world_bottom: f32, player: &mut Player, sink: &mut dyn SessionSink) {
        if !self.active {
            return;
        }
        self.rect.y += self.tuning.fall_speed;
        if self.rect.y > world_bottom {
            self.active = false;
            return;
        }
        if !player.is_dead() && intersects(&player.hitbox(), &self.hitbox()) {
            log::debug!("Player hit by a slime at x={:.1}", self.rect.x);
            player.die(sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerTuning;
    use crate::player::Surroundings;
    use crate::session::{EventBuffer, SessionEvent};
    use flagrun_core::input::{Action, ActionSet};
    use flagrun_core::scheduler::{Generation, Scheduler};
    use flagrun_core::time::FIXED_DT_US;

    #[test]
    fn falls_and_expires_below_the_world() {
        let mut slime = Slime::new(2000.0, &SlimeTuning::default());
        let mut player = Player::new(Generation::default(), &PlayerTuning::default());
        let mut events = EventBuffer::default();

        let mut steps = 0;
        while slime.is_active() {
            slime.update(800.0, &mut player, &mut events);
            steps += 1;
        }
        // From y = -50 at 4px a step, y first exceeds 800 on step 213.
        assert_eq!(steps, 213);
        assert!(!player.is_dead());

        let y = slime.rect.y;
        slime.update(800.0, &mut player, &mut events);
        assert_eq!(slime.rect.y, y);
    }

    #[test]
    fn kills_on_hitbox_overlap() {
        let mut player = Player::new(Generation::default(), &PlayerTuning::default());
        let mut events = EventBuffer::default();
        let hitbox = player.hitbox();
        let mut slime = Slime::new(hitbox.x, &SlimeTuning::default());
        slime.rect.y = hitbox.y - 4.0;

        slime.update(800.0, &mut player, &mut events);
        assert!(player.is_dead());
        assert_eq!(events.events, vec![SessionEvent::PlayerDied]);
    }

    #[test]
    fn attacking_does_not_protect_from_slimes() {
        let mut player = Player::new(Generation::default(), &PlayerTuning::default());
        let mut timers = Scheduler::new();
        let mut events = EventBuffer::default();
        let mut world = Surroundings {
            platforms: &[],
            enemies: &mut [],
            exit: Rect::new(-1000.0, -1000.0, 1.0, 1.0),
            world_bottom: 10_000.0,
        };
        let attack = ActionSet::none().with(Action::Attack);
        player.update(&attack, &mut world, FIXED_DT_US, &mut timers, &mut events);
        assert!(player.is_attacking());
        assert!(events.events.is_empty());

        let hitbox = player.hitbox();
        let mut slime = Slime::new(hitbox.x, &SlimeTuning::default());
        slime.rect.y = hitbox.y - 4.0;

        slime.update(800.0, &mut player, &mut events);
        assert!(player.is_dead());
        assert!(slime.is_active());
        assert_eq!(events.events, vec![SessionEvent::PlayerDied]);
    }

    #[test]
    fn hitbox_is_inset_on_every_side() {
        let slime = Slime::new(100.0, &SlimeTuning::default());
        assert_eq!(slime.hitbox(), Rect::new(105.0, -45.0, 30.0, 30.0));
    }
}
