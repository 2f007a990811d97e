/// The player's ship.

use crate::bullets::{BulletController, SpawnOutcome};
use crate::display::Canvas;
use crate::entities::{Collider, PlayerIntent, Rect, Rgb};
use crate::tuning::{CanvasTuning, PlayerTuning};

const C_PLAYER: Rgb = Rgb::new(0x4F, 0xC3, 0xF7);

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Reduced by the orchestrator on each hit; never self-managed.
    pub health: u32,
    pub intent: PlayerIntent,
    /// Ticks until the next shot is accepted.
    pub fire_cooldown: u32,
    velocity: f32,
    fire_delay: u32,
    canvas_width: f32,
}

impl Player {
    /// Centred horizontally near the bottom of the canvas, at full health.
    pub fn new(tuning: &PlayerTuning, canvas: &CanvasTuning) -> Self {
        Self {
            x: (canvas.width - tuning.width) / 2.0,
            y: canvas.height - tuning.bottom_margin,
            width: tuning.width,
            height: tuning.height,
            health: tuning.max_health,
            intent: PlayerIntent::default(),
            fire_cooldown: 0,
            velocity: tuning.velocity,
            fire_delay: tuning.fire_delay,
            canvas_width: canvas.width,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Move according to the current intent, then try to fire through the
    /// shared player bullet pool.  Returns the spawn outcome when a shot was
    /// attempted.
    pub fn update(&mut self, bullets: &mut BulletController) -> Option<SpawnOutcome> {
        if self.intent.left {
            self.x -= self.velocity;
        }
        if self.intent.right {
            self.x += self.velocity;
        }
        self.x = self.x.clamp(0.0, (self.canvas_width - self.width).max(0.0));

        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
        if !self.intent.shoot || self.fire_cooldown > 0 {
            return None;
        }
        let outcome = bullets.spawn(self.x + self.width / 2.0, self.y);
        if outcome.spawned() {
            self.fire_cooldown = self.fire_delay;
        }
        Some(outcome)
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) -> std::io::Result<()> {
        // Fuselage plus a narrow nose.
        let nose_width = self.width / 5.0;
        canvas.fill_rect(
            Rect::new(self.x + (self.width - nose_width) / 2.0, self.y, nose_width, self.height / 2.0),
            C_PLAYER,
        )?;
        canvas.fill_rect(
            Rect::new(self.x, self.y + self.height / 2.0, self.width, self.height / 2.0),
            C_PLAYER,
        )
    }
}

impl Collider for Player {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}
