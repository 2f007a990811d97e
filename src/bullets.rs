/// Projectile pool for one side of the fight.

use crate::display::Canvas;
use crate::entities::{Bullet, BulletOwner, Collider, Rect};
use crate::tuning::{BulletTuning, CanvasTuning};

/// Result of a spawn request.  Refusals are normal control flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned { play_sound: bool },
    AtCapacity,
}

impl SpawnOutcome {
    pub fn spawned(&self) -> bool {
        matches!(self, SpawnOutcome::Spawned { .. })
    }
}

#[derive(Clone, Debug)]
pub struct BulletController {
    owner: BulletOwner,
    tuning: BulletTuning,
    canvas: CanvasTuning,
    bullets: Vec<Bullet>,
}

impl BulletController {
    pub fn new(owner: BulletOwner, tuning: BulletTuning, canvas: CanvasTuning) -> Self {
        Self {
            owner,
            tuning,
            canvas,
            bullets: Vec::with_capacity(tuning.max_bullets_at_a_time),
        }
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tuning.max_bullets_at_a_time
    }

    pub fn has_capacity(&self) -> bool {
        self.bullets.len() < self.tuning.max_bullets_at_a_time
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.tuning.sound_enabled = enabled;
    }

    /// Fire one bullet centred horizontally on `origin_x`, with its leading
    /// edge at `origin_y`.  Dropped (not queued) when the pool is full.
    pub fn spawn(&mut self, origin_x: f32, origin_y: f32) -> SpawnOutcome {
        if !self.has_capacity() {
            return SpawnOutcome::AtCapacity;
        }
        let t = &self.tuning;
        // Player shots travel up, so their box hangs above the muzzle.
        let y = match self.owner {
            BulletOwner::Player => origin_y - t.height,
            BulletOwner::Enemy => origin_y,
        };
        self.bullets.push(Bullet {
            x: origin_x - t.width / 2.0,
            y,
            vx: 0.0,
            vy: self.owner.direction() * t.speed,
            width: t.width,
            height: t.height,
            owner: self.owner,
        });
        SpawnOutcome::Spawned {
            play_sound: t.sound_enabled,
        }
    }

    /// Insert a bullet as-is, still honouring the capacity limit.
    pub fn push(&mut self, bullet: Bullet) -> SpawnOutcome {
        if !self.has_capacity() {
            return SpawnOutcome::AtCapacity;
        }
        self.bullets.push(bullet);
        SpawnOutcome::Spawned {
            play_sound: self.tuning.sound_enabled,
        }
    }

    /// Advance every bullet and drop the ones whose position left the canvas.
    pub fn update(&mut self) {
        let (width, height) = (self.canvas.width, self.canvas.height);
        for b in &mut self.bullets {
            b.x += b.vx;
            b.y += b.vy;
        }
        self.bullets
            .retain(|b| (0.0..=width).contains(&b.x) && (0.0..=height).contains(&b.y));
    }

    /// Consume the first bullet overlapping `target`.  Returns whether a hit
    /// happened; the caller applies the damage.
    pub fn collide_with(&mut self, target: &impl Collider) -> bool {
        let bounds: Rect = target.bounds();
        match self.bullets.iter().position(|b| b.bounds().overlaps(&bounds)) {
            Some(index) => {
                self.bullets.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) -> std::io::Result<()> {
        for b in &self.bullets {
            canvas.fill_rect(b.bounds(), self.tuning.color)?;
        }
        Ok(())
    }
}
