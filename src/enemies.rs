/// Enemy formation: grid movement, enemy fire, kills and score.

use rand::Rng;
use tracing::debug;

use crate::bullets::BulletController;
use crate::display::Canvas;
use crate::entities::{BulletOwner, Collider, Enemy, EnemyKind, EnemyRow, Rgb};
use crate::tuning::{BulletTuning, CanvasTuning, FormationTuning};

const C_SQUID: Rgb = Rgb::new(0xE0, 0x40, 0xFB);
const C_CRAB: Rgb = Rgb::new(0x69, 0xF0, 0xAE);
const C_OCTOPUS: Rgb = Rgb::new(0xFF, 0x52, 0x52);

fn color_for(kind: EnemyKind) -> Rgb {
    match kind {
        EnemyKind::Squid => C_SQUID,
        EnemyKind::Crab => C_CRAB,
        EnemyKind::Octopus => C_OCTOPUS,
    }
}

/// Lay out a full formation grid from tuning.
pub fn build_formation(t: &FormationTuning) -> Vec<EnemyRow> {
    (0..t.rows)
        .map(|row| {
            (0..t.columns)
                .map(|column| Enemy {
                    x: t.origin_x + column as f32 * t.spacing_x,
                    y: t.origin_y + row as f32 * t.spacing_y,
                    width: t.enemy_width,
                    height: t.enemy_height,
                    column,
                    kind: EnemyKind::for_row(row),
                })
                .collect()
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct EnemyController {
    rows: Vec<EnemyRow>,
    /// Shared by the whole formation; only its sign ever changes.
    velocity_x: f32,
    step_down: f32,
    fire_timer: u32,
    fire_timer_default: u32,
    kill_reward: u32,
    pub score: u32,
    /// Set by the orchestrator each tick from the player's health.
    pub score_multiplier: u32,
    bullets: BulletController,
    canvas: CanvasTuning,
}

impl EnemyController {
    pub fn new(formation: &FormationTuning, enemy_bullets: BulletTuning, canvas: CanvasTuning) -> Self {
        Self::with_rows(build_formation(formation), formation, enemy_bullets, canvas)
    }

    /// Start from an explicit set of rows instead of the tuned grid.
    pub fn with_rows(
        rows: Vec<EnemyRow>,
        formation: &FormationTuning,
        enemy_bullets: BulletTuning,
        canvas: CanvasTuning,
    ) -> Self {
        let mut rows = rows;
        rows.retain(|row| !row.is_empty());
        Self {
            rows,
            velocity_x: formation.velocity_x,
            step_down: formation.step_down,
            fire_timer: formation.fire_timer_default,
            fire_timer_default: formation.fire_timer_default,
            kill_reward: formation.kill_reward,
            score: 0,
            score_multiplier: 1,
            bullets: BulletController::new(BulletOwner::Enemy, enemy_bullets, canvas),
            canvas,
        }
    }

    pub fn enemy_rows(&self) -> &[EnemyRow] {
        &self.rows
    }

    pub fn enemy_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_cleared(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn velocity_x(&self) -> f32 {
        self.velocity_x
    }

    pub fn bullets(&self) -> &BulletController {
        &self.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut BulletController {
        &mut self.bullets
    }

    /// One formation tick: sweep or bounce, resolve player shots, maybe fire,
    /// then move enemy bullets.  Returns the number of enemies shot down.
    pub fn update(&mut self, player_bullets: &mut BulletController, rng: &mut impl Rng) -> usize {
        self.advance();
        let kills = self.resolve_hits(player_bullets);
        self.fire(rng);
        self.bullets.update();
        kills
    }

    /// Move the formation one step.  If any enemy would cross a side of the
    /// canvas, the formation instead reverses and drops by `step_down`.
    /// The drop stops at the canvas floor; from there the bottom row sweeps
    /// through the player's lane.
    pub fn advance(&mut self) {
        let vx = self.velocity_x;
        let width = self.canvas.width;
        let bounce = self
            .rows
            .iter()
            .flatten()
            .any(|e| e.x + vx < 0.0 || e.x + e.width + vx > width);

        if bounce {
            self.velocity_x = -vx;
            let lowest = self
                .rows
                .iter()
                .flatten()
                .map(|e| e.y + e.height)
                .fold(f32::MIN, f32::max);
            let step = self.step_down.min(self.canvas.height - lowest).max(0.0);
            for e in self.rows.iter_mut().flatten() {
                e.y += step;
            }
            debug!(velocity_x = self.velocity_x, step, "formation bounced");
        } else {
            for e in self.rows.iter_mut().flatten() {
                e.x += vx;
            }
        }
    }

    /// Destroy every enemy struck by a player bullet.
    fn resolve_hits(&mut self, player_bullets: &mut BulletController) -> usize {
        let mut kills = 0;
        for row in &mut self.rows {
            row.retain(|enemy| {
                let hit = player_bullets.collide_with(enemy);
                kills += hit as usize;
                !hit
            });
        }
        self.award(kills);
        self.prune_rows();
        kills
    }

    /// Body collision with the player.  Every overlapping enemy is destroyed
    /// and scored; one `true` is reported regardless of how many touched.
    pub fn collide_with(&mut self, target: &impl Collider) -> bool {
        let mut kills = 0;
        for row in &mut self.rows {
            row.retain(|enemy| {
                let hit = enemy.collides_with(target);
                kills += hit as usize;
                !hit
            });
        }
        self.award(kills);
        self.prune_rows();
        kills > 0
    }

    fn award(&mut self, kills: usize) {
        if kills == 0 {
            return;
        }
        let gained = kills as u32 * self.kill_reward * self.score_multiplier;
        self.score += gained;
        debug!(kills, gained, score = self.score, "enemies destroyed");
    }

    fn prune_rows(&mut self) {
        self.rows.retain(|row| !row.is_empty());
    }

    /// Count down the fire timer; on expiry the lowest enemy of a random
    /// occupied column shoots.
    fn fire(&mut self, rng: &mut impl Rng) {
        self.fire_timer = self.fire_timer.saturating_sub(1);
        if self.fire_timer > 0 {
            return;
        }
        self.fire_timer = self.fire_timer_default;
        if !self.bullets.has_capacity() {
            return;
        }

        let mut columns: Vec<usize> = self.rows.iter().flatten().map(|e| e.column).collect();
        columns.sort_unstable();
        columns.dedup();
        if columns.is_empty() {
            return;
        }
        let column = columns[rng.gen_range(0..columns.len())];

        let shooter = self
            .rows
            .iter()
            .flatten()
            .filter(|e| e.column == column)
            .max_by(|a, b| a.y.total_cmp(&b.y));
        if let Some(e) = shooter {
            let (x, y) = (e.x + e.width / 2.0, e.y + e.height);
            self.bullets.spawn(x, y);
        }
    }

    /// Draws the enemies only; enemy bullets are drawn through `bullets()`.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) -> std::io::Result<()> {
        for e in self.rows.iter().flatten() {
            canvas.fill_rect(e.bounds(), color_for(e.kind))?;
        }
        Ok(())
    }
}
