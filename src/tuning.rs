/// Gameplay tuning.
///
/// Keep this separate from runtime configuration (tick rate, URLs, queue
/// sizes), which lives in `config`.  All distances are logical canvas pixels
/// and all speeds are pixels per tick.

use crate::entities::Rgb;

#[derive(Debug, Clone, Copy)]
pub struct CanvasTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasTuning {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,

    /// Horizontal speed while a direction is held.
    pub velocity: f32,

    /// Starting (and maximum) health.
    pub max_health: u32,

    /// Ticks between two accepted shots.
    pub fire_delay: u32,

    /// Distance of the ship's top edge from the bottom of the canvas.
    pub bottom_margin: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 48.0,
            velocity: 3.0,
            max_health: 3,
            fire_delay: 10,
            bottom_margin: 75.0,
        }
    }
}

/// One side's projectile pool.
#[derive(Debug, Clone, Copy)]
pub struct BulletTuning {
    /// Spawn requests beyond this many live bullets are dropped.
    pub max_bullets_at_a_time: usize,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
    pub sound_enabled: bool,
}

impl BulletTuning {
    pub fn player() -> Self {
        Self {
            max_bullets_at_a_time: 10,
            speed: 4.0,
            width: 5.0,
            height: 20.0,
            color: Rgb::new(0x96, 0xFA, 0x9D),
            sound_enabled: true,
        }
    }

    pub fn enemy() -> Self {
        Self {
            max_bullets_at_a_time: 4,
            speed: 3.0,
            width: 5.0,
            height: 20.0,
            color: Rgb::WHITE,
            sound_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormationTuning {
    pub rows: usize,
    pub columns: usize,
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub origin_x: f32,
    pub origin_y: f32,

    /// Initial horizontal speed (sign is the initial direction).
    pub velocity_x: f32,

    /// Vertical drop applied once per edge bounce.
    pub step_down: f32,

    /// Ticks between two enemy shots.
    pub fire_timer_default: u32,

    /// Base score per kill, multiplied by the current multiplier.
    pub kill_reward: u32,
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            rows: 5,
            columns: 10,
            enemy_width: 44.0,
            enemy_height: 32.0,
            spacing_x: 50.0,
            spacing_y: 35.0,
            origin_x: 20.0,
            origin_y: 70.0,
            velocity_x: 1.0,
            step_down: 30.0,
            fire_timer_default: 10,
            kill_reward: 1,
        }
    }
}

/// Visual shake applied after the player is hit.
#[derive(Debug, Clone, Copy)]
pub struct ShakeTuning {
    pub ticks: u32,
    pub max_offset: f32,
}

impl Default for ShakeTuning {
    fn default() -> Self {
        Self {
            ticks: 5,
            max_offset: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GameTuning {
    pub canvas: CanvasTuning,
    pub player: PlayerTuning,
    pub player_bullets: BulletTuning,
    pub enemy_bullets: BulletTuning,
    pub formation: FormationTuning,
    pub shake: ShakeTuning,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            canvas: CanvasTuning::default(),
            player: PlayerTuning::default(),
            player_bullets: BulletTuning::player(),
            enemy_bullets: BulletTuning::enemy(),
            formation: FormationTuning::default(),
            shake: ShakeTuning::default(),
        }
    }
}
