/// All game entity types: pure data plus the bounding-box geometry every
/// collision check is built on.  Behaviour lives in the controller modules.

use serde::Serialize;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in logical canvas pixels (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Anything that takes part in bounding-box collision.
pub trait Collider {
    fn bounds(&self) -> Rect;

    fn collides_with(&self, other: &impl Collider) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

impl Collider for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

// ── Colour ────────────────────────────────────────────────────────────────────

/// 24-bit colour shared by the canvas and the LED wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

impl BulletOwner {
    /// Vertical direction of travel: player shots go up, enemy shots go down.
    pub fn direction(&self) -> f32 {
        match self {
            BulletOwner::Player => -1.0,
            BulletOwner::Enemy => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub owner: BulletOwner,
}

impl Collider for Bullet {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Squid,
    Crab,
    Octopus,
}

impl EnemyKind {
    /// Kind used for a given formation row (top row first).
    pub fn for_row(row: usize) -> Self {
        match row {
            0 => EnemyKind::Squid,
            1 | 2 => EnemyKind::Crab,
            _ => EnemyKind::Octopus,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Formation column, used to pick who fires.
    pub column: usize,
    pub kind: EnemyKind,
}

impl Collider for Enemy {
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Enemies of one formation row, left to right.  Destroyed enemies are
/// removed outright, so every member is alive.
pub type EnemyRow = Vec<Enemy>;

// ── Player input ──────────────────────────────────────────────────────────────

/// What the player asked for on this tick.  Rebuilt from input every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerIntent {
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
}
