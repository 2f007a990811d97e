/// Scene orchestrator: the fixed-tick update, the scene state machine and
/// the one-shot LED side effects tied to scene changes.
///
/// All game state lives in `Game`.  The binary calls `tick` once per frame
/// and then `draw`; nothing here blocks or touches the network.  LED effects
/// are queued in an outbox that the caller drains after every tick.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::assets::{AssetLoader, BackgroundSlot, LoadState};
use crate::bullets::{BulletController, SpawnOutcome};
use crate::display::{Canvas, TextStyle};
use crate::enemies::EnemyController;
use crate::entities::{BulletOwner, PlayerIntent, Rgb};
use crate::input::{ButtonStates, InputEdges, TickActions};
use crate::led::LedCommand;
use crate::player::Player;
use crate::tuning::GameTuning;

const C_TEXT: Rgb = Rgb::WHITE;
const C_NOTICE: Rgb = Rgb::new(0xFF, 0xB7, 0x4D);

/// How long the red hit flash stays on the LED matrix.
const HIT_FLASH: Duration = Duration::from_millis(500);
/// Pause before the game-over banner starts scrolling.
const GAME_OVER_DELAY: Duration = Duration::from_millis(1000);

// ── State machine ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scene {
    Menu,
    Level1,
    Lose,
    Win,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    PointerClick,
    HealthDepleted,
    FormationCleared,
    /// Debug button: jump straight to the win screen.
    ForceWin,
    Start,
}

/// The whole transition table.  `None` means the trigger does nothing in
/// that scene.
pub fn transition(scene: Scene, trigger: Trigger) -> Option<Scene> {
    match (scene, trigger) {
        (Scene::Menu, Trigger::PointerClick) => Some(Scene::Level1),
        (Scene::Level1, Trigger::HealthDepleted) => Some(Scene::Lose),
        (Scene::Level1, Trigger::FormationCleared) => Some(Scene::Win),
        (Scene::Level1, Trigger::ForceWin) => Some(Scene::Win),
        (_, Trigger::Start) => Some(Scene::Level1),
        _ => None,
    }
}

// ── Per-tick input ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct TickInput {
    /// Polled gamepad state; `None` when no pad is connected.
    pub buttons: Option<ButtonStates>,
    /// A pointer click arrived since the previous tick.
    pub clicked: bool,
}

// ── Level state ───────────────────────────────────────────────────────────────

/// Everything built fresh each time `Level1` is entered.
#[derive(Clone, Debug)]
pub struct Level {
    pub player: Player,
    /// Shared player-side pool; the player fires into it, the formation
    /// checks it for hits.
    pub player_bullets: BulletController,
    pub enemies: EnemyController,
}

impl Level {
    pub fn new(tuning: &GameTuning) -> Self {
        Self {
            player: Player::new(&tuning.player, &tuning.canvas),
            player_bullets: BulletController::new(
                BulletOwner::Player,
                tuning.player_bullets,
                tuning.canvas,
            ),
            enemies: EnemyController::new(&tuning.formation, tuning.enemy_bullets, tuning.canvas),
        }
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

pub struct Game {
    tuning: GameTuning,
    scene: Scene,
    scene_initialized: bool,
    level: Option<Level>,
    background: BackgroundSlot,
    loader: Box<dyn AssetLoader>,
    edges: InputEdges,
    /// One-shot click listener, live only while the menu is showing.
    pointer_armed: bool,
    /// Latch for the clear-display request sent on the very first tick.
    display_cleared: bool,
    shake_ticks: u32,
    shake_offset: Option<(f32, f32)>,
    outbox: Vec<LedCommand>,
    sounds: u32,
    ticks: u64,
}

impl Game {
    pub fn new(tuning: GameTuning, loader: Box<dyn AssetLoader>) -> Self {
        Self {
            tuning,
            scene: Scene::Menu,
            scene_initialized: false,
            level: None,
            background: BackgroundSlot::default(),
            loader,
            edges: InputEdges::default(),
            pointer_armed: true,
            display_cleared: false,
            shake_ticks: 0,
            shake_offset: None,
            outbox: Vec::new(),
            sounds: 0,
            ticks: 0,
        }
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn is_scene_initialized(&self) -> bool {
        self.scene_initialized
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    pub fn score(&self) -> u32 {
        self.level.as_ref().map_or(0, |l| l.enemies.score)
    }

    pub fn background_state(&self) -> &LoadState {
        self.background.state()
    }

    pub fn shake_offset(&self) -> Option<(f32, f32)> {
        self.shake_offset
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// LED commands queued since the last drain, oldest first.
    pub fn drain_led(&mut self) -> std::vec::Drain<'_, LedCommand> {
        self.outbox.drain(..)
    }

    /// Number of fire sounds to play since the last call.
    pub fn take_sounds(&mut self) -> u32 {
        std::mem::take(&mut self.sounds)
    }

    /// Advance the game by one fixed tick.
    pub fn tick(&mut self, input: &TickInput, rng: &mut impl Rng) {
        self.ticks += 1;

        let actions = match &input.buttons {
            Some(buttons) => self.edges.update(buttons),
            None => {
                self.edges.reset();
                TickActions::default()
            }
        };

        if !self.display_cleared {
            self.publish(LedCommand::fill(Rgb::BLACK));
            self.display_cleared = true;
        }

        if self.background.poll() && self.scene == Scene::Menu {
            self.scene_initialized = true;
        }

        if actions.start {
            self.publish(LedCommand::scroll("GAME START", Rgb::GREEN));
            self.apply(Trigger::Start);
        }
        if actions.force_win {
            self.apply(Trigger::ForceWin);
        }
        if input.clicked && self.pointer_armed {
            self.pointer_armed = false;
            self.apply(Trigger::PointerClick);
        }

        match self.scene {
            Scene::Menu => self.update_menu(),
            Scene::Level1 => self.update_level(actions.intent, rng),
            Scene::Lose | Scene::Win => self.update_end_screen(),
        }
    }

    /// Fire a trigger through the transition table.
    pub fn apply(&mut self, trigger: Trigger) -> bool {
        match transition(self.scene, trigger) {
            Some(next) => {
                info!(from = ?self.scene, to = ?next, ?trigger, "scene transition");
                self.enter(next);
                true
            }
            None => false,
        }
    }

    fn enter(&mut self, next: Scene) {
        self.scene = next;
        self.scene_initialized = false;
        self.pointer_armed = next == Scene::Menu;
        if next == Scene::Level1 {
            self.shake_ticks = 0;
            self.shake_offset = None;
        }
    }

    fn publish(&mut self, command: LedCommand) {
        self.outbox.push(command);
    }

    fn update_menu(&mut self) {
        if self.scene_initialized {
            return;
        }
        self.background.begin(self.loader.as_ref());
        // A load finished during another scene still counts.
        if self.background.is_settled() {
            self.scene_initialized = true;
        }
    }

    fn update_level(&mut self, intent: PlayerIntent, rng: &mut impl Rng) {
        if !self.scene_initialized {
            self.level = Some(Level::new(&self.tuning));
            self.scene_initialized = true;
            info!("level initialized");
        }
        let Some(level) = self.level.as_mut() else {
            return;
        };

        level.player.intent = intent;
        if let Some(SpawnOutcome::Spawned { play_sound: true }) =
            level.player.update(&mut level.player_bullets)
        {
            self.sounds += 1;
        }
        level.player_bullets.update();

        level.enemies.score_multiplier = level.player.health;
        level.enemies.update(&mut level.player_bullets, rng);

        let mut hits = 0;
        if level.enemies.bullets_mut().collide_with(&level.player) {
            hits += 1;
        }
        if level.enemies.collide_with(&level.player) {
            hits += 1;
        }
        let cleared = level.enemies.is_cleared();

        for _ in 0..hits {
            if self.scene != Scene::Level1 {
                break;
            }
            self.lose_health();
        }
        if cleared {
            self.apply(Trigger::FormationCleared);
        }

        self.shake_offset = if self.shake_ticks > 0 {
            self.shake_ticks -= 1;
            let max = self.tuning.shake.max_offset.max(f32::EPSILON);
            Some((rng.gen_range(0.0..max), rng.gen_range(0.0..max)))
        } else {
            None
        };
    }

    fn lose_health(&mut self) {
        let Some(level) = self.level.as_mut() else {
            return;
        };
        if level.player.health == 0 {
            return;
        }
        level.player.health -= 1;
        let health = level.player.health;
        debug!(health, "player hit");

        self.shake_ticks = self.tuning.shake.ticks;
        self.publish(LedCommand::fill(Rgb::RED));
        self.publish(LedCommand::fill(Rgb::BLACK).after(HIT_FLASH));

        if health == 0 {
            self.apply(Trigger::HealthDepleted);
        }
    }

    fn update_end_screen(&mut self) {
        if self.scene_initialized {
            return;
        }
        self.scene_initialized = true;
        let banner = match self.scene {
            Scene::Lose => LedCommand::scroll("GAME OVER", Rgb::RED).after(GAME_OVER_DELAY),
            _ => LedCommand::scroll("YOU WIN", Rgb::GREEN),
        };
        self.publish(banner);
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) -> std::io::Result<()> {
        match self.scene {
            Scene::Menu => self.draw_menu(canvas),
            Scene::Level1 => self.draw_level(canvas),
            Scene::Lose => self.draw_end_screen(canvas, "Game Over", -50.0, 50.0),
            Scene::Win => self.draw_end_screen(canvas, "You Win!", 0.0, 70.0),
        }
    }

    fn draw_background<C: Canvas + ?Sized>(&self, canvas: &mut C) -> std::io::Result<()> {
        match self.background.background() {
            Some(background) => canvas.draw_background(background),
            None => Ok(()),
        }
    }

    fn draw_menu<C: Canvas + ?Sized>(&self, canvas: &mut C) -> std::io::Result<()> {
        let (cx, cy) = self.center();
        canvas.reset_transform();
        self.draw_background(canvas)?;
        canvas.fill_text("Pingu's Bar", cx, cy - 40.0, TextStyle::centered(30, C_TEXT))?;
        canvas.fill_text("Press start.", cx, cy, TextStyle::centered(16, C_TEXT))?;
        if let LoadState::Failed(reason) = self.background.state() {
            let notice = format!("background unavailable: {reason}");
            canvas.fill_text(&notice, cx, cy + 40.0, TextStyle::centered(16, C_NOTICE))?;
        }
        Ok(())
    }

    fn draw_level<C: Canvas + ?Sized>(&self, canvas: &mut C) -> std::io::Result<()> {
        match self.shake_offset {
            Some((dx, dy)) => canvas.set_offset(dx, dy),
            None => canvas.reset_transform(),
        }
        self.draw_background(canvas)?;

        if let Some(level) = &self.level {
            level.enemies.draw(canvas)?;
            level.player.draw(canvas)?;
            level.player_bullets.draw(canvas)?;
            level.enemies.bullets().draw(canvas)?;

            let height = self.tuning.canvas.height;
            canvas.fill_text(
                &format!("${} Tips", level.enemies.score),
                10.0,
                50.0,
                TextStyle::left(30, C_TEXT),
            )?;
            canvas.fill_text(
                &format!("{} hp", level.player.health),
                50.0,
                height - 30.0,
                TextStyle::centered(30, C_TEXT),
            )?;
        }
        canvas.reset_transform();
        Ok(())
    }

    fn draw_end_screen<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        title: &str,
        title_dy: f32,
        tip_dy: f32,
    ) -> std::io::Result<()> {
        let (cx, cy) = self.center();
        canvas.reset_transform();
        self.draw_background(canvas)?;
        canvas.fill_text(title, cx, cy + title_dy, TextStyle::centered(70, C_TEXT))?;
        canvas.fill_text(
            &format!("Tip ${}!", self.score()),
            cx,
            cy + tip_dy,
            TextStyle::centered(50, C_TEXT),
        )?;
        canvas.fill_text(
            "Press start to play again",
            cx,
            cy + 130.0,
            TextStyle::centered(30, C_TEXT),
        )
    }

    fn center(&self) -> (f32, f32) {
        (self.tuning.canvas.width / 2.0, self.tuning.canvas.height / 2.0)
    }
}
