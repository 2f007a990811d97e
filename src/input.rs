/// Input source: a polled digital gamepad and the per-tick edge model that
/// turns its button array into player intent and one-shot actions.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tracing::debug;

use crate::entities::PlayerIntent;

// ── Button layout ─────────────────────────────────────────────────────────────

pub const BUTTON_X: usize = 0;
pub const BUTTON_A: usize = 1;
pub const BUTTON_B: usize = 2;
pub const BUTTON_Y: usize = 3;
pub const BUTTON_L: usize = 4;
pub const BUTTON_R: usize = 5;
pub const BUTTON_SELECT: usize = 8;
pub const BUTTON_START: usize = 9;

pub const BUTTON_COUNT: usize = 10;

/// Pressed flags in gamepad button order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonStates(pub Vec<bool>);

impl ButtonStates {
    pub fn released() -> Self {
        Self(vec![false; BUTTON_COUNT])
    }

    /// Convenience constructor: everything released except `indices`.
    pub fn with_pressed(indices: &[usize]) -> Self {
        let len = indices.iter().map(|i| i + 1).max().unwrap_or(0).max(BUTTON_COUNT);
        let mut states = vec![false; len];
        for &i in indices {
            states[i] = true;
        }
        Self(states)
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }
}

/// Anything that can be polled for a button array once per tick.
/// `None` means no pad is connected.
pub trait Gamepad {
    fn poll(&mut self) -> Option<ButtonStates>;
}

// ── Edge model ────────────────────────────────────────────────────────────────

/// What one tick of input asks the game to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickActions {
    pub intent: PlayerIntent,
    /// Debug override straight to the win screen.
    pub force_win: bool,
    pub start: bool,
}

/// Compares each poll against the previous one.  Movement and fire act for
/// as long as the button is down; everything else fires on the press edge.
#[derive(Clone, Debug, Default)]
pub struct InputEdges {
    previous: ButtonStates,
}

impl InputEdges {
    pub fn update(&mut self, current: &ButtonStates) -> TickActions {
        let edge = |i: usize| current.is_pressed(i) && !self.previous.is_pressed(i);

        let actions = TickActions {
            intent: PlayerIntent {
                left: current.is_pressed(BUTTON_L),
                right: current.is_pressed(BUTTON_R),
                shoot: current.is_pressed(BUTTON_A),
            },
            force_win: edge(BUTTON_B),
            start: edge(BUTTON_START),
        };

        for (index, name) in [
            (BUTTON_X, "X"),
            (BUTTON_A, "A"),
            (BUTTON_B, "B"),
            (BUTTON_Y, "Y"),
            (BUTTON_L, "L"),
            (BUTTON_R, "R"),
            (BUTTON_SELECT, "SELECT"),
            (BUTTON_START, "START"),
        ] {
            if edge(index) {
                debug!(button = name, "button pressed");
            }
        }

        self.previous = current.clone();
        actions
    }

    /// Forget held buttons, e.g. when the pad disconnects.
    pub fn reset(&mut self) {
        self.previous = ButtonStates::default();
    }
}

// ── Keyboard as a gamepad ─────────────────────────────────────────────────────

/// A key counts as held if its last press/repeat event arrived within this
/// many frames.  Terminals without key-release events rely on OS key repeat
/// refreshing it.
const HOLD_WINDOW: u64 = 8;

fn button_for(code: &KeyCode) -> Option<usize> {
    match code {
        KeyCode::Char('x') | KeyCode::Char('X') => Some(BUTTON_X),
        KeyCode::Char(' ') | KeyCode::Char('j') | KeyCode::Char('J') => Some(BUTTON_A),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(BUTTON_B),
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(BUTTON_Y),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(BUTTON_L),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(BUTTON_R),
        KeyCode::Tab => Some(BUTTON_SELECT),
        KeyCode::Enter => Some(BUTTON_START),
        _ => None,
    }
}

/// Virtual gamepad fed by terminal key events.
#[derive(Clone, Debug, Default)]
pub struct KeyboardPad {
    // Maps each held button → the frame it was last seen (press or repeat).
    button_frame: HashMap<usize, u64>,
    frame: u64,
}

impl KeyboardPad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &KeyEvent) {
        let Some(button) = button_for(&event.code) else {
            return;
        };
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.button_frame.insert(button, self.frame);
            }
            // Keyboard-enhancement terminals report releases; drop immediately.
            KeyEventKind::Release => {
                self.button_frame.remove(&button);
            }
        }
    }

    fn is_held(&self, button: usize) -> bool {
        self.button_frame
            .get(&button)
            .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }
}

impl Gamepad for KeyboardPad {
    fn poll(&mut self) -> Option<ButtonStates> {
        let states = (0..BUTTON_COUNT).map(|i| self.is_held(i)).collect();
        self.frame += 1;
        Some(ButtonStates(states))
    }
}
