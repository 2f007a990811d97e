// Shared fixtures for the integration tests: a canvas that records draw
// calls and asset loaders with scripted outcomes.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{mpsc, Mutex};

use led_invaders::assets::{AssetError, AssetLoader, Background, PendingBackground};
use led_invaders::display::{Canvas, TextStyle};
use led_invaders::entities::{Rect, Rgb};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Background,
    Rect(Rect, Rgb),
    Text(String, TextStyle),
    Offset(f32, f32),
    Reset,
}

#[derive(Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text(text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn rects_in(&self, color: Rgb) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Rect(_, fill) if *fill == color))
            .count()
    }

    pub fn drew_background(&self) -> bool {
        self.calls.contains(&DrawCall::Background)
    }
}

impl Canvas for RecordingCanvas {
    fn draw_background(&mut self, _background: &Background) -> std::io::Result<()> {
        self.calls.push(DrawCall::Background);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> std::io::Result<()> {
        self.calls.push(DrawCall::Rect(rect, color));
        Ok(())
    }

    fn fill_text(&mut self, text: &str, _x: f32, _y: f32, look: TextStyle) -> std::io::Result<()> {
        self.calls.push(DrawCall::Text(text.to_string(), look));
        Ok(())
    }

    fn set_offset(&mut self, dx: f32, dy: f32) {
        self.calls.push(DrawCall::Offset(dx, dy));
    }

    fn reset_transform(&mut self) {
        self.calls.push(DrawCall::Reset);
    }
}

/// Loader whose result is already waiting when the load begins.
pub struct ReadyLoader;

impl AssetLoader for ReadyLoader {
    fn begin(&self) -> PendingBackground {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(Ok(Background::from_text("~~ bar ~~\n|| ||")));
        rx
    }
}

pub struct FailingLoader;

impl AssetLoader for FailingLoader {
    fn begin(&self) -> PendingBackground {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(Err(AssetError::Empty {
            path: PathBuf::from("missing.txt"),
        }));
        rx
    }
}

/// Loader that never finishes; keeps its senders alive so the channel
/// does not report a disconnect.
#[derive(Default)]
pub struct StalledLoader {
    senders: Mutex<Vec<mpsc::Sender<Result<Background, AssetError>>>>,
}

impl AssetLoader for StalledLoader {
    fn begin(&self) -> PendingBackground {
        let (tx, rx) = mpsc::channel();
        self.senders.lock().unwrap().push(tx);
        rx
    }
}
