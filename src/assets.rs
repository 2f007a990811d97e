/// Background asset loading.
///
/// Loading happens off the tick thread; the orchestrator polls a
/// `BackgroundSlot` once per tick and may render any number of frames
/// before the asset arrives.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use tracing::{error, info};

/// Text-art backdrop, one string per terminal row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Background {
    pub lines: Vec<String>,
}

impl Background {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug)]
pub enum AssetError {
    Io { path: PathBuf, source: std::io::Error },
    Empty { path: PathBuf },
    /// The loader went away without reporting a result.
    Abandoned,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Empty { path } => write!(f, "{} is empty", path.display()),
            Self::Abandoned => write!(f, "asset loader stopped before finishing"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type PendingBackground = mpsc::Receiver<Result<Background, AssetError>>;

/// Starts an asynchronous background load and hands back the receiving end.
pub trait AssetLoader {
    fn begin(&self) -> PendingBackground;
}

/// Reads a text-art file on a short-lived thread.
pub struct FileBackgroundLoader {
    path: PathBuf,
}

impl FileBackgroundLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AssetLoader for FileBackgroundLoader {
    fn begin(&self) -> PendingBackground {
        let (tx, rx) = mpsc::channel();
        let path = self.path.clone();
        thread::spawn(move || {
            let result = match std::fs::read_to_string(&path) {
                Ok(text) if text.trim().is_empty() => Err(AssetError::Empty { path }),
                Ok(text) => Ok(Background::from_text(&text)),
                Err(source) => Err(AssetError::Io { path, source }),
            };
            // Receiver gone means the game already quit.
            let _ = tx.send(result);
        });
        rx
    }
}

#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready(Background),
    Failed(String),
}

/// Lifecycle of the single background asset.
#[derive(Debug, Default)]
pub struct BackgroundSlot {
    state: LoadState,
    pending: Option<PendingBackground>,
}

impl BackgroundSlot {
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn background(&self) -> Option<&Background> {
        match &self.state {
            LoadState::Ready(background) => Some(background),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, LoadState::Ready(_) | LoadState::Failed(_))
    }

    /// Kick off a load unless one is already running or finished.
    pub fn begin(&mut self, loader: &dyn AssetLoader) {
        if matches!(self.state, LoadState::Idle) {
            self.pending = Some(loader.begin());
            self.state = LoadState::Loading;
        }
    }

    /// Non-blocking check for a finished load.  Returns `true` on the tick the
    /// load settles (either way).
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return false,
            Err(mpsc::TryRecvError::Disconnected) => Err(AssetError::Abandoned),
        };
        self.pending = None;
        match outcome {
            Ok(background) => {
                info!(rows = background.lines.len(), "background loaded");
                self.state = LoadState::Ready(background);
            }
            Err(e) => {
                error!(error = %e, "background load failed");
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }
}
