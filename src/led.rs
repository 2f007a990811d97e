/// LED-matrix side effects.
///
/// The game never waits on the display: the orchestrator queues
/// `LedCommand`s, `LedPublisher` hands them to a worker over a bounded
/// channel, and the worker posts each one over HTTP in its own task.
/// Failures are logged and dropped.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::entities::Rgb;

/// Scroll speed used for every announcement.
pub const TEXT_SPEED: f32 = 0.12;

#[derive(Clone, Debug, PartialEq)]
pub enum LedCommand {
    Fill {
        color: Rgb,
        delay: Duration,
    },
    ScrollText {
        text: String,
        speed: f32,
        color: Rgb,
        delay: Duration,
    },
}

impl LedCommand {
    pub fn fill(color: Rgb) -> Self {
        Self::Fill {
            color,
            delay: Duration::ZERO,
        }
    }

    pub fn scroll(text: impl Into<String>, color: Rgb) -> Self {
        Self::ScrollText {
            text: text.into(),
            speed: TEXT_SPEED,
            color,
            delay: Duration::ZERO,
        }
    }

    /// Same command, sent after `delay`.
    pub fn after(self, delay: Duration) -> Self {
        match self {
            Self::Fill { color, .. } => Self::Fill { color, delay },
            Self::ScrollText {
                text, speed, color, ..
            } => Self::ScrollText {
                text,
                speed,
                color,
                delay,
            },
        }
    }

    pub fn delay(&self) -> Duration {
        match self {
            Self::Fill { delay, .. } | Self::ScrollText { delay, .. } => *delay,
        }
    }
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct FillRequest {
    color: Rgb,
}

#[derive(Debug, Serialize)]
struct ScrollTextRequest<'a> {
    text: &'a str,
    text_speed: f32,
    color: Rgb,
}

#[derive(Debug)]
pub enum LedError {
    /// Request never got a response (connect, timeout, body).
    Transport(reqwest::Error),
    /// Device answered with a non-success status.
    Status(u16),
}

impl fmt::Display for LedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "led request failed: {e}"),
            Self::Status(code) => write!(f, "led device returned status {code}"),
        }
    }
}

impl std::error::Error for LedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Status(_) => None,
        }
    }
}

// ── HTTP client ───────────────────────────────────────────────────────────────

// Thin reqwest client for the LED display API.
#[derive(Clone)]
pub struct LedClient {
    http: reqwest::Client,
    base_url: String,
}

impl LedClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fill(&self, color: Rgb) -> Result<(), LedError> {
        self.post("fill", &FillRequest { color }).await
    }

    pub async fn scroll_text(&self, text: &str, speed: f32, color: Rgb) -> Result<(), LedError> {
        let body = ScrollTextRequest {
            text,
            text_speed: speed,
            color,
        };
        self.post("scrolling-text", &body).await
    }

    /// Send one command, ignoring its delay.
    pub async fn send(&self, command: &LedCommand) -> Result<(), LedError> {
        match command {
            LedCommand::Fill { color, .. } => self.fill(*color).await,
            LedCommand::ScrollText {
                text, speed, color, ..
            } => self.scroll_text(text, *speed, *color).await,
        }
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<(), LedError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(LedError::Transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LedError::Status(response.status().as_u16()))
        }
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

/// Game-side handle.  Never blocks: a full or closed queue drops the command.
#[derive(Clone, Debug)]
pub struct LedPublisher {
    tx: Option<mpsc::Sender<LedCommand>>,
}

impl LedPublisher {
    pub fn new(tx: mpsc::Sender<LedCommand>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Publisher that discards everything (LED integration switched off).
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn publish(&self, command: LedCommand) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.try_send(command) {
            match e {
                mpsc::error::TrySendError::Full(command) => {
                    warn!(?command, "led queue full, dropping command");
                }
                mpsc::error::TrySendError::Closed(command) => {
                    warn!(?command, "led worker gone, dropping command");
                }
            }
        }
    }
}

/// Receive commands until every publisher is dropped.  Each command runs in
/// its own task so delayed commands never hold up later ones.
pub async fn drain(mut rx: mpsc::Receiver<LedCommand>, client: Arc<LedClient>) {
    let mut in_flight = tokio::task::JoinSet::new();
    while let Some(command) = rx.recv().await {
        let client = Arc::clone(&client);
        in_flight.spawn(async move {
            let delay = command.delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match client.send(&command).await {
                Ok(()) => debug!(?command, "led command sent"),
                Err(e) => warn!(error = %e, ?command, "led command failed"),
            }
        });
        // Reap finished tasks so the set does not grow for the whole session.
        while in_flight.try_join_next().is_some() {}
    }
    // Let delayed commands (e.g. the clear after a hit flash) finish.
    while in_flight.join_next().await.is_some() {}
}

/// Run the LED worker on its own thread with a private Tokio runtime, so the
/// synchronous game loop only ever touches the channel.
pub fn spawn_worker(
    client: LedClient,
    capacity: usize,
) -> std::io::Result<(LedPublisher, thread::JoinHandle<()>)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (tx, rx) = mpsc::channel::<LedCommand>(capacity);
    info!(base_url = client.base_url(), "led worker starting");
    let handle = thread::Builder::new()
        .name("led-worker".to_string())
        .spawn(move || runtime.block_on(drain(rx, Arc::new(client))))?;
    Ok((LedPublisher::new(tx), handle))
}
