use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEventKind, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use led_invaders::assets::FileBackgroundLoader;
use led_invaders::config;
use led_invaders::display::TerminalCanvas;
use led_invaders::input::{Gamepad, KeyboardPad};
use led_invaders::led::{self, LedClient, LedPublisher};
use led_invaders::scene::{Game, TickInput};
use led_invaders::tuning::GameTuning;

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal is in raw alternate-screen mode, so logs go to a file.
fn init_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let file = File::create(config::log_file())?;

    if config::log_json() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(())
}

fn start_led_worker() -> LedPublisher {
    if !config::led_enabled() {
        tracing::info!("led integration disabled");
        return LedPublisher::disabled();
    }
    let started = LedClient::new(config::led_api_url(), config::led_timeout())
        .map_err(std::io::Error::other)
        .and_then(|client| led::spawn_worker(client, config::LED_QUEUE_CAPACITY));
    match started {
        // The worker thread is detached; it exits once the publisher drops.
        Ok((publisher, _worker)) => publisher,
        Err(e) => {
            tracing::error!(error = %e, "failed to start led worker");
            LedPublisher::disabled()
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn is_quit(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        }
}

/// Runs until the player quits.  One iteration is one fixed tick: drain
/// terminal events, tick, draw, forward side effects, sleep out the frame.
fn game_loop<W: Write>(
    canvas: &mut TerminalCanvas<W>,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
    leds: &LedPublisher,
) -> std::io::Result<()> {
    let mut rng = thread_rng();
    let mut pad = KeyboardPad::new();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut clicked = false;
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(key) => {
                    if is_quit(&key) {
                        return Ok(());
                    }
                    pad.record(&key);
                }
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(_) = mouse.kind {
                        clicked = true;
                    }
                }
                Event::Resize(cols, rows) => canvas.resize(cols, rows),
                _ => {}
            }
        }

        let input = TickInput {
            buttons: pad.poll(),
            clicked,
        };
        game.tick(&input, &mut rng);

        canvas.begin_frame()?;
        game.draw(canvas)?;
        for _ in 0..game.take_sounds() {
            canvas.bell()?;
        }
        canvas.present()?;

        for command in game.drain_led() {
            leds.publish(command);
        }

        let elapsed = frame_start.elapsed();
        if elapsed < config::TICK_INTERVAL {
            thread::sleep(config::TICK_INTERVAL - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing()?;

    let leds = start_led_worker();

    let mut tuning = GameTuning::default();
    tuning.player_bullets.sound_enabled = config::sound_enabled();
    let loader = FileBackgroundLoader::new(config::background_path());
    let mut game = Game::new(tuning, Box::new(loader));

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let (cols, rows) = terminal::size()?;
    let mut canvas = TerminalCanvas::new(out, cols, rows, tuning.canvas);
    tracing::info!(cols, rows, "game started");
    let result = game_loop(&mut canvas, &mut game, &rx, &leds);

    // Always restore the terminal
    let mut out = canvas.into_inner();
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        tracing::error!(error = %e, "game loop failed");
    }
    tracing::info!(ticks = game.ticks(), score = game.score(), "game exited");
    Ok(result?)
}
