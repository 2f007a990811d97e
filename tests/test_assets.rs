use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use led_invaders::assets::{
    AssetLoader, Background, BackgroundSlot, FileBackgroundLoader, LoadState, PendingBackground,
};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("led_invaders_{}_{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

/// Poll until the load settles, giving the loader thread time to finish.
fn settle(slot: &mut BackgroundSlot) {
    for _ in 0..200 {
        if slot.poll() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("background load never settled");
}

#[test]
fn text_splits_into_rows() {
    let bg = Background::from_text("a\nbb\n\nccc");
    assert_eq!(bg.lines, vec!["a", "bb", "", "ccc"]);
}

#[test]
fn file_loader_reads_background() {
    let path = temp_file("ok.txt", "~~~\n| |\n");
    let mut slot = BackgroundSlot::default();
    assert!(matches!(slot.state(), LoadState::Idle));

    slot.begin(&FileBackgroundLoader::new(&path));
    assert!(matches!(slot.state(), LoadState::Loading));
    assert!(!slot.is_settled());

    settle(&mut slot);
    assert!(slot.is_settled());
    assert_eq!(slot.background().unwrap().lines, vec!["~~~", "| |"]);
    // Already settled; nothing more to report.
    assert!(!slot.poll());

    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_fails_explicitly() {
    let mut slot = BackgroundSlot::default();
    slot.begin(&FileBackgroundLoader::new("/definitely/not/here.txt"));
    settle(&mut slot);

    match slot.state() {
        LoadState::Failed(reason) => assert!(reason.starts_with("failed to read")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(slot.background().is_none());
}

#[test]
fn blank_file_is_rejected() {
    let path = temp_file("blank.txt", "  \n\n");
    let mut slot = BackgroundSlot::default();
    slot.begin(&FileBackgroundLoader::new(&path));
    settle(&mut slot);

    match slot.state() {
        LoadState::Failed(reason) => assert!(reason.ends_with("is empty")),
        other => panic!("expected failure, got {other:?}"),
    }
    let _ = std::fs::remove_file(path);
}

struct VanishingLoader;

impl AssetLoader for VanishingLoader {
    fn begin(&self) -> PendingBackground {
        let (_tx, rx) = mpsc::channel();
        rx
    }
}

#[test]
fn dropped_loader_counts_as_failure() {
    let mut slot = BackgroundSlot::default();
    slot.begin(&VanishingLoader);
    assert!(slot.poll());
    assert!(matches!(slot.state(), LoadState::Failed(_)));
}

#[derive(Default)]
struct CountingLoader {
    calls: AtomicUsize,
}

impl AssetLoader for CountingLoader {
    fn begin(&self) -> PendingBackground {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(Ok(Background::from_text("x")));
        rx
    }
}

#[test]
fn load_starts_only_once() {
    let loader = CountingLoader::default();
    let mut slot = BackgroundSlot::default();
    slot.begin(&loader);
    slot.begin(&loader);
    assert!(slot.poll());
    slot.begin(&loader);
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}
