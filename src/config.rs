use std::{env, path::PathBuf, time::Duration};

// Runtime constants (not gameplay tuning).

pub const TICK_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);
pub const LED_QUEUE_CAPACITY: usize = 64;

pub fn led_api_url() -> String {
    env::var("LED_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/light".to_string())
}

pub fn led_timeout() -> Duration {
    let millis = env::var("LED_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

pub fn led_enabled() -> bool {
    flag("LED_ENABLED", true)
}

pub fn sound_enabled() -> bool {
    flag("SOUND_ENABLED", true)
}

pub fn background_path() -> PathBuf {
    env::var("BACKGROUND_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("assets/background.txt"))
}

pub fn log_file() -> PathBuf {
    env::var("LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("led_invaders.log"))
}

pub fn log_json() -> bool {
    matches!(env::var("LOG_FORMAT").as_deref(), Ok("json"))
}

fn flag(name: &str, default: bool) -> bool {
    match env::var(name).as_deref() {
        Ok("1") | Ok("true") | Ok("yes") | Ok("on") => true,
        Ok("0") | Ok("false") | Ok("no") | Ok("off") => false,
        _ => default,
    }
}
