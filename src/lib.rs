pub mod assets;
pub mod bullets;
pub mod config;
pub mod display;
pub mod enemies;
pub mod entities;
pub mod input;
pub mod led;
pub mod player;
pub mod scene;
pub mod tuning;
