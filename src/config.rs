use std::path::PathBuf;
use std::str::FromStr;

use crate::maze::MIN_SIDE;

pub const DEFAULT_TICK_MS: u64 = 150;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const BASE_HEIGHT: usize = 10;
pub const BASE_WIDTH: usize = 15;
pub const BASE_ADVERSARIES: usize = 1;
pub const BASE_MIN_SEPARATION: f64 = 50.0;

/// Runtime knobs, read from `PACMAZE_*` environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub tick_ms: u64,
    pub render_fps: u64,
    pub base_height: usize,
    pub base_width: usize,
    pub base_adversaries: usize,
    pub min_separation: f64,
    pub seed: Option<u64>,
    pub log_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            base_height: BASE_HEIGHT,
            base_width: BASE_WIDTH,
            base_adversaries: BASE_ADVERSARIES,
            min_separation: BASE_MIN_SEPARATION,
            seed: None,
            log_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        Self {
            tick_ms: parse::<u64>(&lookup, "PACMAZE_TICK_MS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.tick_ms),
            render_fps: parse::<u64>(&lookup, "PACMAZE_FPS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.render_fps),
            base_height: parse::<usize>(&lookup, "PACMAZE_HEIGHT")
                .unwrap_or(defaults.base_height)
                .max(MIN_SIDE),
            base_width: parse::<usize>(&lookup, "PACMAZE_WIDTH")
                .unwrap_or(defaults.base_width)
                .max(MIN_SIDE),
            base_adversaries: parse::<usize>(&lookup, "PACMAZE_ADVERSARIES")
                .unwrap_or(defaults.base_adversaries),
            min_separation: parse::<f64>(&lookup, "PACMAZE_MIN_SEPARATION")
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.min_separation),
            seed: parse::<u64>(&lookup, "PACMAZE_SEED"),
            log_path: lookup("PACMAZE_LOG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}
