//! Runtime settings read from `MAZE_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 14;
pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rows: usize,
    pub cols: usize,
    pub tick_ms: u64,
    pub render_fps: u64,
    pub seed: Option<u64>,
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            seed: None,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unparsable or zero values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            rows: positive(&lookup, "MAZE_ROWS").unwrap_or(DEFAULT_ROWS),
            cols: positive(&lookup, "MAZE_COLS").unwrap_or(DEFAULT_COLS),
            tick_ms: positive(&lookup, "MAZE_TICK_MS").unwrap_or(DEFAULT_TICK_MS),
            render_fps: positive(&lookup, "MAZE_FPS").unwrap_or(DEFAULT_RENDER_FPS),
            seed: lookup("MAZE_SEED").and_then(|v| v.trim().parse().ok()),
            log_dir: lookup("MAZE_LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }
}

fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(settings_from(&[]), Settings::default());
    }

    #[test]
    fn values_are_parsed() {
        let s = settings_from(&[
            ("MAZE_ROWS", "4"),
            ("MAZE_COLS", " 7 "),
            ("MAZE_TICK_MS", "33"),
            ("MAZE_FPS", "30"),
            ("MAZE_SEED", "12345"),
            ("MAZE_LOG_DIR", "/tmp/maze"),
        ]);
        assert_eq!(s.rows, 4);
        assert_eq!(s.cols, 7);
        assert_eq!(s.tick_ms, 33);
        assert_eq!(s.render_fps, 30);
        assert_eq!(s.seed, Some(12345));
        assert_eq!(s.log_dir, PathBuf::from("/tmp/maze"));
    }

    #[test]
    fn zero_and_garbage_fall_back() {
        let s = settings_from(&[
            ("MAZE_ROWS", "0"),
            ("MAZE_COLS", "-3"),
            ("MAZE_FPS", "fast"),
            ("MAZE_SEED", "x"),
            ("MAZE_LOG_DIR", "  "),
        ]);
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn seed_zero_is_kept() {
        assert_eq!(settings_from(&[("MAZE_SEED", "0")]).seed, Some(0));
    }
}
