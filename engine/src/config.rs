use std::{collections::HashMap, env, fs, path::Path, path::PathBuf, time::Duration};

use primes_common::models::GameParams;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

const MAX_SIDE: usize = 16;
const DEFAULT_COLORS: [&str; 8] = [
    "#eee4da", "#ede0c8", "#f2b179", "#f59563", "#f67c5f", "#f65e3b", "#edcf72", "#edc22e",
];

/// How a face value is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileStyle {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
struct TileStyleEntry {
    value: u32,
    label: Option<String>,
    color: String,
}

/// Lookup table from face value to its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileStyles {
    styles: HashMap<u32, TileStyle>,
}

impl TileStyles {
    pub fn new(styles: HashMap<u32, TileStyle>) -> Self {
        Self { styles }
    }

    /// Reads a JSON array of `{ "value", "label"?, "color" }` entries.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let entries: Vec<TileStyleEntry> = serde_json::from_str(&text)?;
        let styles = entries
            .into_iter()
            .map(|entry| {
                let label = entry.label.unwrap_or_else(|| entry.value.to_string());
                (
                    entry.value,
                    TileStyle {
                        label,
                        color: entry.color,
                    },
                )
            })
            .collect();
        Ok(Self { styles })
    }

    pub fn get(&self, value: u32) -> Option<&TileStyle> {
        self.styles.get(&value)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for TileStyles {
    /// 2, 3 and every 5·2^k up to 5·2^16.
    fn default() -> Self {
        let values = [2, 3].into_iter().chain((0..=16).map(|k| 5u32 << k));
        let styles = values
            .enumerate()
            .map(|(i, value)| {
                (
                    value,
                    TileStyle {
                        label: value.to_string(),
                        color: DEFAULT_COLORS[i % DEFAULT_COLORS.len()].to_string(),
                    },
                )
            })
            .collect();
        Self { styles }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub params: GameParams,
    pub settle_delay: Duration,
    pub conversion_delay: Duration,
    pub tick: Duration,
    pub start_tiles: Vec<u32>,
    pub seed: Option<u64>,
    pub high_score_file: PathBuf,
    pub styles: TileStyles,
    pub event_format: EventFormat,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            params: GameParams::default(),
            settle_delay: Duration::from_millis(120),
            conversion_delay: Duration::from_millis(600),
            tick: Duration::from_millis(16),
            start_tiles: vec![2, 3],
            seed: None,
            high_score_file: PathBuf::from("primes-highscore.json"),
            styles: TileStyles::default(),
            event_format: EventFormat::Text,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

pub fn validate_params(params: &mut GameParams) {
    params.width = params.width.clamp(1, MAX_SIDE);
    params.height = params.height.clamp(1, MAX_SIDE);
}

fn parse_start_tiles(raw: &str) -> Vec<u32> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid start tile value: {}", s);
                None
            }
        })
        .collect()
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut params = GameParams {
            width: env_or("PRIMES_WIDTH", defaults.params.width),
            height: env_or("PRIMES_HEIGHT", defaults.params.height),
        };
        validate_params(&mut params);

        let settle_ms: u64 = env_or("PRIMES_SETTLE_MS", 120);
        let conversion_ms: u64 = env_or("PRIMES_CONVERSION_MS", 600);
        let tick_ms: u64 = env_or("PRIMES_TICK_MS", 16).max(1);

        let start_tiles = env::var("PRIMES_START_TILES")
            .map(|raw| parse_start_tiles(&raw))
            .unwrap_or(defaults.start_tiles);

        let seed = env::var("PRIMES_SEED").ok().and_then(|s| s.parse().ok());

        let high_score_file = env::var("PRIMES_HIGH_SCORE_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.high_score_file);

        let styles = match env::var("PRIMES_TILE_STYLES") {
            Ok(path) => match TileStyles::from_json_file(Path::new(&path)) {
                Ok(styles) => {
                    debug!("Loaded {} tile styles from {}", styles.len(), path);
                    styles
                }
                Err(e) => {
                    warn!("Failed to load tile styles from {}: {}", path, e);
                    TileStyles::default()
                }
            },
            Err(_) => TileStyles::default(),
        };

        let event_format = match env::var("PRIMES_EVENT_FORMAT").as_deref() {
            Ok("json") => EventFormat::Json,
            _ => EventFormat::Text,
        };

        info!(
            "Configured {}x{} board, settle delay {}ms, start tiles {:?}",
            params.width, params.height, settle_ms, start_tiles
        );

        Self {
            params,
            settle_delay: Duration::from_millis(settle_ms),
            conversion_delay: Duration::from_millis(conversion_ms),
            tick: Duration::from_millis(tick_ms),
            start_tiles,
            seed,
            high_score_file,
            styles,
            event_format,
        }
    }
}
