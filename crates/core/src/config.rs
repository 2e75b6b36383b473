//! Game configuration - the constants provider
//!
//! Every tunable the simulation reads lives on [`GameConfig`]. Defaults are
//! the standard rules; hosts may load overrides from JSON, with any missing
//! field falling back to its default.
//!
//! ```
//! use driftblocks_core::GameConfig;
//!
//! let config: GameConfig = serde_json::from_str(r#"{ "lock_delay_ms": 350 }"#).unwrap();
//! assert_eq!(config.lock_delay_ms, 350);
//! assert_eq!(config.board_width, 10);
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pieces::{standard_definitions, PieceCatalog, PieceDefinition};
use crate::types::{
    PieceKind, TransitionKind, BOARD_HEIGHT, BOARD_WIDTH, DROP_INTERVALS, INPUT_BUFFER_WINDOW_MS,
    LATE_LOCK_MS,
};

/// Score at which a special kind joins the draw pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockThreshold {
    pub score: u32,
    pub kind: PieceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionDurations {
    pub menu_to_countdown_ms: u32,
    pub countdown_to_playing_ms: u32,
    pub playing_to_pause_ms: u32,
    pub pause_to_playing_ms: u32,
    pub game_over_to_menu_ms: u32,
}

impl TransitionDurations {
    pub fn duration_ms(&self, kind: TransitionKind) -> u32 {
        match kind {
            TransitionKind::MenuToCountdown => self.menu_to_countdown_ms,
            TransitionKind::CountdownToPlaying => self.countdown_to_playing_ms,
            TransitionKind::PlayingToPause => self.playing_to_pause_ms,
            TransitionKind::PauseToPlaying => self.pause_to_playing_ms,
            TransitionKind::GameOverToMenu => self.game_over_to_menu_ms,
        }
    }
}

impl Default for TransitionDurations {
    fn default() -> Self {
        Self {
            menu_to_countdown_ms: 400,
            countdown_to_playing_ms: 300,
            playing_to_pause_ms: 200,
            pause_to_playing_ms: 200,
            game_over_to_menu_ms: 500,
        }
    }
}

/// Gravity curve: per-level interval, shortened as the session goes on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Milliseconds per row by level; the last entry covers every higher level
    pub level_intervals_ms: Vec<u32>,
    /// Session time per speed-up step
    pub speedup_interval_ms: u32,
    /// Score per speed-up step
    pub speedup_score_step: u32,
    /// Fraction removed from the interval per step
    pub speedup_per_step: f64,
    pub max_speedup: f64,
    /// No interval is ever shorter than this
    pub floor_ms: u32,
}

impl GravityConfig {
    /// Milliseconds per row for the given session time, score and level
    pub fn delay_ms(&self, elapsed_ms: f64, score: u32, level: u32) -> f64 {
        let Some(&last) = self.level_intervals_ms.last() else {
            return f64::from(self.floor_ms);
        };
        let base = self
            .level_intervals_ms
            .get(level as usize)
            .copied()
            .unwrap_or(last);

        let mut steps = 0.0;
        if self.speedup_interval_ms > 0 {
            steps += (elapsed_ms.max(0.0) / f64::from(self.speedup_interval_ms)).floor();
        }
        if self.speedup_score_step > 0 {
            steps += f64::from(score / self.speedup_score_step);
        }
        let speedup = (steps * self.speedup_per_step).clamp(0.0, self.max_speedup);

        (f64::from(base) * (1.0 - speedup)).max(f64::from(self.floor_ms))
    }
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            level_intervals_ms: DROP_INTERVALS.to_vec(),
            speedup_interval_ms: 30_000,
            speedup_score_step: 10_000,
            speedup_per_step: 0.01,
            max_speedup: 0.2,
            floor_ms: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_width: u8,
    pub board_height: u8,
    pub pieces: Vec<PieceDefinition>,

    pub lock_delay_ms: u32,
    pub float_lock_delay_ms: u32,
    /// Applied (as a minimum) when a piece comes to rest near the top
    pub danger_lock_delay_ms: u32,
    /// Resting positions whose top row is above this count as dangerous
    pub danger_rows: u8,
    pub late_lock_ms: u32,
    pub input_buffer_window_ms: u32,

    pub clear_duration_ms: u32,
    pub countdown_ms: u32,
    pub countdown_time_scale: f64,
    pub transitions: TransitionDurations,
    pub game_over_delay_ms: u32,

    pub float_chance: f64,
    pub float_up_move_cap: u8,
    pub special_weight_multiplier: f64,
    pub unlocks: Vec<UnlockThreshold>,

    pub gravity: GravityConfig,
    /// Host deltas larger than this are clamped
    pub max_tick_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            pieces: standard_definitions(),
            lock_delay_ms: 500,
            float_lock_delay_ms: 1000,
            danger_lock_delay_ms: 800,
            danger_rows: 4,
            late_lock_ms: LATE_LOCK_MS,
            input_buffer_window_ms: INPUT_BUFFER_WINDOW_MS,
            clear_duration_ms: 400,
            countdown_ms: 3000,
            countdown_time_scale: 1.0,
            transitions: TransitionDurations::default(),
            game_over_delay_ms: 1200,
            float_chance: 0.08,
            float_up_move_cap: 3,
            special_weight_multiplier: 0.5,
            unlocks: vec![
                UnlockThreshold {
                    score: 1000,
                    kind: PieceKind::Float,
                },
                UnlockThreshold {
                    score: 3000,
                    kind: PieceKind::Plus,
                },
                UnlockThreshold {
                    score: 6000,
                    kind: PieceKind::U,
                },
            ],
            gravity: GravityConfig::default(),
            max_tick_ms: 250,
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl GameConfig {
    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(|e| {
            log::warn!("rejected game config: {}", e);
            e
        })
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.board_width < 4 || self.board_height < 4 || self.board_width > 64 {
            return Err(ConfigError::InvalidBoard {
                width: self.board_width,
                height: self.board_height,
            });
        }

        let catalog = self.catalog()?;
        for kind in PieceKind::ORDINARY {
            if !catalog.contains(kind) {
                return Err(ConfigError::MissingDefinition(kind));
            }
        }
        for unlock in &self.unlocks {
            if !catalog.contains(unlock.kind) {
                return Err(ConfigError::MissingDefinition(unlock.kind));
            }
        }

        check_range("float_chance", self.float_chance, 0.0, 1.0)?;
        check_range(
            "special_weight_multiplier",
            self.special_weight_multiplier,
            0.0,
            100.0,
        )?;
        check_range("countdown_time_scale", self.countdown_time_scale, 0.01, 100.0)?;
        check_range("max_tick_ms", f64::from(self.max_tick_ms), 1.0, 10_000.0)?;
        check_range("clear_duration_ms", f64::from(self.clear_duration_ms), 0.0, 60_000.0)?;

        if self.gravity.level_intervals_ms.is_empty() {
            return Err(ConfigError::EmptyGravityTable);
        }
        check_range("gravity.max_speedup", self.gravity.max_speedup, 0.0, 0.95)?;
        Ok(())
    }

    /// Build the piece catalog from the configured definitions
    pub fn catalog(&self) -> Result<PieceCatalog, ConfigError> {
        PieceCatalog::from_definitions(&self.pieces)
    }

    /// Lock delay for a piece of `kind` resting with its top row at `top_row`
    pub fn lock_delay_for(&self, kind: PieceKind, top_row: i32) -> f64 {
        let base = if kind == PieceKind::Float {
            self.float_lock_delay_ms
        } else {
            self.lock_delay_ms
        };
        if top_row < i32::from(self.danger_rows) {
            f64::from(base.max(self.danger_lock_delay_ms))
        } else {
            f64::from(base)
        }
    }

    /// Unlock thresholds in ascending score order
    pub fn sorted_unlocks(&self) -> Vec<UnlockThreshold> {
        let mut unlocks = self.unlocks.clone();
        unlocks.sort_by_key(|u| u.score);
        unlocks
    }
}
