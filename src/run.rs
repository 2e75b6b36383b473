//! Headless session runner behind the `driftblocks` binary.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::autoplay::Autoplayer;
use crate::core::{GameConfig, GameSnapshot};
use crate::engine::{EngineEvent, GameOverSummary, SimulationEngine};
use crate::types::{GameMode, Phase, TICK_MS};

/// The autoplayer acts on every n-th tick
pub const DECISION_INTERVAL_TICKS: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub seed: u32,
    pub config_path: Option<PathBuf>,
    pub ticks: u32,
    pub mode: GameMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            config_path: None,
            ticks: 50_000,
            mode: GameMode::Evolving,
        }
    }
}

pub fn parse_run_args(args: &[String]) -> Result<RunConfig> {
    let mut run = RunConfig::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --seed"))?;
                run.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --seed value: {}", v))?;
            }
            "--config" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                run.config_path = Some(PathBuf::from(v));
            }
            "--ticks" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --ticks"))?;
                run.ticks = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --ticks value: {}", v))?;
            }
            "--classic" => run.mode = GameMode::Classic,
            other => {
                return Err(anyhow!("unknown argument: {}", other));
            }
        }
        i += 1;
    }
    Ok(run)
}

pub fn load_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("config: read {} failed: {}", path.display(), e))?;
    let config: GameConfig = serde_json::from_str(&text)
        .map_err(|e| anyhow!("config: parse {} failed: {}", path.display(), e))?;
    Ok(config)
}

/// Event counts gathered over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventTally {
    pub spawned: u32,
    pub locked: u32,
    pub line_clears: u32,
    pub level_ups: u32,
    pub unlocks: u32,
    pub collaborator_failures: u32,
}

impl EventTally {
    fn record(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::Spawned { .. } => self.spawned += 1,
            EngineEvent::Locked { .. } => self.locked += 1,
            EngineEvent::LinesCleared { .. } => self.line_clears += 1,
            EngineEvent::LevelUp { .. } => self.level_ups += 1,
            EngineEvent::Unlocked { .. } => self.unlocks += 1,
            EngineEvent::CollaboratorFailed { .. } => self.collaborator_failures += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub seed: u32,
    pub mode: GameMode,
    pub ticks_run: u32,
    pub placed: u32,
    pub fallbacks: u32,
    pub events: EventTally,
    /// Present when the session reached game over within the tick budget
    pub summary: Option<GameOverSummary>,
    pub snapshot: GameSnapshot,
}

/// Play one autoplay session to game over or until the tick budget runs out
pub fn run_session(run: &RunConfig) -> Result<RunReport> {
    let config = match &run.config_path {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    let mut engine = SimulationEngine::with_seed(config, run.seed)?;
    engine.start_game(run.mode)?;

    let mut bot = Autoplayer::new(DECISION_INTERVAL_TICKS);
    let mut events = EventTally::default();
    let mut summary = None;
    let mut ticks_run = 0;

    while ticks_run < run.ticks {
        engine.tick(f64::from(TICK_MS))?;
        bot.step(&mut engine)?;
        ticks_run += 1;

        for event in engine.drain_events() {
            events.record(&event);
            if let EngineEvent::GameOver(s) = event {
                summary = Some(s);
            }
        }
        if engine.phase() == Phase::GameOver {
            break;
        }
    }

    log::info!(
        "run finished after {} ticks in {:?}",
        ticks_run,
        engine.phase()
    );

    Ok(RunReport {
        seed: run.seed,
        mode: run.mode,
        ticks_run,
        placed: bot.placed(),
        fallbacks: bot.fallbacks(),
        events,
        summary,
        snapshot: engine.snapshot(),
    })
}
