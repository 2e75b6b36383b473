//! Simulation engine - the phase state machine around one [`GameState`]
//!
//! The host drives everything through four calls: [`SimulationEngine::start_game`],
//! [`SimulationEngine::handle_input`], [`SimulationEngine::tick`] and
//! [`SimulationEngine::return_to_menu`]. It reads results back through
//! [`SimulationEngine::snapshot`] and [`SimulationEngine::drain_events`].
//!
//! # Clock
//!
//! The engine keeps a single simulation clock that only `tick` advances.
//! Gravity, lock and clear timers, transition progress and input-buffer ages
//! all read that clock, so a throttled host slows the game down uniformly
//! instead of skewing one timer against another.

use std::mem;

use driftblocks_core::game_state::{
    ActivePiece, GameState, TransitionDescriptor, TransitionPayload,
};
use driftblocks_core::physics;
use driftblocks_core::pieces::Piece;
use driftblocks_core::rng::next_session_seed;
use driftblocks_core::scoring::{ScoreState, Scoring, StandardScoring};
use driftblocks_core::snapshot::GameSnapshot;
use driftblocks_core::types::{
    Action, GameMode, MoveDirection, Phase, PieceKind, RotationDirection, TransitionKind,
};
use driftblocks_core::{GameConfig, PieceFactory, UnlockThreshold};

use crate::error::EngineError;
use crate::events::{EngineEvent, GameOverSummary};
use crate::input_buffer::InputBuffer;
use crate::ports::{MemoryStore, ProgressStore, SessionRecord};

/// Fraction of the clear window at each end that runs slowed down
const CLEAR_EDGE_FRACTION: f64 = 0.1;

/// Clock rate applied at the edges of the clear window
const CLEAR_EDGE_SPEED: f64 = 0.5;

/// What the engine did with an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The action changed the game
    Applied,
    /// Held for replay on the next entry to play
    Buffered,
    /// Meaningful here, but blocked (a wall, a spent hold)
    Rejected,
    /// Not meaningful in the current phase
    Ignored,
}

/// Clock rate for the clear window given the time still remaining
pub fn clear_speed(remaining_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    let progress = 1.0 - remaining_ms / duration_ms;
    if progress < CLEAR_EDGE_FRACTION || progress > 1.0 - CLEAR_EDGE_FRACTION {
        CLEAR_EDGE_SPEED
    } else {
        1.0
    }
}

pub struct SimulationEngine<S = StandardScoring, P = MemoryStore> {
    config: GameConfig,
    factory: PieceFactory,
    unlocks: Vec<UnlockThreshold>,
    state: GameState,
    scoring: S,
    store: P,
    input: InputBuffer,
    events: Vec<EngineEvent>,
    now_ms: f64,
    /// Seed for the next session
    seed: u32,
}

impl SimulationEngine {
    /// Engine with standard scoring and an in-memory store
    pub fn with_seed(config: GameConfig, seed: u32) -> Result<Self, EngineError> {
        Self::new(config, seed, StandardScoring::new(), MemoryStore::new())
    }
}

impl<S: Scoring, P: ProgressStore> SimulationEngine<S, P> {
    /// Validate the configuration and build an engine sitting in the menu
    pub fn new(config: GameConfig, seed: u32, scoring: S, store: P) -> Result<Self, EngineError> {
        config.validate()?;
        let factory = PieceFactory::new(
            config.catalog()?,
            config.float_chance,
            config.special_weight_multiplier,
        );
        let unlocks = config.sorted_unlocks();
        let state = GameState::new(&config, GameMode::default(), seed);
        let input = InputBuffer::new(f64::from(config.input_buffer_window_ms));

        Ok(Self {
            config,
            factory,
            unlocks,
            state,
            scoring,
            store,
            input,
            events: Vec::new(),
            now_ms: 0.0,
            seed,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn input_buffer(&self) -> &InputBuffer {
        &self.input
    }

    /// Current simulation time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Seed the next `start_game` will use
    pub fn next_seed(&self) -> u32 {
        self.seed
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.state, self.now_ms, self.config.float_up_move_cap)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        mem::take(&mut self.events)
    }

    /// Begin a new session from the menu or the game-over screen
    pub fn start_game(&mut self, mode: GameMode) -> Result<bool, EngineError> {
        if !matches!(self.state.phase, Phase::Menu | Phase::GameOver) {
            return Ok(false);
        }

        let seed = self.seed;
        self.seed = next_session_seed(seed);
        self.state = GameState {
            phase: self.state.phase,
            started_at_ms: self.now_ms,
            ..GameState::new(&self.config, mode, seed)
        };
        self.input.clear();
        self.scoring.start_game();
        self.sync_score();
        self.state.next = Some(self.generate_piece()?);

        log::info!("starting {:?} session with seed {}", mode, seed);
        self.begin_transition(
            TransitionKind::MenuToCountdown,
            TransitionPayload::StartMode(mode),
        );
        Ok(true)
    }

    /// Leave the current session.
    ///
    /// From the game-over screen this plays the closing transition; from any
    /// other phase the state is rebuilt immediately.
    pub fn return_to_menu(&mut self) -> bool {
        match self.state.phase {
            Phase::Menu | Phase::GameOverToMenu => false,
            Phase::GameOver => {
                self.begin_transition(TransitionKind::GameOverToMenu, TransitionPayload::None);
                true
            }
            _ => {
                self.reset_to_menu();
                true
            }
        }
    }

    pub fn handle_input(&mut self, action: Action) -> Result<InputOutcome, EngineError> {
        if action.is_bufferable() {
            return self.handle_piece_action(action);
        }
        match action {
            Action::StartGame { mode } => Ok(applied_or_ignored(self.start_game(mode)?)),
            Action::ReturnToMenu => Ok(applied_or_ignored(self.return_to_menu())),
            Action::Pause => Ok(self.toggle_pause()),
            _ => Ok(InputOutcome::Ignored),
        }
    }

    /// Advance the simulation clock by `delta_ms` and run the current phase
    pub fn tick(&mut self, delta_ms: f64) -> Result<(), EngineError> {
        let delta = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, f64::from(self.config.max_tick_ms))
        } else {
            0.0
        };
        self.now_ms += delta;

        match self.state.phase {
            Phase::Menu | Phase::Paused | Phase::GameOver => Ok(()),
            Phase::MenuToCountdown
            | Phase::CountdownToPlaying
            | Phase::PlayingToPause
            | Phase::PauseToPlaying
            | Phase::GameOverToMenu => self.tick_transition(),
            Phase::Countdown => {
                self.tick_countdown(delta);
                Ok(())
            }
            Phase::Playing => self.tick_playing(delta),
            Phase::Clearing => self.tick_clearing(delta),
            Phase::GameOverSequence => {
                self.tick_game_over_sequence(delta);
                Ok(())
            }
        }
    }

    /// Promote `next` to the active piece and draw a new `next`.
    ///
    /// Returns `false` when the spawn position is blocked, in which case the
    /// game over sequence has begun and no piece is placed.
    pub fn spawn_next_piece(&mut self) -> Result<bool, EngineError> {
        let piece = match self.state.next.take() {
            Some(piece) => piece,
            None => self.generate_piece()?,
        };
        self.state.next = Some(self.generate_piece()?);
        Ok(self.place_piece(piece))
    }

    /// Shift the active piece one cell.
    ///
    /// A blocked horizontal move by a float piece falls back to the cell
    /// diagonally below when that one is free.
    pub fn move_piece(&mut self, direction: MoveDirection) -> bool {
        let Some(active) = self.state.current.as_ref() else {
            return false;
        };
        let board = &self.state.board;
        let (dx, dy) = direction.delta();
        let (old_y, tx, ty) = (
            active.y,
            active.x + i32::from(dx),
            active.y + i32::from(dy),
        );

        let target = if physics::fits(board, &active.piece, tx, ty) {
            Some((tx, ty, false))
        } else if active.piece.kind() == PieceKind::Float
            && direction.is_horizontal()
            && physics::fits(board, &active.piece, tx, old_y + 1)
        {
            Some((tx, old_y + 1, true))
        } else {
            None
        };
        let Some((x, y, diagonal)) = target else {
            return false;
        };
        let room_below = physics::has_room_below(board, &active.piece, x, y);

        if let Some(active) = self.state.current.as_mut() {
            active.x = x;
            active.y = y;
        }

        if y > old_y {
            self.state.gravity_accumulator_ms = 0.0;
            if room_below {
                self.state.cancel_lock();
            }
        }
        if diagonal {
            self.state.stats.diagonal_moves += 1;
        }
        if direction == MoveDirection::Down {
            self.scoring.soft_drop(1);
            self.sync_score();
        }

        self.events.push(EngineEvent::Moved {
            dx,
            dy: (y - old_y) as i8,
        });
        true
    }

    /// Rotate with wall kicks; on failure the piece is left untouched
    pub fn rotate_piece(&mut self, direction: RotationDirection) -> bool {
        let Some(active) = self.state.current.as_ref() else {
            return false;
        };
        let resolved = physics::resolve_rotation(
            &self.state.board,
            &active.piece,
            active.x,
            active.y,
            direction,
        );

        match resolved {
            Some(result) => {
                if let Some(active) = self.state.current.as_mut() {
                    active.piece.set_rotation(result.rotation);
                    active.x = result.x;
                    active.y = result.y;
                }
                self.events.push(EngineEvent::Rotated {
                    rotation: result.rotation,
                    kick: result.kick,
                });
                true
            }
            None => {
                self.events.push(EngineEvent::RotateFailed);
                false
            }
        }
    }

    /// Drop straight to the shadow row and lock
    pub fn hard_drop(&mut self) -> Result<bool, EngineError> {
        let Some(shadow) = self.state.shadow_y() else {
            return Ok(false);
        };
        let Some(active) = self.state.current.as_mut() else {
            return Ok(false);
        };
        let cells = (shadow - active.y).max(0) as u32;
        active.y = shadow;

        self.scoring.hard_drop(cells);
        self.sync_score();
        self.events.push(EngineEvent::HardDropped { cells });
        self.lock_current_piece()?;
        Ok(true)
    }

    /// Swap the active piece into the hold slot, once per spawned piece
    pub fn hold(&mut self) -> Result<bool, EngineError> {
        if !self.state.can_hold {
            return Ok(false);
        }
        let Some(mut outgoing) = self.state.current.take() else {
            return Ok(false);
        };
        outgoing.piece.reset();
        let kind = outgoing.piece.kind();
        self.state.stats.holds += 1;
        self.events.push(EngineEvent::Held { kind });

        match self.state.held.replace(outgoing.piece) {
            Some(incoming) => {
                self.place_piece(incoming);
            }
            None => {
                self.spawn_next_piece()?;
            }
        }
        self.state.can_hold = false;
        Ok(true)
    }

    fn handle_piece_action(&mut self, action: Action) -> Result<InputOutcome, EngineError> {
        if self.should_buffer() {
            self.input.push(action, self.now_ms);
            return Ok(InputOutcome::Buffered);
        }
        if self.state.phase != Phase::Playing || self.state.current.is_none() {
            return Ok(InputOutcome::Ignored);
        }
        Ok(if self.apply_action(action)? {
            InputOutcome::Applied
        } else {
            InputOutcome::Rejected
        })
    }

    fn apply_action(&mut self, action: Action) -> Result<bool, EngineError> {
        self.scoring.input_made();
        match action {
            Action::Move { direction } => Ok(self.move_piece(direction)),
            Action::Rotate { direction } => Ok(self.rotate_piece(direction)),
            Action::HardDrop => self.hard_drop(),
            Action::Hold => self.hold(),
            Action::UpPressed => Ok(self.up_pressed()),
            Action::Pause | Action::StartGame { .. } | Action::ReturnToMenu => Ok(false),
        }
    }

    /// Rise for a float with budget left, rotate clockwise otherwise
    fn up_pressed(&mut self) -> bool {
        let cap = self.config.float_up_move_cap;
        let Some(active) = self.state.current.as_ref() else {
            return false;
        };
        if active.piece.kind() != PieceKind::Float || active.piece.up_moves_used >= cap {
            return self.rotate_piece(RotationDirection::Clockwise);
        }
        if !physics::fits(&self.state.board, &active.piece, active.x, active.y - 1) {
            return false;
        }

        let Some(active) = self.state.current.as_mut() else {
            return false;
        };
        active.y -= 1;
        active.piece.up_moves_used += 1;
        let up_moves_used = active.piece.up_moves_used;

        self.state.stats.float_rises += 1;
        self.state.cancel_lock();
        self.events.push(EngineEvent::Rose { up_moves_used });
        true
    }

    fn toggle_pause(&mut self) -> InputOutcome {
        match self.state.phase {
            Phase::Playing => {
                self.begin_transition(
                    TransitionKind::PlayingToPause,
                    TransitionPayload::Resume(Phase::Playing),
                );
                InputOutcome::Applied
            }
            Phase::Paused => {
                self.begin_transition(TransitionKind::PauseToPlaying, TransitionPayload::None);
                InputOutcome::Applied
            }
            _ => InputOutcome::Ignored,
        }
    }

    fn should_buffer(&self) -> bool {
        let phase = self.state.phase;
        phase.buffers_input()
            || (phase == Phase::Playing
                && self
                    .state
                    .in_late_lock(f64::from(self.config.late_lock_ms)))
    }

    fn replay_buffered_input(&mut self) -> Result<(), EngineError> {
        let Some(action) = self.input.take_fresh(self.now_ms) else {
            return Ok(());
        };
        if self.state.phase == Phase::Playing && self.state.current.is_some() {
            log::debug!("replaying buffered {:?}", action);
            self.apply_action(action)?;
        }
        Ok(())
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        self.state.phase = to;
        log::debug!("phase {:?} -> {:?}", from, to);
        self.events.push(EngineEvent::PhaseChanged { from, to });
    }

    fn begin_transition(&mut self, kind: TransitionKind, payload: TransitionPayload) {
        let duration = f64::from(self.config.transitions.duration_ms(kind));
        self.state.transition =
            Some(TransitionDescriptor::new(kind, self.now_ms, duration).with_payload(payload));
        self.set_phase(kind.phase());
    }

    fn tick_transition(&mut self) -> Result<(), EngineError> {
        let Some(transition) = self.state.transition else {
            return Ok(());
        };
        if !transition.is_complete(self.now_ms) {
            return Ok(());
        }
        self.state.transition = None;
        log::debug!(
            "committing {:?} ({:?})",
            transition.kind,
            transition.payload
        );

        self.set_phase(transition.kind.target());
        match transition.kind {
            TransitionKind::MenuToCountdown => {
                self.state.countdown_ms = f64::from(self.config.countdown_ms);
            }
            TransitionKind::CountdownToPlaying => {
                self.state.started_at_ms = self.now_ms;
                if self.spawn_next_piece()? {
                    self.replay_buffered_input()?;
                }
            }
            TransitionKind::PlayingToPause => self.events.push(EngineEvent::Paused),
            TransitionKind::PauseToPlaying => {
                self.events.push(EngineEvent::Resumed);
                self.replay_buffered_input()?;
            }
            TransitionKind::GameOverToMenu => self.reset_to_menu(),
        }
        Ok(())
    }

    fn tick_countdown(&mut self, delta: f64) {
        self.state.countdown_ms -= delta * self.config.countdown_time_scale;
        if self.state.countdown_ms <= 0.0 {
            self.state.countdown_ms = 0.0;
            self.begin_transition(TransitionKind::CountdownToPlaying, TransitionPayload::None);
        }
    }

    fn tick_playing(&mut self, delta: f64) -> Result<(), EngineError> {
        let elapsed = self.now_ms - self.state.started_at_ms;
        let ScoreState { score, level, .. } = self.state.score;
        self.state.gravity_delay_ms = self.config.gravity.delay_ms(elapsed, score, level);

        let Some(shadow) = self.state.shadow_y() else {
            return Ok(());
        };
        let Some(y) = self.state.current.as_ref().map(|a| a.y) else {
            return Ok(());
        };

        if y < shadow {
            // The piece has room again, e.g. after sliding off a ledge.
            if self.state.is_locking {
                self.state.cancel_lock();
            }
            self.state.gravity_accumulator_ms += delta;
            if self.state.gravity_accumulator_ms >= self.state.gravity_delay_ms && self.step_down()
            {
                self.state.gravity_accumulator_ms = 0.0;
            }
            return Ok(());
        }

        if !self.state.is_locking {
            self.start_lock();
        }

        // The tick that starts the lock already counts against it.
        self.state.lock_timer_ms -= delta;
        if self.state.lock_timer_ms <= 0.0 {
            self.lock_current_piece()?;
        }
        Ok(())
    }

    fn step_down(&mut self) -> bool {
        let state = &mut self.state;
        let Some(active) = state.current.as_mut() else {
            return false;
        };
        if !physics::fits(&state.board, &active.piece, active.x, active.y + 1) {
            return false;
        }
        active.y += 1;
        true
    }

    fn start_lock(&mut self) {
        let Some(active) = self.state.current.as_ref() else {
            return;
        };
        let delay = self
            .config
            .lock_delay_for(active.piece.kind(), active.top_row());
        self.state.lock_timer_ms = delay;
        self.state.is_locking = true;
        self.state.gravity_accumulator_ms = 0.0;
        self.events.push(EngineEvent::Landed {
            lock_delay_ms: delay,
        });
    }

    /// Write the active piece into the board, then decide what follows
    fn lock_current_piece(&mut self) -> Result<(), EngineError> {
        let Some(active) = self.state.current.take() else {
            return Ok(());
        };
        physics::lock(&mut self.state.board, &active.piece, active.x, active.y);
        self.state.shadow.invalidate();
        self.state.cancel_lock();
        self.state.gravity_accumulator_ms = 0.0;
        self.state.stats.pieces_placed += 1;
        self.scoring.piece_placed();
        self.events.push(EngineEvent::Locked {
            kind: active.piece.kind(),
        });

        if physics::is_above_board(&active.piece, active.y) {
            self.sync_score();
            log::info!("top out at row {}", active.top_row());
            self.enter_game_over_sequence();
            return Ok(());
        }

        let full = physics::find_full_lines(&self.state.board);
        if full.is_empty() {
            self.scoring.reset_combo();
            self.sync_score();
            if self.spawn_next_piece()? {
                self.replay_buffered_input()?;
            }
        } else {
            self.state.clear_timer_ms = f64::from(self.config.clear_duration_ms);
            self.events.push(EngineEvent::ClearStarted { rows: full.clone() });
            self.state.clearing_lines = full;
            self.set_phase(Phase::Clearing);
        }
        Ok(())
    }

    fn tick_clearing(&mut self, delta: f64) -> Result<(), EngineError> {
        let duration = f64::from(self.config.clear_duration_ms);
        let speed = clear_speed(self.state.clear_timer_ms, duration);
        self.state.clear_timer_ms -= delta * speed;
        if self.state.clear_timer_ms > 0.0 {
            return Ok(());
        }
        self.state.clear_timer_ms = 0.0;
        self.finish_clear()
    }

    fn finish_clear(&mut self) -> Result<(), EngineError> {
        let rows = mem::take(&mut self.state.clearing_lines);
        let count = physics::remove_lines(&mut self.state.board, &rows);
        self.state.shadow.invalidate();

        let previous_level = self.state.score.level;
        let outcome = self.scoring.line_clear(count, &self.state.board);
        self.sync_score();
        self.state.stats.max_combo = self.state.stats.max_combo.max(self.state.score.combo);
        self.events.push(EngineEvent::LinesCleared {
            count,
            points: outcome.points,
            message: outcome.message,
        });

        let level = self.state.score.level;
        if level > previous_level {
            log::info!("level up: {}", level);
            self.events.push(EngineEvent::LevelUp { level });
        }

        self.check_unlocks();
        self.set_phase(Phase::Playing);
        if self.spawn_next_piece()? {
            self.replay_buffered_input()?;
        }
        Ok(())
    }

    fn check_unlocks(&mut self) {
        if self.state.mode != GameMode::Evolving {
            return;
        }
        let score = self.state.score.score;
        for threshold in &self.unlocks {
            if score < threshold.score || self.state.unlocked.contains(&threshold.kind) {
                continue;
            }
            self.state.unlocked.insert(threshold.kind);
            self.state.last_unlock_threshold = self.state.last_unlock_threshold.max(threshold.score);
            log::info!("unlocked {} at score {}", threshold.kind.as_str(), score);
            self.events.push(EngineEvent::Unlocked {
                kind: threshold.kind,
                score: threshold.score,
            });
        }
    }

    fn place_piece(&mut self, piece: Piece) -> bool {
        let (x, y) = piece.definition().spawn_position(self.state.board.width());
        let kind = piece.kind();
        self.state.cancel_lock();
        self.state.gravity_accumulator_ms = 0.0;
        self.state.shadow.invalidate();

        if !physics::fits(&self.state.board, &piece, x, y) {
            log::info!("spawn blocked for {} at ({}, {})", kind.as_str(), x, y);
            self.state.current = None;
            self.enter_game_over_sequence();
            return false;
        }

        self.state.current = Some(ActivePiece::new(piece, x, y));
        self.state.can_hold = true;
        log::debug!("spawned {} at ({}, {})", kind.as_str(), x, y);
        self.events.push(EngineEvent::Spawned { kind });
        true
    }

    fn generate_piece(&mut self) -> Result<Piece, EngineError> {
        Ok(self
            .factory
            .generate(&self.state.unlocked, &mut self.state.rng)?)
    }

    fn enter_game_over_sequence(&mut self) {
        self.state.cancel_lock();
        self.state.game_over_timer_ms = 0.0;
        self.input.clear();
        self.set_phase(Phase::GameOverSequence);
    }

    fn tick_game_over_sequence(&mut self, delta: f64) {
        self.state.game_over_timer_ms += delta;
        if self.state.game_over_timer_ms >= f64::from(self.config.game_over_delay_ms) {
            self.finish_game_over();
        }
    }

    fn finish_game_over(&mut self) {
        self.state.ended_at_ms = Some(self.now_ms);
        self.set_phase(Phase::GameOver);

        let ScoreState {
            score, lines, level, ..
        } = self.state.score;
        let new_high_score = score > self.store.high_score();
        if new_high_score {
            if let Err(err) = self.store.set_high_score(score) {
                self.report_failure("progress store", err.to_string());
            }
        }
        let record = SessionRecord {
            score,
            lines,
            pieces: self.state.stats.pieces_placed,
        };
        if let Err(err) = self.store.record_session(&record) {
            self.report_failure("progress store", err.to_string());
        }

        let proof = match self.scoring.generate_proof() {
            Ok(proof) => Some(proof),
            Err(err) => {
                self.report_failure("scoring", err.to_string());
                None
            }
        };

        let metrics = self.scoring.performance_metrics();
        let elapsed_ms = self.state.elapsed_ms(self.now_ms).max(0.0) as u64;
        log::info!(
            "game over: score {} level {} lines {} after {} ms",
            score,
            level,
            lines,
            elapsed_ms
        );
        self.events.push(EngineEvent::GameOver(GameOverSummary {
            score,
            level,
            lines,
            elapsed_ms,
            new_high_score,
            metrics,
            proof,
        }));
    }

    fn reset_to_menu(&mut self) {
        self.state = GameState {
            phase: self.state.phase,
            ..GameState::new(&self.config, self.state.mode, self.seed)
        };
        self.input.clear();
        self.set_phase(Phase::Menu);
    }

    fn report_failure(&mut self, collaborator: &'static str, message: String) {
        log::warn!("{} failed: {}", collaborator, message);
        self.events.push(EngineEvent::CollaboratorFailed {
            collaborator,
            message,
        });
    }

    fn sync_score(&mut self) {
        self.state.score = self.scoring.state();
    }
}

fn applied_or_ignored(applied: bool) -> InputOutcome {
    if applied {
        InputOutcome::Applied
    } else {
        InputOutcome::Ignored
    }
}
