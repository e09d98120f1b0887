//! Spin sequencer — the session state machine
//!
//! ```text
//! Idle ──request──> Debiting ──> Spinning ──join──> Presenting ──dwell──> Idle
//!   │                                                                      │
//!   └──────────────────── cursor == script length ─────────────> Exhausted ┘
//! ```
//!
//! `is_spinning` is the only concurrency guard: it is raised before the stake
//! is debited and lowered only when the win dwell has fully elapsed. Every
//! delayed step runs on the session's own [`Scheduler`], so a breakpoint
//! reset can cancel all of them at once.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationState, ColumnAnimation};
use crate::audio::{AudioClip, AudioGate, AudioPlayer};
use crate::bet::{BetController, round_cents};
use crate::breakpoint::{BreakpointConfig, BreakpointResolver};
use crate::celebration::{CelebrationFactory, LazyCelebration};
use crate::config::GameConfig;
use crate::locator::locate;
use crate::outcome::{NextOutcome, Outcome, OutcomeKind, OutcomeScript};
use crate::paylines::PaylinePreview;
use crate::render::{Highlight, NullRenderer, ReelRenderer, WinPresentation};
use crate::scheduler::{Scheduler, TimerId};
use crate::strip::{Strip, StripBuilder};
use crate::window::{visible_cells, visible_symbol};
use crate::{ReelResult, SymbolId};

// ═══════════════════════════════════════════════════════════════════════════════
// STATE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Debiting,
    Spinning,
    Presenting,
    /// Every scripted outcome has been served; terminal until a reset
    Exhausted,
}

/// Why a spin request did nothing
///
/// Rejections are ordinary values, not errors: the UI simply stays as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinRejection {
    /// A spin is already in flight (including its win dwell)
    Busy,
    InsufficientFunds,
    Exhausted,
}

impl fmt::Display for SpinRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Busy => "spin in progress",
            Self::InsufficientFunds => "insufficient funds",
            Self::Exhausted => "script exhausted",
        })
    }
}

/// Player-facing session state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinSession {
    /// Cursor into the outcome script
    pub spin_count: usize,
    pub balance: f64,
    pub bet: f64,
    pub is_spinning: bool,
}

/// Running totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub spins: u64,
    pub total_staked: f64,
    pub total_won: f64,
    pub wins: u64,
    pub losses: u64,
    /// Columns skipped because their scripted slice was not in the strip
    pub locator_misses: u64,
    /// Breakpoint resets
    pub resets: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    ColumnStart(usize),
    BlurOff(usize),
    ColumnSettled(usize),
    OverlayActivate,
    WinFlash,
    FlashExpired(u32),
    PresentationEnd,
    OverlayRemoved,
    CtaShow,
    PaylinesHide,
    PaylinesRemoved,
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Assembles a [`GameSession`] and its collaborators
pub struct SessionBuilder {
    config: GameConfig,
    viewport_width: f64,
    renderer: Box<dyn ReelRenderer>,
    audio: Option<Box<dyn AudioPlayer>>,
    celebration: Option<CelebrationFactory>,
    seed: Option<u64>,
}

impl SessionBuilder {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            viewport_width: 1280.0,
            renderer: Box::new(NullRenderer),
            audio: None,
            celebration: None,
            seed: None,
        }
    }

    pub fn viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn renderer(mut self, renderer: Box<dyn ReelRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn audio(mut self, player: Box<dyn AudioPlayer>) -> Self {
        self.audio = Some(player);
        self
    }

    /// Celebration shown with the call-to-action, built on first use
    pub fn celebration(mut self, factory: CelebrationFactory) -> Self {
        self.celebration = Some(factory);
        self
    }

    /// Fixed seed for filler, resting offsets, paylines and flashes
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the config and lay out the first breakpoint
    pub fn build(self) -> ReelResult<GameSession> {
        self.config.validate()?;
        let resolver = self.config.resolver()?;
        let layout = resolver.resolve(self.viewport_width);
        let bet = BetController::new(self.config.bet.clone())?;
        let rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        let mut session = GameSession {
            builder: StripBuilder::new(self.config.strip.clone()),
            state: SpinSession {
                spin_count: 0,
                balance: round_cents(self.config.starting_balance),
                bet: bet.bet(),
                is_spinning: false,
            },
            resolver,
            layout,
            strips: Vec::new(),
            columns: Vec::new(),
            settled: Vec::new(),
            pending_columns: 0,
            bet,
            phase: Phase::Idle,
            in_flight: None,
            presenting: None,
            overlay_drawn: false,
            overlay_removal: None,
            live_flashes: Vec::new(),
            next_flash_id: 0,
            paylines: PaylinePreview::default(),
            payline_timer: None,
            exhausted_reported: false,
            scheduler: Scheduler::new(),
            renderer: self.renderer,
            audio: self.audio.map(AudioGate::new).unwrap_or_default(),
            celebration: self
                .celebration
                .map(LazyCelebration::new)
                .unwrap_or_default(),
            rng,
            stats: SessionStats::default(),
            config: self.config,
        };

        session.rebuild_layout();
        session.renderer.balance_changed(session.state.balance);
        session.renderer.bet_changed(session.state.bet);
        session.renderer.controls_enabled(true);

        log::info!(
            "Session ready: {} {}×{} @ {:.0}px, balance {:.2}",
            session.layout.name,
            session.layout.columns,
            session.layout.rows,
            session.layout.cell_size,
            session.state.balance
        );
        Ok(session)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// One player's game: layout, strips, script cursor, balance and timers
pub struct GameSession {
    config: GameConfig,
    resolver: BreakpointResolver,
    layout: BreakpointConfig,
    builder: StripBuilder,
    strips: Vec<Strip>,
    columns: Vec<AnimationState>,

    // Join over the columns of the spin in flight
    settled: Vec<bool>,
    pending_columns: usize,

    state: SpinSession,
    bet: BetController,
    phase: Phase,
    in_flight: Option<Outcome>,
    presenting: Option<OutcomeKind>,
    overlay_drawn: bool,
    overlay_removal: Option<TimerId>,
    live_flashes: Vec<u32>,
    next_flash_id: u32,
    paylines: PaylinePreview,
    payline_timer: Option<TimerId>,
    exhausted_reported: bool,

    scheduler: Scheduler<Timer>,
    renderer: Box<dyn ReelRenderer>,
    audio: AudioGate,
    celebration: LazyCelebration,
    rng: ChaCha8Rng,
    stats: SessionStats,
}

impl GameSession {
    /// Session with default collaborators
    pub fn new(config: GameConfig, viewport_width: f64) -> ReelResult<Self> {
        SessionBuilder::new(config)
            .viewport_width(viewport_width)
            .build()
    }

    // ─── Spin ────────────────────────────────────────────────────────────────

    /// Start a spin if every guard passes
    pub fn request_spin(&mut self) -> Result<(), SpinRejection> {
        if self.state.is_spinning {
            log::debug!("Spin ignored: {:?} in progress", self.phase);
            return Err(SpinRejection::Busy);
        }

        let outcome = match self.next_outcome() {
            NextOutcome::Ready(outcome) => outcome.clone(),
            NextOutcome::Exhausted => {
                self.enter_exhausted();
                return Err(SpinRejection::Exhausted);
            }
        };

        if self.state.balance < self.state.bet {
            log::debug!(
                "Spin ignored: balance {:.2} below bet {:.2}",
                self.state.balance,
                self.state.bet
            );
            return Err(SpinRejection::InsufficientFunds);
        }

        self.flush_overlay_removal();

        // Debiting
        self.state.is_spinning = true;
        self.set_phase(Phase::Debiting);
        let bet = self.state.bet;
        self.state.balance = round_cents(self.state.balance - bet);
        self.stats.spins += 1;
        self.stats.total_staked = round_cents(self.stats.total_staked + bet);
        self.renderer.controls_enabled(false);
        self.renderer.balance_changed(self.state.balance);
        self.audio.play(AudioClip::Spin);
        log::info!(
            "Spin {} on {}: bet {:.2}, balance {:.2}",
            self.state.spin_count + 1,
            self.layout.name,
            bet,
            self.state.balance
        );

        // Spinning
        self.set_phase(Phase::Spinning);
        self.in_flight = Some(outcome);
        self.settled = vec![false; self.layout.columns];
        self.pending_columns = self.layout.columns;
        for column in 0..self.layout.columns {
            let delay = self.config.timing.column_delay(column);
            self.scheduler.schedule_in(delay, Timer::ColumnStart(column));
        }

        // Column 0 starts without delay
        self.advance_to(self.scheduler.now());
        Ok(())
    }

    /// Outcome the next spin will land on
    pub fn next_outcome(&self) -> NextOutcome<'_> {
        match self.script() {
            Some(script) => script.next_outcome(self.state.spin_count),
            None => NextOutcome::Exhausted,
        }
    }

    // ─── Clock ───────────────────────────────────────────────────────────────

    /// Move the virtual clock forward by `delta_ms`
    pub fn advance(&mut self, delta_ms: u64) {
        self.advance_to(self.scheduler.now().saturating_add(delta_ms));
    }

    /// Fire every timer due up to `now_ms`, then sample column offsets
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((_, timer)) = self.scheduler.pop_due(now_ms) {
            self.fire(timer);
        }
        self.scheduler.set_now(now_ms);

        let now = self.scheduler.now();
        for state in &mut self.columns {
            state.sample(now);
        }
    }

    /// Jump from timer to timer until none is pending
    pub fn run_pending(&mut self) {
        while let Some(due) = self.scheduler.next_due() {
            self.advance_to(due);
        }
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    // ─── Viewport ────────────────────────────────────────────────────────────

    /// Viewport resize; returns `true` when the breakpoint changed
    ///
    /// A new breakpoint aborts whatever is in flight, rebuilds the strips and
    /// restarts the new breakpoint's script from the top. Resizes inside the
    /// current breakpoint are ignored.
    pub fn resize(&mut self, viewport_width: f64) -> bool {
        match self.resolver.resolve_change(&self.layout, viewport_width) {
            Some(next) => {
                self.reset_layout(next);
                true
            }
            None => false,
        }
    }

    // ─── Bet & paylines ──────────────────────────────────────────────────────

    pub fn increase_bet(&mut self) -> bool {
        self.change_bet(BetController::increase)
    }

    pub fn decrease_bet(&mut self) -> bool {
        self.change_bet(BetController::decrease)
    }

    pub fn select_bet(&mut self, index: usize) -> bool {
        self.change_bet(|bet| bet.select(index))
    }

    /// Show the preview for a paid-line count, replacing any current one
    ///
    /// An unknown count still removes the previous preview and returns
    /// `false`.
    pub fn select_paylines(&mut self, lines: u32) -> bool {
        let was_visible = self.paylines.hide().is_some();
        let was_fading = self
            .payline_timer
            .take()
            .is_some_and(|id| self.scheduler.cancel(id));
        if was_visible || was_fading {
            self.renderer.remove_paylines();
        }

        match self.paylines.show(lines) {
            Some(set) => self.renderer.show_paylines(lines, &set.paylines),
            None => {
                log::warn!("No payline preview for {lines} lines");
                return false;
            }
        }

        let delay = self.config.timing.payline_preview_ms;
        self.payline_timer = Some(self.scheduler.schedule_in(delay, Timer::PaylinesHide));
        true
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.audio.toggle_mute()
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn spin_session(&self) -> &SpinSession {
        &self.state
    }

    pub fn spin_count(&self) -> usize {
        self.state.spin_count
    }

    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    pub fn bet(&self) -> f64 {
        self.state.bet
    }

    pub fn is_spinning(&self) -> bool {
        self.state.is_spinning
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    pub fn celebration_running(&self) -> bool {
        self.celebration.is_running()
    }

    pub fn layout(&self) -> &BreakpointConfig {
        &self.layout
    }

    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    pub fn column_state(&self, column: usize) -> Option<&AnimationState> {
        self.columns.get(column)
    }

    pub fn column_offset(&self, column: usize) -> Option<f64> {
        self.columns.get(column).map(AnimationState::offset)
    }

    /// Symbol currently shown at a window cell
    pub fn visible_symbol(&self, column: usize, row: usize) -> Option<SymbolId> {
        let strip = self.strips.get(column)?;
        let offset = self.column_offset(column)?;
        visible_symbol(strip, offset, self.layout.cell_size, row)
    }

    pub fn paylines(&self) -> &PaylinePreview {
        &self.paylines
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn script(&self) -> Option<&OutcomeScript> {
        self.config.scripts.get(self.layout.name)
    }

    fn script_len(&self) -> usize {
        self.script().map_or(0, OutcomeScript::len)
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::debug!("Phase {from:?} → {to:?}");
        self.phase = to;
        self.renderer.phase_changed(from, to);
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::ColumnStart(column) => self.start_column(column),
            Timer::BlurOff(column) => self.renderer.set_motion_blur(column, false),
            Timer::ColumnSettled(column) => self.settle_column(column),
            Timer::OverlayActivate => self.renderer.set_overlay_active(true),
            Timer::WinFlash => self.spawn_flash(),
            Timer::FlashExpired(id) => {
                self.live_flashes.retain(|&f| f != id);
                self.renderer.remove_flash(id);
            }
            Timer::PresentationEnd => self.end_presentation(),
            Timer::OverlayRemoved => {
                self.overlay_removal = None;
                self.remove_overlay();
            }
            Timer::CtaShow => {
                self.renderer.show_cta();
                self.celebration.start();
            }
            Timer::PaylinesHide => {
                self.paylines.hide();
                self.renderer.hide_paylines();
                let fade = self.config.timing.payline_fade_ms;
                self.payline_timer = Some(self.scheduler.schedule_in(fade, Timer::PaylinesRemoved));
            }
            Timer::PaylinesRemoved => {
                self.payline_timer = None;
                self.renderer.remove_paylines();
            }
        }
    }

    fn start_column(&mut self, column: usize) {
        let Some(outcome) = self.in_flight.as_ref() else {
            return;
        };
        let Some(strip) = self.strips.get(column) else {
            return;
        };

        let located = outcome
            .column(column)
            .and_then(|target| locate(&strip.symbols, target));
        let Some(index) = located else {
            log::error!(
                "Column {column}: scripted slice {:?} not in strip, skipping",
                outcome.column(column)
            );
            self.stats.locator_misses += 1;
            self.column_done(column);
            return;
        };

        let timing = &self.config.timing;
        let state = &mut self.columns[column];
        let from = if self.config.rewind_on_spin {
            0.0
        } else {
            state.offset()
        };
        let animation = ColumnAnimation {
            column,
            from_offset: from,
            to_offset: index as f64 * self.layout.cell_size,
            duration_ms: timing.spin_duration_ms,
            easing: self.config.easing,
        };
        state.begin(&animation, self.scheduler.now());

        self.renderer.animate_column(&animation);
        self.renderer.set_motion_blur(column, true);

        let duration = timing.spin_duration_ms;
        let blur_off = duration.saturating_sub(timing.blur_lead_ms);
        self.scheduler.schedule_in(blur_off, Timer::BlurOff(column));
        self.scheduler.schedule_in(duration, Timer::ColumnSettled(column));

        log::debug!(
            "Column {column} → strip index {index} ({:.0} → {:.0}px)",
            animation.from_offset,
            animation.to_offset
        );
    }

    fn settle_column(&mut self, column: usize) {
        if let Some(state) = self.columns.get_mut(column) {
            state.settle();
            let offset = state.offset();
            self.renderer.place_column(column, offset);
        }
        self.column_done(column);
    }

    /// Barrier: the spin completes when every column has reported once
    fn column_done(&mut self, column: usize) {
        match self.settled.get_mut(column) {
            Some(done) if !*done => *done = true,
            _ => return,
        }
        self.pending_columns = self.pending_columns.saturating_sub(1);
        if self.pending_columns == 0 {
            self.finish_spin();
        }
    }

    fn finish_spin(&mut self) {
        let Some(outcome) = self.in_flight.take() else {
            return;
        };

        self.state.spin_count += 1;
        self.set_phase(Phase::Presenting);
        log::info!(
            "Spin {} landed: {:?}, payout {:.2}",
            self.state.spin_count,
            outcome.kind,
            outcome.credited()
        );

        let kind = outcome.kind;
        if !kind.is_win() {
            self.stats.losses += 1;
            self.unlock();
            return;
        }

        let payout = outcome.credited();
        self.state.balance = round_cents(self.state.balance + payout);
        self.stats.wins += 1;
        self.stats.total_won = round_cents(self.stats.total_won + payout);
        self.renderer.balance_changed(self.state.balance);
        self.audio.play(AudioClip::Win);

        self.presenting = Some(kind);
        self.renderer.win_tier_effect(kind, true);
        self.draw_overlay(&outcome);

        let timing = &self.config.timing;
        self.scheduler
            .schedule_in(timing.overlay_activate_ms, Timer::OverlayActivate);
        if kind == OutcomeKind::BigWin {
            for i in 0..timing.win_flash_count {
                let delay = u64::from(i).saturating_mul(timing.win_flash_interval_ms);
                self.scheduler.schedule_in(delay, Timer::WinFlash);
            }
        }
        self.scheduler
            .schedule_in(timing.dwell(kind), Timer::PresentationEnd);
    }

    /// Highlight winning cells from the settled offsets
    fn draw_overlay(&mut self, outcome: &Outcome) {
        let mode = self.config.presentation;
        let rows = self.layout.rows;
        let cell_size = self.layout.cell_size;
        let mut line = Vec::new();

        for (column, state) in self.columns.iter().enumerate() {
            let winning_row = outcome.winning_row(column);
            if mode == WinPresentation::Border && winning_row.is_none() {
                continue;
            }
            let strip_len = self.strips.get(column).map_or(0, Strip::len);
            for cell in visible_cells(column, state.offset(), cell_size, rows, strip_len) {
                let highlight = match (mode, Some(cell.row) == winning_row) {
                    (WinPresentation::Border, true) => Highlight::Border,
                    (WinPresentation::Line, true) => {
                        line.push(cell);
                        Highlight::Winning
                    }
                    _ => Highlight::Dimmed,
                };
                self.renderer.highlight_cell(cell, highlight);
            }
        }

        if mode == WinPresentation::Line && line.len() >= 2 {
            self.renderer.draw_win_line(&line);
        }
        self.overlay_drawn = true;
    }

    fn spawn_flash(&mut self) {
        let id = self.next_flash_id;
        self.next_flash_id = self.next_flash_id.wrapping_add(1);
        let x = self.rng.random_range(0.0..1.0);
        let y = self.rng.random_range(0.0..1.0);

        self.renderer.spawn_flash(id, x, y);
        self.live_flashes.push(id);
        let life = self.config.timing.win_flash_life_ms;
        self.scheduler.schedule_in(life, Timer::FlashExpired(id));
    }

    fn end_presentation(&mut self) {
        self.renderer.set_overlay_active(false);
        if let Some(kind) = self.presenting.take() {
            self.renderer.win_tier_effect(kind, false);
        }
        let fade = self.config.timing.overlay_fade_ms;
        self.overlay_removal = Some(self.scheduler.schedule_in(fade, Timer::OverlayRemoved));
        self.unlock();
    }

    fn remove_overlay(&mut self) {
        if !self.overlay_drawn {
            return;
        }
        self.renderer.clear_highlights();
        self.renderer.remove_overlay();
        self.overlay_drawn = false;
    }

    /// A fading overlay must not linger into the next spin
    fn flush_overlay_removal(&mut self) {
        if let Some(id) = self.overlay_removal.take() {
            self.scheduler.cancel(id);
            self.remove_overlay();
        }
    }

    fn unlock(&mut self) {
        self.state.is_spinning = false;
        self.set_phase(Phase::Idle);
        if self.state.spin_count >= self.script_len() {
            self.enter_exhausted();
        } else {
            self.renderer.controls_enabled(true);
        }
    }

    /// Terminal state, reported once per script run
    fn enter_exhausted(&mut self) {
        if self.exhausted_reported {
            return;
        }
        self.exhausted_reported = true;
        self.set_phase(Phase::Exhausted);
        self.renderer.controls_enabled(false);
        let delay = self.config.timing.cta_delay_ms;
        self.scheduler.schedule_in(delay, Timer::CtaShow);
        log::info!(
            "Script exhausted on {} after {} spins",
            self.layout.name,
            self.state.spin_count
        );
    }

    fn change_bet(&mut self, op: impl FnOnce(&mut BetController) -> bool) -> bool {
        if self.state.is_spinning {
            log::debug!("Bet change ignored while spinning");
            return false;
        }
        if !op(&mut self.bet) {
            return false;
        }
        self.state.bet = self.bet.bet();
        self.renderer.bet_changed(self.state.bet);
        true
    }

    /// Strips, resting offsets and payline patterns for the current layout
    fn rebuild_layout(&mut self) {
        let fallback;
        let script = match self.config.scripts.get(self.layout.name) {
            Some(script) => script,
            None => {
                fallback = OutcomeScript::new(self.layout.name, Vec::new());
                &fallback
            }
        };
        self.strips = self.builder.build(&self.layout, script, &mut self.rng);

        self.columns.clear();
        for _ in 0..self.layout.columns {
            let offset = self
                .builder
                .resting_offset(self.layout.cell_size, &mut self.rng);
            self.columns.push(AnimationState::at_rest(offset));
        }
        self.settled = vec![false; self.layout.columns];
        self.pending_columns = 0;

        self.paylines =
            PaylinePreview::generate(&self.config.paylines, &self.layout, &mut self.rng);

        self.renderer.build_strips(&self.layout, &self.strips);
        for (column, state) in self.columns.iter().enumerate() {
            self.renderer.place_column(column, state.offset());
        }
    }

    fn reset_layout(&mut self, next: BreakpointConfig) {
        log::info!(
            "Breakpoint {} → {}: resetting session",
            self.layout.name,
            next.name
        );
        let was_spinning = self.state.is_spinning;
        let was_visible = self.paylines.hide().is_some();
        let had_paylines = self.payline_timer.take().is_some() || was_visible;
        let cancelled = self.scheduler.cancel_all();
        self.overlay_removal = None;

        for (column, state) in self.columns.iter().enumerate() {
            if state.in_transit() {
                self.renderer.set_motion_blur(column, false);
            }
        }
        if let Some(kind) = self.presenting.take() {
            self.renderer.set_overlay_active(false);
            self.renderer.win_tier_effect(kind, false);
        }
        self.remove_overlay();
        for id in std::mem::take(&mut self.live_flashes) {
            self.renderer.remove_flash(id);
        }
        if had_paylines {
            self.renderer.remove_paylines();
        }
        self.celebration.stop();
        self.audio.stop(AudioClip::Spin);

        self.layout = next;
        self.in_flight = None;
        self.state.spin_count = 0;
        self.state.is_spinning = false;
        self.exhausted_reported = false;
        self.stats.resets += 1;
        self.rebuild_layout();

        self.set_phase(Phase::Idle);
        if self.script_len() == 0 {
            self.enter_exhausted();
        } else {
            self.renderer.controls_enabled(true);
        }
        log::debug!("Reset cancelled {cancelled} timers (spin in flight: {was_spinning})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::SpinTiming;

    fn session(width: f64) -> GameSession {
        SessionBuilder::new(GameConfig::default())
            .viewport_width(width)
            .seed(42)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = session(1280.0);

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.balance(), 1000.0);
        assert_eq!(session.bet(), 1.0);
        assert_eq!(session.strips().len(), 5);
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn test_columns_start_staggered() {
        let mut session = session(1280.0);
        session.request_spin().unwrap();

        assert_eq!(session.phase(), Phase::Spinning);
        assert!(session.column_state(0).unwrap().in_transit());
        assert!(!session.column_state(1).unwrap().in_transit());

        session.advance(100);
        assert!(session.column_state(1).unwrap().in_transit());
        assert!(!session.column_state(2).unwrap().in_transit());
    }

    #[test]
    fn test_join_waits_for_last_column() {
        let mut session = session(1280.0);
        session.request_spin().unwrap();

        // Column 0 is done at 3000ms, column 4 only at 3400ms
        session.advance_to(3399);
        assert_eq!(session.phase(), Phase::Spinning);
        assert_eq!(session.spin_count(), 0);

        session.advance_to(3400);
        assert_eq!(session.spin_count(), 1);
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_bet_locked_while_spinning() {
        let mut session = session(1280.0);
        session.request_spin().unwrap();

        assert!(!session.increase_bet());
        assert!(!session.select_bet(3));
        session.run_pending();
        assert!(session.increase_bet());
        assert_eq!(session.bet(), 5.0);
    }

    #[test]
    fn test_instant_timing_completes_inside_request() {
        let config = GameConfig {
            timing: SpinTiming::instant(),
            ..GameConfig::default()
        };
        let mut session = SessionBuilder::new(config)
            .viewport_width(400.0)
            .seed(1)
            .build()
            .unwrap();

        session.request_spin().unwrap();
        assert_eq!(session.spin_count(), 1);
        assert!(!session.is_spinning());
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(SpinRejection::Busy.to_string(), "spin in progress");
        assert_eq!(SpinRejection::Exhausted.to_string(), "script exhausted");
    }

    #[test]
    fn test_missing_slice_skips_only_that_column() {
        let mut session = session(1280.0);
        let outcome = match session.next_outcome() {
            NextOutcome::Ready(outcome) => outcome.clone(),
            NextOutcome::Exhausted => panic!("default script is empty"),
        };
        session.strips[1].symbols.fill(SymbolId::MAX);

        session.request_spin().unwrap();
        session.run_pending();

        assert_eq!(session.spin_count(), 1);
        assert_eq!(session.stats().locator_misses, 1);
        assert_eq!(session.phase(), Phase::Idle);
        for column in [0, 2, 3, 4] {
            for (row, &symbol) in outcome.grid[column].iter().enumerate() {
                assert_eq!(session.visible_symbol(column, row), Some(symbol));
            }
        }
        assert_eq!(session.visible_symbol(1, 0), Some(SymbolId::MAX));
    }

    #[test]
    fn test_oversized_timings_do_not_overflow() {
        let mut config = GameConfig::default();
        config.timing.stagger_ms = u64::MAX / 2;
        config.timing.win_flash_interval_ms = u64::MAX / 2;
        config.validate().unwrap();

        let mut session = SessionBuilder::new(config)
            .viewport_width(1280.0)
            .seed(42)
            .build()
            .unwrap();

        session.request_spin().unwrap();
        assert_eq!(session.phase(), Phase::Spinning);
        session.run_pending();
        assert_eq!(session.spin_count(), 1);
        assert!(!session.is_spinning());
    }
}
