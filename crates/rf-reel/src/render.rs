//! Renderer collaborator
//!
//! The session pushes every visual change through [`ReelRenderer`]; it never
//! reads state back. All methods default to no-ops so a host only implements
//! what it draws.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::animation::ColumnAnimation;
use crate::breakpoint::BreakpointConfig;
use crate::outcome::OutcomeKind;
use crate::paylines::Payline;
use crate::session::Phase;
use crate::strip::Strip;
use crate::window::CellRef;

/// Style applied to one visible cell during win presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// Framed winning cell
    Border,
    /// Winning cell on a connecting line
    Winning,
    /// Non-winning cell pushed to the background
    Dimmed,
}

/// How winning cells are marked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinPresentation {
    /// Border the winning cell, dim the rest of that column
    #[default]
    Border,
    /// Line through every winning cell, dim everything else
    Line,
}

pub trait ReelRenderer: Send {
    // ═══════════════════════════════════════════════════════════════════════════
    // LAYOUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Replace every column with freshly built strips
    fn build_strips(&mut self, _layout: &BreakpointConfig, _strips: &[Strip]) {}

    /// Put a column at an offset without animating
    fn place_column(&mut self, _column: usize, _offset: f64) {}

    /// Scroll a column; the session tracks completion on its own clock
    fn animate_column(&mut self, _animation: &ColumnAnimation) {}

    fn set_motion_blur(&mut self, _column: usize, _on: bool) {}

    // ═══════════════════════════════════════════════════════════════════════════
    // WIN PRESENTATION
    // ═══════════════════════════════════════════════════════════════════════════

    fn highlight_cell(&mut self, _cell: CellRef, _highlight: Highlight) {}

    fn clear_highlights(&mut self) {}

    /// Connecting line through cell centres (always two or more cells)
    fn draw_win_line(&mut self, _cells: &[CellRef]) {}

    fn set_overlay_active(&mut self, _active: bool) {}

    /// Drop highlights and lines entirely
    fn remove_overlay(&mut self) {}

    fn win_tier_effect(&mut self, _kind: OutcomeKind, _on: bool) {}

    /// Flash at normalised (0..1) coordinates
    fn spawn_flash(&mut self, _id: u32, _x: f64, _y: f64) {}

    fn remove_flash(&mut self, _id: u32) {}

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION STATE
    // ═══════════════════════════════════════════════════════════════════════════

    fn phase_changed(&mut self, _from: Phase, _to: Phase) {}

    fn balance_changed(&mut self, _balance: f64) {}

    fn bet_changed(&mut self, _bet: f64) {}

    fn controls_enabled(&mut self, _enabled: bool) {}

    /// End-of-session call to action
    fn show_cta(&mut self) {}

    // ═══════════════════════════════════════════════════════════════════════════
    // PAYLINE PREVIEW
    // ═══════════════════════════════════════════════════════════════════════════

    fn show_paylines(&mut self, _lines: u32, _paylines: &[Payline]) {}

    /// Start the fade-out
    fn hide_paylines(&mut self) {}

    fn remove_paylines(&mut self) {}
}

/// Renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl ReelRenderer for NullRenderer {}

/// One renderer call, as seen by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    BuildStrips { layout: BreakpointConfig, strips: Vec<Strip> },
    PlaceColumn { column: usize, offset: f64 },
    AnimateColumn(ColumnAnimation),
    MotionBlur { column: usize, on: bool },
    Highlight { cell: CellRef, highlight: Highlight },
    ClearHighlights,
    WinLine(Vec<CellRef>),
    OverlayActive(bool),
    RemoveOverlay,
    TierEffect { kind: OutcomeKind, on: bool },
    SpawnFlash { id: u32, x: f64, y: f64 },
    RemoveFlash(u32),
    Phase { from: Phase, to: Phase },
    Balance(f64),
    Bet(f64),
    Controls(bool),
    ShowCta,
    ShowPaylines { lines: u32, count: usize },
    HidePaylines,
    RemovePaylines,
}

/// Renderer that records every call
///
/// Clones share one log, so a test keeps a handle while the session owns
/// the boxed renderer.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn count(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    /// Phases entered, in order
    pub fn phases(&self) -> Vec<Phase> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RenderCall::Phase { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: RenderCall) {
        self.calls.lock().push(call);
    }
}

impl ReelRenderer for RecordingRenderer {
    fn build_strips(&mut self, layout: &BreakpointConfig, strips: &[Strip]) {
        self.push(RenderCall::BuildStrips {
            layout: *layout,
            strips: strips.to_vec(),
        });
    }

    fn place_column(&mut self, column: usize, offset: f64) {
        self.push(RenderCall::PlaceColumn { column, offset });
    }

    fn animate_column(&mut self, animation: &ColumnAnimation) {
        self.push(RenderCall::AnimateColumn(*animation));
    }

    fn set_motion_blur(&mut self, column: usize, on: bool) {
        self.push(RenderCall::MotionBlur { column, on });
    }

    fn highlight_cell(&mut self, cell: CellRef, highlight: Highlight) {
        self.push(RenderCall::Highlight { cell, highlight });
    }

    fn clear_highlights(&mut self) {
        self.push(RenderCall::ClearHighlights);
    }

    fn draw_win_line(&mut self, cells: &[CellRef]) {
        self.push(RenderCall::WinLine(cells.to_vec()));
    }

    fn set_overlay_active(&mut self, active: bool) {
        self.push(RenderCall::OverlayActive(active));
    }

    fn remove_overlay(&mut self) {
        self.push(RenderCall::RemoveOverlay);
    }

    fn win_tier_effect(&mut self, kind: OutcomeKind, on: bool) {
        self.push(RenderCall::TierEffect { kind, on });
    }

    fn spawn_flash(&mut self, id: u32, x: f64, y: f64) {
        self.push(RenderCall::SpawnFlash { id, x, y });
    }

    fn remove_flash(&mut self, id: u32) {
        self.push(RenderCall::RemoveFlash(id));
    }

    fn phase_changed(&mut self, from: Phase, to: Phase) {
        self.push(RenderCall::Phase { from, to });
    }

    fn balance_changed(&mut self, balance: f64) {
        self.push(RenderCall::Balance(balance));
    }

    fn bet_changed(&mut self, bet: f64) {
        self.push(RenderCall::Bet(bet));
    }

    fn controls_enabled(&mut self, enabled: bool) {
        self.push(RenderCall::Controls(enabled));
    }

    fn show_cta(&mut self) {
        self.push(RenderCall::ShowCta);
    }

    fn show_paylines(&mut self, lines: u32, paylines: &[Payline]) {
        self.push(RenderCall::ShowPaylines {
            lines,
            count: paylines.len(),
        });
    }

    fn hide_paylines(&mut self) {
        self.push(RenderCall::HidePaylines);
    }

    fn remove_paylines(&mut self) {
        self.push(RenderCall::RemovePaylines);
    }
}
