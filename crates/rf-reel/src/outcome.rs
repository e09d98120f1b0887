//! Outcome script — predefined spin results, consumed strictly in order

use serde::{Deserialize, Serialize};

use crate::breakpoint::{Breakpoint, BreakpointConfig};
use crate::{ReelError, ReelResult, SymbolId};

/// Win classification of a scripted outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Loss,
    SmallWin,
    BigWin,
}

impl OutcomeKind {
    pub fn is_win(&self) -> bool {
        !matches!(self, Self::Loss)
    }
}

/// One scripted spin result
///
/// `grid[c]` is column `c` top to bottom. `win_pattern[c]` names the winning
/// row of column `c`, or `None` when that column has no winning cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    #[serde(default)]
    pub payout: f64,
    #[serde(default)]
    pub win_pattern: Option<Vec<Option<usize>>>,
    pub grid: Vec<Vec<SymbolId>>,
}

impl Outcome {
    pub fn loss(grid: Vec<Vec<SymbolId>>) -> Self {
        Self {
            kind: OutcomeKind::Loss,
            payout: 0.0,
            win_pattern: None,
            grid,
        }
    }

    pub fn win(
        kind: OutcomeKind,
        payout: f64,
        win_pattern: Vec<Option<usize>>,
        grid: Vec<Vec<SymbolId>>,
    ) -> Self {
        Self {
            kind,
            payout,
            win_pattern: Some(win_pattern),
            grid,
        }
    }

    /// Column slice the reel must land on
    pub fn column(&self, column: usize) -> Option<&[SymbolId]> {
        self.grid.get(column).map(Vec::as_slice)
    }

    /// Winning row of a column, if any
    pub fn winning_row(&self, column: usize) -> Option<usize> {
        self.win_pattern
            .as_ref()
            .and_then(|p| p.get(column).copied().flatten())
    }

    /// Amount credited when this outcome is presented
    pub fn credited(&self) -> f64 {
        if self.kind.is_win() { self.payout } else { 0.0 }
    }

    fn check_shape(&self, layout: &BreakpointConfig, alphabet_size: u32) -> Result<(), String> {
        if self.grid.len() != layout.columns {
            return Err(format!(
                "grid has {} columns, layout needs {}",
                self.grid.len(),
                layout.columns
            ));
        }
        for (c, column) in self.grid.iter().enumerate() {
            if column.len() != layout.rows {
                return Err(format!(
                    "column {c} has {} rows, layout needs {}",
                    column.len(),
                    layout.rows
                ));
            }
            if let Some(&bad) = column.iter().find(|&&s| s == 0 || s > alphabet_size) {
                return Err(format!(
                    "column {c} uses symbol {bad} outside 1..={alphabet_size}"
                ));
            }
        }
        if !self.payout.is_finite() || self.payout < 0.0 {
            return Err(format!("payout {} is negative", self.payout));
        }
        if let Some(pattern) = &self.win_pattern {
            if pattern.len() != layout.columns {
                return Err(format!(
                    "win pattern has {} entries, layout needs {}",
                    pattern.len(),
                    layout.columns
                ));
            }
            if let Some(row) = pattern.iter().flatten().find(|&&r| r >= layout.rows) {
                return Err(format!("win pattern row {row} out of range"));
            }
        }
        Ok(())
    }
}

/// Result of asking the script for the next spin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextOutcome<'a> {
    Ready(&'a Outcome),
    /// Every outcome has been served; terminal, not an error
    Exhausted,
}

/// Ordered, finite outcome list for one breakpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeScript {
    pub breakpoint: Breakpoint,
    pub outcomes: Vec<Outcome>,
}

impl OutcomeScript {
    pub fn new(breakpoint: Breakpoint, outcomes: Vec<Outcome>) -> Self {
        Self {
            breakpoint,
            outcomes,
        }
    }

    /// Outcome at `cursor`, or `Exhausted` past the end
    pub fn next_outcome(&self, cursor: usize) -> NextOutcome<'_> {
        match self.outcomes.get(cursor) {
            Some(outcome) => NextOutcome::Ready(outcome),
            None => NextOutcome::Exhausted,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Check every outcome against a layout
    pub fn validate(&self, layout: &BreakpointConfig, alphabet_size: u32) -> ReelResult<()> {
        for (index, outcome) in self.outcomes.iter().enumerate() {
            outcome
                .check_shape(layout, alphabet_size)
                .map_err(|reason| ReelError::ScriptShape {
                    breakpoint: self.breakpoint,
                    index,
                    reason,
                })?;
        }
        Ok(())
    }

    /// Scripted desktop sequence: loss, small win, big win
    pub fn desktop_default() -> Self {
        Self::new(
            Breakpoint::Desktop,
            vec![
                Outcome::loss(vec![
                    vec![2, 4, 1],
                    vec![3, 5, 2],
                    vec![1, 7, 4],
                    vec![6, 2, 5],
                    vec![4, 1, 3],
                ]),
                Outcome::win(
                    OutcomeKind::SmallWin,
                    50.0,
                    vec![Some(1), Some(2), Some(1), None, None],
                    vec![
                        vec![1, 3, 4],
                        vec![7, 4, 3],
                        vec![4, 3, 1],
                        vec![2, 5, 4],
                        vec![5, 6, 7],
                    ],
                ),
                Outcome::win(
                    OutcomeKind::BigWin,
                    150.0,
                    vec![Some(0), Some(0), Some(1), Some(2), Some(2)],
                    vec![
                        vec![8, 4, 7],
                        vec![8, 6, 2],
                        vec![3, 8, 1],
                        vec![1, 4, 8],
                        vec![5, 3, 8],
                    ],
                ),
            ],
        )
    }

    /// Scripted mobile sequence: loss, small win, big win
    pub fn mobile_default() -> Self {
        Self::new(
            Breakpoint::Mobile,
            vec![
                Outcome::loss(vec![vec![4, 1, 7], vec![5, 2, 8], vec![7, 4, 3]]),
                Outcome::win(
                    OutcomeKind::SmallWin,
                    50.0,
                    vec![Some(1), Some(1), Some(1)],
                    vec![vec![2, 3, 5], vec![7, 3, 2], vec![4, 3, 8]],
                ),
                Outcome::win(
                    OutcomeKind::BigWin,
                    150.0,
                    vec![Some(2), Some(1), Some(1)],
                    vec![vec![8, 5, 7], vec![3, 8, 6], vec![6, 8, 4]],
                ),
            ],
        )
    }
}

/// Outcome scripts keyed by breakpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptBook {
    scripts: Vec<OutcomeScript>,
}

impl ScriptBook {
    pub fn new(scripts: Vec<OutcomeScript>) -> Self {
        Self { scripts }
    }

    pub fn get(&self, breakpoint: Breakpoint) -> Option<&OutcomeScript> {
        self.scripts.iter().find(|s| s.breakpoint == breakpoint)
    }

    /// Script for a breakpoint, or `MissingScript`
    pub fn require(&self, breakpoint: Breakpoint) -> ReelResult<&OutcomeScript> {
        self.get(breakpoint)
            .ok_or(ReelError::MissingScript(breakpoint))
    }

    pub fn scripts(&self) -> &[OutcomeScript] {
        &self.scripts
    }
}

impl Default for ScriptBook {
    fn default() -> Self {
        Self::new(vec![
            OutcomeScript::desktop_default(),
            OutcomeScript::mobile_default(),
        ])
    }
}
