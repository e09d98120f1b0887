//! Visible window — which strip cells sit in the reel window at an offset

use serde::{Deserialize, Serialize};

use crate::strip::Strip;
use crate::SymbolId;

/// First strip index visible at `current_offset`
///
/// Rounds, so sub-pixel easing residue still maps onto the intended cell.
pub fn visible_start(current_offset: f64, cell_size: f64) -> usize {
    if cell_size <= 0.0 || !current_offset.is_finite() {
        return 0;
    }
    (current_offset / cell_size).round().max(0.0) as usize
}

/// Strip index shown at window row `row_in_window`
pub fn visible_index(current_offset: f64, cell_size: f64, row_in_window: usize) -> usize {
    visible_start(current_offset, cell_size) + row_in_window
}

/// Symbol shown at window row `row_in_window`
pub fn visible_symbol(
    strip: &Strip,
    current_offset: f64,
    cell_size: f64,
    row_in_window: usize,
) -> Option<SymbolId> {
    strip.symbol_at(visible_index(current_offset, cell_size, row_in_window))
}

/// A cell of the reel window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub column: usize,
    /// Row inside the visible window
    pub row: usize,
    /// Index into the column's strip
    pub strip_index: usize,
}

/// Visible cells of one column, top to bottom
pub fn visible_cells(
    column: usize,
    current_offset: f64,
    cell_size: f64,
    rows: usize,
    strip_len: usize,
) -> Vec<CellRef> {
    let start = visible_start(current_offset, cell_size);
    (0..rows)
        .map(|row| CellRef {
            column,
            row,
            strip_index: start + row,
        })
        .filter(|cell| cell.strip_index < strip_len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_index_from_offset() {
        assert_eq!(visible_index(540.0, 180.0, 1), 4);
        assert_eq!(visible_index(0.0, 180.0, 0), 0);
    }

    #[test]
    fn test_rounding_tolerates_easing_residue() {
        assert_eq!(visible_start(539.6, 180.0), 3);
        assert_eq!(visible_start(540.4, 180.0), 3);
        assert_eq!(visible_start(629.0, 180.0), 3);
        assert_eq!(visible_start(631.0, 180.0), 4);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(visible_start(100.0, 0.0), 0);
        assert_eq!(visible_start(f64::NAN, 180.0), 0);
        assert_eq!(visible_start(-500.0, 180.0), 0);
    }

    #[test]
    fn test_visible_symbol_reads_strip() {
        let strip = Strip {
            column: 0,
            symbols: vec![1, 2, 3, 4, 5, 6],
            tail_start: 3,
        };
        assert_eq!(visible_symbol(&strip, 540.0, 180.0, 1), Some(5));
        assert_eq!(visible_symbol(&strip, 900.0, 180.0, 2), None);
    }

    #[test]
    fn test_visible_cells_clipped_to_strip() {
        let cells = visible_cells(2, 280.0, 140.0, 3, 4);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].strip_index, 2);
        assert_eq!(cells[1].row, 1);
        assert!(cells.iter().all(|c| c.column == 2));
    }
}
