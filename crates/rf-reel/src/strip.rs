//! Reel strips — random filler followed by the scripted outcome tail

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::breakpoint::BreakpointConfig;
use crate::outcome::OutcomeScript;
use crate::{ReelError, ReelResult, SymbolId};

/// How filler symbols are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillerPattern {
    /// Cycle through the alphabet from a random per-column offset
    #[default]
    Cycle,
    /// Every symbol drawn independently
    Uniform,
}

/// Strip construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripSettings {
    /// Filler symbols before the outcome tail
    pub filler_length: usize,
    /// Number of distinct reel icons
    pub alphabet_size: u32,
    pub filler: FillerPattern,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            filler_length: 100,
            alphabet_size: 8,
            filler: FillerPattern::Cycle,
        }
    }
}

impl StripSettings {
    pub fn validate(&self) -> ReelResult<()> {
        if self.alphabet_size == 0 {
            return Err(ReelError::InvalidStrip("alphabet is empty".into()));
        }
        Ok(())
    }
}

/// One column's scrollable symbol sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    pub column: usize,
    pub symbols: Vec<SymbolId>,
    /// Index where the outcome tail begins
    pub tail_start: usize,
}

impl Strip {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbol_at(&self, index: usize) -> Option<SymbolId> {
        self.symbols.get(index).copied()
    }

    pub fn filler(&self) -> &[SymbolId] {
        &self.symbols[..self.tail_start]
    }

    pub fn tail(&self) -> &[SymbolId] {
        &self.symbols[self.tail_start..]
    }

    /// Strip index where outcome `n` of the tail starts
    pub fn outcome_start(&self, outcome_index: usize, rows: usize) -> usize {
        self.tail_start + outcome_index * rows
    }
}

/// Builds one strip per layout column
#[derive(Debug, Clone)]
pub struct StripBuilder {
    settings: StripSettings,
}

impl StripBuilder {
    pub fn new(settings: StripSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &StripSettings {
        &self.settings
    }

    /// Build strips for every column of `layout`
    ///
    /// Filler is redrawn on every call; the tail is the concatenation of each
    /// outcome's column slice in script order and never varies.
    pub fn build<R: Rng + ?Sized>(
        &self,
        layout: &BreakpointConfig,
        script: &OutcomeScript,
        rng: &mut R,
    ) -> Vec<Strip> {
        (0..layout.columns)
            .map(|column| {
                let mut symbols = self.filler(rng);
                let tail_start = symbols.len();
                symbols.extend(outcome_tail(script, column));
                Strip {
                    column,
                    symbols,
                    tail_start,
                }
            })
            .collect()
    }

    fn filler<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<SymbolId> {
        let alphabet = self.settings.alphabet_size.max(1);
        let len = self.settings.filler_length;
        match self.settings.filler {
            FillerPattern::Cycle => {
                let offset = rng.random_range(0..alphabet) as usize;
                (0..len)
                    .map(|i| ((i + offset) % alphabet as usize) as SymbolId + 1)
                    .collect()
            }
            FillerPattern::Uniform => (0..len).map(|_| rng.random_range(1..=alphabet)).collect(),
        }
    }

    /// Random resting offset for a freshly built column
    pub fn resting_offset<R: Rng + ?Sized>(&self, cell_size: f64, rng: &mut R) -> f64 {
        let cells = self.settings.alphabet_size.max(1);
        rng.random_range(0..cells) as f64 * cell_size
    }
}

/// Scripted symbols of one column, in outcome order
pub fn outcome_tail(script: &OutcomeScript, column: usize) -> impl Iterator<Item = SymbolId> + '_ {
    script
        .outcomes
        .iter()
        .filter_map(move |o| o.column(column))
        .flat_map(|slice| slice.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::{Breakpoint, BreakpointResolver};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn desktop() -> BreakpointConfig {
        BreakpointResolver::default().resolve(1024.0)
    }

    #[test]
    fn test_strip_per_column_with_tail() {
        let script = OutcomeScript::desktop_default();
        let builder = StripBuilder::new(StripSettings::default());
        let strips = builder.build(&desktop(), &script, &mut ChaCha8Rng::seed_from_u64(7));

        assert_eq!(strips.len(), 5);
        for (c, strip) in strips.iter().enumerate() {
            assert_eq!(strip.column, c);
            assert_eq!(strip.tail_start, 100);
            assert_eq!(strip.len(), 100 + 3 * 3);
            let expected: Vec<_> = script
                .outcomes
                .iter()
                .flat_map(|o| o.grid[c].clone())
                .collect();
            assert_eq!(strip.tail(), expected.as_slice());
        }
    }

    #[test]
    fn test_cycle_filler_is_sequential() {
        let builder = StripBuilder::new(StripSettings::default());
        let script = OutcomeScript::desktop_default();
        let strips = builder.build(&desktop(), &script, &mut ChaCha8Rng::seed_from_u64(1));

        for strip in &strips {
            for pair in strip.filler().windows(2) {
                assert_eq!(pair[1], pair[0] % 8 + 1);
            }
            assert!(strip.filler().iter().all(|&s| (1..=8).contains(&s)));
        }
    }

    #[test]
    fn test_uniform_filler_in_alphabet() {
        let builder = StripBuilder::new(StripSettings {
            filler: FillerPattern::Uniform,
            alphabet_size: 5,
            filler_length: 400,
        });
        let script = OutcomeScript::new(Breakpoint::Desktop, Vec::new());
        let strips = builder.build(&desktop(), &script, &mut ChaCha8Rng::seed_from_u64(3));

        for strip in &strips {
            assert_eq!(strip.len(), 400);
            assert!(strip.symbols.iter().all(|&s| (1..=5).contains(&s)));
        }
    }

    #[test]
    fn test_tail_stable_across_rebuilds() {
        let builder = StripBuilder::new(StripSettings::default());
        let script = OutcomeScript::desktop_default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let first = builder.build(&desktop(), &script, &mut rng);
        let second = builder.build(&desktop(), &script, &mut rng);

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.tail(), b.tail());
        }
        // Filler offsets are redrawn, so at least one column should differ
        assert!(first.iter().zip(&second).any(|(a, b)| a.filler() != b.filler()));
    }

    #[test]
    fn test_outcome_start_index() {
        let builder = StripBuilder::new(StripSettings::default());
        let script = OutcomeScript::desktop_default();
        let strips = builder.build(&desktop(), &script, &mut ChaCha8Rng::seed_from_u64(5));

        let strip = &strips[2];
        let start = strip.outcome_start(1, 3);
        assert_eq!(&strip.symbols[start..start + 3], &[4, 3, 1]);
    }

    #[test]
    fn test_resting_offset_on_cell_grid() {
        let builder = StripBuilder::new(StripSettings::default());
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let offset = builder.resting_offset(140.0, &mut rng);
            assert_eq!(offset % 140.0, 0.0);
            assert!(offset < 8.0 * 140.0);
        }
    }
}
