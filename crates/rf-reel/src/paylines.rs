//! Payline preview — decorative line patterns per paid-line count
//!
//! Purely cosmetic and independent of the spin sequence. The session owns the
//! hide/remove timers; this module owns which patterns exist and which count
//! is on screen.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::breakpoint::BreakpointConfig;
use crate::{ReelError, ReelResult};

/// Paid-line count and how many preview patterns it draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaylineOption {
    pub lines: u32,
    pub patterns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaylineSettings {
    pub options: Vec<PaylineOption>,
}

impl Default for PaylineSettings {
    fn default() -> Self {
        let options = [(100, 20), (80, 16), (60, 12), (40, 8), (20, 4)]
            .into_iter()
            .map(|(lines, patterns)| PaylineOption { lines, patterns })
            .collect();
        Self { options }
    }
}

impl PaylineSettings {
    pub fn validate(&self) -> ReelResult<()> {
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|o| o.lines == option.lines) {
                return Err(ReelError::InvalidConfig(format!(
                    "payline count {} declared twice",
                    option.lines
                )));
            }
        }
        Ok(())
    }
}

/// One preview line: a window row per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    pub rows: Vec<usize>,
}

/// Patterns drawn for one paid-line count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaylineSet {
    pub lines: u32,
    pub paylines: Vec<Payline>,
}

/// Generated patterns plus the count currently on screen
#[derive(Debug, Clone, Default)]
pub struct PaylinePreview {
    sets: Vec<PaylineSet>,
    visible: Option<u32>,
}

impl PaylinePreview {
    /// Draw fresh random patterns for a layout
    pub fn generate<R: Rng + ?Sized>(
        settings: &PaylineSettings,
        layout: &BreakpointConfig,
        rng: &mut R,
    ) -> Self {
        let rows = layout.rows.max(1);
        let sets = settings
            .options
            .iter()
            .map(|option| PaylineSet {
                lines: option.lines,
                paylines: (0..option.patterns)
                    .map(|_| Payline {
                        rows: (0..layout.columns).map(|_| rng.random_range(0..rows)).collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            sets,
            visible: None,
        }
    }

    pub fn set(&self, lines: u32) -> Option<&PaylineSet> {
        self.sets.iter().find(|s| s.lines == lines)
    }

    pub fn sets(&self) -> &[PaylineSet] {
        &self.sets
    }

    /// Count currently on screen
    pub fn visible(&self) -> Option<u32> {
        self.visible
    }

    /// Mark `lines` as shown; an unknown count leaves nothing visible
    pub fn show(&mut self, lines: u32) -> Option<&PaylineSet> {
        match self.sets.iter().find(|s| s.lines == lines) {
            Some(set) => {
                self.visible = Some(lines);
                Some(set)
            }
            None => {
                self.visible = None;
                None
            }
        }
    }

    pub fn hide(&mut self) -> Option<u32> {
        self.visible.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::BreakpointResolver;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_counts_and_shape() {
        let layout = BreakpointResolver::default().resolve(1280.0);
        let preview = PaylinePreview::generate(
            &PaylineSettings::default(),
            &layout,
            &mut ChaCha8Rng::seed_from_u64(4),
        );

        assert_eq!(preview.sets().len(), 5);
        assert_eq!(preview.set(100).unwrap().paylines.len(), 20);
        assert_eq!(preview.set(20).unwrap().paylines.len(), 4);
        for set in preview.sets() {
            for line in &set.paylines {
                assert_eq!(line.rows.len(), 5);
                assert!(line.rows.iter().all(|&r| r < 3));
            }
        }
    }

    #[test]
    fn test_show_unknown_count_clears() {
        let layout = BreakpointResolver::default().resolve(400.0);
        let mut preview = PaylinePreview::generate(
            &PaylineSettings::default(),
            &layout,
            &mut ChaCha8Rng::seed_from_u64(4),
        );

        assert!(preview.show(60).is_some());
        assert_eq!(preview.visible(), Some(60));
        assert!(preview.show(55).is_none());
        assert_eq!(preview.visible(), None);

        preview.show(40);
        assert_eq!(preview.hide(), Some(40));
        assert_eq!(preview.hide(), None);
    }

    #[test]
    fn test_duplicate_counts_rejected() {
        let settings = PaylineSettings {
            options: vec![
                PaylineOption { lines: 20, patterns: 4 },
                PaylineOption { lines: 20, patterns: 2 },
            ],
        };
        assert!(settings.validate().is_err());
        assert!(PaylineSettings::default().validate().is_ok());
    }
}
