//! Timing profiles for spin sequencing and win presentation

use serde::{Deserialize, Serialize};

use crate::outcome::OutcomeKind;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// No waiting (headless simulation, tests)
    Instant,
    /// Scaled or hand-tuned values
    Custom,
}

/// Detailed timing configuration (all values in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Start delay between neighbouring columns
    pub stagger_ms: u64,

    /// Scroll duration of one column
    pub spin_duration_ms: u64,

    /// Motion blur is dropped this long before a column settles
    pub blur_lead_ms: u64,

    /// Win presentation hold for a small win
    pub small_win_dwell_ms: u64,

    /// Win presentation hold for a big win
    pub big_win_dwell_ms: u64,

    /// Delay between drawing a win overlay and activating it
    pub overlay_activate_ms: u64,

    /// Fade-out before a win overlay is removed
    pub overlay_fade_ms: u64,

    /// Flash effects during a big win
    pub win_flash_count: u32,

    /// Delay between flashes
    pub win_flash_interval_ms: u64,

    /// Lifetime of one flash
    pub win_flash_life_ms: u64,

    /// Delay before the call-to-action once the script is exhausted
    pub cta_delay_ms: u64,

    /// How long a payline preview stays up
    pub payline_preview_ms: u64,

    /// Fade-out before a payline preview is removed
    pub payline_fade_ms: u64,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            stagger_ms: 100,
            spin_duration_ms: 3000,
            blur_lead_ms: 250,
            small_win_dwell_ms: 1500,
            big_win_dwell_ms: 2000,
            overlay_activate_ms: 50,
            overlay_fade_ms: 300,
            win_flash_count: 12,
            win_flash_interval_ms: 120,
            win_flash_life_ms: 600,
            cta_delay_ms: 1500,
            payline_preview_ms: 2000,
            payline_fade_ms: 300,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            ..Self::normal().scaled(0.4)
        }
    }

    /// Every delay collapsed to zero
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            ..Self::normal().scaled(0.0)
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ms: u64| (ms as f64 * factor.max(0.0)).round() as u64;
        Self {
            profile: TimingProfile::Custom,
            stagger_ms: scale(self.stagger_ms),
            spin_duration_ms: scale(self.spin_duration_ms),
            blur_lead_ms: scale(self.blur_lead_ms),
            small_win_dwell_ms: scale(self.small_win_dwell_ms),
            big_win_dwell_ms: scale(self.big_win_dwell_ms),
            overlay_activate_ms: scale(self.overlay_activate_ms),
            overlay_fade_ms: scale(self.overlay_fade_ms),
            win_flash_count: self.win_flash_count,
            win_flash_interval_ms: scale(self.win_flash_interval_ms),
            win_flash_life_ms: scale(self.win_flash_life_ms),
            cta_delay_ms: scale(self.cta_delay_ms),
            payline_preview_ms: scale(self.payline_preview_ms),
            payline_fade_ms: scale(self.payline_fade_ms),
        }
    }

    /// Start delay of a column
    pub fn column_delay(&self, column: usize) -> u64 {
        self.stagger_ms.saturating_mul(column as u64)
    }

    /// Time from spin start until every column has settled
    pub fn total_spin_duration(&self, columns: usize) -> u64 {
        self.column_delay(columns.saturating_sub(1))
            .saturating_add(self.spin_duration_ms)
    }

    /// Win presentation hold per outcome tier
    pub fn dwell(&self, kind: OutcomeKind) -> u64 {
        match kind {
            OutcomeKind::Loss => 0,
            OutcomeKind::SmallWin => self.small_win_dwell_ms,
            OutcomeKind::BigWin => self.big_win_dwell_ms,
        }
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_profiles() {
        let normal = SpinTiming::normal();
        let turbo = SpinTiming::turbo();
        let instant = SpinTiming::instant();

        assert!(turbo.spin_duration_ms < normal.spin_duration_ms);
        assert_eq!(turbo.profile, TimingProfile::Turbo);
        assert_eq!(instant.spin_duration_ms, 0);
        assert_eq!(instant.win_flash_count, normal.win_flash_count);
    }

    #[test]
    fn test_total_spin_is_barrier_not_sum() {
        let timing = SpinTiming::normal();

        // Last column starts at 400ms and runs 3000ms
        assert_eq!(timing.total_spin_duration(5), 3400);
        assert_eq!(timing.total_spin_duration(1), 3000);
        assert_eq!(timing.total_spin_duration(0), 3000);
    }

    #[test]
    fn test_huge_stagger_saturates() {
        let timing = SpinTiming {
            stagger_ms: u64::MAX / 2,
            ..SpinTiming::normal()
        };

        assert_eq!(timing.column_delay(1), u64::MAX / 2);
        assert_eq!(timing.column_delay(4), u64::MAX);
        assert_eq!(timing.total_spin_duration(5), u64::MAX);
    }

    #[test]
    fn test_dwell_by_tier() {
        let timing = SpinTiming::normal();

        assert_eq!(timing.dwell(OutcomeKind::Loss), 0);
        assert!(timing.dwell(OutcomeKind::SmallWin) < timing.dwell(OutcomeKind::BigWin));
    }

    #[test]
    fn test_from_profile() {
        assert_eq!(
            SpinTiming::from_profile(TimingProfile::Turbo),
            SpinTiming::turbo()
        );
        assert_eq!(SpinTiming::from_profile(TimingProfile::Custom).stagger_ms, 100);
    }
}
