//! Breakpoint resolution — viewport width to reel layout

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ReelError, ReelResult};

/// Named responsive layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakpoint {
    Desktop,
    Mobile,
}

impl Breakpoint {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Symbol cell height rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellSize {
    /// Same height at every width
    Fixed { px: f64 },
    /// `base` up to `reference_width`, growing proportionally beyond it
    Scaled { base: f64, reference_width: f64 },
}

impl CellSize {
    /// Cell height for a viewport width
    pub fn resolve(&self, viewport_width: f64) -> f64 {
        match *self {
            Self::Fixed { px } => px,
            Self::Scaled {
                base,
                reference_width,
            } => {
                if reference_width <= 0.0 {
                    return base;
                }
                base.max(base / reference_width * viewport_width)
            }
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            Self::Fixed { px } => px > 0.0,
            Self::Scaled {
                base,
                reference_width,
            } => base > 0.0 && reference_width > 0.0,
        }
    }
}

/// One threshold in the breakpoint table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointRule {
    pub name: Breakpoint,
    /// Viewport must be strictly wider than this (px)
    pub min_width: f64,
    pub columns: usize,
    pub rows: usize,
    pub cell_size: CellSize,
}

impl BreakpointRule {
    /// 5×3 grid, 180px cells scaled up past 1440px
    pub fn desktop() -> Self {
        Self {
            name: Breakpoint::Desktop,
            min_width: 767.98,
            columns: 5,
            rows: 3,
            cell_size: CellSize::Scaled {
                base: 180.0,
                reference_width: 1440.0,
            },
        }
    }

    /// 3×3 grid, fixed 140px cells
    pub fn mobile() -> Self {
        Self {
            name: Breakpoint::Mobile,
            min_width: 0.0,
            columns: 3,
            rows: 3,
            cell_size: CellSize::Fixed { px: 140.0 },
        }
    }

    /// Layout of this rule at a viewport width
    pub fn config_for(&self, viewport_width: f64) -> BreakpointConfig {
        BreakpointConfig {
            name: self.name,
            columns: self.columns,
            rows: self.rows,
            cell_size: self.cell_size.resolve(viewport_width),
        }
    }
}

/// Resolved layout for the current viewport class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointConfig {
    pub name: Breakpoint,
    pub columns: usize,
    pub rows: usize,
    /// Symbol cell height (px)
    pub cell_size: f64,
}

/// Maps viewport widths to layouts
///
/// Rules are kept widest-first; the first rule whose `min_width` the viewport
/// exceeds wins. A viewport narrower than every rule falls back to the
/// narrowest one.
#[derive(Debug, Clone)]
pub struct BreakpointResolver {
    rules: Vec<BreakpointRule>,
}

impl BreakpointResolver {
    /// Build from an unordered rule list
    pub fn new(mut rules: Vec<BreakpointRule>) -> ReelResult<Self> {
        validate_rules(&rules)?;
        rules.sort_by(|a, b| b.min_width.total_cmp(&a.min_width));
        Ok(Self { rules })
    }

    /// Resolve a viewport width
    pub fn resolve(&self, viewport_width: f64) -> BreakpointConfig {
        match self
            .rules
            .iter()
            .find(|r| viewport_width > r.min_width)
            .or_else(|| self.rules.last())
        {
            Some(rule) => rule.config_for(viewport_width),
            None => BreakpointRule::mobile().config_for(viewport_width),
        }
    }

    /// Resolve, but only report a layout whose name differs from `current`
    ///
    /// Width changes inside the same breakpoint return `None` so callers do
    /// not rebuild strips on every resize event.
    pub fn resolve_change(
        &self,
        current: &BreakpointConfig,
        viewport_width: f64,
    ) -> Option<BreakpointConfig> {
        let next = self.resolve(viewport_width);
        (next.name != current.name).then_some(next)
    }

    /// Rule for a breakpoint name
    pub fn rule(&self, name: Breakpoint) -> Option<&BreakpointRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn rules(&self) -> &[BreakpointRule] {
        &self.rules
    }
}

impl Default for BreakpointResolver {
    fn default() -> Self {
        Self {
            rules: vec![BreakpointRule::desktop(), BreakpointRule::mobile()],
        }
    }
}

pub(crate) fn validate_rules(rules: &[BreakpointRule]) -> ReelResult<()> {
    if rules.is_empty() {
        return Err(ReelError::InvalidBreakpoints("no rules".into()));
    }
    for (i, rule) in rules.iter().enumerate() {
        if rule.columns == 0 || rule.rows == 0 {
            return Err(ReelError::InvalidBreakpoints(format!(
                "{} has an empty grid ({}×{})",
                rule.name, rule.columns, rule.rows
            )));
        }
        if !rule.cell_size.is_valid() {
            return Err(ReelError::InvalidBreakpoints(format!(
                "{} has a non-positive cell size",
                rule.name
            )));
        }
        if !rule.min_width.is_finite() || rule.min_width < 0.0 {
            return Err(ReelError::InvalidBreakpoints(format!(
                "{} has min_width {}",
                rule.name, rule.min_width
            )));
        }
        if rules[..i].iter().any(|r| r.name == rule.name) {
            return Err(ReelError::InvalidBreakpoints(format!(
                "{} declared twice",
                rule.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let resolver = BreakpointResolver::default();

        assert_eq!(resolver.resolve(1280.0).name, Breakpoint::Desktop);
        assert_eq!(resolver.resolve(768.0).name, Breakpoint::Desktop);
        assert_eq!(resolver.resolve(767.0).name, Breakpoint::Mobile);
        assert_eq!(resolver.resolve(767.99).name, Breakpoint::Desktop);
        assert_eq!(resolver.resolve(767.98).name, Breakpoint::Mobile);
        assert_eq!(resolver.resolve(320.0).name, Breakpoint::Mobile);
    }

    #[test]
    fn test_desktop_cell_scaling() {
        let resolver = BreakpointResolver::default();

        assert_eq!(resolver.resolve(900.0).cell_size, 180.0);
        assert_eq!(resolver.resolve(1440.0).cell_size, 180.0);
        assert_eq!(resolver.resolve(2880.0).cell_size, 360.0);
        assert_eq!(resolver.resolve(500.0).cell_size, 140.0);
    }

    #[test]
    fn test_rules_sorted_widest_first() {
        let tablet = BreakpointRule {
            min_width: 1200.0,
            columns: 6,
            ..BreakpointRule::desktop()
        };
        let resolver = BreakpointResolver::new(vec![BreakpointRule::mobile(), tablet]).unwrap();

        assert_eq!(resolver.resolve(1300.0).columns, 6);
        assert_eq!(resolver.resolve(800.0).columns, 3);
    }

    #[test]
    fn test_narrow_viewport_falls_back_to_narrowest_rule() {
        let only_desktop = BreakpointResolver::new(vec![BreakpointRule::desktop()]).unwrap();
        assert_eq!(only_desktop.resolve(200.0).name, Breakpoint::Desktop);
    }

    #[test]
    fn test_resolve_change_ignores_same_class() {
        let resolver = BreakpointResolver::default();
        let current = resolver.resolve(900.0);

        assert!(resolver.resolve_change(&current, 1600.0).is_none());
        let changed = resolver.resolve_change(&current, 500.0).unwrap();
        assert_eq!(changed.name, Breakpoint::Mobile);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        assert!(BreakpointResolver::new(Vec::new()).is_err());

        let empty_grid = BreakpointRule {
            rows: 0,
            ..BreakpointRule::mobile()
        };
        assert!(BreakpointResolver::new(vec![empty_grid]).is_err());

        let duplicate = vec![BreakpointRule::mobile(), BreakpointRule::mobile()];
        assert!(BreakpointResolver::new(duplicate).is_err());
    }
}
