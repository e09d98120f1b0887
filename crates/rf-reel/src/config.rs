//! Game configuration — one value carrying every tunable of a session

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bet::BetModel;
use crate::breakpoint::{BreakpointResolver, BreakpointRule, validate_rules};
use crate::easing::Easing;
use crate::outcome::ScriptBook;
use crate::paylines::PaylineSettings;
use crate::render::WinPresentation;
use crate::strip::StripSettings;
use crate::timing::SpinTiming;
use crate::{ReelError, ReelResult};

/// On-disk config encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ReelError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Complete game configuration
///
/// `GameConfig::default()` is the stock two-breakpoint game: desktop 5×3 and
/// mobile 3×3, a loss / small win / big win script for each, preset bets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Breakpoint thresholds, any order
    pub breakpoints: Vec<BreakpointRule>,

    /// Outcome script per breakpoint
    pub scripts: ScriptBook,

    pub bet: BetModel,

    pub presentation: WinPresentation,

    pub timing: SpinTiming,

    pub strip: StripSettings,

    pub starting_balance: f64,

    pub paylines: PaylineSettings,

    /// Start every spin from offset 0 instead of the resting offset
    pub rewind_on_spin: bool,

    /// Scroll easing
    pub easing: Easing,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            breakpoints: vec![BreakpointRule::desktop(), BreakpointRule::mobile()],
            scripts: ScriptBook::default(),
            bet: BetModel::default(),
            presentation: WinPresentation::default(),
            timing: SpinTiming::default(),
            strip: StripSettings::default(),
            starting_balance: 1000.0,
            paylines: PaylineSettings::default(),
            rewind_on_spin: false,
            easing: Easing::default(),
        }
    }
}

impl GameConfig {
    /// Maximum accepted config file size (4MB)
    const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

    // ---- Validation ----

    /// Check every construction-time invariant
    ///
    /// Each breakpoint needs a script whose grids match its column and row
    /// counts and stay inside the symbol alphabet.
    pub fn validate(&self) -> ReelResult<()> {
        validate_rules(&self.breakpoints)?;
        self.bet.validate()?;
        self.strip.validate()?;
        self.paylines.validate()?;

        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(ReelError::InvalidConfig(format!(
                "starting balance {}",
                self.starting_balance
            )));
        }

        for rule in &self.breakpoints {
            let layout = rule.config_for(rule.min_width);
            self.scripts
                .require(rule.name)?
                .validate(&layout, self.strip.alphabet_size)?;
        }
        Ok(())
    }

    /// Resolver over this config's breakpoint rules
    pub fn resolver(&self) -> ReelResult<BreakpointResolver> {
        BreakpointResolver::new(self.breakpoints.clone())
    }

    // ---- Text formats ----

    pub fn from_json(json: &str) -> ReelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_yaml(yaml: &str) -> ReelResult<Self> {
        Ok(serde_yml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> ReelResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    // ---- Save/Load ----

    /// Load and validate a config file (format by extension)
    pub fn load(path: &Path) -> ReelResult<Self> {
        let format = ConfigFormat::from_path(path)?;

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > Self::MAX_FILE_SIZE {
            return Err(ReelError::InvalidConfig(format!(
                "config file too large: {} bytes",
                metadata.len()
            )));
        }

        let text = std::fs::read_to_string(path)?;
        let config = match format {
            ConfigFormat::Json => Self::from_json(&text)?,
            ConfigFormat::Yaml => Self::from_yaml(&text)?,
        };
        config.validate()?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config (format by extension)
    pub fn save(&self, path: &Path) -> ReelResult<()> {
        let text = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => self.to_json()?,
            ConfigFormat::Yaml => self.to_yaml()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::Breakpoint;
    use crate::outcome::{OutcomeScript, ScriptBook};

    #[test]
    fn test_default_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_missing_script_rejected() {
        let config = GameConfig {
            scripts: ScriptBook::new(vec![OutcomeScript::desktop_default()]),
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReelError::MissingScript(Breakpoint::Mobile))
        ));
    }

    #[test]
    fn test_script_grid_mismatch_rejected() {
        // Desktop outcomes on a mobile-sized grid
        let mut mobile = OutcomeScript::desktop_default();
        mobile.breakpoint = Breakpoint::Mobile;
        let config = GameConfig {
            scripts: ScriptBook::new(vec![OutcomeScript::desktop_default(), mobile]),
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReelError::ScriptShape {
                breakpoint: Breakpoint::Mobile,
                index: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_symbol_outside_alphabet_rejected() {
        let config = GameConfig {
            strip: StripSettings {
                alphabet_size: 6,
                ..StripSettings::default()
            },
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_balance_rejected() {
        let config = GameConfig {
            starting_balance: -1.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReelError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(
            r#"{ "starting_balance": 250.0, "presentation": "line",
                 "bet": { "type": "stepped", "min": 0.1, "max": 5.0, "step": 0.1 } }"#,
        )
        .unwrap();

        assert_eq!(config.starting_balance, 250.0);
        assert_eq!(config.presentation, WinPresentation::Line);
        assert_eq!(config.timing, SpinTiming::normal());
        assert_eq!(config.breakpoints.len(), 2);
        config.validate().unwrap();
    }

    #[test]
    fn test_yaml_round_trip_keeps_scripts() {
        let yaml = GameConfig::default().to_yaml().unwrap();
        let parsed = GameConfig::from_yaml(&yaml).unwrap();

        assert_eq!(
            parsed.scripts.require(Breakpoint::Desktop).unwrap().outcomes,
            OutcomeScript::desktop_default().outcomes
        );
        parsed.validate().unwrap();
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("game.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("GAME.JSON")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("game.toml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("game")).is_err());
    }
}
