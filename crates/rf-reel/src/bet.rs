//! Bet stepping — discrete presets or a continuous min/max/step stake

use serde::{Deserialize, Serialize};

use crate::{ReelError, ReelResult};

/// Smallest stake increment a stepped bet may use
pub const MIN_STEP: f64 = 0.01;

/// Round a credit amount to cents
#[inline]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// How the stake is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BetModel {
    /// Fixed preset buttons selected by index
    Presets { values: Vec<f64> },
    /// Continuous stake moved by `step` between `min` and `max`
    Stepped { min: f64, max: f64, step: f64 },
}

impl Default for BetModel {
    fn default() -> Self {
        Self::Presets {
            values: vec![1.0, 5.0, 10.0, 20.0, 30.0],
        }
    }
}

impl BetModel {
    pub fn validate(&self) -> ReelResult<()> {
        match self {
            Self::Presets { values } => {
                if values.is_empty() {
                    return Err(ReelError::InvalidBet("no presets".into()));
                }
                if let Some(v) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
                    return Err(ReelError::InvalidBet(format!("preset {v} is not positive")));
                }
            }
            Self::Stepped { min, max, step } => {
                if !(*min > 0.0 && max >= min && *step >= MIN_STEP) {
                    return Err(ReelError::InvalidBet(format!(
                        "min {min}, max {max}, step {step}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Current stake and its stepping rules
///
/// Every operation is a no-op at the boundary and returns whether the stake
/// changed. Locking while a spin is in flight is the caller's job.
#[derive(Debug, Clone)]
pub struct BetController {
    model: BetModel,
    index: usize,
    value: f64,
}

impl BetController {
    pub fn new(model: BetModel) -> ReelResult<Self> {
        model.validate()?;
        let value = match &model {
            BetModel::Presets { values } => values[0],
            BetModel::Stepped { min, .. } => round_cents(*min),
        };
        Ok(Self {
            model,
            index: 0,
            value,
        })
    }

    /// Current stake
    pub fn bet(&self) -> f64 {
        self.value
    }

    /// Selected preset index (always 0 for stepped stakes)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn model(&self) -> &BetModel {
        &self.model
    }

    /// Pick a preset by index
    pub fn select(&mut self, index: usize) -> bool {
        match &self.model {
            BetModel::Presets { values } => match values.get(index) {
                Some(&value) if index != self.index => {
                    self.index = index;
                    self.value = value;
                    true
                }
                _ => false,
            },
            BetModel::Stepped { .. } => false,
        }
    }

    pub fn increase(&mut self) -> bool {
        match &self.model {
            BetModel::Presets { values } => {
                if self.index + 1 < values.len() {
                    self.index += 1;
                    self.value = values[self.index];
                    true
                } else {
                    false
                }
            }
            BetModel::Stepped { max, step, .. } => {
                let max = round_cents(*max);
                if self.value >= max {
                    return false;
                }
                let next = round_cents(self.value + step).min(max);
                let changed = next != self.value;
                self.value = next;
                changed
            }
        }
    }

    pub fn decrease(&mut self) -> bool {
        match &self.model {
            BetModel::Presets { values } => {
                if self.index > 0 {
                    self.index -= 1;
                    self.value = values[self.index];
                    true
                } else {
                    false
                }
            }
            BetModel::Stepped { min, step, .. } => {
                let min = round_cents(*min);
                if self.value <= min {
                    return false;
                }
                let next = round_cents(self.value - step).max(min);
                let changed = next != self.value;
                self.value = next;
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_clamp() {
        let mut bet = BetController::new(BetModel::default()).unwrap();
        assert_eq!(bet.bet(), 1.0);
        assert!(!bet.decrease());

        for _ in 0..4 {
            assert!(bet.increase());
        }
        assert_eq!(bet.bet(), 30.0);
        assert!(!bet.increase());
        assert_eq!(bet.index(), 4);
    }

    #[test]
    fn test_select_preset() {
        let mut bet = BetController::new(BetModel::default()).unwrap();
        assert!(bet.select(2));
        assert_eq!(bet.bet(), 10.0);
        assert!(!bet.select(2));
        assert!(!bet.select(9));
        assert_eq!(bet.bet(), 10.0);
    }

    #[test]
    fn test_stepped_rounds_to_cents() {
        let mut bet = BetController::new(BetModel::Stepped {
            min: 0.1,
            max: 1.0,
            step: 0.1,
        })
        .unwrap();

        for _ in 0..3 {
            bet.increase();
        }
        assert_eq!(bet.bet(), 0.4);
        assert!(!bet.select(1));
    }

    #[test]
    fn test_sub_cent_step_rejected() {
        let model = BetModel::Stepped {
            min: 1.0,
            max: 2.0,
            step: 0.001,
        };

        assert!(matches!(model.validate(), Err(ReelError::InvalidBet(_))));
        assert!(BetController::new(model).is_err());
    }

    #[test]
    fn test_stepped_clamps_at_bounds() {
        let mut bet = BetController::new(BetModel::Stepped {
            min: 0.5,
            max: 2.0,
            step: 0.75,
        })
        .unwrap();

        assert!(!bet.decrease());
        assert!(bet.increase());
        assert_eq!(bet.bet(), 1.25);
        assert!(bet.increase());
        assert_eq!(bet.bet(), 2.0);
        assert!(!bet.increase());
        assert!(bet.decrease());
        assert_eq!(bet.bet(), 1.25);
        assert!(bet.decrease());
        assert_eq!(bet.bet(), 0.5);
    }

    #[test]
    fn test_invalid_models() {
        assert!(BetController::new(BetModel::Presets { values: vec![] }).is_err());
        assert!(BetController::new(BetModel::Presets { values: vec![1.0, 0.0] }).is_err());
        assert!(
            BetController::new(BetModel::Stepped {
                min: 2.0,
                max: 1.0,
                step: 0.1
            })
            .is_err()
        );
    }
}
