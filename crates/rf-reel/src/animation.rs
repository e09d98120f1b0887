//! Per-column scroll animation state

use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// Scroll animation handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnimation {
    pub column: usize,
    pub from_offset: f64,
    pub to_offset: f64,
    pub duration_ms: u64,
    pub easing: Easing,
}

/// Scroll state of one column
///
/// Owned by the session; the renderer is told offsets and never queried
/// for them.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    offset: f64,
    target: f64,
    from: f64,
    in_transit: bool,
    started_at_ms: u64,
    duration_ms: u64,
    easing: Easing,
}

impl AnimationState {
    /// A column resting at `offset`
    pub fn at_rest(offset: f64) -> Self {
        Self {
            offset,
            target: offset,
            from: offset,
            in_transit: false,
            started_at_ms: 0,
            duration_ms: 0,
            easing: Easing::default(),
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn in_transit(&self) -> bool {
        self.in_transit
    }

    /// Start a transit toward `animation.to_offset` at `now_ms`
    pub fn begin(&mut self, animation: &ColumnAnimation, now_ms: u64) {
        self.from = animation.from_offset;
        self.offset = animation.from_offset;
        self.target = animation.to_offset;
        self.started_at_ms = now_ms;
        self.duration_ms = animation.duration_ms;
        self.easing = animation.easing;
        self.in_transit = true;
    }

    /// Update the live offset for `now_ms`
    pub fn sample(&mut self, now_ms: u64) -> f64 {
        if !self.in_transit {
            return self.offset;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        let progress = if self.duration_ms == 0 {
            1.0
        } else {
            elapsed as f64 / self.duration_ms as f64
        };
        self.offset = self.from + (self.target - self.from) * self.easing.apply(progress);
        self.offset
    }

    /// Finish the transit exactly on the target
    pub fn settle(&mut self) {
        self.offset = self.target;
        self.from = self.target;
        self.in_transit = false;
    }

    /// Drop any transit and rest at `offset`
    pub fn reset(&mut self, offset: f64) {
        *self = Self::at_rest(offset);
    }
}
