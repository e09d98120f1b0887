//! # rf-reel — Scripted Reel Engine
//!
//! Presentation engine for reel games whose outcomes are authored in advance.
//! Every spin lands on the next entry of a fixed outcome script; the engine's
//! job is to lay the strips out so a continuous scroll can stop exactly on
//! that entry, and to sequence the spin, win presentation and unlock without
//! overlapping spins.
//!
//! ## Architecture
//!
//! ```text
//! BreakpointResolver (viewport width → layout)
//!     │
//!     ├── ScriptBook (outcomes per breakpoint)
//!     │       │
//!     │       v
//!     ├── StripBuilder (random filler + outcome tail per column)
//!     │
//!     v
//! GameSession (Idle → Debiting → Spinning → Presenting → Idle | Exhausted)
//!     ├── locate()          aligns each column on the scripted slice
//!     ├── visible_index()   maps a settled offset back to strip cells
//!     ├── Scheduler         stagger / settle / dwell / overlay timers
//!     └── ReelRenderer, AudioPlayer, Celebration (host collaborators)
//! ```
//!
//! The session runs on a virtual clock: the host calls
//! [`GameSession::advance`] from its frame loop and every timer fires in
//! deterministic order.

pub mod animation;
pub mod audio;
pub mod bet;
pub mod breakpoint;
pub mod celebration;
pub mod config;
pub mod easing;
pub mod locator;
pub mod outcome;
pub mod paylines;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod strip;
pub mod timing;
pub mod window;

pub use animation::*;
pub use audio::*;
pub use bet::*;
pub use breakpoint::*;
pub use celebration::*;
pub use config::*;
pub use easing::*;
pub use locator::*;
pub use outcome::*;
pub use paylines::*;
pub use render::*;
pub use scheduler::*;
pub use session::*;
pub use strip::*;
pub use timing::*;
pub use window::*;

use thiserror::Error;

/// Reel engine error types
///
/// Only construction and configuration loading fail. A running session never
/// returns these; it logs and degrades instead.
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("No outcome script for breakpoint {0}")]
    MissingScript(Breakpoint),

    #[error("Outcome {index} of {breakpoint} script: {reason}")]
    ScriptShape {
        breakpoint: Breakpoint,
        index: usize,
        reason: String,
    },

    #[error("Invalid breakpoint rules: {0}")]
    InvalidBreakpoints(String),

    #[error("Invalid bet model: {0}")]
    InvalidBet(String),

    #[error("Invalid strip settings: {0}")]
    InvalidStrip(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type ReelResult<T> = Result<T, ReelError>;

/// Identifier of one reel icon, `1..=alphabet_size`
pub type SymbolId = u32;
