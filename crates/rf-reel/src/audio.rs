//! Audio collaborator — fire-and-forget clips behind a mute gate

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clips the session triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioClip {
    /// Started when the stake is debited
    Spin,
    /// Started when a win is presented
    Win,
}

impl AudioClip {
    pub const ALL: [AudioClip; 2] = [AudioClip::Spin, AudioClip::Win];
}

#[derive(Debug, Error)]
pub enum AudioError {
    /// The host refused playback (autoplay policy, no device)
    #[error("Playback rejected: {0}")]
    Rejected(String),

    #[error("Clip not loaded: {0:?}")]
    NotLoaded(AudioClip),
}

/// Host audio backend
pub trait AudioPlayer: Send {
    fn play(&mut self, clip: AudioClip) -> Result<(), AudioError>;

    fn stop(&mut self, clip: AudioClip);
}

/// Backend that plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioPlayer for NullAudio {
    fn play(&mut self, _clip: AudioClip) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop(&mut self, _clip: AudioClip) {}
}

/// Mute flag in front of an [`AudioPlayer`]
///
/// Playback failures are logged and swallowed; they never hold up the game.
pub struct AudioGate {
    player: Box<dyn AudioPlayer>,
    muted: bool,
}

impl AudioGate {
    pub fn new(player: Box<dyn AudioPlayer>) -> Self {
        Self {
            player,
            muted: false,
        }
    }

    pub fn play(&mut self, clip: AudioClip) {
        if self.muted {
            return;
        }
        if let Err(e) = self.player.play(clip) {
            log::warn!("Audio {clip:?} failed: {e}");
        }
    }

    pub fn stop(&mut self, clip: AudioClip) {
        self.player.stop(clip);
    }

    pub fn stop_all(&mut self) {
        for clip in AudioClip::ALL {
            self.player.stop(clip);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        if muted && !self.muted {
            self.stop_all();
        }
        self.muted = muted;
    }

    /// Flip the mute flag, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }
}

impl Default for AudioGate {
    fn default() -> Self {
        Self::new(Box::new(NullAudio))
    }
}

impl std::fmt::Debug for AudioGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGate")
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

/// Audio event seen by [`RecordingAudio`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    Play(AudioClip),
    Stop(AudioClip),
}

/// Backend that records calls, optionally rejecting every `play`
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    events: Arc<Mutex<Vec<AudioEvent>>>,
    reject: bool,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `play` always fails, like a blocked autoplay
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<AudioEvent> {
        self.events.lock().clone()
    }

    pub fn plays(&self, clip: AudioClip) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| **e == AudioEvent::Play(clip))
            .count()
    }
}

impl AudioPlayer for RecordingAudio {
    fn play(&mut self, clip: AudioClip) -> Result<(), AudioError> {
        self.events.lock().push(AudioEvent::Play(clip));
        if self.reject {
            return Err(AudioError::Rejected("autoplay blocked".into()));
        }
        Ok(())
    }

    fn stop(&mut self, clip: AudioClip) {
        self.events.lock().push(AudioEvent::Stop(clip));
    }
}
