//! Chirp-based sound cues
//!
//! Sounds are short frequency sweeps played by the device's tone generator.
//! Playback failures never reach the game: the cue is dropped and logged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::platform::ChirpPlayer;

/// Note frequencies (Hz)
pub mod notes {
    pub const NOTE_C2: u16 = 65;
    pub const NOTE_C3: u16 = 131;
    pub const NOTE_C4: u16 = 262;
    pub const NOTE_C5: u16 = 523;
}

use notes::*;

/// A linear frequency sweep. Zero frequencies are silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub start_freq: u16,
    pub end_freq: u16,
    pub duration_ms: u32,
}

impl Chirp {
    pub const fn new(start_freq: u16, end_freq: u16, duration_ms: u32) -> Self {
        Self {
            start_freq,
            end_freq,
            duration_ms,
        }
    }

    pub const fn silence(duration_ms: u32) -> Self {
        Self::new(0, 0, duration_ms)
    }
}

const HIT: [Chirp; 1] = [Chirp::new(NOTE_C5, NOTE_C5, 50)];

const MISS: [Chirp; 3] = [
    Chirp::new(NOTE_C4, NOTE_C3, 200),
    Chirp::silence(100),
    Chirp::new(NOTE_C3, NOTE_C2, 300),
];

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball bounced off a wall or the paddle
    Hit,
    /// Crash or missed ball
    Miss,
}

impl SoundEffect {
    pub fn chirps(self) -> &'static [Chirp] {
        match self {
            SoundEffect::Hit => &HIT,
            SoundEffect::Miss => &MISS,
        }
    }
}

/// Plays cues on the device tone generator
#[derive(Clone)]
pub struct AudioManager {
    player: Arc<dyn ChirpPlayer>,
    muted: bool,
}

impl AudioManager {
    pub fn new(player: Arc<dyn ChirpPlayer>) -> Self {
        Self {
            player,
            muted: false,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Play a sound effect; returns whether the backend accepted it
    pub fn play(&self, effect: SoundEffect) -> bool {
        if self.muted {
            return false;
        }
        match self.player.play(effect.chirps()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("dropping {:?} cue: {}", effect, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use crate::platform::headless::RecordingAudio;

    struct BrokenPlayer;

    impl ChirpPlayer for BrokenPlayer {
        fn play(&self, _chirps: &[Chirp]) -> Result<(), AudioError> {
            Err(AudioError::Unavailable("no codec".into()))
        }
    }

    #[test]
    fn test_miss_cue_is_descending_with_gap() {
        let chirps = SoundEffect::Miss.chirps();
        assert_eq!(chirps.len(), 3);
        assert!(chirps[0].start_freq > chirps[0].end_freq);
        assert_eq!(chirps[1], Chirp::silence(100));
        assert_eq!(chirps[2].end_freq, NOTE_C2);
    }

    #[test]
    fn test_play_forwards_sequence() {
        let recorder = Arc::new(RecordingAudio::default());
        let audio = AudioManager::new(recorder.clone());
        assert!(audio.play(SoundEffect::Hit));
        assert_eq!(recorder.played(), vec![HIT.to_vec()]);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let recorder = Arc::new(RecordingAudio::default());
        let mut audio = AudioManager::new(recorder.clone());
        audio.set_muted(true);
        assert!(!audio.play(SoundEffect::Miss));
        assert!(recorder.played().is_empty());
    }

    #[test]
    fn test_backend_failure_is_dropped() {
        let audio = AudioManager::new(Arc::new(BrokenPlayer));
        assert!(!audio.play(SoundEffect::Miss));
    }
}
