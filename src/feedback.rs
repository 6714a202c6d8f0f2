//! Sound, haptic and visual-effect capabilities
//!
//! The core never talks to audio or particle systems directly. The
//! presentation layer implements these traits and hands a `Feedback` bundle
//! to the heist, which passes it on to every puzzle it builds.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::Vec2;

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Pin set, pair matched, code cracked
    LockOpen,
    /// Missed zone, mismatch, wrong node, failed code
    LockFail,
    /// Tile flipped, node traced, digit entered
    PickMove,
    /// Guess scored without solving
    Click,
    /// A whole layer was cleared
    LayerComplete,
}

/// Haptic patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPattern {
    Light,
    Success,
    Error,
    /// Countdown ran out
    Alarm,
}

/// Visual effects, positioned in the puzzle's canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Sparkle { at: Vec2, count: u32 },
    Shake { intensity: f32, duration_ms: u32 },
    Pulse { scale: f32 },
    Flash { success: bool },
    Celebrate,
}

pub trait SoundPlayer {
    fn play(&self, cue: SoundCue);
}

pub trait HapticFeedback {
    fn vibrate(&self, pattern: HapticPattern);
}

pub trait EffectsSink {
    fn emit(&self, effect: Effect);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundPlayer for Silent {
    fn play(&self, _cue: SoundCue) {}
}

impl HapticFeedback for Silent {
    fn vibrate(&self, _pattern: HapticPattern) {}
}

impl EffectsSink for Silent {
    fn emit(&self, _effect: Effect) {}
}

/// The capability bundle handed to puzzles and heists
#[derive(Clone)]
pub struct Feedback {
    sound: Rc<dyn SoundPlayer>,
    haptics: Rc<dyn HapticFeedback>,
    effects: Rc<dyn EffectsSink>,
}

impl fmt::Debug for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feedback").finish_non_exhaustive()
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self::silent()
    }
}

impl Feedback {
    pub fn new(
        sound: Rc<dyn SoundPlayer>,
        haptics: Rc<dyn HapticFeedback>,
        effects: Rc<dyn EffectsSink>,
    ) -> Self {
        Self { sound, haptics, effects }
    }

    pub fn silent() -> Self {
        let silent = Rc::new(Silent);
        Self::new(silent.clone(), silent.clone(), silent)
    }

    pub fn play(&self, cue: SoundCue) {
        self.sound.play(cue);
    }

    pub fn vibrate(&self, pattern: HapticPattern) {
        self.haptics.vibrate(pattern);
    }

    pub fn emit(&self, effect: Effect) {
        self.effects.emit(effect);
    }

    /// Standard success feedback for a cleared sub-target
    pub(crate) fn success(&self, at: Vec2) {
        self.play(SoundCue::LockOpen);
        self.vibrate(HapticPattern::Success);
        self.emit(Effect::Sparkle { at, count: 8 });
    }

    /// Standard soft-miss feedback
    pub(crate) fn miss(&self, intensity: f32, duration_ms: u32) {
        self.play(SoundCue::LockFail);
        self.vibrate(HapticPattern::Error);
        self.emit(Effect::Shake { intensity, duration_ms });
    }
}

/// Everything a `Recorder` saw, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Sound(SoundCue),
    Haptic(HapticPattern),
    Effect(Effect),
}

/// Records every call, for tests and headless runs
#[derive(Debug, Default)]
pub struct Recorder {
    log: RefCell<Vec<Recorded>>,
}

impl Recorder {
    /// A recorder plus a `Feedback` bundle routed into it
    pub fn feedback() -> (Rc<Recorder>, Feedback) {
        let recorder = Rc::new(Recorder::default());
        let feedback = Feedback::new(recorder.clone(), recorder.clone(), recorder.clone());
        (recorder, feedback)
    }

    pub fn entries(&self) -> Vec<Recorded> {
        self.log.borrow().clone()
    }

    pub fn sounds(&self) -> Vec<SoundCue> {
        self.log
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Recorded::Sound(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    pub fn count_sound(&self, cue: SoundCue) -> usize {
        self.sounds().iter().filter(|c| **c == cue).count()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl SoundPlayer for Recorder {
    fn play(&self, cue: SoundCue) {
        self.log.borrow_mut().push(Recorded::Sound(cue));
    }
}

impl HapticFeedback for Recorder {
    fn vibrate(&self, pattern: HapticPattern) {
        self.log.borrow_mut().push(Recorded::Haptic(pattern));
    }
}

impl EffectsSink for Recorder {
    fn emit(&self, effect: Effect) {
        self.log.borrow_mut().push(Recorded::Effect(effect));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_sees_all_channels() {
        let (recorder, feedback) = Recorder::feedback();
        feedback.success(Vec2::new(10.0, 20.0));
        feedback.miss(8.0, 200);
        assert_eq!(
            recorder.sounds(),
            vec![SoundCue::LockOpen, SoundCue::LockFail]
        );
        assert_eq!(recorder.entries().len(), 6);
        assert!(recorder.entries().contains(&Recorded::Effect(Effect::Shake {
            intensity: 8.0,
            duration_ms: 200
        })));
    }

    #[test]
    fn test_silent_feedback_is_inert() {
        let feedback = Feedback::default();
        feedback.play(SoundCue::Click);
        feedback.emit(Effect::Celebrate);
    }
}
