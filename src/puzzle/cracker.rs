//! Cracker lock: Mastermind-style code breaking on a numeric keypad.
//!
//! Each guess reports how many digits are right and in place, and how many
//! are right but misplaced. Running out of attempts shows the code, then a
//! new code is generated; the lock itself never gives up.

use rand::Rng;
use rand::seq::index;
use rand_pcg::Pcg32;

use super::{Lifecycle, PointerEvent, PointerPhase, Puzzle, PuzzleContext, PuzzleEvent, PuzzleOutcome, ms};
use crate::feedback::{Effect, Feedback, SoundCue};
use crate::layout::{KeypadKey, KeypadLayout, Viewport};
use crate::tables::{CrackerParams, PuzzleKind};

/// Feedback for one guess
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessScore {
    /// Right digit, right position
    pub correct: u8,
    /// Right digit, wrong position
    pub misplaced: u8,
}

/// Score a guess against a secret of the same length.
///
/// Exact matches are counted first and consume both slots; each remaining
/// guess digit then consumes at most one unused secret slot of equal value.
pub fn score_guess(secret: &[u8], guess: &[u8]) -> GuessScore {
    debug_assert_eq!(secret.len(), guess.len());
    let len = secret.len().min(guess.len());
    let mut secret_used = vec![false; len];
    let mut guess_used = vec![false; len];
    let mut score = GuessScore::default();

    for i in 0..len {
        if guess[i] == secret[i] {
            score.correct += 1;
            secret_used[i] = true;
            guess_used[i] = true;
        }
    }

    for i in 0..len {
        if guess_used[i] {
            continue;
        }
        if let Some(j) = (0..len).find(|&j| !secret_used[j] && secret[j] == guess[i]) {
            secret_used[j] = true;
            score.misplaced += 1;
        }
    }

    score
}

/// A submitted guess and its score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub digits: Vec<u8>,
    pub score: GuessScore,
}

/// Cracker state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrackerPhase {
    Guessing,
    /// Out of attempts: the secret is on screen until the reset
    Revealing { remaining: f32 },
    Solved,
}

#[derive(Debug)]
pub struct CrackerPuzzle {
    secret: Vec<u8>,
    /// Pre-revealed digits from the decoder
    hints: Vec<Option<u8>>,
    guesses: Vec<GuessRecord>,
    input: Vec<u8>,
    max_attempts: usize,
    /// Hint count after capping to leave one digit hidden
    reveal_count: usize,
    phase: CrackerPhase,
    reset_delay: f32,
    layout: KeypadLayout,
    life: Lifecycle,
    rng: Pcg32,
    feedback: Feedback,
}

impl CrackerPuzzle {
    pub fn new(params: CrackerParams, ctx: &PuzzleContext, rng: Pcg32) -> Self {
        let digit_count = usize::from(params.digit_count.max(1));
        let reveal_count = usize::from(ctx.bonuses.revealed_digit_count).min(digit_count - 1);

        let mut puzzle = Self {
            secret: Vec::new(),
            hints: Vec::new(),
            guesses: Vec::new(),
            input: Vec::with_capacity(digit_count),
            max_attempts: usize::from(params.max_attempts.max(1)),
            reveal_count,
            phase: CrackerPhase::Guessing,
            reset_delay: ms(ctx.settings.cracker_reset_delay_ms),
            layout: KeypadLayout::new(ctx.viewport),
            life: Lifecycle::new(),
            rng,
            feedback: ctx.feedback.clone(),
        };
        puzzle.generate_code(digit_count);
        puzzle
    }

    /// New secret (duplicates allowed) and fresh hints
    fn generate_code(&mut self, digit_count: usize) {
        let rng = &mut self.rng;
        self.secret = (0..digit_count).map(|_| rng.random_range(0..=9u8)).collect();

        self.hints = vec![None; digit_count];
        for i in index::sample(rng, digit_count, self.reveal_count) {
            self.hints[i] = Some(self.secret[i]);
        }
    }

    pub fn digit_count(&self) -> usize {
        self.secret.len()
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn attempts_used(&self) -> usize {
        self.guesses.len()
    }

    pub fn phase(&self) -> CrackerPhase {
        self.phase
    }

    pub fn hints(&self) -> &[Option<u8>] {
        &self.hints
    }

    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    /// Digits typed so far for the next guess
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// The secret, only while it is being shown after a failed round
    pub fn revealed_secret(&self) -> Option<&[u8]> {
        match self.phase {
            CrackerPhase::Revealing { .. } => Some(&self.secret),
            _ => None,
        }
    }

    pub fn layout(&self) -> &KeypadLayout {
        &self.layout
    }

    fn accepts_input(&self) -> bool {
        self.life.active && self.phase == CrackerPhase::Guessing
    }

    pub fn press_digit(&mut self, digit: u8) -> Vec<PuzzleEvent> {
        if !self.accepts_input() || digit > 9 || self.input.len() >= self.digit_count() {
            return Vec::new();
        }
        self.input.push(digit);
        self.feedback.play(SoundCue::PickMove);
        vec![PuzzleEvent::DigitEntered { digit }]
    }

    pub fn delete(&mut self) -> Vec<PuzzleEvent> {
        if !self.accepts_input() || self.input.pop().is_none() {
            return Vec::new();
        }
        vec![PuzzleEvent::DigitDeleted]
    }

    /// Submit the typed digits. Incomplete input is ignored.
    pub fn submit(&mut self) -> Vec<PuzzleEvent> {
        if !self.accepts_input() || self.input.len() != self.digit_count() {
            return Vec::new();
        }
        let digits = std::mem::take(&mut self.input);
        self.guess(digits)
    }

    fn guess(&mut self, digits: Vec<u8>) -> Vec<PuzzleEvent> {
        let score = score_guess(&self.secret, &digits);
        self.guesses.push(GuessRecord { digits, score });
        let mut events = vec![PuzzleEvent::GuessScored(score)];

        if usize::from(score.correct) == self.digit_count() {
            self.phase = CrackerPhase::Solved;
            self.life.solve();
            self.feedback.success(self.layout.submit.center());
            events.push(PuzzleEvent::Solved);
        } else if self.guesses.len() >= self.max_attempts {
            log::debug!("Cracker out of attempts after {} guesses", self.guesses.len());
            self.phase = CrackerPhase::Revealing { remaining: self.reset_delay };
            self.feedback.miss(10.0, 300);
            events.push(PuzzleEvent::AttemptsExhausted { secret: self.secret.clone() });
        } else {
            self.feedback.play(SoundCue::Click);
        }
        events
    }

    fn reset_round(&mut self) -> Vec<PuzzleEvent> {
        self.guesses.clear();
        self.input.clear();
        self.generate_code(self.digit_count());
        self.phase = CrackerPhase::Guessing;
        self.feedback.emit(Effect::Flash { success: false });
        vec![PuzzleEvent::CodeReset]
    }

    pub fn press(&mut self, key: KeypadKey) -> Vec<PuzzleEvent> {
        match key {
            KeypadKey::Digit(d) => self.press_digit(d),
            KeypadKey::Submit => self.submit(),
            KeypadKey::Delete => self.delete(),
        }
    }
}

impl Puzzle for CrackerPuzzle {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Cracker
    }

    fn tick(&mut self, dt: f32) -> Vec<PuzzleEvent> {
        if !self.life.active {
            return Vec::new();
        }
        match self.phase {
            CrackerPhase::Revealing { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.reset_round()
                } else {
                    self.phase = CrackerPhase::Revealing { remaining };
                    Vec::new()
                }
            }
            CrackerPhase::Guessing | CrackerPhase::Solved => Vec::new(),
        }
    }

    fn pointer(&mut self, event: PointerEvent) -> Vec<PuzzleEvent> {
        if event.phase != PointerPhase::Down {
            return Vec::new();
        }
        match self.layout.key_at(event.pos) {
            Some(key) => self.press(key),
            None => Vec::new(),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.layout = KeypadLayout::new(viewport);
    }

    fn outcome(&self) -> PuzzleOutcome {
        self.life.outcome
    }

    fn stop(&mut self) {
        self.life.stop();
    }

    fn abort(&mut self) {
        self.life.abort();
    }

    fn is_active(&self) -> bool {
        self.life.active
    }
}
