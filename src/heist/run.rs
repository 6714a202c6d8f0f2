//! A single heist attempt
//!
//! `HeistRun::tick` is the only scheduler: it advances the live puzzle first,
//! then the countdown. A layer solved in the same frame the countdown would
//! run out therefore counts as solved.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Countdown, HeistEvent, HeistPhase};
use crate::error::{ConfigError, HeistError};
use crate::feedback::{Effect, Feedback, HapticPattern, SoundCue};
use crate::layout::Viewport;
use crate::mission::Mission;
use crate::puzzle::{PointerEvent, PuzzleContext, PuzzleEvent, PuzzleInstance, PuzzleOutcome};
use crate::settings::HeistSettings;
use crate::tables::{DifficultyTable, PlayerTools, ToolBonusSet, compute_bonuses};

#[derive(Debug)]
pub struct HeistRun {
    mission: Mission,
    table: DifficultyTable,
    /// Bonuses, settings, viewport and feedback handed to every layer
    ctx: PuzzleContext,
    countdown: Countdown,
    current_layer: usize,
    puzzle: Option<PuzzleInstance>,
    phase: HeistPhase,
    /// Seeds one RNG per layer
    rng: Pcg32,
}

impl HeistRun {
    /// Prepare a heist. Tool bonuses are computed once, here.
    ///
    /// The mission, table and settings are validated first; a layer that
    /// could never be solved is rejected instead of timing out later.
    pub fn new(
        mission: Mission,
        tools: &PlayerTools,
        table: &DifficultyTable,
        settings: &HeistSettings,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        mission.validate()?;
        table.validate()?;
        settings.validate()?;
        let bonuses = compute_bonuses(tools);
        let countdown = Countdown::new(settings.total_seconds(mission.puzzle_layers.len())?);

        Ok(Self {
            ctx: PuzzleContext {
                bonuses,
                settings: settings.clone(),
                viewport: Viewport::default(),
                feedback: Feedback::silent(),
            },
            mission,
            table: table.clone(),
            countdown,
            current_layer: 0,
            puzzle: None,
            phase: HeistPhase::Idle,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.ctx.feedback = feedback;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.ctx.viewport = viewport;
        self
    }

    /// Start the first layer
    pub fn begin(&mut self) -> Result<Vec<HeistEvent>, HeistError> {
        match self.phase {
            HeistPhase::Idle => {
                log::info!(
                    "Heist started: {} ({} layers, {}s)",
                    self.mission.id,
                    self.total_layers(),
                    self.countdown.total()
                );
                Ok(self.start_layer())
            }
            HeistPhase::LayerRunning => Ok(Vec::new()),
            HeistPhase::Success | HeistPhase::Failure => Err(HeistError::Finished),
        }
    }

    // === Accessors ===

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn phase(&self) -> HeistPhase {
        self.phase
    }

    pub fn bonuses(&self) -> ToolBonusSet {
        self.ctx.bonuses
    }

    /// Index of the layer being played (equals `total_layers` once cleared)
    pub fn current_layer(&self) -> usize {
        self.current_layer
    }

    pub fn total_layers(&self) -> usize {
        self.mission.puzzle_layers.len()
    }

    pub fn layers_completed(&self) -> usize {
        self.current_layer
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn total_seconds(&self) -> u32 {
        self.countdown.total()
    }

    /// The live puzzle, or the aborted one after the countdown ran out
    pub fn active_puzzle(&self) -> Option<&PuzzleInstance> {
        self.puzzle.as_ref()
    }

    /// Direct access for engine-specific input; a solve made this way is
    /// picked up on the next `tick`
    pub fn active_puzzle_mut(&mut self) -> Option<&mut PuzzleInstance> {
        self.puzzle.as_mut()
    }

    // === Driving ===

    /// Advance the live puzzle, then the countdown
    pub fn tick(&mut self, dt: f32) -> Vec<HeistEvent> {
        if self.phase != HeistPhase::LayerRunning {
            return Vec::new();
        }
        let layer = self.current_layer;
        let mut events = match self.puzzle.as_mut() {
            Some(puzzle) => wrap(layer, puzzle.tick(dt)),
            None => Vec::new(),
        };

        if self.layer_solved() {
            events.extend(self.complete_layer(false));
            if self.phase.is_terminal() {
                return events;
            }
        }

        events.extend(
            self.countdown
                .advance(dt)
                .into_iter()
                .map(|remaining| HeistEvent::TimerTick { remaining }),
        );
        if self.countdown.is_expired() {
            events.extend(self.expire());
        }
        events
    }

    /// Route pointer input to the live puzzle
    pub fn pointer(&mut self, event: PointerEvent) -> Vec<HeistEvent> {
        if self.phase != HeistPhase::LayerRunning {
            return Vec::new();
        }
        let layer = self.current_layer;
        let mut events = match self.puzzle.as_mut() {
            Some(puzzle) => wrap(layer, puzzle.pointer(event)),
            None => Vec::new(),
        };
        if self.layer_solved() {
            events.extend(self.complete_layer(false));
        }
        events
    }

    /// Clear the live layer without solving it. The caller pays for this
    /// (one dynamite charge) before calling. A layer that is already solved
    /// completes as a normal solve.
    pub fn skip_layer(&mut self) -> Result<Vec<HeistEvent>, HeistError> {
        if self.phase.is_terminal() {
            return Err(HeistError::Finished);
        }
        if self.phase != HeistPhase::LayerRunning || self.puzzle.is_none() {
            return Err(HeistError::NoActiveLayer);
        }
        if self.layer_solved() {
            // Solved directly on the engine since the last tick
            return Ok(self.complete_layer(false));
        }
        log::info!("Layer {} skipped", self.current_layer + 1);
        Ok(self.complete_layer(true))
    }

    /// End the countdown now, failing the heist
    pub fn force_expire(&mut self) -> Vec<HeistEvent> {
        if self.phase != HeistPhase::LayerRunning {
            return Vec::new();
        }
        self.countdown.set_remaining(0);
        self.expire()
    }

    /// Overwrite the remaining time (clamped to the total)
    pub fn set_remaining(&mut self, seconds: u32) {
        self.countdown.set_remaining(seconds);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.ctx.viewport = viewport;
        if let Some(puzzle) = self.puzzle.as_mut() {
            puzzle.resize(viewport);
        }
    }

    // === Transitions ===

    fn layer_solved(&self) -> bool {
        self.puzzle
            .as_ref()
            .is_some_and(|p| p.outcome() == PuzzleOutcome::Solved)
    }

    fn start_layer(&mut self) -> Vec<HeistEvent> {
        let index = self.current_layer;
        let Some(spec) = self.mission.puzzle_layers.get(index).copied() else {
            return Vec::new();
        };
        let params = self.table.params_for(spec.kind, spec.difficulty);
        let rng = Pcg32::seed_from_u64(self.rng.random());

        self.puzzle = Some(PuzzleInstance::new(params, &self.ctx, rng));
        self.phase = HeistPhase::LayerRunning;

        log::info!(
            "Layer {}/{}: {} (level {})",
            index + 1,
            self.total_layers(),
            spec.kind.display_name(),
            spec.difficulty.get()
        );
        vec![HeistEvent::LayerStarted { index, kind: spec.kind }]
    }

    fn complete_layer(&mut self, skipped: bool) -> Vec<HeistEvent> {
        let index = self.current_layer;
        // The old instance never sees another event
        if let Some(mut puzzle) = self.puzzle.take() {
            puzzle.stop();
        }

        let feedback = &self.ctx.feedback;
        feedback.play(SoundCue::LayerComplete);
        feedback.emit(Effect::Sparkle { at: self.ctx.viewport.center(), count: 14 });
        feedback.emit(Effect::Flash { success: true });

        self.countdown.add_bonus(self.ctx.settings.solve_bonus_seconds);
        self.current_layer += 1;

        let mut events = vec![HeistEvent::LayerSolved { index, skipped }];
        if self.current_layer >= self.total_layers() {
            self.phase = HeistPhase::Success;
            self.ctx.feedback.emit(Effect::Celebrate);
            log::info!(
                "Heist complete: {} with {}s left",
                self.mission.id,
                self.countdown.remaining()
            );
            events.push(HeistEvent::MissionComplete { mission: self.mission.id.clone() });
        } else {
            events.extend(self.start_layer());
        }
        events
    }

    fn expire(&mut self) -> Vec<HeistEvent> {
        let index = self.current_layer;
        if let Some(puzzle) = self.puzzle.as_mut() {
            puzzle.abort();
        }
        self.phase = HeistPhase::Failure;

        let feedback = &self.ctx.feedback;
        feedback.play(SoundCue::LockFail);
        feedback.vibrate(HapticPattern::Alarm);
        feedback.emit(Effect::Flash { success: false });

        log::warn!(
            "Heist failed: {} timed out on layer {}/{}",
            self.mission.id,
            index + 1,
            self.total_layers()
        );
        vec![
            HeistEvent::LayerFailed { index },
            HeistEvent::MissionFailed {
                mission: self.mission.id.clone(),
                layers_completed: index,
                total_layers: self.total_layers(),
            },
        ]
    }
}

fn wrap(layer: usize, events: Vec<PuzzleEvent>) -> Vec<HeistEvent> {
    events
        .into_iter()
        .map(|event| HeistEvent::Puzzle { layer, event })
        .collect()
}
