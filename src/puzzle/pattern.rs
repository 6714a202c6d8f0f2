//! Pattern lock: a path across a 3x3 node grid is shown one node at a time,
//! then hidden. Tap the nodes in the same order.

use rand::seq::index;
use rand_pcg::Pcg32;

use super::{Lifecycle, PointerEvent, PointerPhase, Puzzle, PuzzleContext, PuzzleEvent, PuzzleOutcome, ms};
use crate::consts::PATTERN_NODE_COUNT;
use crate::feedback::{Feedback, SoundCue};
use crate::layout::{NodeGridLayout, Viewport};
use crate::tables::{PatternParams, PuzzleKind};

/// Pattern state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternPhase {
    /// The first `revealed` path nodes are lit
    Showing { revealed: usize, until_next: f32 },
    /// Whole path lit for the memorization window
    Holding { remaining: f32 },
    Input,
    Complete,
}

#[derive(Debug)]
pub struct PatternPuzzle {
    /// Distinct node indices (row * 3 + col)
    path: Vec<usize>,
    traced: Vec<usize>,
    phase: PatternPhase,
    step_interval: f32,
    show_time: f32,
    layout: NodeGridLayout,
    life: Lifecycle,
    feedback: Feedback,
}

impl PatternPuzzle {
    pub fn new(params: PatternParams, ctx: &PuzzleContext, mut rng: Pcg32) -> Self {
        let length = usize::from(params.node_count).min(PATTERN_NODE_COUNT);
        let path = index::sample(&mut rng, PATTERN_NODE_COUNT, length).into_vec();
        let step_interval = ms(ctx.settings.pattern_step_interval_ms);

        Self {
            path,
            traced: Vec::new(),
            phase: PatternPhase::Showing { revealed: 0, until_next: step_interval },
            step_interval,
            show_time: ms(params.show_time_ms.saturating_add(ctx.bonuses.extra_show_time_ms)),
            layout: NodeGridLayout::new(ctx.viewport),
            life: Lifecycle::new(),
            feedback: ctx.feedback.clone(),
        }
    }

    pub fn phase(&self) -> PatternPhase {
        self.phase
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// The part of the path currently lit for memorization
    pub fn visible_path(&self) -> &[usize] {
        match self.phase {
            PatternPhase::Showing { revealed, .. } => &self.path[..revealed],
            PatternPhase::Holding { .. } => &self.path,
            PatternPhase::Input | PatternPhase::Complete => &[],
        }
    }

    /// Nodes the player has traced so far
    pub fn traced(&self) -> &[usize] {
        &self.traced
    }

    pub fn layout(&self) -> &NodeGridLayout {
        &self.layout
    }

    /// Tap a node during input. The expected next node extends the trace,
    /// any other untraced node clears it.
    pub fn tap_node(&mut self, node: usize) -> Vec<PuzzleEvent> {
        if !self.life.active || self.phase != PatternPhase::Input || node >= PATTERN_NODE_COUNT {
            return Vec::new();
        }
        // Re-tapping a lit node is not a mistake
        if self.traced.contains(&node) {
            return Vec::new();
        }

        if self.path.get(self.traced.len()) == Some(&node) {
            self.traced.push(node);
            self.feedback.play(SoundCue::PickMove);
            let mut events = vec![PuzzleEvent::NodeTraced { node, progress: self.traced.len() }];
            if self.traced.len() == self.path.len() {
                self.phase = PatternPhase::Complete;
                self.life.solve();
                self.feedback.success(self.layout.nodes[node]);
                events.push(PuzzleEvent::Solved);
            }
            events
        } else {
            self.traced.clear();
            self.feedback.miss(6.0, 200);
            vec![PuzzleEvent::PatternReset]
        }
    }
}

impl Puzzle for PatternPuzzle {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Pattern
    }

    fn tick(&mut self, dt: f32) -> Vec<PuzzleEvent> {
        if !self.life.active {
            return Vec::new();
        }
        let mut events = Vec::new();
        let mut dt = dt;

        // Spend the frame across as many phase steps as it covers
        loop {
            match self.phase {
                PatternPhase::Showing { revealed, until_next } => {
                    if dt < until_next {
                        self.phase = PatternPhase::Showing { revealed, until_next: until_next - dt };
                        break;
                    }
                    dt -= until_next;
                    if revealed < self.path.len() {
                        let step = revealed + 1;
                        events.push(PuzzleEvent::NodeRevealed { node: self.path[revealed], step });
                        self.phase = PatternPhase::Showing { revealed: step, until_next: self.step_interval };
                    } else {
                        self.phase = PatternPhase::Holding { remaining: self.show_time };
                    }
                }
                PatternPhase::Holding { remaining } => {
                    if dt < remaining {
                        self.phase = PatternPhase::Holding { remaining: remaining - dt };
                        break;
                    }
                    self.phase = PatternPhase::Input;
                    events.push(PuzzleEvent::RevealEnded);
                    break;
                }
                PatternPhase::Input | PatternPhase::Complete => break,
            }
        }
        events
    }

    fn pointer(&mut self, event: PointerEvent) -> Vec<PuzzleEvent> {
        if event.phase != PointerPhase::Down {
            return Vec::new();
        }
        match self.layout.node_at(event.pos) {
            Some(node) => self.tap_node(node),
            None => Vec::new(),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.layout = NodeGridLayout::new(viewport);
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
