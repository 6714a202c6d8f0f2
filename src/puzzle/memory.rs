//! Memory lock: all tumblers are shown briefly, then hidden.
//! Flip two at a time to find matching pairs.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::{Lifecycle, PointerEvent, PointerPhase, Puzzle, PuzzleContext, PuzzleEvent, PuzzleOutcome, ms};
use crate::consts::MEMORY_SYMBOLS;
use crate::feedback::{Effect, Feedback, SoundCue};
use crate::layout::{TileGridLayout, Viewport};
use crate::tables::{MemoryParams, PuzzleKind};

/// Memory state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemoryPhase {
    /// Every tile face up for the memorization window
    Showing { remaining: f32 },
    AwaitingFirstPick,
    AwaitingSecondPick { first: usize },
    /// Both picks face up; input disabled until the delay elapses
    Evaluating {
        first: usize,
        second: usize,
        matched: bool,
        remaining: f32,
    },
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTile {
    /// Index into the symbol list; equal for both tiles of a pair
    pub pair: u8,
    pub matched: bool,
}

impl MemoryTile {
    pub fn symbol(&self) -> &'static str {
        MEMORY_SYMBOLS[usize::from(self.pair)]
    }
}

#[derive(Debug)]
pub struct MemoryPuzzle {
    tiles: Vec<MemoryTile>,
    phase: MemoryPhase,
    matched_count: usize,
    match_delay: f32,
    mismatch_delay: f32,
    layout: TileGridLayout,
    life: Lifecycle,
    feedback: Feedback,
}

impl MemoryPuzzle {
    pub fn new(params: MemoryParams, ctx: &PuzzleContext, mut rng: Pcg32) -> Self {
        let pairs = params.pair_count.min(MEMORY_SYMBOLS.len() as u8);
        let mut tiles: Vec<MemoryTile> = (0..pairs)
            .flat_map(|pair| [MemoryTile { pair, matched: false }; 2])
            .collect();
        tiles.shuffle(&mut rng);

        let show_time = ms(params.show_time_ms.saturating_add(ctx.bonuses.extra_show_time_ms));
        let layout = TileGridLayout::new(ctx.viewport, tiles.len());

        Self {
            tiles,
            phase: MemoryPhase::Showing { remaining: show_time },
            matched_count: 0,
            match_delay: ms(ctx.settings.memory_match_delay_ms),
            mismatch_delay: ms(ctx.settings.memory_mismatch_delay_ms),
            layout,
            life: Lifecycle::new(),
            feedback: ctx.feedback.clone(),
        }
    }

    pub fn phase(&self) -> MemoryPhase {
        self.phase
    }

    pub fn tiles(&self) -> &[MemoryTile] {
        &self.tiles
    }

    pub fn pair_count(&self) -> usize {
        self.tiles.len() / 2
    }

    /// Number of matched tiles (always even)
    pub fn matched_count(&self) -> usize {
        self.matched_count
    }

    pub fn layout(&self) -> &TileGridLayout {
        &self.layout
    }

    /// Whether the tile is currently showing its symbol
    pub fn is_face_up(&self, index: usize) -> bool {
        let Some(tile) = self.tiles.get(index) else {
            return false;
        };
        tile.matched
            || match self.phase {
                MemoryPhase::Showing { .. } => true,
                MemoryPhase::AwaitingFirstPick | MemoryPhase::Solved => false,
                MemoryPhase::AwaitingSecondPick { first } => first == index,
                MemoryPhase::Evaluating { first, second, .. } => first == index || second == index,
            }
    }

    /// Whether picks are currently accepted
    pub fn accepts_input(&self) -> bool {
        self.life.active
            && matches!(
                self.phase,
                MemoryPhase::AwaitingFirstPick | MemoryPhase::AwaitingSecondPick { .. }
            )
    }

    /// Flip a tile. Matched, already-flipped and out-of-range picks are ignored.
    pub fn pick(&mut self, index: usize) -> Vec<PuzzleEvent> {
        if !self.accepts_input() {
            return Vec::new();
        }
        match self.tiles.get(index) {
            Some(tile) if !tile.matched => {}
            _ => return Vec::new(),
        }

        match self.phase {
            MemoryPhase::AwaitingFirstPick => {
                self.phase = MemoryPhase::AwaitingSecondPick { first: index };
            }
            MemoryPhase::AwaitingSecondPick { first } => {
                if first == index {
                    return Vec::new();
                }
                let matched = self.tiles[first].pair == self.tiles[index].pair;
                let remaining = if matched { self.match_delay } else { self.mismatch_delay };
                self.phase = MemoryPhase::Evaluating { first, second: index, matched, remaining };
            }
            _ => return Vec::new(),
        }

        self.feedback.play(SoundCue::PickMove);
        vec![PuzzleEvent::TileFlipped { tile: index }]
    }

    fn resolve(&mut self, first: usize, second: usize, matched: bool) -> Vec<PuzzleEvent> {
        if !matched {
            self.phase = MemoryPhase::AwaitingFirstPick;
            self.feedback.miss(4.0, 150);
            return vec![PuzzleEvent::PairMismatched { first, second }];
        }

        // Pairs lock in together
        self.tiles[first].matched = true;
        self.tiles[second].matched = true;
        self.matched_count += 2;
        self.feedback.success(self.layout.tiles[second].center());

        let mut events = vec![PuzzleEvent::PairMatched { first, second }];
        if self.matched_count == self.tiles.len() {
            self.phase = MemoryPhase::Solved;
            self.life.solve();
            self.feedback.emit(Effect::Flash { success: true });
            events.push(PuzzleEvent::Solved);
        } else {
            self.phase = MemoryPhase::AwaitingFirstPick;
        }
        events
    }
}

impl Puzzle for MemoryPuzzle {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Memory
    }

    fn tick(&mut self, dt: f32) -> Vec<PuzzleEvent> {
        if !self.life.active {
            return Vec::new();
        }
        match self.phase {
            MemoryPhase::Showing { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = MemoryPhase::AwaitingFirstPick;
                    vec![PuzzleEvent::RevealEnded]
                } else {
                    self.phase = MemoryPhase::Showing { remaining };
                    Vec::new()
                }
            }
            MemoryPhase::Evaluating { first, second, matched, remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.resolve(first, second, matched)
                } else {
                    self.phase = MemoryPhase::Evaluating { first, second, matched, remaining };
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn pointer(&mut self, event: PointerEvent) -> Vec<PuzzleEvent> {
        if event.phase != PointerPhase::Down {
            return Vec::new();
        }
        match self.layout.tile_at(event.pos) {
            Some(index) => self.pick(index),
            None => Vec::new(),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.layout = TileGridLayout::new(viewport, self.tiles.len());
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ToolBonusSet;
    use rand::SeedableRng;

    fn puzzle(pair_count: u8) -> MemoryPuzzle {
        let params = MemoryParams { pair_count, show_time_ms: 1000 };
        MemoryPuzzle::new(params, &PuzzleContext::default(), Pcg32::seed_from_u64(11))
    }

    /// Indices of both tiles of every pair
    fn pairs(p: &MemoryPuzzle) -> Vec<(usize, usize)> {
        (0..p.pair_count() as u8)
            .map(|pair| {
                let mut idx = p.tiles().iter().enumerate().filter(|(_, t)| t.pair == pair).map(|(i, _)| i);
                (idx.next().unwrap(), idx.next().unwrap())
            })
            .collect()
    }

    fn mismatched_pair(p: &MemoryPuzzle) -> (usize, usize) {
        let second = (1..p.tiles().len()).find(|&i| p.tiles()[i].pair != p.tiles()[0].pair).unwrap();
        (0, second)
    }

    #[test]
    fn test_tiles_are_shuffled_pairs() {
        let p = puzzle(5);
        assert_eq!(p.tiles().len(), 10);
        for pair in 0..5u8 {
            assert_eq!(p.tiles().iter().filter(|t| t.pair == pair).count(), 2);
        }
    }

    #[test]
    fn test_show_phase_blocks_input_then_hides() {
        let mut p = puzzle(3);
        assert!(p.is_face_up(4));
        assert!(p.pick(0).is_empty());

        assert!(p.tick(0.5).is_empty());
        assert_eq!(p.tick(0.6), vec![PuzzleEvent::RevealEnded]);
        assert_eq!(p.phase(), MemoryPhase::AwaitingFirstPick);
        assert!(!p.is_face_up(4));
    }

    #[test]
    fn test_show_time_bonus_extends_reveal() {
        let ctx = PuzzleContext {
            bonuses: ToolBonusSet { extra_show_time_ms: 1500, ..Default::default() },
            ..Default::default()
        };
        let params = MemoryParams { pair_count: 3, show_time_ms: 1000 };
        let mut p = MemoryPuzzle::new(params, &ctx, Pcg32::seed_from_u64(1));
        assert!(p.tick(2.0).is_empty());
        assert_eq!(p.tick(0.6), vec![PuzzleEvent::RevealEnded]);
    }

    #[test]
    fn test_mismatch_flips_back_after_delay() {
        let mut p = puzzle(3);
        p.tick(1.0);
        let (a, b) = mismatched_pair(&p);

        assert_eq!(p.pick(a), vec![PuzzleEvent::TileFlipped { tile: a }]);
        // Re-picking the face-up tile does nothing
        assert!(p.pick(a).is_empty());
        assert_eq!(p.pick(b), vec![PuzzleEvent::TileFlipped { tile: b }]);
        assert!(!p.accepts_input());
        assert!(p.is_face_up(a) && p.is_face_up(b));

        assert!(p.tick(0.5).is_empty());
        assert_eq!(p.tick(0.4), vec![PuzzleEvent::PairMismatched { first: a, second: b }]);
        assert!(!p.is_face_up(a) && !p.is_face_up(b));
        assert_eq!(p.matched_count(), 0);
        assert!(p.accepts_input());
    }

    #[test]
    fn test_matching_all_pairs_solves_with_even_counts() {
        let mut p = puzzle(4);
        p.tick(1.0);
        let all = pairs(&p);

        for (n, (a, b)) in all.iter().copied().enumerate() {
            p.pick(a);
            assert_eq!(p.matched_count() % 2, 0);
            p.pick(b);
            assert_eq!(p.matched_count() % 2, 0);
            let events = p.tick(0.5);
            assert_eq!(events[0], PuzzleEvent::PairMatched { first: a, second: b });
            assert_eq!(p.matched_count(), 2 * (n + 1));

            // Matched tiles can't be picked again
            assert!(p.pick(a).is_empty());
        }

        assert_eq!(p.outcome(), PuzzleOutcome::Solved);
        assert_eq!(p.phase(), MemoryPhase::Solved);
        assert_eq!(p.matched_count(), p.tiles().len());
    }

    #[test]
    fn test_pointer_picks_tile_under_cursor() {
        let mut p = puzzle(3);
        p.tick(1.0);
        let center = p.layout().tiles[2].center();
        assert_eq!(
            p.pointer(PointerEvent::down(center.x, center.y)),
            vec![PuzzleEvent::TileFlipped { tile: 2 }]
        );
        assert!(p.pointer(PointerEvent::down(-10.0, -10.0)).is_empty());
    }
}
