//! Slider lock: an indicator sweeps back and forth along a track.
//! Tap while it is inside the sweet spot to set each pin.

use rand::Rng;
use rand_pcg::Pcg32;

use super::{Lifecycle, PointerEvent, PointerPhase, Puzzle, PuzzleContext, PuzzleEvent, PuzzleOutcome};
use crate::consts::{SLIDER_ZONE_MAX, SLIDER_ZONE_MIN};
use crate::feedback::{Effect, Feedback};
use crate::layout::{SliderLayout, Viewport};
use crate::tables::{PuzzleKind, SliderParams};

/// One sweet spot on the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderZone {
    /// Track fraction in [0.2, 0.8]
    pub center: f32,
    /// Half-width as a track fraction
    pub tolerance: f32,
    pub hit: bool,
}

impl SliderZone {
    pub fn contains(&self, position: f32) -> bool {
        (position - self.center).abs() <= self.tolerance
    }
}

#[derive(Debug)]
pub struct SliderPuzzle {
    /// Effective speed after tool slowdown (track widths per second)
    speed: f32,
    /// Indicator position in [0, 1]
    position: f32,
    /// +1.0 or -1.0
    direction: f32,
    zones: Vec<SliderZone>,
    current_zone: usize,
    layout: SliderLayout,
    life: Lifecycle,
    rng: Pcg32,
    feedback: Feedback,
}

impl SliderPuzzle {
    pub fn new(params: SliderParams, ctx: &PuzzleContext, mut rng: Pcg32) -> Self {
        let tolerance = params.tolerance_percent / 100.0;
        let zones = (0..params.zone_count)
            .map(|_| SliderZone { center: random_center(&mut rng), tolerance, hit: false })
            .collect();

        Self {
            speed: params.speed * (1.0 - ctx.bonuses.slowdown_fraction),
            position: 0.0,
            direction: 1.0,
            zones,
            current_zone: 0,
            layout: SliderLayout::new(ctx.viewport),
            life: Lifecycle::new(),
            rng,
            feedback: ctx.feedback.clone(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn zones(&self) -> &[SliderZone] {
        &self.zones
    }

    pub fn current_zone_index(&self) -> usize {
        self.current_zone
    }

    /// The zone waiting to be hit, if any
    pub fn current_zone(&self) -> Option<&SliderZone> {
        self.zones.get(self.current_zone)
    }

    pub fn layout(&self) -> &SliderLayout {
        &self.layout
    }

    /// Try to set the current pin at the indicator's position
    pub fn tap(&mut self) -> Vec<PuzzleEvent> {
        if !self.life.active {
            return Vec::new();
        }
        let index = self.current_zone;
        let Some(zone) = self.zones.get_mut(index) else {
            return Vec::new();
        };

        if zone.contains(self.position) {
            zone.hit = true;
            let at = self.layout.point_at(zone.center);
            self.feedback.success(at);
            self.feedback.emit(Effect::Pulse { scale: 1.03 });
            self.current_zone += 1;

            let mut events = vec![PuzzleEvent::ZoneHit { zone: index }];
            if self.current_zone >= self.zones.len() {
                self.life.solve();
                events.push(PuzzleEvent::Solved);
            }
            events
        } else {
            // Only the current sweet spot moves; set pins stay put
            zone.center = random_center(&mut self.rng);
            self.feedback.miss(8.0, 200);
            vec![PuzzleEvent::ZoneMissed { zone: index }]
        }
    }

    /// Advance the indicator, bouncing off both ends
    fn advance(&mut self, dt: f32) {
        let mut position = self.position + self.direction * self.speed * dt;
        // A long frame can cross the track more than once
        for _ in 0..8 {
            if position > 1.0 {
                position = 2.0 - position;
                self.direction = -1.0;
            } else if position < 0.0 {
                position = -position;
                self.direction = 1.0;
            } else {
                break;
            }
        }
        self.position = position.clamp(0.0, 1.0);
        if self.position >= 1.0 {
            self.direction = -1.0;
        } else if self.position <= 0.0 {
            self.direction = 1.0;
        }
    }
}

fn random_center(rng: &mut Pcg32) -> f32 {
    rng.random_range(SLIDER_ZONE_MIN..=SLIDER_ZONE_MAX)
}

impl Puzzle for SliderPuzzle {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Slider
    }

    fn tick(&mut self, dt: f32) -> Vec<PuzzleEvent> {
        if self.life.active {
            self.advance(dt);
        }
        Vec::new()
    }

    fn pointer(&mut self, event: PointerEvent) -> Vec<PuzzleEvent> {
        match event.phase {
            // The whole canvas is the tap target
            PointerPhase::Down => self.tap(),
            PointerPhase::Move | PointerPhase::Up => Vec::new(),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.layout = SliderLayout::new(viewport);
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
    use crate::feedback::{Recorder, SoundCue};
    use crate::tables::ToolBonusSet;
    use rand::SeedableRng;

    fn params(zone_count: u8) -> SliderParams {
        SliderParams { speed: 1.0, zone_count, tolerance_percent: 10.0 }
    }

    fn puzzle(zone_count: u8) -> SliderPuzzle {
        SliderPuzzle::new(params(zone_count), &PuzzleContext::default(), Pcg32::seed_from_u64(42))
    }

    #[test]
    fn test_zones_generated_in_range() {
        let p = puzzle(3);
        assert_eq!(p.zones().len(), 3);
        for zone in p.zones() {
            assert!((0.2..=0.8).contains(&zone.center));
            assert!((zone.tolerance - 0.1).abs() < 1e-6);
            assert!(!zone.hit);
        }
    }

    #[test]
    fn test_slowdown_reduces_speed() {
        let ctx = PuzzleContext {
            bonuses: ToolBonusSet { slowdown_fraction: 0.3, ..Default::default() },
            ..Default::default()
        };
        let p = SliderPuzzle::new(params(1), &ctx, Pcg32::seed_from_u64(1));
        assert!((p.speed() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_indicator_reflects_at_ends() {
        let mut p = puzzle(1);
        p.tick(0.75);
        assert!((p.position() - 0.75).abs() < 1e-5);
        assert_eq!(p.direction(), 1.0);

        // Overshoots the right end by 0.25 and bounces back
        p.tick(0.5);
        assert!((p.position() - 0.75).abs() < 1e-5);
        assert_eq!(p.direction(), -1.0);

        p.tick(1.0);
        assert!((p.position() - 0.25).abs() < 1e-5);
        assert_eq!(p.direction(), 1.0);
    }

    #[test]
    fn test_hit_advances_and_solves() {
        let (recorder, feedback) = Recorder::feedback();
        let ctx = PuzzleContext { feedback, ..Default::default() };
        let mut p = SliderPuzzle::new(params(2), &ctx, Pcg32::seed_from_u64(9));

        p.position = p.zones[0].center;
        assert_eq!(p.tap(), vec![PuzzleEvent::ZoneHit { zone: 0 }]);
        assert_eq!(p.current_zone_index(), 1);
        assert_eq!(p.outcome(), PuzzleOutcome::Running);

        p.position = p.zones[1].center + 0.05;
        assert_eq!(p.tap(), vec![PuzzleEvent::ZoneHit { zone: 1 }, PuzzleEvent::Solved]);
        assert_eq!(p.outcome(), PuzzleOutcome::Solved);
        assert!(!p.is_active());
        assert_eq!(recorder.count_sound(SoundCue::LockOpen), 2);

        // Solved puzzle ignores further taps
        assert!(p.tap().is_empty());
    }

    #[test]
    fn test_miss_only_moves_current_zone() {
        let mut p = puzzle(3);
        p.position = p.zones[0].center;
        p.tap();
        let solved_center = p.zones[0].center;
        let later_center = p.zones[2].center;

        for _ in 0..20 {
            // Track end is always outside a sweet spot in [0.2, 0.8] +- 0.1
            p.position = 0.0;
            assert_eq!(p.tap(), vec![PuzzleEvent::ZoneMissed { zone: 1 }]);
            assert!((0.2..=0.8).contains(&p.zones[1].center));
        }

        assert_eq!(p.zones[0].center, solved_center);
        assert!(p.zones[0].hit);
        assert_eq!(p.zones[2].center, later_center);
        assert_eq!(p.current_zone_index(), 1);
        assert_eq!(p.outcome(), PuzzleOutcome::Running);
    }

    #[test]
    fn test_pointer_down_taps() {
        let mut p = puzzle(1);
        p.position = p.zones[0].center;
        let events = p.pointer(PointerEvent::down(5.0, 5.0));
        assert_eq!(events.last(), Some(&PuzzleEvent::Solved));
    }
}
