//! Rotation lock: drag a combination dial and release it on each target angle.

use rand::Rng;
use rand_pcg::Pcg32;

use super::{Lifecycle, PointerEvent, PointerPhase, Puzzle, PuzzleContext, PuzzleEvent, PuzzleOutcome};
use crate::feedback::{Effect, Feedback};
use crate::layout::{DialLayout, Viewport};
use crate::tables::{PuzzleKind, RotationParams};
use crate::{circular_distance_degrees, normalize_degrees, pointer_angle_degrees, wrap_delta_degrees};

#[derive(Debug)]
pub struct RotationPuzzle {
    /// Dial angle in [0, 360)
    angle: f32,
    /// Whole-degree targets, one per pin
    targets: Vec<f32>,
    current_pin: usize,
    /// Base tolerance plus tension-wrench bonus
    tolerance: f32,
    /// Last pointer angle while a drag is in progress
    drag_anchor: Option<f32>,
    layout: DialLayout,
    life: Lifecycle,
    feedback: Feedback,
}

impl RotationPuzzle {
    pub fn new(params: RotationParams, ctx: &PuzzleContext, mut rng: Pcg32) -> Self {
        let targets = (0..params.pin_count)
            .map(|_| rng.random_range(0..360u16) as f32)
            .collect();

        Self {
            angle: 0.0,
            targets,
            current_pin: 0,
            tolerance: params.tolerance_degrees + ctx.bonuses.extra_tolerance_degrees,
            drag_anchor: None,
            layout: DialLayout::new(ctx.viewport),
            life: Lifecycle::new(),
            feedback: ctx.feedback.clone(),
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn pin_count(&self) -> usize {
        self.targets.len()
    }

    pub fn current_pin(&self) -> usize {
        self.current_pin
    }

    /// Target of the pin being worked on, for the hint arc
    pub fn current_target(&self) -> Option<f32> {
        self.targets.get(self.current_pin).copied()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn layout(&self) -> &DialLayout {
        &self.layout
    }

    /// Start a drag with the pointer at `pointer_degrees` around the dial center
    pub fn begin_drag(&mut self, pointer_degrees: f32) {
        if self.life.active {
            self.drag_anchor = Some(pointer_degrees);
        }
    }

    /// Turn the dial by however far the pointer moved around the center
    pub fn drag_to(&mut self, pointer_degrees: f32) {
        if !self.life.active {
            return;
        }
        let Some(anchor) = self.drag_anchor else {
            return;
        };
        let delta = wrap_delta_degrees(pointer_degrees - anchor);
        self.angle = normalize_degrees(self.angle + delta);
        self.drag_anchor = Some(pointer_degrees);
    }

    /// Release the dial and test the current pin
    pub fn release(&mut self) -> Vec<PuzzleEvent> {
        if !self.life.active || self.drag_anchor.take().is_none() {
            return Vec::new();
        }
        let Some(target) = self.current_target() else {
            return Vec::new();
        };
        let pin = self.current_pin;

        if circular_distance_degrees(self.angle, target) <= self.tolerance {
            self.current_pin += 1;
            self.feedback.success(self.layout.rim_point(target));
            self.feedback.emit(Effect::Pulse { scale: 1.03 });

            let mut events = vec![PuzzleEvent::PinSet { pin }];
            if self.current_pin >= self.targets.len() {
                self.life.solve();
                self.feedback.emit(Effect::Flash { success: true });
                events.push(PuzzleEvent::Solved);
            }
            events
        } else {
            // Dial stays where it was released
            vec![PuzzleEvent::PinMissed { pin }]
        }
    }
}

impl Puzzle for RotationPuzzle {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Rotation
    }

    fn tick(&mut self, _dt: f32) -> Vec<PuzzleEvent> {
        Vec::new()
    }

    fn pointer(&mut self, event: PointerEvent) -> Vec<PuzzleEvent> {
        let degrees = pointer_angle_degrees(self.layout.center, event.pos);
        match event.phase {
            PointerPhase::Down => {
                self.begin_drag(degrees);
                Vec::new()
            }
            PointerPhase::Move => {
                self.drag_to(degrees);
                Vec::new()
            }
            PointerPhase::Up => self.release(),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.layout = DialLayout::new(viewport);
    }

    fn outcome(&self) -> PuzzleOutcome {
        self.life.outcome
    }

    fn stop(&mut self) {
        self.drag_anchor = None;
        self.life.stop();
    }

    fn abort(&mut self) {
        self.drag_anchor = None;
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

    fn puzzle(pin_count: u8, tolerance_degrees: f32) -> RotationPuzzle {
        let params = RotationParams { pin_count, tolerance_degrees };
        RotationPuzzle::new(params, &PuzzleContext::default(), Pcg32::seed_from_u64(5))
    }

    /// Drag from 0° by `delta` in small steps and release
    fn turn_and_release(p: &mut RotationPuzzle, delta: f32) -> Vec<PuzzleEvent> {
        let steps = 12;
        let mut pointer = 0.0;
        p.begin_drag(pointer);
        for _ in 0..steps {
            pointer += delta / steps as f32;
            // Report pointer angles the way atan2 does, in (-180, 180]
            p.drag_to(wrap_delta_degrees(pointer));
        }
        p.release()
    }

    #[test]
    fn test_targets_are_whole_degrees() {
        let p = puzzle(5, 10.0);
        assert_eq!(p.pin_count(), 5);
        for t in &p.targets {
            assert!((0.0..360.0).contains(t));
            assert_eq!(t.fract(), 0.0);
        }
    }

    #[test]
    fn test_circular_tolerance_across_zero() {
        let mut p = puzzle(2, 5.0);
        p.targets = vec![2.0, 180.0];
        let events = turn_and_release(&mut p, -1.0);
        assert!((p.angle() - 359.0).abs() < 1e-3);
        assert_eq!(events, vec![PuzzleEvent::PinSet { pin: 0 }]);
        assert_eq!(p.current_pin(), 1);
    }

    #[test]
    fn test_miss_keeps_dial_and_pin() {
        let mut p = puzzle(1, 5.0);
        p.targets = vec![90.0];
        let events = turn_and_release(&mut p, 45.0);
        assert_eq!(events, vec![PuzzleEvent::PinMissed { pin: 0 }]);
        assert!((p.angle() - 45.0).abs() < 1e-3);
        assert_eq!(p.outcome(), PuzzleOutcome::Running);

        // Re-drag from where it was left
        let events = turn_and_release(&mut p, 44.0);
        assert_eq!(events, vec![PuzzleEvent::PinSet { pin: 0 }, PuzzleEvent::Solved]);
        assert_eq!(p.outcome(), PuzzleOutcome::Solved);
    }

    #[test]
    fn test_drag_across_pointer_seam_is_continuous() {
        let mut p = puzzle(1, 5.0);
        p.begin_drag(170.0);
        p.drag_to(-170.0);
        assert!((p.angle() - 20.0).abs() < 1e-3);
        p.drag_to(170.0);
        assert!(p.angle().abs() < 1e-3);
    }

    #[test]
    fn test_tension_wrench_widens_window() {
        let ctx = PuzzleContext {
            bonuses: ToolBonusSet { extra_tolerance_degrees: 10.0, ..Default::default() },
            ..Default::default()
        };
        let params = RotationParams { pin_count: 1, tolerance_degrees: 5.0 };
        let mut p = RotationPuzzle::new(params, &ctx, Pcg32::seed_from_u64(5));
        assert_eq!(p.tolerance(), 15.0);
        p.targets = vec![100.0];
        let events = turn_and_release(&mut p, 88.0);
        assert_eq!(events.last(), Some(&PuzzleEvent::Solved));
    }

    #[test]
    fn test_release_without_drag_is_ignored() {
        let mut p = puzzle(1, 180.0 - 1.0);
        assert!(p.release().is_empty());
    }

    #[test]
    fn test_pointer_drag_through_layout() {
        let mut p = puzzle(1, 5.0);
        p.targets = vec![90.0];
        let c = p.layout().center;
        // Pointer starts right of center (0°) and moves below it (90°)
        p.pointer(PointerEvent::down(c.x + 50.0, c.y));
        p.pointer(PointerEvent::moved(c.x + 35.0, c.y + 35.0));
        p.pointer(PointerEvent::moved(c.x, c.y + 50.0));
        let events = p.pointer(PointerEvent::up(c.x, c.y + 50.0));
        assert_eq!(events, vec![PuzzleEvent::PinSet { pin: 0 }, PuzzleEvent::Solved]);
    }
}
