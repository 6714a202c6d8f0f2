//! Puzzle geometry
//!
//! Each puzzle computes its layout once per viewport. The same structs are
//! used for hit-testing pointer input here and for drawing in the
//! presentation layer, so the two can never disagree.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Size of the puzzle canvas in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    /// Portrait phone canvas
    fn default() -> Self {
        Self::new(360.0, 560.0)
    }
}

/// Axis-aligned rectangle, `min` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { min: Vec2::new(x, y), size: Vec2::new(w, h) }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Inclusive on all edges
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.min.x && p.x <= max.x && p.y >= self.min.y && p.y <= max.y
    }
}

/// Horizontal track with a moving indicator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderLayout {
    pub track: Rect,
}

impl SliderLayout {
    pub fn new(viewport: Viewport) -> Self {
        let width = (viewport.width - 2.0 * SLIDER_TRACK_MARGIN).max(1.0);
        let y = viewport.height / 2.0 - SLIDER_TRACK_HEIGHT / 2.0;
        Self { track: Rect::new(SLIDER_TRACK_MARGIN, y, width, SLIDER_TRACK_HEIGHT) }
    }

    /// Canvas x of a track fraction in [0, 1]
    pub fn x_at(&self, fraction: f32) -> f32 {
        self.track.min.x + fraction * self.track.size.x
    }

    pub fn point_at(&self, fraction: f32) -> Vec2 {
        Vec2::new(self.x_at(fraction), self.track.center().y)
    }
}

/// Circular combination dial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialLayout {
    pub center: Vec2,
    pub radius: f32,
}

impl DialLayout {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            center: viewport.center(),
            radius: viewport.width.min(viewport.height) * DIAL_RADIUS_FRACTION,
        }
    }

    /// Point on the dial rim at `degrees` (0 = right, clockwise on screen)
    pub fn rim_point(&self, degrees: f32) -> Vec2 {
        let r = degrees.to_radians();
        self.center + Vec2::new(r.cos(), r.sin()) * self.radius
    }
}

/// Grid of memory tiles
#[derive(Debug, Clone, PartialEq)]
pub struct TileGridLayout {
    pub cols: usize,
    pub rows: usize,
    pub tiles: Vec<Rect>,
}

impl TileGridLayout {
    pub fn new(viewport: Viewport, tile_count: usize) -> Self {
        let cols = if tile_count <= 6 { 3 } else { 4 };
        let rows = tile_count.div_ceil(cols).max(1);

        let area_w = viewport.width - GRID_PADDING * 2.0;
        let area_h = viewport.height * 0.65;
        let start_y = viewport.height * 0.12;

        let gaps_x = (cols - 1) as f32 * TILE_GAP;
        let gaps_y = (rows - 1) as f32 * TILE_GAP;
        let tile_w = TILE_MAX_SIZE.min((area_w - gaps_x) / cols as f32);
        let tile_h = TILE_MAX_SIZE.min((area_h - gaps_y) / rows as f32);
        let start_x = (viewport.width - (cols as f32 * tile_w + gaps_x)) / 2.0;

        let tiles = (0..tile_count)
            .map(|i| {
                let col = (i % cols) as f32;
                let row = (i / cols) as f32;
                Rect::new(
                    start_x + col * (tile_w + TILE_GAP),
                    start_y + row * (tile_h + TILE_GAP),
                    tile_w,
                    tile_h,
                )
            })
            .collect();

        Self { cols, rows, tiles }
    }

    pub fn tile_at(&self, p: Vec2) -> Option<usize> {
        self.tiles.iter().position(|r| r.contains(p))
    }
}

/// 3x3 pattern-lock node grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGridLayout {
    pub nodes: [Vec2; PATTERN_NODE_COUNT],
    pub node_radius: f32,
}

impl NodeGridLayout {
    pub fn new(viewport: Viewport) -> Self {
        let grid_size = viewport.width.min(viewport.height * 0.6) * 0.7;
        let start = Vec2::new((viewport.width - grid_size) / 2.0, viewport.height * 0.18);
        let gap = grid_size / 2.0;

        let mut nodes = [Vec2::ZERO; PATTERN_NODE_COUNT];
        for (i, node) in nodes.iter_mut().enumerate() {
            let row = (i / PATTERN_GRID_SIDE) as f32;
            let col = (i % PATTERN_GRID_SIDE) as f32;
            *node = start + Vec2::new(col * gap + gap / 2.0, row * gap + gap / 2.0);
        }

        Self { nodes, node_radius: 25.0f32.min(grid_size / 8.0) }
    }

    /// First node whose enlarged hit circle contains `p`
    pub fn node_at(&self, p: Vec2) -> Option<usize> {
        let hit_radius = self.node_radius * PATTERN_HIT_SCALE;
        self.nodes.iter().position(|n| n.distance(p) <= hit_radius)
    }
}

/// A keypad button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Digit(u8),
    Submit,
    Delete,
}

/// Cracker keypad: digits 0-9 in two rows, then submit and delete
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypadLayout {
    pub digits: [Rect; 10],
    pub submit: Rect,
    pub delete: Rect,
}

impl KeypadLayout {
    pub fn new(viewport: Viewport) -> Self {
        let pad_w = (viewport.width - 40.0).min(KEYPAD_MAX_WIDTH);
        let pad_x = (viewport.width - pad_w) / 2.0;
        let pad_y = viewport.height - KEYPAD_BOTTOM_OFFSET;
        let btn_w = pad_w / 5.0;
        let row_h = KEYPAD_BUTTON_HEIGHT + KEYPAD_ROW_GAP;

        let mut digits = [Rect::new(0.0, 0.0, 0.0, 0.0); 10];
        for (i, rect) in digits.iter_mut().enumerate() {
            let col = (i % 5) as f32;
            let row = (i / 5) as f32;
            *rect = Rect::new(
                pad_x + col * btn_w + 4.0,
                pad_y + row * row_h,
                btn_w - 8.0,
                KEYPAD_BUTTON_HEIGHT,
            );
        }

        let action_y = pad_y + 2.0 * row_h + 5.0;
        let action_w = pad_w * 0.45;
        Self {
            digits,
            submit: Rect::new(pad_x, action_y, action_w, KEYPAD_ACTION_HEIGHT),
            delete: Rect::new(pad_x + pad_w - action_w, action_y, action_w, KEYPAD_ACTION_HEIGHT),
        }
    }

    pub fn key_at(&self, p: Vec2) -> Option<KeypadKey> {
        if let Some(d) = self.digits.iter().position(|r| r.contains(p)) {
            return Some(KeypadKey::Digit(d as u8));
        }
        if self.submit.contains(p) {
            return Some(KeypadKey::Submit);
        }
        if self.delete.contains(p) {
            return Some(KeypadKey::Delete);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(r.contains(Vec2::new(30.0, 30.0)));
        assert!(!r.contains(Vec2::new(30.1, 20.0)));
    }

    #[test]
    fn test_tile_grid_hit_matches_draw_rects() {
        let grid = TileGridLayout::new(Viewport::default(), 6);
        assert_eq!(grid.cols, 3);
        assert_eq!(grid.rows, 2);
        for (i, rect) in grid.tiles.iter().enumerate() {
            assert_eq!(grid.tile_at(rect.center()), Some(i));
        }
        assert_eq!(grid.tile_at(Vec2::new(-5.0, -5.0)), None);

        let grid = TileGridLayout::new(Viewport::default(), 10);
        assert_eq!(grid.cols, 4);
        assert_eq!(grid.rows, 3);
    }

    #[test]
    fn test_node_grid_hit() {
        let grid = NodeGridLayout::new(Viewport::default());
        for (i, node) in grid.nodes.iter().enumerate() {
            assert_eq!(grid.node_at(*node), Some(i));
        }
        assert_eq!(grid.node_at(Vec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_keypad_keys() {
        let pad = KeypadLayout::new(Viewport::default());
        for d in 0..10u8 {
            assert_eq!(
                pad.key_at(pad.digits[usize::from(d)].center()),
                Some(KeypadKey::Digit(d))
            );
        }
        assert_eq!(pad.key_at(pad.submit.center()), Some(KeypadKey::Submit));
        assert_eq!(pad.key_at(pad.delete.center()), Some(KeypadKey::Delete));
        assert_eq!(pad.key_at(Vec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_dial_rim_point() {
        let dial = DialLayout::new(Viewport::new(400.0, 600.0));
        assert_eq!(dial.center, Vec2::new(200.0, 300.0));
        assert!((dial.radius - 128.0).abs() < 1e-4);
        let p = dial.rim_point(90.0);
        assert!((p - Vec2::new(200.0, 428.0)).length() < 1e-3);
    }
}
