//! Crop region and its drag handles

use super::geometry::{Bounds, Point};

/// Drag state for crop region handles
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    #[default]
    None,
    /// Whole region is being moved
    Move,
    /// North-West corner
    NW,
    /// North edge
    N,
    /// North-East corner
    NE,
    /// East edge
    E,
    /// South-East corner
    SE,
    /// South edge
    S,
    /// South-West corner
    SW,
    /// West edge
    W,
}

/// User-positioned crop rectangle in display space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRegion {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Default region for a freshly entered crop tool: an eighth in from the
    /// top-left corner, covering half of each dimension
    pub fn default_for(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            left: canvas_width / 8.0,
            top: canvas_height / 8.0,
            width: canvas_width / 2.0,
            height: canvas_height / 2.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.left, self.top, self.right(), self.bottom())
    }

    /// Which handle (if any) is under `point`; corners win over edges, edges
    /// over the interior
    pub fn handle_at(&self, point: Point, handle_size: f32) -> DragState {
        let near = |a: f32, b: f32| (a - b).abs() <= handle_size;
        let within_x = point.x >= self.left - handle_size && point.x <= self.right() + handle_size;
        let within_y = point.y >= self.top - handle_size && point.y <= self.bottom() + handle_size;
        if !within_x || !within_y {
            return DragState::None;
        }
        let (l, r) = (near(point.x, self.left), near(point.x, self.right()));
        let (t, b) = (near(point.y, self.top), near(point.y, self.bottom()));
        match (l, r, t, b) {
            (true, _, true, _) => DragState::NW,
            (_, true, true, _) => DragState::NE,
            (true, _, _, true) => DragState::SW,
            (_, true, _, true) => DragState::SE,
            (_, _, true, _) => DragState::N,
            (_, _, _, true) => DragState::S,
            (true, _, _, _) => DragState::W,
            (_, true, _, _) => DragState::E,
            _ if self.bounds().contains_point(point) => DragState::Move,
            _ => DragState::None,
        }
    }

    /// Apply a pointer delta for the given handle. Dragging an edge past
    /// its opposite leaves a negative size, which applying the crop rejects.
    pub fn drag(&mut self, handle: DragState, dx: f32, dy: f32) {
        let moves_left = matches!(handle, DragState::NW | DragState::W | DragState::SW);
        let moves_right = matches!(handle, DragState::NE | DragState::E | DragState::SE);
        let moves_top = matches!(handle, DragState::NW | DragState::N | DragState::NE);
        let moves_bottom = matches!(handle, DragState::SW | DragState::S | DragState::SE);

        if handle == DragState::Move {
            self.left += dx;
            self.top += dy;
            return;
        }
        if moves_left {
            self.left += dx;
            self.width -= dx;
        }
        if moves_right {
            self.width += dx;
        }
        if moves_top {
            self.top += dy;
            self.height -= dy;
        }
        if moves_bottom {
            self.height += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_matches_editor_canvas() {
        let region = CropRegion::default_for(800.0, 600.0);
        assert_eq!(region, CropRegion::new(100.0, 75.0, 400.0, 300.0));
    }

    #[test]
    fn test_handle_hit_testing() {
        let region = CropRegion::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(region.handle_at(Point::new(101.0, 99.0), 5.0), DragState::NW);
        assert_eq!(region.handle_at(Point::new(300.0, 200.0), 5.0), DragState::SE);
        assert_eq!(region.handle_at(Point::new(200.0, 100.0), 5.0), DragState::N);
        assert_eq!(region.handle_at(Point::new(200.0, 150.0), 5.0), DragState::Move);
        assert_eq!(region.handle_at(Point::new(10.0, 10.0), 5.0), DragState::None);
    }

    #[test]
    fn test_resize_from_west_edge_keeps_right_fixed() {
        let mut region = CropRegion::new(100.0, 100.0, 200.0, 100.0);
        region.drag(DragState::W, 20.0, 5.0);
        assert_eq!(region.left, 120.0);
        assert_eq!(region.right(), 300.0);
        assert_eq!(region.top, 100.0);
    }

    #[test]
    fn test_move_keeps_size() {
        let mut region = CropRegion::new(10.0, 10.0, 50.0, 40.0);
        region.drag(DragState::Move, -5.0, 7.0);
        assert_eq!(region, CropRegion::new(5.0, 17.0, 50.0, 40.0));
    }
}
