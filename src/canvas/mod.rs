//! Canvas surface: the base image plus the ordered annotation list
//!
//! The surface itself never touches history; `EditorSession` decides which
//! mutations are committed.

pub mod image;

use ::image::RgbaImage;

pub use self::image::{BaseImage, load_base_image};
use crate::domain::{AnnotationObject, ObjectId, Point};
use crate::render::image::render_composite;
use crate::render::text::FontBook;

#[derive(Clone, Debug)]
pub struct CanvasSurface {
    base: BaseImage,
    objects: Vec<AnnotationObject>,
    selected: Option<ObjectId>,
}

impl CanvasSurface {
    pub fn new(base: BaseImage) -> Self {
        Self {
            base,
            objects: Vec::new(),
            selected: None,
        }
    }

    pub fn base(&self) -> &BaseImage {
        &self.base
    }

    /// Canvas size in display coordinates
    pub fn size(&self) -> (f32, f32) {
        (self.base.display_width() as f32, self.base.display_height() as f32)
    }

    pub fn objects(&self) -> &[AnnotationObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&AnnotationObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut AnnotationObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Append on top of the z-order
    pub fn push(&mut self, object: AnnotationObject) {
        self.objects.push(object);
    }

    /// Remove by id, returning the object if it was present
    pub fn remove(&mut self, id: ObjectId) -> Option<AnnotationObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.objects.remove(index))
    }

    /// Replace the object with the same id in place, or append it if absent
    pub fn upsert(&mut self, object: AnnotationObject) {
        match self.get_mut(object.id) {
            Some(slot) => *slot = object,
            None => self.objects.push(object),
        }
    }

    /// Swap in a whole list (history restore). Drops a selection whose
    /// object no longer exists.
    pub fn set_objects(&mut self, objects: Vec<AnnotationObject>) {
        self.objects = objects;
        if let Some(id) = self.selected
            && self.get(id).is_none()
        {
            self.selected = None;
        }
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Select at most one object; unknown ids clear the selection
    pub fn select(&mut self, id: Option<ObjectId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    /// Top-most selectable object whose bounds (grown by `tolerance`) contain `point`
    pub fn hit_test(&self, point: Point, tolerance: f32) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.selectable && o.bounds().inflate(tolerance).contains_point(point))
            .map(|o| o.id)
    }

    /// Render the surface at display resolution
    pub fn render(&self, fonts: &FontBook) -> RgbaImage {
        self.render_at(1.0, fonts)
    }

    /// Render base image plus annotations at `multiplier` × display resolution
    pub fn render_at(&self, multiplier: f64, fonts: &FontBook) -> RgbaImage {
        render_objects(&self.base, &self.objects, multiplier, fonts)
    }
}

/// Composite `objects` over `base` at `multiplier` × display resolution
pub(crate) fn render_objects(
    base: &BaseImage,
    objects: &[AnnotationObject],
    multiplier: f64,
    fonts: &FontBook,
) -> RgbaImage {
    let width = (base.display_width() * multiplier).round() as u32;
    let height = (base.display_height() * multiplier).round() as u32;
    render_composite(base.pixels(), width, height, objects, multiplier as f32, fonts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;

    fn canvas() -> CanvasSurface {
        CanvasSurface::new(BaseImage::from_rgba(RgbaImage::new(400, 300), "mem", (800, 600)))
    }

    fn rect(id: u64, x: f32, y: f32) -> AnnotationObject {
        AnnotationObject::rectangle(ObjectId(id), Point::new(x, y), 100.0, 100.0, ShapeColor::BLACK, 2.0)
    }

    #[test]
    fn test_push_keeps_z_order() {
        let mut c = canvas();
        c.push(rect(1, 0.0, 0.0));
        c.push(rect(2, 50.0, 50.0));
        assert_eq!(c.objects()[1].id, ObjectId(2));
        // Overlap resolves to the top-most object
        assert_eq!(c.hit_test(Point::new(75.0, 75.0), 0.0), Some(ObjectId(2)));
        assert_eq!(c.hit_test(Point::new(10.0, 10.0), 0.0), Some(ObjectId(1)));
        assert_eq!(c.hit_test(Point::new(500.0, 500.0), 0.0), None);
    }

    #[test]
    fn test_hit_test_skips_unselectable() {
        let mut c = canvas();
        let mut locked = rect(1, 0.0, 0.0);
        locked.selectable = false;
        c.push(locked);
        assert_eq!(c.hit_test(Point::new(10.0, 10.0), 0.0), None);
    }

    #[test]
    fn test_remove_absent_is_none() {
        let mut c = canvas();
        c.push(rect(1, 0.0, 0.0));
        c.select(Some(ObjectId(1)));
        assert!(c.remove(ObjectId(9)).is_none());
        assert!(c.remove(ObjectId(1)).is_some());
        assert_eq!(c.selected(), None);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut c = canvas();
        c.push(rect(1, 0.0, 0.0));
        c.push(rect(2, 0.0, 0.0));
        c.upsert(rect(1, 30.0, 30.0));
        assert_eq!(c.objects().len(), 2);
        assert_eq!(c.objects()[0], rect(1, 30.0, 30.0));
        c.upsert(rect(3, 0.0, 0.0));
        assert_eq!(c.objects().len(), 3);
    }

    #[test]
    fn test_render_at_display_size() {
        let c = canvas();
        assert_eq!(c.size(), (800.0, 600.0));
        assert_eq!(c.render(&FontBook::default()).dimensions(), (800, 600));
        assert_eq!(c.render_at(0.5, &FontBook::default()).dimensions(), (400, 300));
    }
}
