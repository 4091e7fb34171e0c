//! Annotation types for drawing on photos
//!
//! All annotation types store coordinates in display space. The object list
//! is a plain value: it serializes with an explicit `type` discriminant so a
//! history snapshot can be rebuilt without any runtime type information.

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Point};
use crate::config::ShapeColor;

/// Average glyph advance as a fraction of the font size, used for text bounds
pub const TEXT_ADVANCE: f32 = 0.6;
/// Line height as a fraction of the font size
pub const TEXT_LINE_HEIGHT: f32 = 1.16;

/// Unique identifier of an annotation within one editor session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out ids that are never reused within a session
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> ObjectId {
        self.next += 1;
        ObjectId(self.next)
    }

    /// Make sure an externally created id is never handed out again
    pub fn reserve(&mut self, id: ObjectId) {
        self.next = self.next.max(id.0);
    }
}

/// Freehand pencil stroke
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathAnnotation {
    pub points: Vec<Point>,
    pub stroke_color: ShapeColor,
    pub stroke_width: f32,
}

/// Text label anchored at its top-left corner
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub position: Point,
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    pub color: ShapeColor,
}

/// Outline rectangle annotation (no fill)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectOutlineAnnotation {
    /// Top-left corner
    pub position: Point,
    pub width: f32,
    pub height: f32,
    pub stroke_color: ShapeColor,
    pub stroke_width: f32,
}

/// Outline circle annotation (no fill)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircleOutlineAnnotation {
    /// Top-left of the bounding square; the centre is `position + radius`
    pub position: Point,
    pub radius: f32,
    pub stroke_color: ShapeColor,
    pub stroke_width: f32,
}

impl CircleOutlineAnnotation {
    pub fn center(&self) -> Point {
        self.position.offset(self.radius, self.radius)
    }
}

/// Arrow drawn as a shaft plus two head strokes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrowAnnotation {
    pub start: Point,
    pub end: Point,
    pub stroke_color: ShapeColor,
    pub stroke_width: f32,
}

/// Unified annotation type for ordered drawing and undo/redo
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationKind {
    FreehandPath(PathAnnotation),
    TextLabel(TextAnnotation),
    Rectangle(RectOutlineAnnotation),
    Circle(CircleOutlineAnnotation),
    Arrow(ArrowAnnotation),
}

/// One drawing primitive on top of the base image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationObject {
    pub id: ObjectId,
    pub selectable: bool,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

impl AnnotationObject {
    pub fn new(id: ObjectId, kind: AnnotationKind) -> Self {
        Self {
            id,
            selectable: true,
            kind,
        }
    }

    pub fn freehand(id: ObjectId, start: Point, stroke_color: ShapeColor, stroke_width: f32) -> Self {
        Self::new(
            id,
            AnnotationKind::FreehandPath(PathAnnotation {
                points: vec![start],
                stroke_color,
                stroke_width,
            }),
        )
    }

    pub fn text(
        id: ObjectId,
        position: Point,
        content: impl Into<String>,
        font_family: impl Into<String>,
        font_size: f32,
        color: ShapeColor,
    ) -> Self {
        Self::new(
            id,
            AnnotationKind::TextLabel(TextAnnotation {
                position,
                content: content.into(),
                font_family: font_family.into(),
                font_size,
                color,
            }),
        )
    }

    pub fn rectangle(
        id: ObjectId,
        position: Point,
        width: f32,
        height: f32,
        stroke_color: ShapeColor,
        stroke_width: f32,
    ) -> Self {
        Self::new(
            id,
            AnnotationKind::Rectangle(RectOutlineAnnotation {
                position,
                width,
                height,
                stroke_color,
                stroke_width,
            }),
        )
    }

    pub fn circle(
        id: ObjectId,
        position: Point,
        radius: f32,
        stroke_color: ShapeColor,
        stroke_width: f32,
    ) -> Self {
        Self::new(
            id,
            AnnotationKind::Circle(CircleOutlineAnnotation {
                position,
                radius,
                stroke_color,
                stroke_width,
            }),
        )
    }

    pub fn arrow(
        id: ObjectId,
        start: Point,
        end: Point,
        stroke_color: ShapeColor,
        stroke_width: f32,
    ) -> Self {
        Self::new(
            id,
            AnnotationKind::Arrow(ArrowAnnotation {
                start,
                end,
                stroke_color,
                stroke_width,
            }),
        )
    }

    /// Short name of the variant, matching the serialized discriminant
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            AnnotationKind::FreehandPath(_) => "freehand_path",
            AnnotationKind::TextLabel(_) => "text_label",
            AnnotationKind::Rectangle(_) => "rectangle",
            AnnotationKind::Circle(_) => "circle",
            AnnotationKind::Arrow(_) => "arrow",
        }
    }

    /// Axis-aligned bounds including half the stroke width
    pub fn bounds(&self) -> Bounds {
        match &self.kind {
            AnnotationKind::FreehandPath(path) => {
                Bounds::from_points(path.points.iter().copied())
                    .unwrap_or_default()
                    .inflate(path.stroke_width / 2.0)
            }
            AnnotationKind::TextLabel(text) => {
                let lines = text.content.lines().count().max(1);
                let longest = text
                    .content
                    .lines()
                    .map(|line| line.chars().count())
                    .max()
                    .unwrap_or(0);
                let width = longest as f32 * text.font_size * TEXT_ADVANCE;
                let height = lines as f32 * text.font_size * TEXT_LINE_HEIGHT;
                Bounds::new(
                    text.position.x,
                    text.position.y,
                    text.position.x + width,
                    text.position.y + height,
                )
            }
            AnnotationKind::Rectangle(rect) => {
                let p = rect.position;
                Bounds::from_points([p, p.offset(rect.width, rect.height)])
                    .unwrap_or_default()
                    .inflate(rect.stroke_width / 2.0)
            }
            AnnotationKind::Circle(circle) => {
                let d = circle.radius * 2.0;
                Bounds::new(
                    circle.position.x,
                    circle.position.y,
                    circle.position.x + d,
                    circle.position.y + d,
                )
                .inflate(circle.stroke_width / 2.0)
            }
            AnnotationKind::Arrow(arrow) => {
                let (head1, head2) =
                    crate::render::geometry::arrow::head_points(arrow.start, arrow.end, arrow.stroke_width);
                Bounds::from_points([arrow.start, arrow.end, head1, head2])
                    .unwrap_or_default()
                    .inflate(arrow.stroke_width / 2.0)
            }
        }
    }

    /// Move the whole object by `(dx, dy)`
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match &mut self.kind {
            AnnotationKind::FreehandPath(path) => {
                for p in &mut path.points {
                    *p = p.offset(dx, dy);
                }
            }
            AnnotationKind::TextLabel(text) => text.position = text.position.offset(dx, dy),
            AnnotationKind::Rectangle(rect) => rect.position = rect.position.offset(dx, dy),
            AnnotationKind::Circle(circle) => circle.position = circle.position.offset(dx, dy),
            AnnotationKind::Arrow(arrow) => {
                arrow.start = arrow.start.offset(dx, dy);
                arrow.end = arrow.end.offset(dx, dy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_discriminant() {
        let obj = AnnotationObject::circle(ObjectId(3), Point::new(1.0, 2.0), 5.0, ShapeColor::BLACK, 2.0);
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["type"], "circle");
        assert_eq!(json["id"], 3);
        assert_eq!(json["radius"], 5.0);
        assert_eq!(obj.type_name(), "circle");
    }

    #[test]
    fn test_deserialize_dispatches_on_type_field() {
        let json = r#"{"id":7,"selectable":true,"type":"arrow",
            "start":{"x":0.0,"y":0.0},"end":{"x":10.0,"y":0.0},
            "stroke_color":{"r":1.0,"g":0.0,"b":0.0},"stroke_width":2.0}"#;
        let obj: AnnotationObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.id, ObjectId(7));
        assert!(matches!(obj.kind, AnnotationKind::Arrow(ref a) if a.end == Point::new(10.0, 0.0)));

        let unknown = json.replace("\"arrow\"", "\"polygon\"");
        assert!(serde_json::from_str::<AnnotationObject>(&unknown).is_err());
    }

    #[test]
    fn test_rectangle_bounds_include_stroke() {
        let rect = AnnotationObject::rectangle(
            ObjectId(1),
            Point::new(100.0, 100.0),
            100.0,
            50.0,
            ShapeColor::BLACK,
            2.0,
        );
        assert_eq!(rect.bounds(), Bounds::new(99.0, 99.0, 201.0, 151.0));
    }

    #[test]
    fn test_negative_rectangle_size_normalizes_bounds() {
        let rect = AnnotationObject::rectangle(
            ObjectId(1),
            Point::new(50.0, 50.0),
            -20.0,
            -10.0,
            ShapeColor::BLACK,
            0.0,
        );
        assert_eq!(rect.bounds(), Bounds::new(30.0, 40.0, 50.0, 50.0));
    }

    #[test]
    fn test_text_bounds_scale_with_content() {
        let text = AnnotationObject::text(ObjectId(1), Point::new(0.0, 0.0), "abcd", "Arial", 20.0, ShapeColor::BLACK);
        let b = text.bounds();
        assert_eq!(b.width(), 4.0 * 20.0 * TEXT_ADVANCE);
        assert_eq!(b.height(), 20.0 * TEXT_LINE_HEIGHT);
    }

    #[test]
    fn test_translate_moves_every_point() {
        let mut path = AnnotationObject::freehand(ObjectId(1), Point::new(1.0, 1.0), ShapeColor::BLACK, 2.0);
        if let AnnotationKind::FreehandPath(p) = &mut path.kind {
            p.points.push(Point::new(3.0, 4.0));
        }
        path.translate(10.0, -1.0);
        let AnnotationKind::FreehandPath(p) = &path.kind else {
            unreachable!()
        };
        assert_eq!(p.points, vec![Point::new(11.0, 0.0), Point::new(13.0, 3.0)]);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
    }
}
