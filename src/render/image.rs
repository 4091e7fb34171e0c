//! Image rendering for annotations using tiny-skia
//!
//! These functions composite the base image and annotations into an
//! RgbaImage, for the on-screen surface, for cropping and for export.

use image::RgbaImage;
use image::imageops::FilterType;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{self, arrow, shape};
use super::text::FontBook;
use crate::config::ShapeColor;
use crate::domain::{
    AnnotationKind, AnnotationObject, ArrowAnnotation, CircleOutlineAnnotation, PathAnnotation,
    Point, RectOutlineAnnotation,
};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

fn paint_for(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Build an arrow path as stroked lines (shaft + two angled head lines)
fn build_arrow_path(start: Point, end: Point, stroke_width: f32, scale: f32) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for (from, to) in arrow::segments(start, end, stroke_width) {
        pb.move_to(from.x * scale, from.y * scale);
        pb.line_to(to.x * scale, to.y * scale);
    }
    pb.finish()
}

/// Build a circle path using cubic bezier curves
fn build_circle_path(cx: f32, cy: f32, r: f32) -> Option<tiny_skia::Path> {
    let k = r * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - r);

    // Top to right
    pb.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);

    // Right to bottom
    pb.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);

    // Bottom to left
    pb.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);

    // Left to top
    pb.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);

    pb.close();
    pb.finish()
}

fn draw_path(pixmap: &mut Pixmap, path: &PathAnnotation, scale: f32) {
    let paint = paint_for(path.stroke_color);
    let width = path.stroke_width * scale;
    let Some(first) = path.points.first() else {
        return;
    };

    // A path whose points all coincide is a dot
    if path.points.iter().all(|p| p == first) {
        if let Some(dot) = PathBuilder::from_circle(first.x * scale, first.y * scale, (width / 2.0).max(0.5)) {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x * scale, first.y * scale);
    for p in &path.points[1..] {
        pb.line_to(p.x * scale, p.y * scale);
    }
    if let Some(p) = pb.finish() {
        pixmap.stroke_path(&p, &paint, &round_stroke(width), Transform::identity(), None);
    }
}

fn draw_rect(pixmap: &mut Pixmap, rect: &RectOutlineAnnotation, scale: f32) {
    let x1 = rect.position.x * scale;
    let y1 = rect.position.y * scale;
    let x2 = (rect.position.x + rect.width) * scale;
    let y2 = (rect.position.y + rect.height) * scale;
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(x1, y1, x2, y2);

    let mut pb = PathBuilder::new();
    pb.move_to(min_x, min_y);
    pb.line_to(max_x, min_y);
    pb.line_to(max_x, max_y);
    pb.line_to(min_x, max_y);
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width: rect.stroke_width * scale,
        line_join: LineJoin::Miter,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint_for(rect.stroke_color), &stroke, Transform::identity(), None);
}

fn draw_circle(pixmap: &mut Pixmap, circle: &CircleOutlineAnnotation, scale: f32) {
    let center = circle.center();
    let r = (circle.radius * scale).max(0.5);
    let Some(path) = build_circle_path(center.x * scale, center.y * scale, r) else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &paint_for(circle.stroke_color),
        &round_stroke(circle.stroke_width * scale),
        Transform::identity(),
        None,
    );
}

fn draw_arrow(pixmap: &mut Pixmap, arrow_ann: &ArrowAnnotation, scale: f32) {
    let Some(path) = build_arrow_path(arrow_ann.start, arrow_ann.end, arrow_ann.stroke_width, scale) else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &paint_for(arrow_ann.stroke_color),
        &round_stroke(arrow_ann.stroke_width * scale),
        Transform::identity(),
        None,
    );
}

/// Draw a run of non-text objects in one pixmap pass
fn draw_shapes(img: &mut RgbaImage, objects: &[AnnotationObject], scale: f32) {
    if objects.is_empty() {
        return;
    }

    with_pixmap(img, |pixmap| {
        for object in objects {
            match &object.kind {
                AnnotationKind::FreehandPath(path) => draw_path(pixmap, path, scale),
                AnnotationKind::Rectangle(rect) => draw_rect(pixmap, rect, scale),
                AnnotationKind::Circle(circle) => draw_circle(pixmap, circle, scale),
                AnnotationKind::Arrow(arrow_ann) => draw_arrow(pixmap, arrow_ann, scale),
                AnnotationKind::TextLabel(_) => {}
            }
        }
    });
}

/// Draw all annotations in list order (later entries on top)
///
/// `scale` maps display coordinates to pixels of `img`.
pub fn draw_annotations_in_order(
    img: &mut RgbaImage,
    annotations: &[AnnotationObject],
    scale: f32,
    fonts: &FontBook,
) {
    let mut run_start = 0;
    for (i, annotation) in annotations.iter().enumerate() {
        if let AnnotationKind::TextLabel(text) = &annotation.kind {
            draw_shapes(img, &annotations[run_start..i], scale);
            fonts.draw(img, text, scale);
            run_start = i + 1;
        }
    }
    draw_shapes(img, &annotations[run_start..], scale);
}

/// Composite `base` (stretched to `width x height`) with every annotation
pub fn render_composite(
    base: &RgbaImage,
    width: u32,
    height: u32,
    annotations: &[AnnotationObject],
    scale: f32,
    fonts: &FontBook,
) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let mut img = if base.dimensions() == (width, height) {
        base.clone()
    } else {
        image::imageops::resize(base, width, height, FilterType::Lanczos3)
    };
    draw_annotations_in_order(&mut img, annotations, scale, fonts);
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObjectId;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: ShapeColor = ShapeColor {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, WHITE)
    }

    #[test]
    fn test_rectangle_outline_leaves_interior() {
        let mut img = white(100, 100);
        let rect = AnnotationObject::rectangle(ObjectId(1), Point::new(10.0, 10.0), 50.0, 50.0, RED, 4.0);
        draw_annotations_in_order(&mut img, &[rect], 1.0, &FontBook::default());
        assert_eq!(img.get_pixel(10, 35), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(35, 35), &WHITE);
    }

    #[test]
    fn test_arrow_shaft_is_drawn() {
        let mut img = white(200, 100);
        let arrow_obj = AnnotationObject::arrow(ObjectId(1), Point::new(50.0, 50.0), Point::new(150.0, 50.0), RED, 4.0);
        draw_annotations_in_order(&mut img, &[arrow_obj], 1.0, &FontBook::default());
        assert_eq!(img.get_pixel(100, 50), &Rgba([255, 0, 0, 255]));
        // Heads point backwards, nothing ahead of the tip
        assert_eq!(img.get_pixel(170, 50), &WHITE);
    }

    #[test]
    fn test_scale_maps_display_to_pixels() {
        let mut img = white(300, 300);
        let circle = AnnotationObject::circle(ObjectId(1), Point::new(0.0, 0.0), 50.0, RED, 2.0);
        draw_annotations_in_order(&mut img, &[circle], 3.0, &FontBook::default());
        // Leftmost point of the circle at (0, 150) in pixel space
        assert_eq!(img.get_pixel(1, 150).0[1], 0);
        assert_eq!(img.get_pixel(150, 150), &WHITE);
    }

    #[test]
    fn test_later_objects_draw_on_top() {
        let blue = ShapeColor { r: 0.0, g: 0.0, b: 1.0 };
        let mut img = white(50, 50);
        let under = AnnotationObject::rectangle(ObjectId(1), Point::new(10.0, 10.0), 30.0, 30.0, RED, 6.0);
        let over = AnnotationObject::rectangle(ObjectId(2), Point::new(10.0, 10.0), 30.0, 30.0, blue, 6.0);
        draw_annotations_in_order(&mut img, &[under, over], 1.0, &FontBook::default());
        assert_eq!(img.get_pixel(10, 25), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_single_point_path_draws_a_dot() {
        let mut img = white(20, 20);
        let dot = AnnotationObject::freehand(ObjectId(1), Point::new(10.0, 10.0), RED, 6.0);
        draw_annotations_in_order(&mut img, &[dot], 1.0, &FontBook::default());
        assert_eq!(img.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_render_composite_is_idempotent() {
        let base = white(40, 30);
        let objects = vec![AnnotationObject::arrow(ObjectId(1), Point::new(2.0, 2.0), Point::new(30.0, 20.0), RED, 2.0)];
        let fonts = FontBook::default();
        let a = render_composite(&base, 80, 60, &objects, 2.0, &fonts);
        let b = render_composite(&base, 80, 60, &objects, 2.0, &fonts);
        assert_eq!(a.dimensions(), (80, 60));
        assert_eq!(a, b);
    }
}
