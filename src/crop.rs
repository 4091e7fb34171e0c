//! Destructive crop of the composited canvas
//!
//! The region is clamped and rounded in display space, the committed surface
//! is rasterised at display resolution and cut to exactly the region. The
//! result becomes the new base image.

use image::imageops;

use crate::canvas::{BaseImage, CanvasSurface, render_objects};
use crate::domain::{AnnotationObject, CropRegion};
use crate::error::{EditorError, Result};
use crate::render::text::FontBook;

/// Whole-pixel rectangle inside the display-size raster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Clamp `region` to a `canvas_size` raster and round to whole pixels.
/// A region that is empty or inverted after clamping is rejected.
pub fn clamp_region(region: CropRegion, canvas_size: (u32, u32)) -> Result<PixelRect> {
    let (cw, ch) = (canvas_size.0 as f32, canvas_size.1 as f32);
    let invalid = |width: f32, height: f32| EditorError::InvalidCropRegion { width, height };
    if ![region.left, region.top, region.width, region.height]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(invalid(region.width, region.height));
    }

    let left = region.left.max(0.0).round();
    let top = region.top.max(0.0).round();
    let right = region.right().min(cw).round();
    let bottom = region.bottom().min(ch).round();
    let (width, height) = (right - left, bottom - top);
    if width <= 0.0 || height <= 0.0 {
        return Err(invalid(width, height));
    }

    Ok(PixelRect {
        x: left as u32,
        y: top as u32,
        width: width as u32,
        height: height as u32,
    })
}

/// Flatten `objects` over the base and cut out `region`, refitted to `viewport`
pub fn crop_objects(
    base: &BaseImage,
    objects: &[AnnotationObject],
    region: CropRegion,
    fonts: &FontBook,
    viewport: (u32, u32),
) -> Result<BaseImage> {
    let composite = render_objects(base, objects, 1.0, fonts);
    let rect = clamp_region(region, composite.dimensions())?;
    let cropped = imageops::crop_imm(&composite, rect.x, rect.y, rect.width, rect.height).to_image();
    log::info!(
        "Cropped {}x{} canvas to {}x{} at ({}, {})",
        composite.width(),
        composite.height(),
        rect.width,
        rect.height,
        rect.x,
        rect.y
    );
    Ok(BaseImage::from_rgba(cropped, base.source(), viewport))
}

/// Crop the canvas's current object list
pub fn apply_crop(
    canvas: &CanvasSurface,
    region: CropRegion,
    fonts: &FontBook,
    viewport: (u32, u32),
) -> Result<BaseImage> {
    crop_objects(canvas.base(), canvas.objects(), region, fonts, viewport)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{ObjectId, Point};

    #[test]
    fn test_clamp_rounds_and_limits() {
        let rect = clamp_region(CropRegion::new(-20.0, 10.4, 900.0, 99.7), (800, 600)).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x: 0,
                y: 10,
                width: 800,
                height: 100
            }
        );
    }

    #[test]
    fn test_inverted_region_is_invalid() {
        let err = clamp_region(CropRegion::new(300.0, 300.0, -100.0, -50.0), (800, 600)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidCropRegion { width, height } if width < 0.0 && height < 0.0));
        assert!(clamp_region(CropRegion::new(300.0, 300.0, 100.0, -50.0), (800, 600)).is_err());
    }

    #[test]
    fn test_region_outside_canvas_is_invalid() {
        let err = clamp_region(CropRegion::new(900.0, 0.0, 50.0, 50.0), (800, 600)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidCropRegion { width, .. } if width < 0.0));
        assert!(clamp_region(CropRegion::new(10.0, 10.0, 0.2, 40.0), (800, 600)).is_err());
    }

    #[test]
    fn test_crop_keeps_region_pixels() {
        let mut img = RgbaImage::from_pixel(800, 600, Rgba([255, 255, 255, 255]));
        img.put_pixel(150, 100, Rgba([255, 0, 0, 255]));
        let base = BaseImage::from_rgba(img, "mem", (800, 600));
        let canvas = CanvasSurface::new(base);

        let cropped = apply_crop(
            &canvas,
            CropRegion::new(100.0, 75.0, 400.0, 300.0),
            &FontBook::default(),
            (800, 600),
        )
        .unwrap();
        assert_eq!((cropped.width(), cropped.height()), (400, 300));
        assert_eq!(cropped.pixels().get_pixel(50, 25), &Rgba([255, 0, 0, 255]));
        // Refitted to the viewport
        assert_eq!(cropped.display_size(), (800, 600));
    }

    #[test]
    fn test_crop_bakes_annotations_in() {
        let base = BaseImage::from_rgba(RgbaImage::from_pixel(800, 600, Rgba([255; 4])), "mem", (800, 600));
        let mut canvas = CanvasSurface::new(base);
        canvas.push(AnnotationObject::rectangle(
            ObjectId(1),
            Point::new(110.0, 110.0),
            50.0,
            50.0,
            ShapeColor::BLACK,
            4.0,
        ));
        let cropped = apply_crop(
            &canvas,
            CropRegion::new(100.0, 100.0, 100.0, 100.0),
            &FontBook::default(),
            (800, 600),
        )
        .unwrap();
        // Left edge of the rectangle outline at x = 110 lands at x = 10
        let px = cropped.pixels().get_pixel(10, 30);
        assert!(px[0] < 128, "expected dark stroke, got {:?}", px);
    }
}
