//! PNG raster output drawn with imageproc: even-odd filled shapes, 1px outlines, title text.

use std::path::Path;

use ab_glyph::{FontRef, PxScale};
use anyhow::{Context, Result, anyhow};
use image::{GrayImage, ImageFormat, Luma, Rgb as Pixel, RgbImage};
use imageproc::{
    drawing::{draw_line_segment_mut, draw_polygon_mut, draw_text_mut, text_size},
    point::Point,
};

use crate::plot::{Rgb, Scene};

const FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Rasterize a scene and write it as a PNG file, overwriting any existing file.
pub(crate) fn write_scene_to_png(path: &Path, scene: &Scene) -> Result<()> {
    rasterize(scene)?
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("[io::png] Failed to write {}", path.display()))
}

/// Rasterize a scene into an RGB image of `scene.width` x `scene.height` pixels.
pub(crate) fn rasterize(scene: &Scene) -> Result<RgbImage> {
    let mut image = RgbImage::from_pixel(scene.width, scene.height, pixel(Rgb::WHITE));

    for shape in &scene.shapes {
        fill_rings(&mut image, &shape.rings, pixel(shape.fill));
        if let Some(stroke) = shape.stroke {
            for ring in &shape.rings {
                for edge in ring.windows(2) {
                    let (a, b) = (edge[0], edge[1]);
                    draw_line_segment_mut(&mut image, (a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32), pixel(stroke));
                }
            }
        }
    }

    if !scene.labels.is_empty() {
        let font = FontRef::try_from_slice(FONT)
            .map_err(|err| anyhow!("[io::png] Failed to load the title font: {err}"))?;

        // Labels are anchored at their horizontal center and baseline, as in SVG.
        for label in &scene.labels {
            let scale = PxScale::from(label.size as f32);
            let (w, h) = text_size(scale, &font, &label.text);
            let x = label.x.round() as i32 - w as i32 / 2;
            let y = label.y.round() as i32 - h as i32;
            draw_text_mut(&mut image, pixel(Rgb::BLACK), x, y, scale, &font, &label.text);
        }
    }

    Ok(image)
}

#[inline]
fn pixel(color: Rgb) -> Pixel<u8> { Pixel([color.r, color.g, color.b]) }

/// Fill the area enclosed by `rings` with the even-odd rule.
/// Each ring is filled into a mask over the shape's clipped bounding box and XORed in,
/// so holes stay empty without painting over anything drawn earlier.
fn fill_rings(image: &mut RgbImage, rings: &[Vec<(f64, f64)>], color: Pixel<u8>) {
    let (width, height) = image.dimensions();

    let (x_min, y_min, x_max, y_max) = rings.iter().flatten().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    );
    if !x_min.is_finite() || x_max < 0.0 || y_max < 0.0 { return }

    let (left, top) = (x_min.floor().max(0.0) as u32, y_min.floor().max(0.0) as u32);
    let right = (x_max.ceil().max(0.0) as u32).min(width.saturating_sub(1));
    let bottom = (y_max.ceil().max(0.0) as u32).min(height.saturating_sub(1));
    if left > right || top > bottom { return }

    let (mask_w, mask_h) = (right - left + 1, bottom - top + 1);
    let mut mask = GrayImage::new(mask_w, mask_h);

    for ring in rings {
        let points = ring_points(ring, left, top);
        if points.len() < 3 { continue }

        let mut layer = GrayImage::new(mask_w, mask_h);
        draw_polygon_mut(&mut layer, &points, Luma([1]));
        for (m, l) in mask.pixels_mut().zip(layer.pixels()) {
            m.0[0] ^= l.0[0];
        }
    }

    for (x, y, value) in mask.enumerate_pixels() {
        if value.0[0] == 1 {
            image.put_pixel(left + x, top + y, color);
        }
    }
}

/// Ring vertices as integer points relative to (`left`, `top`), without repeated
/// neighbours or a closing vertex, which `draw_polygon_mut` rejects.
fn ring_points(ring: &[(f64, f64)], left: u32, top: u32) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(ring.len());
    for &(x, y) in ring {
        let point = Point::new(x.round() as i32 - left as i32, y.round() as i32 - top as i32);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::scene::Shape;

    fn square_scene(stroke: Option<Rgb>) -> Scene {
        let mut scene = Scene::new((0.2, 0.2), 100); // 20 x 20 px
        scene.shapes.push(Shape {
            rings: vec![
                vec![(2.0, 2.0), (18.0, 2.0), (18.0, 18.0), (2.0, 18.0), (2.0, 2.0)],
                vec![(8.0, 8.0), (12.0, 8.0), (12.0, 12.0), (8.0, 12.0), (8.0, 8.0)],
            ],
            fill: Rgb::parse("blue").unwrap(),
            stroke,
        });
        scene
    }

    #[test]
    fn fills_interior_and_leaves_holes_empty() {
        let image = rasterize(&square_scene(None)).unwrap();
        assert_eq!(image.dimensions(), (20, 20));

        let blue = Pixel([0, 0, 255]);
        let white = Pixel([255, 255, 255]);
        assert_eq!(*image.get_pixel(4, 4), blue);
        assert_eq!(*image.get_pixel(15, 15), blue);
        assert_eq!(*image.get_pixel(10, 10), white); // inside the hole
        assert_eq!(*image.get_pixel(0, 0), white);
        assert_eq!(*image.get_pixel(19, 19), white);
    }

    #[test]
    fn holes_do_not_erase_earlier_shapes() {
        let mut scene = square_scene(None);
        // An enclave drawn first, sitting inside the hole of the square drawn after it.
        scene.shapes.insert(0, Shape {
            rings: vec![vec![(9.0, 9.0), (11.0, 9.0), (11.0, 11.0), (9.0, 11.0), (9.0, 9.0)]],
            fill: Rgb::parse("red").unwrap(),
            stroke: None,
        });
        let image = rasterize(&scene).unwrap();
        assert_eq!(*image.get_pixel(10, 10), Pixel([255, 0, 0]));
    }

    #[test]
    fn outlines_are_drawn_on_top() {
        let image = rasterize(&square_scene(Some(Rgb::BLACK))).unwrap();
        assert_eq!(*image.get_pixel(10, 2), Pixel([0, 0, 0]));
        assert_eq!(*image.get_pixel(2, 10), Pixel([0, 0, 0]));
    }

    #[test]
    fn shapes_outside_the_canvas_are_clipped() {
        let mut scene = Scene::new((0.1, 0.1), 100);
        scene.shapes.push(Shape {
            rings: vec![vec![(-50.0, -50.0), (50.0, -50.0), (50.0, 50.0), (-50.0, 50.0), (-50.0, -50.0)]],
            fill: Rgb::BLACK,
            stroke: Some(Rgb::BLACK),
        });
        let image = rasterize(&scene).unwrap();
        assert!(image.pixels().all(|p| *p == Pixel([0, 0, 0])));
    }

    #[test]
    fn labels_are_rasterized() {
        let mut scene = Scene::new((2.0, 0.4), 100); // 200 x 40 px
        scene.add_label(100.0, 30.0, 20.0, "Macro Polygons");
        let image = rasterize(&scene).unwrap();

        let white = Pixel([255, 255, 255]);
        let inked = (10..30).flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|&(x, y)| *image.get_pixel(x, y) != white)
            .count();
        assert!(inked > 50, "only {inked} title pixels drawn");
        // Text stays centered: nothing near the left edge.
        assert!((0..40).all(|y| *image.get_pixel(0, y) == white));
    }

    #[test]
    fn ring_points_drop_the_closing_vertex() {
        let points = ring_points(&[(0.0, 0.0), (4.0, 0.0), (4.0, 0.2), (4.0, 4.0), (0.0, 0.0)], 0, 0);
        assert_eq!(points, vec![Point::new(0, 0), Point::new(4, 0), Point::new(4, 4)]);
    }
}
