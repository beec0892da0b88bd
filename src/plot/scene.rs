//! Backend-independent figure description: shapes and labels in pixel coordinates.

use geo::{Coord, CoordsIter, LineString, MultiPolygon, Rect};

use crate::plot::Rgb;

/// Projection function: lon/lat -> figure coords (x,y), y down.
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// A filled shape made of closed rings, filled with the even-odd rule.
#[derive(Debug, Clone)]
pub(crate) struct Shape {
    pub(crate) rings: Vec<Vec<(f64, f64)>>,
    pub(crate) fill: Rgb,
    pub(crate) stroke: Option<Rgb>,
}

/// A centered text label.
#[derive(Debug, Clone)]
pub(crate) struct Label {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) size: f64,
    pub(crate) text: String,
}

/// Everything a backend needs to draw the figure.
#[derive(Debug, Clone)]
pub(crate) struct Scene {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) dpi: u32,
    pub(crate) shapes: Vec<Shape>,
    pub(crate) labels: Vec<Label>,
}

impl Scene {
    /// Create an empty scene for a figure of `size` inches at `dpi`.
    pub(crate) fn new(size: (f64, f64), dpi: u32) -> Self {
        Self {
            width: (size.0 * dpi as f64).round().max(1.0) as u32,
            height: (size.1 * dpi as f64).round().max(1.0) as u32,
            dpi,
            shapes: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Figure size in inches.
    pub(crate) fn inches(&self) -> (f64, f64) {
        (self.width as f64 / self.dpi as f64, self.height as f64 / self.dpi as f64)
    }

    /// Add a MultiPolygon, projected into figure coordinates.
    pub(crate) fn add_shape(&mut self, shape: &MultiPolygon<f64>, fill: Rgb, stroke: Option<Rgb>, project: &Projection) {
        let rings = shape.0.iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
            .map(|ring| project_ring(ring, project))
            .filter(|ring| ring.len() >= 3)
            .collect::<Vec<_>>();

        if !rings.is_empty() {
            self.shapes.push(Shape { rings, fill, stroke });
        }
    }

    pub(crate) fn add_label(&mut self, x: f64, y: f64, size: f64, text: &str) {
        self.labels.push(Label { x, y, size, text: text.to_string() });
    }
}

fn project_ring(ring: &LineString<f64>, project: &Projection) -> Vec<(f64, f64)> {
    ring.coords_iter().map(|coord| project(&coord)).collect()
}

/// Rectangle of the figure given to one panel, in pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Panel {
    pub(crate) x0: f64,
    pub(crate) y0: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Panel {
    /// Map lon/lat inside `bounds` onto this panel: aspect preserved, centered, Y inverted.
    pub(crate) fn projection(&self, bounds: Rect<f64>, margin: f64) -> Box<Projection> {
        let inner_w = (self.width - 2.0 * margin).max(1.0);
        let inner_h = (self.height - 2.0 * margin).max(1.0);

        let scale = match (bounds.width() > 0.0, bounds.height() > 0.0) {
            (true, true) => (inner_w / bounds.width()).min(inner_h / bounds.height()),
            (true, false) => inner_w / bounds.width(),
            (false, true) => inner_h / bounds.height(),
            (false, false) => 1.0,
        };

        // Center the drawing inside the panel.
        let x_off = self.x0 + margin + (inner_w - bounds.width() * scale) / 2.0;
        let y_off = self.y0 + margin + (inner_h - bounds.height() * scale) / 2.0;
        let (min_x, max_y) = (bounds.min().x, bounds.max().y);

        Box::new(move |coord: &Coord<f64>| -> (f64, f64) {
            let x = x_off + (coord.x - min_x) * scale;
            let y = y_off + (max_y - coord.y) * scale; // invert vertically
            (x, y)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::polygon;

    #[test]
    fn scene_size_follows_dpi() {
        let scene = Scene::new((12.0, 6.0), 300);
        assert_eq!((scene.width, scene.height), (3600, 1800));
        assert_eq!(scene.inches(), (12.0, 6.0));
    }

    #[test]
    fn projection_preserves_aspect_and_flips_y() {
        let panel = Panel { x0: 100.0, y0: 0.0, width: 100.0, height: 200.0 };
        let bounds = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 });
        let project = panel.projection(bounds, 0.0);

        // Square bounds in a tall panel: scale 10, vertically centered.
        let (x, y) = project(&Coord { x: 0.0, y: 10.0 });
        assert_abs_diff_eq!(x, 100.0);
        assert_abs_diff_eq!(y, 50.0);
        let (x, y) = project(&Coord { x: 10.0, y: 0.0 });
        assert_abs_diff_eq!(x, 200.0);
        assert_abs_diff_eq!(y, 150.0);
    }

    #[test]
    fn shapes_keep_holes_as_rings() {
        let mut scene = Scene::new((1.0, 1.0), 100);
        let shape = MultiPolygon(vec![polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0)]],
        )]);
        let identity = |c: &Coord<f64>| (c.x, c.y);
        scene.add_shape(&shape, Rgb::BLACK, None, &identity);
        assert_eq!(scene.shapes.len(), 1);
        assert_eq!(scene.shapes[0].rings.len(), 2);
    }
}
