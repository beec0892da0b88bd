use geo::Rect;
use rstar::{AABB, RTreeObject};

/// Envelope of one polygon record, stored in the set's R-tree.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, rect: Rect<f64>) -> Self {
        Self { idx, envelope: AABB::from_corners(rect.min().into(), rect.max().into()) }
    }

    /// Position of the record in its polygon set.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }

    /// Envelope grown by `eps` on every side. A zero `eps` still finds boxes that only share an edge or corner.
    pub(crate) fn padded(&self, eps: f64) -> AABB<[f64; 2]> {
        let ([x0, y0], [x1, y1]) = (self.envelope.lower(), self.envelope.upper());
        AABB::from_corners([x0 - eps, y0 - eps], [x1 + eps, y1 + eps])
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.envelope }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    #[test]
    fn padding_grows_every_side() {
        let bbox = BoundingBox::new(3, Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 1.0 }));
        let padded = bbox.padded(0.5);
        assert_eq!(padded.lower(), [-0.5, -0.5]);
        assert_eq!(padded.upper(), [2.5, 1.5]);
        assert_eq!(bbox.idx(), 3);
    }
}
