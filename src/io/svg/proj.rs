/// Append a projected ring as an SVG subpath: "M x,y L x,y ... Z"
pub(crate) fn ring_to_path(ring: &[(f64, f64)], out: &mut String) {
    let Some(&(x, y)) = ring.first() else { return };
    out.push_str(&format!(" M{x:.3},{y:.3}"));
    for &(x, y) in &ring[1..] {
        out.push_str(&format!(" L{x:.3},{y:.3}"));
    }
    out.push('Z');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_path_is_closed() {
        let mut out = String::new();
        ring_to_path(&[(0.0, 0.0), (1.0, 0.5), (0.0, 1.0)], &mut out);
        assert_eq!(out, " M0.000,0.000 L1.000,0.500 L0.000,1.000Z");
    }

    #[test]
    fn empty_ring_writes_nothing() {
        let mut out = String::new();
        ring_to_path(&[], &mut out);
        assert!(out.is_empty());
    }
}
