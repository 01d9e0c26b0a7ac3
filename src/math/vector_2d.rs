use super::Vector2;

/// Rotates a 2D vector anti-clockwise by `theta` radians.
#[must_use]
pub fn rotate_ccw(v: &Vector2, theta: f64) -> Vector2 {
    let (s, c) = theta.sin_cos();
    Vector2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Returns the vector rotated 90° anti-clockwise.
#[must_use]
pub fn perp_ccw(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Which side of the directed line `(x1, y1) → (x2, y2)` the point `(xp, yp)`
/// lies on.
///
/// Positive → right of the line, negative → left, zero → collinear.
#[must_use]
pub fn side_of_line(xp: f64, yp: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((xp - x1) * (y2 - y1)) - ((yp - y1) * (x2 - x1))
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate_ccw(&Vector2::new(1.0, 0.0), FRAC_PI_2);
        assert!((v.x).abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_preserves_norm() {
        let v = rotate_ccw(&Vector2::new(3.0, 4.0), 1.234);
        assert!((v.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn perp_is_quarter_turn() {
        let v = Vector2::new(2.0, 1.0);
        let p = perp_ccw(&v);
        assert!((p.x + 1.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!(v.dot(&p).abs() < 1e-12);
    }

    #[test]
    fn side_signs() {
        // Line along +x; (1, -1) is on the right, (1, 1) on the left.
        assert!(side_of_line(1.0, -1.0, 0.0, 0.0, 2.0, 0.0) > 0.0);
        assert!(side_of_line(1.0, 1.0, 0.0, 0.0, 2.0, 0.0) < 0.0);
        assert!(side_of_line(1.0, 0.0, 0.0, 0.0, 2.0, 0.0).abs() < 1e-12);
    }
}
