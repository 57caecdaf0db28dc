//! Affine transforms as six coefficients `(m11, m21, m12, m22, dx, dy)`.
//!
//! The coefficient order follows the classic 2D graphics convention:
//! `x' = m11*x + m12*y + dx` and `y' = m21*x + m22*y + dy`.

use super::Point;

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trafo {
    pub m11: f64,
    pub m21: f64,
    pub m12: f64,
    pub m22: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Trafo {
    fn default() -> Self {
        Trafo::IDENTITY
    }
}

impl Trafo {
    pub const IDENTITY: Trafo = Trafo {
        m11: 1.0,
        m21: 0.0,
        m12: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn new(m11: f64, m21: f64, m12: f64, m22: f64, dx: f64, dy: f64) -> Self {
        Trafo {
            m11,
            m21,
            m12,
            m22,
            dx,
            dy,
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Trafo::new(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Trafo::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians around `center`.
    pub fn rotation(angle: f64, center: Point) -> Self {
        let m21 = angle.sin();
        let m11 = angle.cos();
        let dx = center.x - m11 * center.x + m21 * center.y;
        let dy = center.y - m21 * center.x - m11 * center.y;
        Trafo::new(m11, m21, -m21, m11, dx, dy)
    }

    /// Map a point through this transform.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.m11 * p.x + self.m12 * p.y + self.dx,
            self.m21 * p.x + self.m22 * p.y + self.dy,
        )
    }

    /// Compose: the result applies `self` first, then `other`.
    ///
    /// Composition is associative; it is not commutative.
    pub fn then(&self, other: &Trafo) -> Trafo {
        Trafo {
            m11: other.m11 * self.m11 + other.m12 * self.m21,
            m12: other.m11 * self.m12 + other.m12 * self.m22,
            m21: other.m21 * self.m11 + other.m22 * self.m21,
            m22: other.m21 * self.m12 + other.m22 * self.m22,
            dx: other.m11 * self.dx + other.m12 * self.dy + other.dx,
            dy: other.m21 * self.dx + other.m22 * self.dy + other.dy,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// Inverse transform, `None` when this transform is singular.
    pub fn invert(&self) -> Option<Trafo> {
        let det = self.determinant();
        if det.abs() < 1e-13 {
            return None;
        }
        Some(Trafo {
            m11: self.m22 / det,
            m12: -self.m12 / det,
            m21: -self.m21 / det,
            m22: self.m11 / det,
            dx: (self.m12 * self.dy - self.m22 * self.dx) / det,
            dy: (self.m21 * self.dx - self.m11 * self.dy) / det,
        })
    }

    /// Coefficients in storage order `(m11, m21, m12, m22, dx, dy)`.
    pub fn coeffs(&self) -> [f64; 6] {
        [self.m11, self.m21, self.m12, self.m22, self.dx, self.dy]
    }

    pub fn from_coeffs(c: [f64; 6]) -> Self {
        Trafo::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Point, b: Point, eps: f64) -> bool {
        (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps
    }

    #[test]
    fn test_identity_apply() {
        let p = Point::new(3.5, -2.0);
        assert_eq!(Trafo::IDENTITY.apply(p), p);
    }

    #[test]
    fn test_compose_order() {
        // Scale then translate is not translate then scale.
        let s = Trafo::scale(2.0, 2.0);
        let t = Trafo::translation(1.0, 0.0);
        let p = Point::new(1.0, 1.0);
        assert_eq!(s.then(&t).apply(p), Point::new(3.0, 2.0));
        assert_eq!(t.then(&s).apply(p), Point::new(4.0, 2.0));
    }

    #[test]
    fn test_compose_associative() {
        let a = Trafo::rotation(0.7, Point::new(1.0, 2.0));
        let b = Trafo::scale(1.5, 0.25);
        let c = Trafo::translation(-4.0, 9.0);
        let p = Point::new(2.0, -3.0);
        let left = a.then(&b).then(&c).apply(p);
        let right = a.then(&b.then(&c)).apply(p);
        assert!(close(left, right, 1e-9));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Trafo::scale(0.0, 1.0).invert().is_none());
        assert!(Trafo::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0).invert().is_none());
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let r = Trafo::rotation(std::f64::consts::FRAC_PI_2, Point::ZERO);
        assert!(close(r.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0), 1e-12));
    }

    proptest! {
        #[test]
        fn prop_inverse_round_trips_points(
            m11 in -5.0f64..5.0, m21 in -5.0f64..5.0,
            m12 in -5.0f64..5.0, m22 in -5.0f64..5.0,
            dx in -100.0f64..100.0, dy in -100.0f64..100.0,
            px in -100.0f64..100.0, py in -100.0f64..100.0,
        ) {
            let t = Trafo::new(m11, m21, m12, m22, dx, dy);
            prop_assume!(t.determinant().abs() > 1e-3);
            let p = Point::new(px, py);
            let inv = t.invert().unwrap();
            let back = inv.apply(t.apply(p));
            prop_assert!(close(back, p, 1e-6));

            // compose(t, inverse(t)) == identity within tolerance
            let id = t.then(&inv);
            prop_assert!((id.m11 - 1.0).abs() < 1e-6 && (id.m22 - 1.0).abs() < 1e-6);
            prop_assert!(id.m12.abs() < 1e-6 && id.m21.abs() < 1e-6);
            prop_assert!(id.dx.abs() < 1e-4 && id.dy.abs() < 1e-4);
        }
    }
}
