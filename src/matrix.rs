//! 2D affine matrices (§4.10 step 4: the appearance-placement matrix, and general `cm`
//! construction). A row-major 3x2-as-4x4 multiply, keeping only the six entries PDF's
//! `cm` operator cares about.

use crate::units::Pt;

/// A PDF-style `[a b c d e f]` matrix representing
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix(pub [f32; 6]);

impl Matrix {
    pub const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub fn translate(x: Pt, y: Pt) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, x.0, y.0])
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Matrix([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Clockwise rotation in degrees.
    pub fn rotate(degrees: f32) -> Self {
        let rad = (360.0 - degrees).to_radians();
        Matrix([rad.cos(), -rad.sin(), rad.sin(), rad.cos(), 0.0, 0.0])
    }

    /// `self` applied first, then `other` (matches PDF's left-to-right `cm` composition:
    /// concatenating `cm` B after `cm` A yields the matrix product A x B).
    pub fn then(&self, other: &Matrix) -> Matrix {
        let a = self.0;
        let b = other.0;
        Matrix([
            a[0] * b[0] + a[1] * b[2],
            a[0] * b[1] + a[1] * b[3],
            a[2] * b[0] + a[3] * b[2],
            a[2] * b[1] + a[3] * b[3],
            a[4] * b[0] + a[5] * b[2] + b[4],
            a[4] * b[1] + a[5] * b[3] + b[5],
        ])
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let m = self.0;
        (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
    }

    /// Transforms an axis-aligned box's four corners and returns the new axis-aligned
    /// bounding box `[x1, y1, x2, y2]` (used to apply an appearance's own `/Matrix`
    /// before computing the placement matrix, §4.10 step 4).
    pub fn transform_bbox(&self, bbox: [f32; 4]) -> [f32; 4] {
        let corners = [
            self.apply(bbox[0], bbox[1]),
            self.apply(bbox[2], bbox[1]),
            self.apply(bbox[2], bbox[3]),
            self.apply(bbox[0], bbox[3]),
        ];
        let xs = corners.iter().map(|p| p.0);
        let ys = corners.iter().map(|p| p.1);
        let x1 = xs.clone().fold(f32::INFINITY, f32::min);
        let x2 = xs.fold(f32::NEG_INFINITY, f32::max);
        let y1 = ys.clone().fold(f32::INFINITY, f32::min);
        let y2 = ys.fold(f32::NEG_INFINITY, f32::max);
        [x1, y1, x2, y2]
    }
}

impl From<Matrix> for crate::content::Operand {
    fn from(m: Matrix) -> Self {
        crate::content::Operand::Array(m.0.iter().map(|v| crate::content::Operand::Number(*v as f64)).collect())
    }
}

/// The translate+scale matrix that maps `transformed_bbox` onto `widget_rect` (§4.10
/// step 4). Rotation is assumed already baked into `transformed_bbox` by the caller
/// applying the appearance's own `/Matrix` first — this function never rotates.
pub fn placement_matrix(transformed_bbox: [f32; 4], widget_rect: [f32; 4]) -> Matrix {
    let (bx1, by1, bx2, by2) = (transformed_bbox[0], transformed_bbox[1], transformed_bbox[2], transformed_bbox[3]);
    let (rx1, ry1, rx2, ry2) = (widget_rect[0], widget_rect[1], widget_rect[2], widget_rect[3]);
    let bw = (bx2 - bx1).abs();
    let bh = (by2 - by1).abs();
    let rw = (rx2 - rx1).abs();
    let rh = (ry2 - ry1).abs();
    let sx = if bw > 0.0 { rw / bw } else { 1.0 };
    let sy = if bh > 0.0 { rh / bh } else { 1.0 };
    let tx = rx1.min(rx2) - bx1.min(bx2) * sx;
    let ty = ry1.min(ry2) - by1.min(by2) * sy;
    Matrix([sx, 0.0, 0.0, sy, tx, ty])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_matches_cm_operands() {
        let m = Matrix::translate(Pt(150.0), Pt(50.0));
        assert_eq!(m.0, [1.0, 0.0, 0.0, 1.0, 150.0, 50.0]);
    }

    #[test]
    fn scale_matches_cm_operands() {
        let m = Matrix::scale(2.0, 4.0);
        assert_eq!(m.0, [2.0, 0.0, 0.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn rotate_matches_reference() {
        let m = Matrix::rotate(30.0);
        assert!((m.0[0] - 0.8660253).abs() < 1e-5);
        assert!((m.0[1] - 0.5000002).abs() < 1e-5);
    }

    #[test]
    fn placement_maps_bbox_onto_rect() {
        let m = placement_matrix([0.0, 0.0, 100.0, 50.0], [10.0, 10.0, 60.0, 35.0]);
        let (x1, y1) = m.apply(0.0, 0.0);
        let (x2, y2) = m.apply(100.0, 50.0);
        assert!((x1 - 10.0).abs() < 1e-4 && (y1 - 10.0).abs() < 1e-4);
        assert!((x2 - 60.0).abs() < 1e-4 && (y2 - 35.0).abs() < 1e-4);
    }

    #[test]
    fn identity_then_identity_is_identity() {
        assert_eq!(Matrix::IDENTITY.then(&Matrix::IDENTITY), Matrix::IDENTITY);
    }
}
