//! 4x4 matrix algebra over homogeneous coordinates.
//!
//! Cells are column-major: the cell at row `r`, column `c` lives at index
//! `r + 4 * c`. All arithmetic is carried out in `f64`.
//!
//! The crate holds one composition convention throughout: [`Matrix::mul`]
//! is the standard product `a · b`, and points are column vectors, so in
//! `a.mul(&b)` the transform `b` is applied to a point first. The
//! mutating [`TransformStack`] builder post-multiplies for the same
//! reason: each call composes a transform that runs *before* the ones
//! already recorded, which keeps chains reading in the usual
//! matrix-stack order.

use std::fmt;

use crate::Error;

/// An affine or projective transform of homogeneous 3D points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    cells: [f64; 16],
}

impl Matrix {
    /// The identity transform.
    pub fn identity() -> Matrix {
        let mut cells = [0.0; 16];
        for i in 0..4 {
            cells[i * 5] = 1.0;
        }
        Matrix { cells }
    }

    /// Scaling along the three axes.
    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Matrix {
        let mut m = Matrix::identity();
        m.cells[0] = sx;
        m.cells[5] = sy;
        m.cells[10] = sz;
        m
    }

    /// Translation by the given offsets.
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Matrix {
        let mut m = Matrix::identity();
        m.cells[12] = tx;
        m.cells[13] = ty;
        m.cells[14] = tz;
        m
    }

    /// Right-handed rotation about the x axis, in degrees.
    pub fn rotation_x(degrees: f64) -> Matrix {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut m = Matrix::identity();
        m.cells[5] = cos;
        m.cells[9] = -sin;
        m.cells[6] = sin;
        m.cells[10] = cos;
        m
    }

    /// Right-handed rotation about the y axis, in degrees.
    pub fn rotation_y(degrees: f64) -> Matrix {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut m = Matrix::identity();
        m.cells[0] = cos;
        m.cells[8] = sin;
        m.cells[2] = -sin;
        m.cells[10] = cos;
        m
    }

    /// Right-handed rotation about the z axis, in degrees.
    pub fn rotation_z(degrees: f64) -> Matrix {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut m = Matrix::identity();
        m.cells[0] = cos;
        m.cells[4] = -sin;
        m.cells[1] = sin;
        m.cells[5] = cos;
        m
    }

    /// OpenGL-style perspective projection.
    ///
    /// Fails when the vertical field of view has no usable cotangent
    /// (outside the open interval 0..180 degrees) or when the near and
    /// far planes coincide.
    pub fn perspective(fovy_degrees: f64, aspect: f64, near: f64, far: f64) -> Result<Matrix, Error> {
        // Checked on the angle itself: sin/cos of the half-angle never
        // round to exactly zero at 180 or 360 degrees.
        if !(fovy_degrees > 0.0 && fovy_degrees < 180.0) {
            return Err(Error::DegenerateProjection(
                "field of view has no usable cotangent",
            ));
        }
        if near == far {
            return Err(Error::DegenerateProjection("near and far planes coincide"));
        }
        let (sin, cos) = (fovy_degrees.to_radians() / 2.0).sin_cos();
        let cot = cos / sin;
        let a = 1.0 / (far - near);
        let mut cells = [0.0; 16];
        cells[0] = cot / aspect;
        cells[5] = cot;
        cells[10] = -(near + far) * a;
        cells[14] = -2.0 * near * far * a;
        cells[11] = -1.0;
        Ok(Matrix { cells })
    }

    /// OpenGL-style orthographic projection of a `width × height` view
    /// volume.
    pub fn orthographic(width: f64, height: f64, near: f64, far: f64) -> Result<Matrix, Error> {
        if width == 0.0 || height == 0.0 {
            return Err(Error::DegenerateProjection("zero view extent"));
        }
        if near == far {
            return Err(Error::DegenerateProjection("near and far planes coincide"));
        }
        let a = 1.0 / (far - near);
        let mut cells = [0.0; 16];
        cells[0] = 2.0 / width;
        cells[5] = 2.0 / height;
        cells[10] = -2.0 * a;
        cells[14] = -(far + near) * a;
        cells[15] = 1.0;
        Ok(Matrix { cells })
    }

    /// Standard matrix product `self · rhs`.
    ///
    /// `a.mul(&b).transform(p)` equals `a.transform(b.transform(p)?)`:
    /// the right operand is applied to a point first.
    pub fn mul(&self, rhs: &Matrix) -> Matrix {
        let mut cells = [0.0; 16];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    cells[i + 4 * j] += self.cells[i + 4 * k] * rhs.cells[k + 4 * j];
                }
            }
        }
        Matrix { cells }
    }

    /// Elementwise sum.
    pub fn add(&self, rhs: &Matrix) -> Matrix {
        let mut cells = self.cells;
        for (cell, other) in cells.iter_mut().zip(rhs.cells.iter()) {
            *cell += other;
        }
        Matrix { cells }
    }

    /// Elementwise difference.
    pub fn sub(&self, rhs: &Matrix) -> Matrix {
        let mut cells = self.cells;
        for (cell, other) in cells.iter_mut().zip(rhs.cells.iter()) {
            *cell -= other;
        }
        Matrix { cells }
    }

    /// Every cell multiplied by `k`.
    pub fn scaled(&self, k: f64) -> Matrix {
        let mut cells = self.cells;
        for cell in cells.iter_mut() {
            *cell *= k;
        }
        Matrix { cells }
    }

    /// Maps a point through the transform, dividing out the homogeneous
    /// weight.
    ///
    /// Fails when the weight is zero: the point maps to infinity and no
    /// finite coordinate would be meaningful.
    pub fn transform(&self, p: [f64; 3]) -> Result<[f64; 3], Error> {
        let c = &self.cells;
        let w = p[0] * c[3] + p[1] * c[7] + p[2] * c[11] + c[15];
        if w == 0.0 {
            return Err(Error::UndefinedMapping { x: p[0], y: p[1] });
        }
        let mut out = [0.0; 3];
        for (i, value) in out.iter_mut().enumerate() {
            *value = (p[0] * c[i] + p[1] * c[4 + i] + p[2] * c[8 + i] + c[12 + i]) / w;
        }
        Ok(out)
    }

    /// Recovers the planar source point that this transform maps onto
    /// `target`, assuming the transform encodes a planar (z = 0)
    /// projective map.
    ///
    /// From `w·x' = m11·x + m12·y + m14` and `w = m41·x + m42·y + m44`
    /// (and the same for y'), eliminating `w` leaves a 2x2 linear system
    /// in `(x, y)`. A zero determinant means the target is not reachable
    /// from the plane and fails explicitly.
    pub fn inverse_map(&self, target: (f64, f64)) -> Result<(f64, f64), Error> {
        let c = &self.cells;
        let (tx, ty) = target;
        let a00 = c[3] * tx - c[0];
        let a01 = c[7] * tx - c[4];
        let a10 = c[3] * ty - c[1];
        let a11 = c[7] * ty - c[5];
        let b0 = c[12] - c[15] * tx;
        let b1 = c[13] - c[15] * ty;
        let det = a01 * a10 - a00 * a11;
        if det == 0.0 {
            return Err(Error::SingularSystem);
        }
        Ok(((a01 * b1 - a11 * b0) / det, (a10 * b0 - a00 * b1) / det))
    }

    /// Solves the planar homography taking the `width × height` rectangle
    /// centered at the origin onto `corners`, given in the order
    /// bottom-left, top-left, bottom-right, top-right.
    ///
    /// The unknown matrix has rows (m11 m12 0 m14), (m21 m22 0 m24),
    /// (0 0 1 0), (m41 m42 0 1), and each corner correspondence
    /// contributes, per output axis,
    ///
    /// ```text
    /// x·m11 + y·m12 + m14 - x·x'·m41 - y·x'·m42 = x'
    /// ```
    ///
    /// With the rectangle corners at (±w/2, ±h/2), pairwise sums and
    /// differences of the four equations cancel everything but a single
    /// 2x2 system in (m41, m42); the six remaining coefficients then
    /// follow in closed form. Fails with a zero determinant (collinear or
    /// otherwise degenerate quadrilateral, or a zero rectangle extent)
    /// and never returns a partial matrix.
    pub fn from_corners(
        corners: [(f64, f64); 4],
        width: f64,
        height: f64,
    ) -> Result<Matrix, Error> {
        let [lb, lt, rb, rt] = corners;

        // Per output axis: differences d = (lt - rb, lb - rt) and sums
        // s = (lt + rb, lb + rt) of the corner images, the axis row of
        // the reduced 2x2 system and its right-hand side.
        let reduce = |p: [f64; 4]| {
            let d = [p[1] - p[2], p[0] - p[3]];
            let s = [p[1] + p[2], p[0] + p[3]];
            let row = [(d[0] - d[1]) * width, -(d[0] + d[1]) * height];
            let rhs = (s[0] - s[1]) * 2.0;
            (d, s, row, rhs)
        };

        let (dx, sx, row_x, rhs_x) = reduce([lb.0, lt.0, rb.0, rt.0]);
        let (dy, sy, row_y, rhs_y) = reduce([lb.1, lt.1, rb.1, rt.1]);

        let det = row_x[1] * row_y[0] - row_x[0] * row_y[1];
        if det == 0.0 {
            return Err(Error::SingularSystem);
        }
        let m41 = (row_x[1] * rhs_y - row_y[1] * rhs_x) / det;
        let m42 = (row_y[0] * rhs_x - row_x[0] * rhs_y) / det;

        // Back-substitution for one output row (m_1, m_2, m_4), from the
        // same sum/difference pairings:
        //   -w·m1 + h·m2 + (w/2)s0·m41 - (h/2)s0·m42 = d0
        //   -w·m1 - h·m2 + (w/2)s1·m41 + (h/2)s1·m42 = d1
        //    2·m4 + (w/2)d1·m41 + (h/2)d1·m42 = s1
        let back = |d: [f64; 2], s: [f64; 2]| {
            let ss = s[0] + s[1];
            let ds = s[0] - s[1];
            let sd = d[0] + d[1];
            let dd = d[0] - d[1];
            let m1 = 0.25 * ss * m41 - (0.25 * height * ds * m42 + 0.5 * sd) / width;
            let m2 = 0.25 * ss * m42 - (0.25 * width * ds * m41 - 0.5 * dd) / height;
            let m4 = 0.5 * s[1] - 0.25 * d[1] * (width * m41 + height * m42);
            [m1, m2, m4]
        };

        let mx = back(dx, sx);
        let my = back(dy, sy);

        Ok(Matrix {
            cells: [
                mx[0], my[0], 0.0, m41, // column 0
                mx[1], my[1], 0.0, m42, // column 1
                0.0, 0.0, 1.0, 0.0, // column 2
                mx[2], my[2], 0.0, 1.0, // column 3
            ],
        })
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            if r > 0 {
                writeln!(f)?;
            }
            for c in 0..4 {
                if c > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", self.cells[r + 4 * c])?;
            }
        }
        Ok(())
    }
}

/// Accumulates a transform chain in place, without allocating an
/// intermediate matrix per step.
///
/// This is the explicitly mutating counterpart of the pure [`Matrix`]
/// constructors; the two APIs are never mixed on one type. Every call
/// post-multiplies the accumulated matrix, so transforms apply to points
/// in reverse call order, e.g. placing, then scaling, then centering:
///
/// ```
/// use pathcast::TransformStack;
///
/// let matrix = TransformStack::new()
///     .translate(40.0, 40.0, 0.0)
///     .scale(2.0, -2.0, 1.0)
///     .translate(-10.0, -10.0, 0.0)
///     .build();
/// assert_eq!(matrix.transform([10.0, 10.0, 0.0]).unwrap(), [40.0, 40.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct TransformStack {
    cells: [f64; 16],
}

impl TransformStack {
    /// Starts from the identity transform.
    pub fn new() -> TransformStack {
        TransformStack {
            cells: Matrix::identity().cells,
        }
    }

    /// Composes a translation, applied before the recorded transforms.
    pub fn translate(&mut self, tx: f64, ty: f64, tz: f64) -> &mut TransformStack {
        let c = &mut self.cells;
        for r in 0..4 {
            c[12 + r] += tx * c[r] + ty * c[4 + r] + tz * c[8 + r];
        }
        self
    }

    /// Composes a scaling, applied before the recorded transforms.
    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) -> &mut TransformStack {
        let c = &mut self.cells;
        for r in 0..4 {
            c[r] *= sx;
            c[4 + r] *= sy;
            c[8 + r] *= sz;
        }
        self
    }

    /// Composes a rotation about the x axis (degrees), applied before the
    /// recorded transforms.
    pub fn rotate_x(&mut self, degrees: f64) -> &mut TransformStack {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let c = &mut self.cells;
        for r in 0..4 {
            let c1 = c[4 + r];
            let c2 = c[8 + r];
            c[4 + r] = c1 * cos + c2 * sin;
            c[8 + r] = c2 * cos - c1 * sin;
        }
        self
    }

    /// Composes a rotation about the y axis (degrees), applied before the
    /// recorded transforms.
    pub fn rotate_y(&mut self, degrees: f64) -> &mut TransformStack {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let c = &mut self.cells;
        for r in 0..4 {
            let c0 = c[r];
            let c2 = c[8 + r];
            c[r] = c0 * cos - c2 * sin;
            c[8 + r] = c0 * sin + c2 * cos;
        }
        self
    }

    /// Composes a rotation about the z axis (degrees), applied before the
    /// recorded transforms.
    pub fn rotate_z(&mut self, degrees: f64) -> &mut TransformStack {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let c = &mut self.cells;
        for r in 0..4 {
            let c0 = c[r];
            let c1 = c[4 + r];
            c[r] = c0 * cos + c1 * sin;
            c[4 + r] = c1 * cos - c0 * sin;
        }
        self
    }

    /// The accumulated transform as an immutable [`Matrix`].
    pub fn build(&self) -> Matrix {
        Matrix { cells: self.cells }
    }
}

impl Default for TransformStack {
    fn default() -> TransformStack {
        TransformStack::new()
    }
}
