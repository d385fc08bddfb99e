use glam::{Quat, Vec3};
use std::ops::{Add, Index, Mul, Sub};

use crate::config::CollisionConfig;
use crate::error::{CollisionError, Result};

/// 3 row, 3 column matrix with row-major semantics.
///
/// The default value is the zero matrix.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Matrix3x3 {
    /// First row of the matrix.
    pub x: Vec3,
    /// Second row of the matrix.
    pub y: Vec3,
    /// Third row of the matrix.
    pub z: Vec3,
}

impl Matrix3x3 {
    /// Gets the 3x3 identity matrix.
    #[inline(always)]
    pub const fn identity() -> Self {
        Self {
            x: Vec3::new(1.0, 0.0, 0.0),
            y: Vec3::new(0.0, 1.0, 0.0),
            z: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Creates a matrix from its nine components, row by row.
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub const fn new(
        a1: f32,
        a2: f32,
        a3: f32,
        b1: f32,
        b2: f32,
        b3: f32,
        c1: f32,
        c2: f32,
        c3: f32,
    ) -> Self {
        Self {
            x: Vec3::new(a1, a2, a3),
            y: Vec3::new(b1, b2, b3),
            z: Vec3::new(c1, c2, c3),
        }
    }

    /// Creates a matrix with every component set to the same value.
    #[inline(always)]
    pub const fn splat(value: f32) -> Self {
        Self {
            x: Vec3::splat(value),
            y: Vec3::splat(value),
            z: Vec3::splat(value),
        }
    }

    /// Creates a matrix from its three rows.
    #[inline(always)]
    pub const fn from_rows(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self { x, y, z }
    }

    /// Creates a diagonal matrix.
    #[inline(always)]
    pub const fn from_diagonal(diagonal: Vec3) -> Self {
        Self::new(
            diagonal.x, 0.0, 0.0, 0.0, diagonal.y, 0.0, 0.0, 0.0, diagonal.z,
        )
    }

    /// Gets the component at the given row and column.
    #[inline(always)]
    pub fn get(&self, row: usize, column: usize) -> f32 {
        self[row][column]
    }

    /// Adds the components of two matrices together.
    #[inline(always)]
    pub fn add(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.x + b.x;
        result.y = a.y + b.y;
        result.z = a.z + b.z;
    }

    /// Scales the components of a matrix by a scalar.
    #[inline(always)]
    pub fn scale(matrix: &Self, scale: f32, result: &mut Self) {
        result.x = matrix.x * scale;
        result.y = matrix.y * scale;
        result.z = matrix.z * scale;
    }

    /// Subtracts the components of one matrix from another.
    #[inline(always)]
    pub fn subtract(a: &Self, b: &Self, result: &mut Self) {
        result.x = a.x - b.x;
        result.y = a.y - b.y;
        result.z = a.z - b.z;
    }

    /// Computes the transposed matrix of a matrix.
    #[inline(always)]
    pub fn transpose_ref(m: &Self, transposed: &mut Self) {
        let xy = m.x.y;
        let xz = m.x.z;
        let yz = m.y.z;
        transposed.x = Vec3::new(m.x.x, m.y.x, m.z.x);
        transposed.y = Vec3::new(xy, m.y.y, m.z.y);
        transposed.z = Vec3::new(xz, yz, m.z.z);
    }

    /// Returns the transpose of the matrix.
    #[inline(always)]
    pub fn transpose(&self) -> Self {
        let mut result = Self::default();
        Self::transpose_ref(self, &mut result);
        result
    }

    /// Calculates the determinant of the matrix.
    #[inline(always)]
    pub fn determinant(&self) -> f32 {
        self.x.dot(self.y.cross(self.z))
    }

    /// Returns the inverse of the matrix using the default singularity tolerance.
    #[inline]
    pub fn try_inverse(&self) -> Result<Self> {
        self.try_inverse_with_tolerance(CollisionConfig::default().singular_determinant_tolerance)
    }

    /// Returns the inverse of the matrix, computed as the adjugate divided by the determinant.
    ///
    /// The matrix counts as singular when its determinant is not finite, is zero, or is
    /// small relative to the product of its row lengths (Hadamard's bound):
    /// `|det| <= tolerance * |x| * |y| * |z|`. Singular matrices produce
    /// [`CollisionError::SingularMatrix`] rather than a finite but meaningless inverse.
    pub fn try_inverse_with_tolerance(&self, tolerance: f32) -> Result<Self> {
        // Rows of the adjugate's transpose are the cross products of row pairs.
        let yz = self.y.cross(self.z);
        let zx = self.z.cross(self.x);
        let xy = self.x.cross(self.y);
        let determinant = self.x.dot(yz);

        let hadamard_bound = self.x.length() * self.y.length() * self.z.length();
        if !determinant.is_finite()
            || determinant == 0.0
            || determinant.abs() <= tolerance * hadamard_bound
        {
            return Err(CollisionError::SingularMatrix { determinant });
        }

        let inverse_determinant = 1.0 / determinant;
        let cofactors = Self::from_rows(
            yz * inverse_determinant,
            zx * inverse_determinant,
            xy * inverse_determinant,
        );
        Ok(cofactors.transpose())
    }

    /// Transforms the row vector by the matrix: result = v * m.
    #[inline(always)]
    pub fn transform(v: &Vec3, m: &Self, result: &mut Vec3) {
        let x = Vec3::splat(v.x);
        let y = Vec3::splat(v.y);
        let z = Vec3::splat(v.z);
        *result = m.x * x + m.y * y + m.z * z;
    }

    /// Transforms the vector by the matrix's transpose, equivalent to m * v for a column vector.
    #[inline(always)]
    pub fn transform_transpose(v: &Vec3, m: &Self, result: &mut Vec3) {
        *result = Vec3::new(v.dot(m.x), v.dot(m.y), v.dot(m.z));
    }

    /// Multiplies the two matrices.
    ///
    /// Both operands are fully read before `result` is written, so `result` may be a copy of either.
    #[inline(always)]
    pub fn multiply(a: &Self, b: &Self, result: &mut Self) {
        let b_x = b.x;
        let b_y = b.y;
        let b_z = b.z;
        let a_x = a.x;
        let a_y = a.y;
        let a_z = a.z;

        result.x = b_x * a_x.x + b_y * a_x.y + b_z * a_x.z;
        result.y = b_x * a_y.x + b_y * a_y.y + b_z * a_y.z;
        result.z = b_x * a_z.x + b_y * a_z.y + b_z * a_z.z;
    }

    /// Creates a rotation matrix from a unit quaternion.
    #[inline(always)]
    pub fn create_from_quaternion(q: &Quat, result: &mut Self) {
        let qx2 = q.x + q.x;
        let qy2 = q.y + q.y;
        let qz2 = q.z + q.z;
        let xx = qx2 * q.x;
        let yy = qy2 * q.y;
        let zz = qz2 * q.z;
        let xy = qx2 * q.y;
        let xz = qx2 * q.z;
        let xw = qx2 * q.w;
        let yz = qy2 * q.z;
        let yw = qy2 * q.w;
        let zw = qz2 * q.w;

        result.x = Vec3::new(1.0 - yy - zz, xy - zw, xz + yw);
        result.y = Vec3::new(xy + zw, 1.0 - xx - zz, yz - xw);
        result.z = Vec3::new(xz - yw, yz + xw, 1.0 - xx - yy);
    }

    /// Creates a 3x3 matrix representing the given scale along its local axes.
    #[inline(always)]
    pub fn create_scale(scale: &Vec3, linear_transform: &mut Self) {
        linear_transform.x = Vec3::new(scale.x, 0.0, 0.0);
        linear_transform.y = Vec3::new(0.0, scale.y, 0.0);
        linear_transform.z = Vec3::new(0.0, 0.0, scale.z);
    }

    /// Creates a matrix such that a x v = result * v. Returns
    /// the skew symmetric matrix representing the cross product.
    #[inline(always)]
    pub fn create_cross_product(v: &Vec3, result: &mut Self) {
        result.x = Vec3::new(0.0, -v.z, v.y);
        result.y = Vec3::new(v.z, 0.0, -v.x);
        result.z = Vec3::new(-v.y, v.x, 0.0);
    }

    /// Gets whether every component is within `epsilon` of the other matrix's.
    #[inline]
    pub fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(other.x, epsilon)
            && self.y.abs_diff_eq(other.y, epsilon)
            && self.z.abs_diff_eq(other.z, epsilon)
    }
}

impl Index<usize> for Matrix3x3 {
    type Output = Vec3;

    #[inline(always)]
    fn index(&self, row: usize) -> &Vec3 {
        match row {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Matrix3x3 row index {} out of range", row),
        }
    }
}

impl Add for Matrix3x3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self::Output {
        let mut result = Self::default();
        Self::add(&self, &other, &mut result);
        result
    }
}

impl Sub for Matrix3x3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self::Output {
        let mut result = Self::default();
        Self::subtract(&self, &other, &mut result);
        result
    }
}

impl Mul for Matrix3x3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, other: Self) -> Self::Output {
        let mut result = Self::default();
        Self::multiply(&self, &other, &mut result);
        result
    }
}

impl Mul<Vec3> for Matrix3x3 {
    type Output = Vec3;

    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        let mut result = Vec3::ZERO;
        Self::transform_transpose(&v, &self, &mut result);
        result
    }
}

impl Mul<f32> for Matrix3x3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, scale: f32) -> Self::Output {
        let mut result = Self::default();
        Self::scale(&self, scale, &mut result);
        result
    }
}
