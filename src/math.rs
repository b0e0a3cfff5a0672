//! Row-major 4×4 transforms.
//!
//! [`Mat44`] stores its sixteen elements row by row: element `(i, j)` lives at
//! index `i * 4 + j`. Products compose right to left, so `(a * b) * v` equals
//! `a * (b * v)`, and constructors follow the right-handed, Y-up conventions
//! of OpenGL.
//!
//! WGSL (like GLSL) reads matrices column by column. Anything uploaded to a
//! shader goes through [`Mat44::to_gpu`], which transposes on the way out.
//!
//! Vectors are plain [`glam`] types; only the matrix is hand-rolled, so every
//! convention stays visible in one place.
//!
//! # Example
//!
//! ```
//! use landfall::{Mat44, Vec3, Vec4};
//!
//! let model = Mat44::translation(Vec3::new(1.0, 2.0, 3.0)) * Mat44::scaling(2.0, 2.0, 2.0);
//! let p = model * Vec4::new(1.0, 1.0, 1.0, 1.0);
//! assert_eq!(p, Vec4::new(3.0, 4.0, 5.0, 1.0));
//! ```

use std::ops::{Index, IndexMut, Mul};

use glam::{Vec3, Vec4};

/// A 4×4 single-precision matrix in row-major order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat44 {
    /// Elements row by row.
    pub v: [f32; 16],
}

impl Default for Mat44 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<(usize, usize)> for Mat44 {
    type Output = f32;

    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        debug_assert!(i < 4 && j < 4);
        &self.v[i * 4 + j]
    }
}

impl IndexMut<(usize, usize)> for Mat44 {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        debug_assert!(i < 4 && j < 4);
        &mut self.v[i * 4 + j]
    }
}

impl Mat44 {
    /// The identity matrix.
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        v: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Remaps OpenGL clip depth (`[-w, w]`) onto wgpu's `[0, w]`.
    ///
    /// Pre-multiply a GL-style projection with this before drawing through wgpu.
    #[rustfmt::skip]
    pub const GL_TO_WGPU_DEPTH: Self = Self {
        v: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.5,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Builds a matrix from its four rows.
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let mut v = [0.0; 16];
        for (i, row) in rows.iter().enumerate() {
            v[i * 4..i * 4 + 4].copy_from_slice(row);
        }
        Self { v }
    }

    /// Returns row `i`.
    pub fn row(&self, i: usize) -> Vec4 {
        Vec4::new(self[(i, 0)], self[(i, 1)], self[(i, 2)], self[(i, 3)])
    }

    /// Swaps element `(i, j)` with `(j, i)`.
    pub fn transpose(&self) -> Self {
        let mut ret = Self::IDENTITY;
        for i in 0..4 {
            for j in 0..4 {
                ret[(j, i)] = self[(i, j)];
            }
        }
        ret
    }

    /// Identity with column 3 set to `(t.x, t.y, t.z, 1)`.
    #[rustfmt::skip]
    pub fn translation(t: Vec3) -> Self {
        Self {
            v: [
                1.0, 0.0, 0.0, t.x,
                0.0, 1.0, 0.0, t.y,
                0.0, 0.0, 1.0, t.z,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Diagonal `(sx, sy, sz, 1)`.
    #[rustfmt::skip]
    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self {
            v: [
                sx,  0.0, 0.0, 0.0,
                0.0, sy,  0.0, 0.0,
                0.0, 0.0, sz,  0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Right-handed rotation about +X by `angle` radians.
    ///
    /// A quarter turn carries +Y onto +Z.
    #[rustfmt::skip]
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            v: [
                1.0, 0.0, 0.0, 0.0,
                0.0, c,   -s,  0.0,
                0.0, s,   c,   0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Right-handed rotation about +Y by `angle` radians.
    ///
    /// A quarter turn carries +X onto -Z.
    #[rustfmt::skip]
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            v: [
                c,   0.0, s,   0.0,
                0.0, 1.0, 0.0, 0.0,
                -s,  0.0, c,   0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Right-handed rotation about +Z by `angle` radians.
    ///
    /// A quarter turn carries +X onto +Y.
    #[rustfmt::skip]
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            v: [
                c,   -s,  0.0, 0.0,
                s,   c,   0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// OpenGL-style perspective projection.
    ///
    /// Maps view space (camera looking down -Z, Y up) to clip space with
    /// `w = -z_view` and NDC depth in `[-1, 1]`.
    ///
    /// `aspect == 0`, `near == far` and `fov == π` divide by zero; callers
    /// must not pass them.
    #[rustfmt::skip]
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov / 2.0).tan();
        let nf = 1.0 / (near - far);
        Self {
            v: [
                f / aspect, 0.0, 0.0,               0.0,
                0.0,        f,   0.0,               0.0,
                0.0,        0.0, (far + near) * nf, 2.0 * far * near * nf,
                0.0,        0.0, -1.0,              0.0,
            ],
        }
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Returns `None` for singular matrices.
    pub fn invert(&self) -> Option<Self> {
        let mut a = *self;
        let mut inv = Self::IDENTITY;

        for col in 0..4 {
            let pivot = (col..4).max_by(|&r1, &r2| a[(r1, col)].abs().total_cmp(&a[(r2, col)].abs()))?;
            if a[(pivot, col)].abs() < f32::EPSILON {
                return None;
            }
            if pivot != col {
                a.swap_rows(pivot, col);
                inv.swap_rows(pivot, col);
            }

            let p = a[(col, col)];
            for j in 0..4 {
                a[(col, j)] /= p;
                inv[(col, j)] /= p;
            }

            for row in (0..4).filter(|&r| r != col) {
                let factor = a[(row, col)];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..4 {
                    let da = factor * a[(col, j)];
                    let di = factor * inv[(col, j)];
                    a[(row, j)] -= da;
                    inv[(row, j)] -= di;
                }
            }
        }

        Some(inv)
    }

    fn swap_rows(&mut self, r1: usize, r2: usize) {
        for j in 0..4 {
            self.v.swap(r1 * 4 + j, r2 * 4 + j);
        }
    }

    /// Transforms a point (`w = 1`) and drops the homogeneous coordinate.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * p.extend(1.0)).truncate()
    }

    /// Column-major copy for shader upload.
    ///
    /// Each inner array is one column, which is what WGSL's `mat4x4<f32>`
    /// expects in a uniform buffer.
    pub fn to_gpu(&self) -> [[f32; 4]; 4] {
        let t = self.transpose();
        [
            [t.v[0], t.v[1], t.v[2], t.v[3]],
            [t.v[4], t.v[5], t.v[6], t.v[7]],
            [t.v[8], t.v[9], t.v[10], t.v[11]],
            [t.v[12], t.v[13], t.v[14], t.v[15]],
        ]
    }
}

impl Mul for Mat44 {
    type Output = Mat44;

    fn mul(self, rhs: Mat44) -> Mat44 {
        let mut ret = Mat44 { v: [0.0; 16] };
        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self[(i, k)] * rhs[(k, j)];
                }
                ret[(i, j)] = sum;
            }
        }
        ret
    }
}

impl Mul<Vec4> for Mat44 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Vec4 {
        Vec4::new(
            self.row(0).dot(rhs),
            self.row(1).dot(rhs),
            self.row(2).dot(rhs),
            self.row(3).dot(rhs),
        )
    }
}
