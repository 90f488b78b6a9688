//! Transformation types for geometric operations
//!
//! Provides the 4x4 transform matrix applied to every entity coordinate and
//! the save/restore stack used while instancing blocks.

use crate::types::Vector3;
use std::ops::Mul;

/// 4x4 transformation matrix for 3D operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    /// Matrix elements stored in row-major order
    pub m: [[f64; 4]; 4],
}

impl Matrix4 {
    /// Create identity matrix
    pub fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Create zero matrix
    pub fn zero() -> Self {
        Self { m: [[0.0; 4]; 4] }
    }

    /// Create translation matrix
    pub fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, tx],
                [0.0, 1.0, 0.0, ty],
                [0.0, 0.0, 1.0, tz],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Create scaling matrix
    pub fn scaling(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            m: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Create rotation matrix around the Z axis (angle in radians)
    pub fn rotation_z(angle: f64) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            m: [
                [cos, -sin, 0.0, 0.0],
                [sin, cos, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation around Z from degrees.
    ///
    /// A rotation of exactly 180 degrees uses a sine of exactly zero so the
    /// matrix round-trips cleanly through angle extraction.
    pub fn rotation_z_degrees(degrees: f64) -> Self {
        if degrees == 0.0 {
            return Self::identity();
        }
        let angle = degrees.to_radians();
        let cos = angle.cos();
        let sin = if degrees == 180.0 { 0.0 } else { angle.sin() };
        Self {
            m: [
                [cos, -sin, 0.0, 0.0],
                [sin, cos, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Transform a point (applies full transformation including translation)
    pub fn transform_point(&self, v: Vector3) -> Vector3 {
        let w = self.m[3][0] * v.x + self.m[3][1] * v.y + self.m[3][2] * v.z + self.m[3][3];
        let w = if w.abs() < 1e-10 { 1.0 } else { w };

        Vector3::new(
            (self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z + self.m[0][3]) / w,
            (self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z + self.m[1][3]) / w,
            (self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z + self.m[2][3]) / w,
        )
    }

    /// Transform a direction vector (ignores translation)
    pub fn transform_direction(&self, v: Vector3) -> Vector3 {
        Vector3::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut result = Self::zero();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result.m[i][j] += self.m[i][k] * rhs.m[k][j];
                }
            }
        }
        result
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

/// A saved parse transform, pushed when a block instance begins.
#[derive(Debug, Clone)]
pub struct StackFrame {
    /// The transform active before the instance was entered.
    pub parent_transform: Matrix4,
    /// Name of the block being instanced, for diagnostics.
    pub block_name: String,
}

/// Composes and saves/restores transforms across nested block instancing.
///
/// The stack depth always equals the actual instancing nesting depth;
/// popping restores the parent transform by value, so N pushes followed by
/// N pops reproduce the original matrix exactly.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Matrix4,
    frames: Vec<StackFrame>,
}

impl TransformStack {
    /// Create a stack with the identity transform active.
    pub fn new() -> Self {
        Self {
            current: Matrix4::identity(),
            frames: Vec::new(),
        }
    }

    /// The transform applied to entity coordinates right now.
    pub fn current(&self) -> &Matrix4 {
        &self.current
    }

    /// Enter a block instance: save the active transform and switch to
    /// `instanced`, which the caller has already composed with the parent.
    pub fn push(&mut self, block_name: &str, instanced: Matrix4) {
        self.frames.push(StackFrame {
            parent_transform: self.current,
            block_name: block_name.to_string(),
        });
        self.current = instanced;
    }

    /// Leave a block instance, restoring the parent transform.
    /// Returns the popped frame, or `None` when the stack is empty.
    pub fn pop(&mut self) -> Option<StackFrame> {
        let frame = self.frames.pop()?;
        self.current = frame.parent_transform;
        Some(frame)
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True outside any block instance.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}
