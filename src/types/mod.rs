//! Core value types shared across the crate

pub mod transform;
pub mod vector;

pub use transform::{Matrix4, StackFrame, TransformStack};
pub use vector::{Vector2, Vector3};
