//! I/O module for reading DXF record streams

pub mod dxf;

pub use dxf::{ConversionConfig, DxfConverter};
