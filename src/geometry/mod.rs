//! Geometry for plotter artwork.
//!
//! This module provides:
//! - Point/polyline data types in device millimeters
//! - SVG to polyline conversion
//! - Fitting polylines to the drawable area

pub mod engine;
pub mod types;

pub(crate) mod markup;

pub use engine::{GeometryEngine, LyonGeometryEngine};
pub use types::{Bounds, Point, Polyline, PolylineSet};

use thiserror::Error;

/// Errors produced while converting SVG documents into polylines.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Document has no <svg> root element")]
    NotSvg,

    #[error("Invalid path data: {0}")]
    InvalidPath(String),

    #[error("Invalid point list: {0}")]
    InvalidPoints(String),
}
