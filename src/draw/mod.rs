//! Drawing primitives for shape generation (Cairo-based).
//!
//! This module defines the core drawing types:
//! - [`Color`]: RGBA color with packed ARGB conversion and named constants
//! - [`ShapePath`]: typed path geometry with a canonical text form
//! - [`Canvas`] and [`Paint`]: the borrowed surface a generator draws on

pub mod canvas;
pub mod color;
pub mod path;

// Re-export commonly used types at module level
pub use canvas::{Canvas, Paint};
pub use color::{Color, name_to_color};
pub use path::{PathCommand, ShapePath, canonical_number};

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, TRANSPARENT, WHITE, YELLOW};
