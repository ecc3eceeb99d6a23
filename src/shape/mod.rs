//! Shape generators: declarative shapes rendered straight into a raster.
//!
//! A generator produces pixels from its configuration alone, without a source
//! image. The pipeline asks it for a [`CacheKey`] first and only calls
//! [`ShapeGenerator::render`] on a cache miss.

pub mod key;
pub mod path_shape;

pub use key::{CacheKey, CacheKeyBuilder};
pub use path_shape::PathShapeRenderer;

use crate::draw::{Canvas, Paint};

/// A source of generated rasters with a stable identity.
pub trait ShapeGenerator: Send + Sync {
    /// Generator type name, used in logs.
    fn name(&self) -> &'static str;

    /// Target raster width in pixels.
    fn width(&self) -> u32;

    /// Target raster height in pixels.
    fn height(&self) -> u32;

    /// Draws onto a surface lent by the caller for this call only.
    fn render(&self, canvas: &mut dyn Canvas, paint: &mut Paint);

    /// Identity of the raster [`render`](Self::render) would produce.
    fn generate_cache_key(&self) -> CacheKey;
}
