//! Filled, rotated path shape generator.

use super::{CacheKey, ShapeGenerator};
use crate::convert::InputConverter;
use crate::draw::{BLACK, Canvas, Color, Paint, ShapePath, canonical_number};
use log::debug;
use serde_json::Value;

const CACHE_TAG: &str = "path_shape";

/// Renders a filled path, rotated about the surface center.
///
/// Path coordinates are offsets from the surface center with y pointing up.
/// The renderer is immutable once built and may be shared between threads
/// rendering into independent surfaces.
#[derive(Debug, Clone)]
pub struct PathShapeRenderer {
    width: u32,
    height: u32,
    path: ShapePath,
    /// Canonical text of `path`, computed once for key generation
    path_key: String,
    rotation: f64,
    color: Color,
}

impl PathShapeRenderer {
    /// Builds a renderer from an optional declarative config.
    ///
    /// Recognized keys are `path`, `rotation` (radians) and `color`. Each is
    /// optional: a missing or malformed field falls back to an empty path,
    /// zero rotation or opaque black respectively. Construction never fails.
    pub fn new(width: u32, height: u32, config: Option<&Value>) -> Self {
        let converter = InputConverter::new(width, height);
        let field = |name: &str| config.and_then(|cfg| cfg.get(name));

        let path = converter.convert_path(field("path"), ShapePath::new());
        let rotation = converter.convert_scalar(field("rotation"), 0.0);
        let color = converter.convert_color(field("color"), BLACK);

        Self {
            width,
            height,
            path_key: path.canonical(),
            path,
            rotation,
            color,
        }
    }

    pub fn path(&self) -> &ShapePath {
        &self.path
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl ShapeGenerator for PathShapeRenderer {
    fn name(&self) -> &'static str {
        "PathShapeRenderer"
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn render(&self, canvas: &mut dyn Canvas, paint: &mut Paint) {
        paint.antialias = true;
        paint.color = self.color;

        let center_x = self.width as f64 / 2.0;
        let center_y = self.height as f64 / 2.0;

        // Order is significant: flip, recenter, rotate, then draw
        canvas.scale_about(1.0, -1.0, center_x, center_y);
        canvas.translate(center_x, center_y);
        canvas.rotate(self.rotation);

        canvas.fill_path(&self.path, paint);
    }

    fn generate_cache_key(&self) -> CacheKey {
        let key = CacheKey::builder(CACHE_TAG)
            .field(&self.path_key)
            .field(canonical_number(self.rotation))
            .field(self.color.to_argb())
            .field(self.width)
            .field(self.height)
            .build();
        debug!("{} cache key: {}", self.name(), key);
        key
    }
}
