//! 4×5 color matrix applied to straight (non-premultiplied) RGBA.

use crate::draw::{Color, canonical_number};
use crate::pipeline::Bitmap;
use crate::shape::CacheKey;

const CACHE_TAG: &str = "color_matrix";

/// Row-major 4×5 matrix: one row per output channel (R, G, B, A), each row
/// holding the R, G, B and A multipliers followed by a bias.
///
/// Channels and biases are normalized to 0.0..=1.0, so a bias of `1.0`
/// adds full intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix([f64; 20]);

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    pub fn new(values: [f64; 20]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; 20] {
        &self.0
    }

    /// Applies the matrix to one color; the result is clamped to 0.0..=1.0.
    pub fn transform(&self, color: Color) -> Color {
        let m = &self.0;
        let input = [color.r, color.g, color.b, color.a, 1.0];
        let row = |index: usize| {
            m[index * 5..index * 5 + 5]
                .iter()
                .zip(input)
                .map(|(weight, channel)| weight * channel)
                .sum::<f64>()
        };
        Color::new(row(0), row(1), row(2), row(3))
    }

    /// Filters every pixel of `source` into a new raster of the same size.
    pub fn apply(&self, source: &Bitmap) -> Bitmap {
        source.map_pixels(|pixel| premultiply(self.transform(unpremultiply(pixel))))
    }

    /// Identity of this matrix: the tag followed by all 20 entries.
    pub fn cache_key(&self) -> CacheKey {
        self.0
            .iter()
            .fold(CacheKey::builder(CACHE_TAG), |key, value| {
                key.field(canonical_number(*value))
            })
            .build()
    }

    /// Identity of this matrix applied to the raster keyed `source`.
    pub fn filtered_key(&self, source: &CacheKey) -> CacheKey {
        CacheKey::builder(self.cache_key().as_str())
            .field(source)
            .build()
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn unpremultiply(pixel: u32) -> Color {
    let alpha = (pixel >> 24) & 0xFF;
    if alpha == 0 {
        return Color::new(0.0, 0.0, 0.0, 0.0);
    }
    let channel = |shift: u32| ((pixel >> shift) & 0xFF) as f64 / alpha as f64;
    Color::new(channel(16), channel(8), channel(0), alpha as f64 / 255.0)
}

fn premultiply(color: Color) -> u32 {
    let alpha = color.a;
    Color::new(color.r * alpha, color.g * alpha, color.b * alpha, alpha).to_argb()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BLUE, RED};
    use cairo::{Context, Format, ImageSurface};

    fn solid(width: i32, height: i32, r: f64, g: f64, b: f64, a: f64) -> Bitmap {
        let surface = ImageSurface::create(Format::ARgb32, width, height).unwrap();
        {
            let ctx = Context::new(&surface).unwrap();
            ctx.set_source_rgba(r, g, b, a);
            ctx.paint().unwrap();
        }
        Bitmap::from_surface(surface).unwrap()
    }

    #[test]
    fn identity_leaves_pixels_untouched() {
        let source = solid(3, 2, 0.2, 0.4, 0.6, 0.5);
        assert_eq!(ColorMatrix::IDENTITY.apply(&source), source);
    }

    #[test]
    fn transform_mixes_channels_and_adds_bias() {
        let swap_red_blue = ColorMatrix::new([
            0.0, 0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.25, //
            1.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]);
        let out = swap_red_blue.transform(RED);
        assert_eq!(out.to_argb(), Color::new(0.0, 0.25, 1.0, 1.0).to_argb());
        assert_eq!(swap_red_blue.transform(BLUE).r, 1.0);
    }

    #[test]
    fn results_are_clamped() {
        let boost = ColorMatrix::new([
            4.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, -2.0, //
            0.0, 0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]);
        let out = boost.transform(Color::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!((out.r, out.g, out.b), (1.0, 0.0, 0.5));
    }

    #[test]
    fn apply_works_on_straight_color_of_translucent_pixels() {
        // 50% red, premultiplied to 0x80800000 on the surface
        let source = solid(1, 1, 1.0, 0.0, 0.0, 0.5);
        let to_green = ColorMatrix::new([
            0.0, 0.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0,
        ]);
        let out = to_green.apply(&source);
        assert_eq!(out.pixel(0, 0), Some(0x80008000));
    }

    #[test]
    fn fully_transparent_pixels_gain_only_bias() {
        let source = solid(1, 1, 0.0, 0.0, 0.0, 0.0);
        let opaque_white = ColorMatrix::new([
            0.0, 0.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 0.0, 1.0,
        ]);
        assert_eq!(opaque_white.apply(&source).pixel(0, 0), Some(0xFFFFFFFF));
        assert_eq!(ColorMatrix::IDENTITY.apply(&source).pixel(0, 0), Some(0));
    }

    #[test]
    fn cache_key_lists_every_entry() {
        assert_eq!(
            ColorMatrix::IDENTITY.cache_key().as_str(),
            "color_matrix_1_0_0_0_0_0_1_0_0_0_0_0_1_0_0_0_0_0_1_0"
        );
        let mut values = *ColorMatrix::IDENTITY.values();
        values[19] = 0.5;
        assert_ne!(
            ColorMatrix::new(values).cache_key(),
            ColorMatrix::IDENTITY.cache_key()
        );
    }

    #[test]
    fn filtered_key_appends_source_key() {
        let source = CacheKey::builder("path_shape").field(7).build();
        let key = ColorMatrix::IDENTITY.filtered_key(&source);
        assert!(key.as_str().starts_with("color_matrix_1_0_0_0_0_"));
        assert!(key.as_str().ends_with("_1_0_path_shape_7"));
    }
}
