//! Borrowed drawing capability used by shape generators.
//!
//! A generator never owns the surface it draws on: the pipeline lends it a
//! [`Canvas`] and a [`Paint`] for the duration of one call. The canvas only
//! exposes the affine transform stack and a filled-path primitive, which is
//! everything a filled shape needs.

use super::color::{BLACK, Color};
use super::path::{PathCommand, ShapePath};

/// Fill settings applied when a path is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    /// Fill color (non-premultiplied)
    pub color: Color,
    /// Whether edges are antialiased
    pub antialias: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: BLACK,
            antialias: false,
        }
    }
}

/// Minimal mutable drawing surface.
///
/// Transform calls compose onto the current transform in call order, so the
/// last call applies first to path coordinates.
pub trait Canvas {
    /// Scales the coordinate system.
    fn scale(&mut self, sx: f64, sy: f64);

    /// Translates the coordinate system.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Rotates the coordinate system by `radians`.
    fn rotate(&mut self, radians: f64);

    /// Fills `path` with `paint` under the current transform.
    fn fill_path(&mut self, path: &ShapePath, paint: &Paint);

    /// Scales about the pivot point `(px, py)` instead of the origin.
    fn scale_about(&mut self, sx: f64, sy: f64, px: f64, py: f64) {
        self.translate(px, py);
        self.scale(sx, sy);
        self.translate(-px, -py);
    }
}

impl Canvas for cairo::Context {
    fn scale(&mut self, sx: f64, sy: f64) {
        cairo::Context::scale(self, sx, sy);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        cairo::Context::translate(self, dx, dy);
    }

    fn rotate(&mut self, radians: f64) {
        cairo::Context::rotate(self, radians);
    }

    fn fill_path(&mut self, path: &ShapePath, paint: &Paint) {
        let ctx: &cairo::Context = self;

        ctx.set_antialias(if paint.antialias {
            cairo::Antialias::Best
        } else {
            cairo::Antialias::None
        });
        ctx.set_source_rgba(paint.color.r, paint.color.g, paint.color.b, paint.color.a);
        ctx.set_fill_rule(cairo::FillRule::Winding);

        ctx.new_path();
        trace_path(ctx, path);

        // Nothing to report to the caller; a failed fill leaves the surface untouched
        if let Err(err) = ctx.fill() {
            log::debug!("Cairo fill failed: {}", err);
        }
    }
}

/// Replays `path` onto the Cairo context as the current path.
///
/// Segments without a current point start from the origin, and quadratic
/// segments are raised to cubics since Cairo has no quadratic primitive.
fn trace_path(ctx: &cairo::Context, path: &ShapePath) {
    let mut current: Option<(f64, f64)> = None;
    let mut subpath_start = (0.0, 0.0);

    let ensure_current = |current: &mut Option<(f64, f64)>, start: &mut (f64, f64)| {
        if current.is_none() {
            ctx.move_to(0.0, 0.0);
            *current = Some((0.0, 0.0));
            *start = (0.0, 0.0);
        }
    };

    for command in path.commands() {
        match *command {
            PathCommand::MoveTo { x, y } => {
                ctx.move_to(x, y);
                current = Some((x, y));
                subpath_start = (x, y);
            }
            PathCommand::LineTo { x, y } => {
                ensure_current(&mut current, &mut subpath_start);
                ctx.line_to(x, y);
                current = Some((x, y));
            }
            PathCommand::QuadTo { x1, y1, x, y } => {
                ensure_current(&mut current, &mut subpath_start);
                let (x0, y0) = current.unwrap_or((0.0, 0.0));
                let c1x = x0 + 2.0 / 3.0 * (x1 - x0);
                let c1y = y0 + 2.0 / 3.0 * (y1 - y0);
                let c2x = x + 2.0 / 3.0 * (x1 - x);
                let c2y = y + 2.0 / 3.0 * (y1 - y);
                ctx.curve_to(c1x, c1y, c2x, c2y, x, y);
                current = Some((x, y));
            }
            PathCommand::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                ensure_current(&mut current, &mut subpath_start);
                ctx.curve_to(x1, y1, x2, y2, x, y);
                current = Some((x, y));
            }
            PathCommand::Close => {
                if current.is_some() {
                    ctx.close_path();
                    current = Some(subpath_start);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairo::{Context, Format, ImageSurface};

    fn alpha_at(surface: &mut ImageSurface, x: usize, y: usize) -> u8 {
        let stride = surface.stride() as usize;
        let data = surface.data().expect("surface data");
        // ARGB32 is native-endian; alpha is the high byte of each u32
        let offset = y * stride + x * 4;
        let pixel = u32::from_ne_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);
        (pixel >> 24) as u8
    }

    #[test]
    fn fill_path_paints_inside_square_only() {
        let mut surface = ImageSurface::create(Format::ARgb32, 20, 20).unwrap();
        {
            let mut ctx = Context::new(&surface).unwrap();
            let mut path = ShapePath::new();
            path.move_to(5.0, 5.0);
            path.line_to(15.0, 5.0);
            path.line_to(15.0, 15.0);
            path.line_to(5.0, 15.0);
            path.close();
            ctx.fill_path(&path, &Paint::default());
        }
        surface.flush();

        assert_eq!(alpha_at(&mut surface, 10, 10), 255);
        assert_eq!(alpha_at(&mut surface, 2, 2), 0);
        assert_eq!(alpha_at(&mut surface, 17, 10), 0);
    }

    #[test]
    fn quad_segment_starts_from_origin_without_move() {
        let mut surface = ImageSurface::create(Format::ARgb32, 20, 20).unwrap();
        {
            let mut ctx = Context::new(&surface).unwrap();
            let mut path = ShapePath::new();
            path.line_to(19.0, 0.0);
            path.quad_to(19.0, 19.0, 0.0, 19.0);
            ctx.fill_path(&path, &Paint::default());
        }
        surface.flush();

        assert_eq!(alpha_at(&mut surface, 12, 8), 255);
    }

    #[test]
    fn scale_about_mirrors_around_pivot() {
        let mut surface = ImageSurface::create(Format::ARgb32, 20, 20).unwrap();
        {
            let mut ctx = Context::new(&surface).unwrap();
            ctx.scale_about(1.0, -1.0, 10.0, 10.0);
            let mut path = ShapePath::new();
            path.move_to(0.0, 0.0);
            path.line_to(20.0, 0.0);
            path.line_to(20.0, 5.0);
            path.line_to(0.0, 5.0);
            path.close();
            ctx.fill_path(&path, &Paint::default());
        }
        surface.flush();

        // Band at the top in path space lands at the bottom of the raster
        assert_eq!(alpha_at(&mut surface, 10, 17), 255);
        assert_eq!(alpha_at(&mut surface, 10, 2), 0);
    }
}
