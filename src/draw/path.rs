//! Typed path geometry and its canonical text form.

use std::fmt::Write;

/// A single path segment in absolute pixel offsets.
///
/// Coordinates are relative to the surface center with y pointing up; the
/// renderer's flip/translate transform maps them onto the raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    /// Starts a new subpath at the given point
    MoveTo { x: f64, y: f64 },
    /// Straight segment to the given point
    LineTo { x: f64, y: f64 },
    /// Quadratic Bézier with one control point
    QuadTo { x1: f64, y1: f64, x: f64, y: f64 },
    /// Cubic Bézier with two control points
    CubicTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// Closes the current subpath
    Close,
}

/// Ordered list of path commands, the concrete geometry a shape fills.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePath {
    commands: Vec<PathCommand>,
}

impl ShapePath {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::LineTo { x, y });
    }

    pub fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        self.commands.push(PathCommand::QuadTo { x1, y1, x, y });
    }

    pub fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.commands.push(PathCommand::CubicTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        });
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the canonical SVG-like serialization of this path.
    ///
    /// Equal paths always produce equal strings: numbers use the shortest
    /// round-trip decimal form and negative zero is written as `0`. The empty
    /// path serializes to the empty string.
    ///
    /// ```
    /// use pathshape::draw::ShapePath;
    /// let mut path = ShapePath::new();
    /// path.move_to(0.0, -0.0);
    /// path.line_to(10.5, 0.0);
    /// path.close();
    /// assert_eq!(path.canonical(), "M0,0L10.5,0Z");
    /// ```
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo { x, y } => push_segment(&mut out, 'M', &[x, y]),
                PathCommand::LineTo { x, y } => push_segment(&mut out, 'L', &[x, y]),
                PathCommand::QuadTo { x1, y1, x, y } => {
                    push_segment(&mut out, 'Q', &[x1, y1, x, y])
                }
                PathCommand::CubicTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => push_segment(&mut out, 'C', &[x1, y1, x2, y2, x, y]),
                PathCommand::Close => out.push('Z'),
            }
        }
        out
    }
}

fn push_segment(out: &mut String, tag: char, values: &[f64]) {
    out.push(tag);
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}", canonical_number(*value));
    }
}

/// Formats a finite number in its shortest round-trip decimal form.
///
/// Negative zero collapses to `0` so that values comparing equal format equally.
pub fn canonical_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}
