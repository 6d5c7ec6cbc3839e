//! Drawing surface abstraction
//!
//! Every animation renders through [`RenderSurface`], a small canvas-like API
//! addressed in surface-local pixels with the origin at the top-left corner.
//! [`DrawList`] records the calls so the GPU renderer can tessellate them
//! afterwards, and so tests can inspect exactly what a frame drew.

use glam::Vec2;

use crate::palette::{mix, Rgba};

/// Axis-aligned rectangle in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_size(size: Vec2) -> Self {
        Self { min: Vec2::ZERO, size }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.y >= self.min.y && point.x < max.x && point.y < max.y
    }
}

/// Linear gradient between two points with ordered colour stops
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    /// `(offset, colour)` pairs, offsets ascending in [0, 1]
    pub stops: Vec<(f32, Rgba)>,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: f32, color: Rgba) -> Self {
        self.stops.push((offset.clamp(0.0, 1.0), color));
        self
    }

    /// Position of `point` projected onto the gradient axis, in [0, 1]
    pub fn offset_of(&self, point: Vec2) -> f32 {
        let axis = self.end - self.start;
        let len_sq = axis.length_squared();
        if len_sq <= f32::EPSILON {
            return 0.0;
        }
        ((point - self.start).dot(axis) / len_sq).clamp(0.0, 1.0)
    }

    /// Colour at a normalised offset along the axis
    pub fn sample(&self, t: f32) -> Rgba {
        match self.stops.as_slice() {
            [] => [0.0; 4],
            [(_, only)] => *only,
            stops => {
                let (first_t, first) = stops[0];
                if t <= first_t {
                    return first;
                }
                for pair in stops.windows(2) {
                    let (t0, c0) = pair[0];
                    let (t1, c1) = pair[1];
                    if t <= t1 {
                        let span = t1 - t0;
                        let local = if span > f32::EPSILON { (t - t0) / span } else { 1.0 };
                        return mix(c0, c1, local);
                    }
                }
                stops[stops.len() - 1].1
            }
        }
    }

    pub fn color_at(&self, point: Vec2) -> Rgba {
        self.sample(self.offset_of(point))
    }
}

/// Fill or stroke style
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Gradient(LinearGradient),
}

impl Paint {
    pub fn color_at(&self, point: Vec2) -> Rgba {
        match self {
            Paint::Solid(color) => *color,
            Paint::Gradient(gradient) => gradient.color_at(point),
        }
    }
}

impl From<Rgba> for Paint {
    fn from(color: Rgba) -> Self {
        Paint::Solid(color)
    }
}

impl From<LinearGradient> for Paint {
    fn from(gradient: LinearGradient) -> Self {
        Paint::Gradient(gradient)
    }
}

/// Line style for paths
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f32,
    /// `[on, off]` dash lengths, solid when `None`
    pub dash: Option<[f32; 2]>,
}

impl Stroke {
    pub fn new(paint: impl Into<Paint>, width: f32) -> Self {
        Self {
            paint: paint.into(),
            width,
            dash: None,
        }
    }

    pub fn dashed(mut self, on: f32, off: f32) -> Self {
        self.dash = Some([on, off]);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgba,
    pub align: TextAlign,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgba) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Left,
            bold: false,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// A 2D drawing target with a size, addressed in local pixels
pub trait RenderSurface {
    /// Current width and height in pixels
    fn size(&self) -> Vec2;

    fn fill_rect(&mut self, rect: Rect, paint: Paint);

    /// Filled disc; `glow` is the radius of the soft halo around it (0 for none)
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, glow: f32);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32);

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);

    fn stroke_path(&mut self, points: &[Vec2], stroke: Stroke);

    /// Baseline-anchored text; `Center` centres it horizontally on `position`
    fn text(&mut self, position: Vec2, text: &str, style: TextStyle);

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.stroke_path(&[from, to], stroke);
    }
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        glow: f32,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        width: f32,
    },
    FillPolygon {
        points: Vec<Vec2>,
        color: Rgba,
    },
    StrokePath {
        points: Vec<Vec2>,
        stroke: Stroke,
    },
    Text {
        position: Vec2,
        text: String,
        style: TextStyle,
    },
}

/// Records draw calls in submission order
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Drop recorded commands, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = (Vec2, &str, &TextStyle)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { position, text, style } => Some((*position, text.as_str(), style)),
            _ => None,
        })
    }
}

impl RenderSurface for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, paint: Paint) {
        self.commands.push(DrawCommand::FillRect { rect, paint });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, glow: f32) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
            glow,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_path(&mut self, points: &[Vec2], stroke: Stroke) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            stroke,
        });
    }

    fn text(&mut self, position: Vec2, text: &str, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            position,
            text: text.to_string(),
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{CYAN, MAGENTA, PURPLE};

    #[test]
    fn test_gradient_samples_between_stops() {
        let gradient = LinearGradient::new(Vec2::ZERO, Vec2::new(100.0, 0.0))
            .stop(0.0, CYAN)
            .stop(0.5, PURPLE)
            .stop(1.0, MAGENTA);

        assert_eq!(gradient.color_at(Vec2::new(-10.0, 0.0)), CYAN);
        assert_eq!(gradient.color_at(Vec2::new(50.0, 30.0)), PURPLE);
        assert_eq!(gradient.color_at(Vec2::new(200.0, 0.0)), MAGENTA);

        let quarter = gradient.color_at(Vec2::new(25.0, 0.0));
        assert_eq!(quarter, mix(CYAN, PURPLE, 0.5));
    }

    #[test]
    fn test_degenerate_gradient_uses_first_stop() {
        let gradient = LinearGradient::new(Vec2::ONE, Vec2::ONE).stop(0.0, CYAN).stop(1.0, MAGENTA);
        assert_eq!(gradient.color_at(Vec2::new(5.0, 5.0)), CYAN);
    }

    #[test]
    fn test_draw_list_records_in_order() {
        let mut list = DrawList::new(Vec2::new(10.0, 10.0));
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), CYAN.into());
        list.line(Vec2::ZERO, Vec2::ONE, Stroke::new(MAGENTA, 1.0));
        list.text(Vec2::ZERO, "hi", TextStyle::new(12.0, CYAN));

        assert_eq!(list.commands().len(), 3);
        assert!(matches!(list.commands()[0], DrawCommand::FillRect { .. }));
        assert!(matches!(list.commands()[1], DrawCommand::StrokePath { ref points, .. } if points.len() == 2));
        assert_eq!(list.texts().count(), 1);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.size(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(Vec2::new(10.0, 10.0)));
        assert!(rect.contains(Vec2::new(29.9, 29.9)));
        assert!(!rect.contains(Vec2::new(30.0, 15.0)));
    }
}
