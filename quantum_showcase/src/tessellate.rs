//! Turns recorded draw commands into GPU triangles
//!
//! Everything becomes a triangle list of [`CanvasVertex`] so one pipeline
//! keeps painter's order across shapes. Discs and rings are emitted as quads
//! and shaped in the fragment shader; text is left to the UI layer.

use glam::Vec2;

use crate::palette::Rgba;
use crate::surface::{DrawCommand, DrawList, Paint, Rect, Stroke};

/// Flat colour
pub const SHAPE_SOLID: f32 = 0.0;
/// Filled disc with optional halo
pub const SHAPE_DISC: f32 = 1.0;
/// Circle outline
pub const SHAPE_RING: f32 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CanvasVertex {
    pub position: [f32; 2],
    /// Quad-local coordinates in [-1, 1] for discs and rings
    pub local: [f32; 2],
    pub color: [f32; 4],
    /// Shape kind and its inner radius as a fraction of the quad
    pub shape: [f32; 2],
}

impl CanvasVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // local
        2 => Float32x4,  // color
        3 => Float32x2,  // shape
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CanvasVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }

    fn solid(position: Vec2, color: Rgba) -> Self {
        Self {
            position: position.to_array(),
            local: [0.0, 0.0],
            color,
            shape: [SHAPE_SOLID, 0.0],
        }
    }
}

/// Append triangles for every command in `list`, shifted by `origin`
pub fn tessellate(list: &DrawList, origin: Vec2, out: &mut Vec<CanvasVertex>) {
    for command in list.commands() {
        match command {
            DrawCommand::FillRect { rect, paint } => fill_rect(out, origin, *rect, paint),
            DrawCommand::FillCircle {
                center,
                radius,
                color,
                glow,
            } => {
                let outer = radius + glow.max(0.0);
                if outer > 0.0 {
                    quad(out, origin + *center, outer, *color, SHAPE_DISC, radius / outer);
                }
            }
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => {
                let outer = radius + width / 2.0;
                if outer > 0.0 {
                    let inner = ((radius - width / 2.0) / outer).max(0.0);
                    quad(out, origin + *center, outer, *color, SHAPE_RING, inner);
                }
            }
            DrawCommand::FillPolygon { points, color } => {
                if points.len() >= 3 {
                    let first = origin + points[0];
                    for pair in points[1..].windows(2) {
                        out.push(CanvasVertex::solid(first, *color));
                        out.push(CanvasVertex::solid(origin + pair[0], *color));
                        out.push(CanvasVertex::solid(origin + pair[1], *color));
                    }
                }
            }
            DrawCommand::StrokePath { points, stroke } => stroke_path(out, origin, points, stroke),
            DrawCommand::Text { .. } => {}
        }
    }
}

fn push_quad(out: &mut Vec<CanvasVertex>, corners: [CanvasVertex; 4]) {
    let [a, b, c, d] = corners;
    out.extend_from_slice(&[a, b, c, a, c, d]);
}

fn quad(out: &mut Vec<CanvasVertex>, center: Vec2, half: f32, color: Rgba, kind: f32, inner: f32) {
    let corner = |sx: f32, sy: f32| CanvasVertex {
        position: (center + Vec2::new(sx, sy) * half).to_array(),
        local: [sx, sy],
        color,
        shape: [kind, inner],
    };
    push_quad(
        out,
        [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)],
    );
}

fn fill_rect(out: &mut Vec<CanvasVertex>, origin: Vec2, rect: Rect, paint: &Paint) {
    if rect.size.x <= 0.0 || rect.size.y <= 0.0 {
        return;
    }

    // Split gradients into strips at each stop so multi-stop ramps stay exact
    let (vertical, cuts) = match paint {
        Paint::Solid(_) => (false, vec![0.0, 1.0]),
        Paint::Gradient(gradient) => {
            let axis = gradient.end - gradient.start;
            let vertical = axis.y.abs() > axis.x.abs();
            let mut cuts = vec![0.0, 1.0];
            for &(offset, _) in &gradient.stops {
                let along = gradient.start + axis * offset;
                let t = if vertical {
                    (along.y - rect.min.y) / rect.size.y
                } else {
                    (along.x - rect.min.x) / rect.size.x
                };
                if t > 0.0 && t < 1.0 {
                    cuts.push(t);
                }
            }
            cuts.sort_by(|a, b| a.total_cmp(b));
            cuts.dedup();
            (vertical, cuts)
        }
    };

    let max = rect.max();
    for pair in cuts.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (p0, p1, p2, p3) = if vertical {
            let y0 = rect.min.y + rect.size.y * a;
            let y1 = rect.min.y + rect.size.y * b;
            (
                Vec2::new(rect.min.x, y0),
                Vec2::new(max.x, y0),
                Vec2::new(max.x, y1),
                Vec2::new(rect.min.x, y1),
            )
        } else {
            let x0 = rect.min.x + rect.size.x * a;
            let x1 = rect.min.x + rect.size.x * b;
            (
                Vec2::new(x0, rect.min.y),
                Vec2::new(x1, rect.min.y),
                Vec2::new(x1, max.y),
                Vec2::new(x0, max.y),
            )
        };
        let vertex = |p: Vec2| CanvasVertex::solid(origin + p, paint.color_at(p));
        push_quad(out, [vertex(p0), vertex(p1), vertex(p2), vertex(p3)]);
    }
}

/// Split a polyline into the visible runs of its dash pattern
pub fn dash_segments(points: &[Vec2], dash: Option<[f32; 2]>) -> Vec<(Vec2, Vec2)> {
    let segments = points.windows(2).map(|pair| (pair[0], pair[1]));
    let [on, off] = match dash {
        Some(pattern) if pattern[0] > 0.0 && pattern[1] >= 0.0 => pattern,
        _ => return segments.collect(),
    };

    let mut result = Vec::new();
    let mut drawing = true;
    let mut remaining = on;

    for (start, end) in segments {
        let length = start.distance(end);
        if length <= f32::EPSILON {
            continue;
        }
        let dir = (end - start) / length;
        let mut travelled = 0.0;

        while travelled < length {
            let step = remaining.min(length - travelled);
            if drawing {
                result.push((start + dir * travelled, start + dir * (travelled + step)));
            }
            travelled += step;
            remaining -= step;
            if remaining <= f32::EPSILON {
                drawing = !drawing;
                remaining = if drawing { on } else { off };
            }
        }
    }
    result
}

fn stroke_path(out: &mut Vec<CanvasVertex>, origin: Vec2, points: &[Vec2], stroke: &Stroke) {
    if stroke.width <= 0.0 {
        return;
    }
    let half = stroke.width / 2.0;

    for (a, b) in dash_segments(points, stroke.dash) {
        let dir = b - a;
        if dir.length_squared() <= f32::EPSILON {
            continue;
        }
        let normal = dir.normalize().perp() * half;
        let ca = stroke.paint.color_at(a);
        let cb = stroke.paint.color_at(b);
        push_quad(
            out,
            [
                CanvasVertex::solid(origin + a + normal, ca),
                CanvasVertex::solid(origin + b + normal, cb),
                CanvasVertex::solid(origin + b - normal, cb),
                CanvasVertex::solid(origin + a - normal, ca),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{CYAN, MAGENTA};
    use crate::surface::{LinearGradient, RenderSurface, TextStyle};

    fn build(list: &DrawList, origin: Vec2) -> Vec<CanvasVertex> {
        let mut out = Vec::new();
        tessellate(list, origin, &mut out);
        out
    }

    #[test]
    fn test_solid_rect_is_two_triangles_offset() {
        let mut list = DrawList::new(Vec2::splat(100.0));
        list.fill_rect(Rect::new(0.0, 0.0, 10.0, 5.0), CYAN.into());
        let verts = build(&list, Vec2::new(100.0, 50.0));

        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].position, [100.0, 50.0]);
        assert_eq!(verts[2].position, [110.0, 55.0]);
        assert!(verts.iter().all(|v| v.color == CYAN));
    }

    #[test]
    fn test_gradient_rect_splits_at_stops() {
        let mut list = DrawList::new(Vec2::splat(100.0));
        let gradient = LinearGradient::new(Vec2::ZERO, Vec2::new(0.0, 100.0))
            .stop(0.0, CYAN)
            .stop(0.5, MAGENTA)
            .stop(1.0, CYAN);
        list.fill_rect(Rect::new(0.0, 0.0, 10.0, 100.0), gradient.into());
        let verts = build(&list, Vec2::ZERO);

        assert_eq!(verts.len(), 12);
        let middle = verts.iter().find(|v| v.position == [0.0, 50.0]).unwrap();
        assert_eq!(middle.color, MAGENTA);
    }

    #[test]
    fn test_glowing_disc_quad() {
        let mut list = DrawList::new(Vec2::splat(100.0));
        list.fill_circle(Vec2::new(50.0, 50.0), 2.0, CYAN, 8.0);
        let verts = build(&list, Vec2::ZERO);

        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].position, [40.0, 40.0]);
        assert_eq!(verts[0].shape, [SHAPE_DISC, 0.2]);
        assert_eq!(verts[0].local, [-1.0, -1.0]);
    }

    #[test]
    fn test_dashes_alternate() {
        let segments = dash_segments(&[Vec2::ZERO, Vec2::new(22.0, 0.0)], Some([5.0, 5.0]));
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], (Vec2::ZERO, Vec2::new(5.0, 0.0)));
        assert_eq!(segments[1], (Vec2::new(10.0, 0.0), Vec2::new(15.0, 0.0)));
        assert_eq!(segments[2], (Vec2::new(20.0, 0.0), Vec2::new(22.0, 0.0)));
    }

    #[test]
    fn test_dash_pattern_carries_across_corners() {
        let path = [Vec2::ZERO, Vec2::new(3.0, 0.0), Vec2::new(3.0, 10.0)];
        let segments = dash_segments(&path, Some([5.0, 5.0]));
        assert_eq!(segments[0], (Vec2::ZERO, Vec2::new(3.0, 0.0)));
        assert_eq!(segments[1], (Vec2::new(3.0, 0.0), Vec2::new(3.0, 2.0)));
        assert_eq!(segments[2], (Vec2::new(3.0, 7.0), Vec2::new(3.0, 10.0)));
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_text_and_empty_shapes_emit_nothing() {
        let mut list = DrawList::new(Vec2::splat(100.0));
        list.text(Vec2::ZERO, "label", TextStyle::new(12.0, CYAN));
        list.fill_rect(Rect::new(0.0, 0.0, 0.0, 10.0), CYAN.into());
        list.fill_polygon(&[Vec2::ZERO, Vec2::ONE], CYAN);
        assert!(build(&list, Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_stroke_has_requested_width() {
        let mut list = DrawList::new(Vec2::splat(100.0));
        list.line(Vec2::ZERO, Vec2::new(10.0, 0.0), Stroke::new(CYAN, 4.0));
        let verts = build(&list, Vec2::ZERO);
        assert_eq!(verts.len(), 6);
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert!(ys.contains(&2.0) && ys.contains(&-2.0));
    }
}
