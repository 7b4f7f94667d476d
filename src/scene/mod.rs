mod layout;
mod polygon;

pub use layout::Scene;
pub use polygon::Polygon;

use crate::geometry::Point;
use crate::lighting::Obstacle;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPACITY: f32 = 0.4;
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 6;

fn default_opacity() -> f32 {
    DEFAULT_OPACITY
}

fn default_segments() -> usize {
    DEFAULT_CIRCLE_SEGMENTS
}

/// Obstacle geometry as authored in a scene file. Each shape flattens to
/// one or more independent segments; the kernel never sees the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned rectangle, `origin` at the lower-left corner
    Rect {
        origin: Point,
        width: f32,
        height: f32,
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
    /// Circle approximated by a regular polygon, optionally spinning
    Circle {
        center: Point,
        radius: f32,
        #[serde(default = "default_segments")]
        segments: usize,
        /// Degrees per second, positive is counter-clockwise
        #[serde(default)]
        spin: f32,
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
    Segment {
        start: Point,
        end: Point,
        #[serde(default = "default_opacity")]
        opacity: f32,
    },
}

impl Shape {
    pub fn square(center: Point, size: f32) -> Self {
        Shape::Rect {
            origin: Point::new(center.x - size / 2.0, center.y - size / 2.0),
            width: size,
            height: size,
            opacity: DEFAULT_OPACITY,
        }
    }

    pub fn circle(center: Point, radius: f32, spin: f32) -> Self {
        Shape::Circle {
            center,
            radius,
            segments: DEFAULT_CIRCLE_SEGMENTS,
            spin,
            opacity: DEFAULT_OPACITY,
        }
    }

    /// Number of segments this shape flattens to
    pub fn segment_count(&self) -> usize {
        match self {
            Shape::Rect { .. } => 4,
            Shape::Circle { segments, .. } if *segments >= 3 => *segments,
            Shape::Circle { .. } => 0,
            Shape::Segment { .. } => 1,
        }
    }

    /// Append this shape's segments at animation time `time` (seconds)
    pub fn append_obstacles(&self, time: f32, out: &mut Vec<Obstacle>) {
        match *self {
            Shape::Rect {
                origin,
                width,
                height,
                opacity,
            } => out.extend(Polygon::rectangle(origin, width, height).obstacles(opacity)),
            Shape::Circle {
                center,
                radius,
                segments,
                spin,
                opacity,
            } => {
                if segments >= 3 {
                    let phase = (spin * time).to_radians();
                    out.extend(Polygon::regular(center, radius, segments, phase).obstacles(opacity));
                }
            },
            Shape::Segment {
                start,
                end,
                opacity,
            } => out.push(Obstacle::new(start, end, opacity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_is_centered() {
        let mut out = Vec::new();
        Shape::square(Point::new(100.0, 100.0), 20.0).append_obstacles(0.0, &mut out);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].start, Point::new(90.0, 90.0));
        assert!(out.iter().all(|o| o.opacity == DEFAULT_OPACITY));
    }

    #[test]
    fn test_circle_spins_over_time() {
        let shape = Shape::circle(Point::new(0.0, 0.0), 10.0, 90.0);
        let mut at_rest = Vec::new();
        let mut later = Vec::new();
        shape.append_obstacles(0.0, &mut at_rest);
        shape.append_obstacles(1.0, &mut later);

        assert_eq!(at_rest.len(), shape.segment_count());
        assert!((at_rest[0].start.x - 10.0).abs() < 1e-4);
        // A quarter turn moves the first vertex to the top
        assert!((later[0].start.y - 10.0).abs() < 1e-4);
        assert!(later[0].start.x.abs() < 1e-4);
    }

    #[test]
    fn test_circle_with_too_few_segments_is_empty() {
        let shape = Shape::Circle {
            center: Point::ORIGIN,
            radius: 5.0,
            segments: 2,
            spin: 0.0,
            opacity: 0.5,
        };
        let mut out = Vec::new();
        shape.append_obstacles(0.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_shape_json_defaults() {
        let shape: Shape = serde_json::from_str(
            r#"{"type":"circle","center":{"x":1.0,"y":2.0},"radius":3.0}"#,
        )
        .unwrap();
        assert_eq!(shape, Shape::circle(Point::new(1.0, 2.0), 3.0, 0.0));
    }
}
